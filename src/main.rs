// What you SEE:
// • The first picture, drawn as a grid of small squares.
// • Move the mouse over it: squares are pushed away and come back wearing
//   the next picture's colors.
// • Once enough squares have flipped, the whole picture switches to the next
//   one (then the next, wrapping around). The bar at the bottom fills up as
//   you get closer.
// • R snaps all squares home. ESC quits.
//
// Usage: pixel-dissolve [--config effect.toml] IMAGE [IMAGE...]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use image::RgbaImage;
use pixel_dissolve::compositor::present;
use pixel_dissolve::config::EffectConfig;
use pixel_dissolve::decompose::decompose_all;
use pixel_dissolve::draw::{Drawer, draw_progress_bar, draw_ring, draw_text_5x7};
use pixel_dissolve::effect::Effect;
use pixel_dissolve::error::{Error, Result};
use pixel_dissolve::pointer::ViewportMapping;
use pixel_dissolve::types::FrameBuffer;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

struct Args {
    config: Option<PathBuf>,
    images: Vec<PathBuf>,
}

impl Args {
    fn parse(mut it: impl Iterator<Item = String>) -> Result<Self> {
        let mut config = None;
        let mut images = Vec::new();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = it
                        .next()
                        .ok_or_else(|| Error::Usage("--config needs a file".into()))?;
                    config = Some(PathBuf::from(path));
                }
                _ => images.push(PathBuf::from(arg)),
            }
        }
        if images.is_empty() {
            return Err(Error::Usage("pixel-dissolve [--config FILE] IMAGE [IMAGE...]".into()));
        }
        Ok(Self { config, images })
    }
}

fn load_images(paths: &[PathBuf]) -> Result<Vec<RgbaImage>> {
    paths
        .iter()
        .map(|path| {
            image::open(path)
                .map(|img| img.to_rgba8())
                .map_err(|source| Error::ImageLoad { path: path.clone(), source })
        })
        .collect()
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse(std::env::args().skip(1))?;
    let cfg = match &args.config {
        Some(path) => EffectConfig::load(path)?,
        None => EffectConfig::default(),
    };

    /* --- Pictures → particles ---
       Visual: nothing yet; every picture becomes a list of colored squares. */
    let images = load_images(&args.images)?;
    let scene = decompose_all(&images, cfg.block_size, cfg.margin)?;
    let mut effect = Effect::new(&scene, &cfg);
    info!(
        images = scene.image_count(),
        particles = effect.field().len(),
        width = scene.width,
        height = scene.height,
        "effect ready"
    );

    /* --- Window + reusable buffers ---
       Visual: window opens showing the first picture at rest. */
    let (w, h) = (scene.width as usize, scene.height as usize);
    let mut drawer = Drawer::new("Pixel Dissolve", w, h)?;
    let mut canvas = effect.new_canvas();
    let mut screen = FrameBuffer::filled(w, h, cfg.background);

    let start = Instant::now();
    let mut last_mouse: Option<(f32, f32)> = None;
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        if drawer.r_pressed_once() {
            effect.reset_particles(); // visual: everything jumps home
        }

        // Only real movement counts as input; a resting mouse lets the bubble shrink.
        if let Some(pos) = drawer.mouse_pos() {
            if last_mouse != Some(pos) {
                let (win_w, _) = drawer.window_size();
                let map = ViewportMapping::new((0.0, 0.0), w as f32, win_w as f32);
                let (sx, sy) = map.to_sim(pos.0, pos.1);
                effect.observe_pointer(sx, sy);
                last_mouse = Some(pos);
            }
        }

        let report = effect.tick(start.elapsed());

        effect.composite(&mut canvas);
        present(&canvas, &mut screen, cfg.background);

        if let Some((px, py)) = effect.pointer().position() {
            let r = effect.pointer().radius_sq().sqrt() as i32;
            draw_ring(&mut screen, px as i32, py as i32, r, 0x00_50_50_50); // visual: push bubble
        }

        /* HUD: which picture is next, and how close the switch is */
        let bar_h = 4;
        let bar_color = if report.complete { 0x00_33_DD_66 } else { 0x00_FF_CC_33 };
        draw_progress_bar(&mut screen, 0, h as i32 - bar_h, w as i32, bar_h, report.progress, bar_color);
        let t = effect.transition();
        let hud = if report.complete {
            String::from("DONE")
        } else {
            format!(
                "IMG {}/{}  {}%",
                t.active_image() + 1,
                scene.image_count(),
                (report.progress * 100.0).round() as u32
            )
        };
        draw_text_5x7(&mut screen, 4, 4, &hud, 0x00_FF_FF_FF);

        drawer.present(&screen)?;

        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / now.duration_since(last_fps_time).as_secs_f32();
            debug!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
