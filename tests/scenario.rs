//! End-to-end: two 100x100 pictures, block 10, margin 0, threshold 0.85.

use std::time::Duration;

use image::{Rgba, RgbaImage};
use pixel_dissolve::{
    DisplacedPredicate, Effect, EffectConfig, MotionModel, ParticleField, ParticleState, Phase,
    TransitionController, decompose_all,
};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn pictures() -> Vec<RgbaImage> {
    vec![
        RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255])),
        RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255])),
    ]
}

fn config() -> EffectConfig {
    EffectConfig { block_size: 10, margin: 0, switch_threshold: 0.85, ..Default::default() }
}

#[test]
fn eighty_six_of_hundred_switches_exactly_once() {
    let cfg = config();
    let scene = decompose_all(&pictures(), cfg.block_size, cfg.margin).unwrap();
    assert!(scene.sets.iter().all(|s| s.len() <= 100));
    let mut field = ParticleField::new(&scene, &cfg);
    assert_eq!(field.len(), 100);
    let mut ctl = TransitionController::new(&cfg, scene.image_count(), field.len());

    // Mark particles one at a time; nothing happens until the 86th.
    let mut switches = 0;
    for i in 0..86 {
        ctl.begin_tick(&mut field, ms(i as u64 * 16));
        ctl.note_interaction(&mut field.particles_mut()[i]);
        if ctl.evaluate(&mut field, ms(i as u64 * 16)).is_some() {
            switches += 1;
            assert_eq!(i, 85, "switched early at {} marks", i + 1);
        }
    }
    assert_eq!(switches, 1);
    assert_eq!(ctl.active_image(), 1);
    let switched_at = ctl.last_switch().unwrap();

    // Keep hammering every particle for the whole cooldown: no second switch,
    // nothing even gets marked.
    let mut t = switched_at;
    while t < switched_at + cfg.cooldown() {
        ctl.begin_tick(&mut field, t);
        for p in field.particles_mut() {
            ctl.note_interaction(p);
        }
        assert!(ctl.evaluate(&mut field, t).is_none());
        assert!(field.particles().iter().all(|p| p.state == ParticleState::Normal));
        t += ms(16);
    }
    assert_eq!(ctl.active_image(), 1);
    assert_eq!(ctl.switch_count(), 1);

    ctl.begin_tick(&mut field, t);
    assert_eq!(ctl.phase(), Phase::Accumulating);
}

#[test]
fn sweeping_pointer_drives_a_switch() {
    let cfg = EffectConfig { radius_growth: 40.0, ..config() };
    let scene = decompose_all(&pictures(), cfg.block_size, cfg.margin).unwrap();
    let mut fx = Effect::new(&scene, &cfg);

    // Boustrophedon sweep over every row band, 2px per tick, twice.
    let mut path = Vec::new();
    for _ in 0..2 {
        for row in 0..10 {
            let y = row as f32 * 10.0 + 5.0;
            for step in 0..=50 {
                let x = if row % 2 == 0 { step as f32 * 2.0 } else { 100.0 - step as f32 * 2.0 };
                path.push((x, y));
            }
        }
    }

    let mut switch_times = Vec::new();
    let mut peak_progress: f32 = 0.0;
    for (i, (x, y)) in path.into_iter().enumerate() {
        let now = ms(i as u64 * 16);
        fx.observe_pointer(x, y);
        let r = fx.tick(now);
        assert!((0.0..=1.0).contains(&r.progress));
        peak_progress = peak_progress.max(r.progress);
        if let Some(ev) = r.switched {
            assert_eq!(ev.to, (ev.from + 1) % 2);
            switch_times.push(ev.at);
        }
    }

    assert!(!switch_times.is_empty(), "peak progress {peak_progress}");
    for pair in switch_times.windows(2) {
        assert!(pair[1] - pair[0] >= cfg.cooldown());
    }
}

#[test]
fn free_drift_with_reset_cycle() {
    let cfg = EffectConfig {
        motion_model: MotionModel::FreeDrift,
        displaced_predicate: DisplacedPredicate::PixelDistance,
        pixel_threshold: 2.0,
        reset_after_switch: true,
        radius_growth: 40.0,
        ..config()
    };
    let scene = decompose_all(&pictures(), cfg.block_size, cfg.margin).unwrap();
    let mut fx = Effect::new(&scene, &cfg);

    let mut t = 0u64;
    let mut switched_at = None;
    'sweep: for _ in 0..4 {
        for row in 0..10 {
            for step in 0..=50 {
                fx.observe_pointer(step as f32 * 2.0, row as f32 * 10.0 + 5.0);
                let r = fx.tick(ms(t));
                t += 16;
                if let Some(ev) = r.switched {
                    assert!(r.complete);
                    switched_at = Some(ev.at);
                    break 'sweep;
                }
            }
        }
    }
    let switched_at = switched_at.expect("free-drift sweep never switched");

    // Held "complete" for the cooldown, then everything snaps home. The
    // pointer leaves the canvas so nothing is pushed after the reset.
    fx.observe_pointer(-1000.0, -1000.0);
    let r = fx.tick(switched_at + ms(10));
    assert!(r.complete);
    assert_eq!(r.progress, 1.0);
    let r = fx.tick(switched_at + cfg.cooldown());
    assert!(!r.complete);
    assert_eq!(r.progress, 0.0);
    assert!(fx.field().particles().iter().all(|p| p.displacement() == 0.0));
    assert!(fx.field().particles().iter().all(|p| p.image == 1));
}
