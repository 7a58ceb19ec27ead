// Rasterize the particle field.
// Visual: every particle's block is stamped at its current (rounded)
// position onto a transparent canvas; the canvas is then laid over the
// window background.

use image::RgbaImage;

use crate::field::ParticleField;
use crate::types::FrameBuffer;

/// Clear `canvas` and draw every particle's current block onto it.
/// Samples that land outside the canvas are dropped; a particle that is
/// entirely off canvas or has a non-finite position is skipped for this frame.
pub fn composite(field: &ParticleField, canvas: &mut RgbaImage) {
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let buf: &mut [u8] = canvas;
    buf.fill(0);

    for p in field.particles() {
        let Some(block) = field.block_for(p) else { continue };
        if !p.x.is_finite() || !p.y.is_finite() {
            continue;
        }
        let bx = p.x.round() as i64;
        let by = p.y.round() as i64;
        let size = block.size() as i64;
        if bx <= -size || bx >= cw || by <= -size || by >= ch {
            continue; // entirely off canvas
        }
        let samples = block.samples();

        for py in 0..size {
            let y = by + py;
            if y < 0 || y >= ch {
                continue;
            }
            for px in 0..size {
                let x = bx + px;
                if x < 0 || x >= cw {
                    continue;
                }
                let dst = ((y * cw + x) * 4) as usize;
                let src = ((py * size + px) * 4) as usize;
                buf[dst..dst + 4].copy_from_slice(&samples[src..src + 4]);
            }
        }
    }
}

/// Lay the RGBA canvas over a solid `background` (0x00RRGGBB) into a
/// window-ready frame. Only the overlapping area is written.
pub fn present(canvas: &RgbaImage, frame: &mut FrameBuffer, background: u32) {
    let br = (background >> 16) & 0xFF;
    let bg = (background >> 8) & 0xFF;
    let bb = background & 0xFF;

    let w = frame.width.min(canvas.width() as usize);
    let h = frame.height.min(canvas.height() as usize);
    for y in 0..h {
        for x in 0..w {
            let [r, g, b, a] = canvas.get_pixel(x as u32, y as u32).0;
            let (r, g, b, a) = (r as u32, g as u32, b as u32, a as u32);
            // Straight alpha "over": out = src*a + bg*(255-a), /255 rounded
            let mix = |s: u32, d: u32| (s * a + d * (255 - a) + 127) / 255;
            frame.pixels[y * frame.width + x] = (mix(r, br) << 16) | (mix(g, bg) << 8) | mix(b, bb);
        }
    }
}
