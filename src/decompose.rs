// Image → particle sets.
// Visual expectation: every B×B square of the picture that has at least one
// visible pixel becomes one particle; empty squares (fully transparent)
// simply do not exist in the effect.

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;
use tracing::{info, warn};

use crate::config::{MAX_BLOCK_SIZE, MAX_MARGIN};
use crate::error::{Error, Result};
use crate::types::{ColorBlock, GridCell};

/// All blocks decomposed from one image, in scan order.
/// A block's position in this sequence is its slot index.
#[derive(Clone, Debug)]
pub struct ParticleSet {
    block_size: u32,
    blocks: Vec<ColorBlock>,
    cells: Vec<GridCell>,
    by_cell: HashMap<GridCell, usize>,
}

impl ParticleSet {
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    #[inline]
    pub fn block(&self, slot: usize) -> Option<&ColorBlock> {
        self.blocks.get(slot)
    }

    #[inline]
    pub fn cell(&self, slot: usize) -> Option<GridCell> {
        self.cells.get(slot).copied()
    }

    /// Slot of the block decomposed at `cell`, if that cell was not empty.
    #[inline]
    pub fn slot_of(&self, cell: GridCell) -> Option<usize> {
        self.by_cell.get(&cell).copied()
    }

    /// Block decomposed at `cell`, if that cell was not empty.
    pub fn block_at(&self, cell: GridCell) -> Option<&ColorBlock> {
        self.slot_of(cell).and_then(|slot| self.blocks.get(slot))
    }

    /// Grid cells in slot order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCell, &ColorBlock)> {
        self.cells.iter().copied().zip(self.blocks.iter())
    }
}

/// Every image of one effect, decomposed on the same canvas.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Canvas (= simulation space) size: image size plus the margin on each side.
    pub width: u32,
    pub height: u32,
    pub block_size: u32,
    pub margin: u32,
    pub sets: Arc<[ParticleSet]>,
}

impl Scene {
    #[inline]
    pub fn image_count(&self) -> usize {
        self.sets.len()
    }

    /// True when every set has the same cells in the same order, which is
    /// what makes sequence slot indices mean the same place in every image.
    pub fn footprints_match(&self) -> bool {
        let Some(first) = self.sets.first() else { return true };
        self.sets.iter().all(|s| s.cells == first.cells)
    }
}

/// Decompose one image. The canvas is the image padded by `margin` on every
/// side; pixels outside the image read as fully transparent.
pub fn decompose(image: &RgbaImage, block_size: u32, margin: u32) -> Result<ParticleSet> {
    if block_size == 0 || block_size > MAX_BLOCK_SIZE {
        return Err(Error::InvalidConfig(format!(
            "block_size must be in 1..={MAX_BLOCK_SIZE}, got {block_size}"
        )));
    }
    let (iw, ih) = image.dimensions();
    if iw == 0 || ih == 0 {
        return Err(Error::EmptyImage { index: 0, width: iw, height: ih });
    }
    let (cw, ch) = canvas_size(iw, ih, margin)?;
    let b = block_size;
    let block_len = (b as usize)
        .checked_mul(b as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| Error::InvalidConfig(format!("block_size {b} is too large")))?;

    let mut blocks = Vec::new();
    let mut cells = Vec::new();
    let mut by_cell = HashMap::new();

    for y in (0..ch).step_by(b as usize) {
        for x in (0..cw).step_by(b as usize) {
            let mut samples = Vec::with_capacity(block_len);
            let mut any_visible = false;
            for py in 0..b {
                for px in 0..b {
                    let rgba = source_pixel(image, x.saturating_add(px), y.saturating_add(py), margin);
                    any_visible |= rgba[3] != 0;
                    samples.extend_from_slice(&rgba);
                }
            }
            if !any_visible {
                continue; // empty cell: no particle
            }
            // Length is b*b*4 by construction.
            let Some(block) = ColorBlock::new(b, samples) else { continue };
            let cell = GridCell { x, y };
            by_cell.insert(cell, blocks.len());
            cells.push(cell);
            blocks.push(block);
        }
    }

    Ok(ParticleSet { block_size: b, blocks, cells, by_cell })
}

/// Image size plus `margin` on every side. Margins past `MAX_MARGIN` or
/// sums that do not fit in `u32` are rejected.
fn canvas_size(iw: u32, ih: u32, margin: u32) -> Result<(u32, u32)> {
    let too_large = || Error::InvalidConfig(format!("margin {margin} is too large for a {iw}x{ih} image"));
    if margin > MAX_MARGIN {
        return Err(too_large());
    }
    let pad = margin.checked_mul(2).ok_or_else(too_large)?;
    let cw = iw.checked_add(pad).ok_or_else(too_large)?;
    let ch = ih.checked_add(pad).ok_or_else(too_large)?;
    Ok((cw, ch))
}

/// Canvas pixel (cx, cy) read from the image shifted by `margin`.
#[inline]
fn source_pixel(image: &RgbaImage, cx: u32, cy: u32, margin: u32) -> [u8; 4] {
    if cx < margin || cy < margin {
        return [0; 4];
    }
    let (sx, sy) = (cx - margin, cy - margin);
    if sx >= image.width() || sy >= image.height() {
        return [0; 4];
    }
    image.get_pixel(sx, sy).0
}

/// Decompose every image of an effect. All images must be non-empty and share
/// the same dimensions.
pub fn decompose_all(images: &[RgbaImage], block_size: u32, margin: u32) -> Result<Scene> {
    let Some(first) = images.first() else { return Err(Error::NoImages) };
    let (w, h) = first.dimensions();

    let mut sets = Vec::with_capacity(images.len());
    for (index, img) in images.iter().enumerate() {
        let (iw, ih) = img.dimensions();
        if iw == 0 || ih == 0 {
            return Err(Error::EmptyImage { index, width: iw, height: ih });
        }
        if (iw, ih) != (w, h) {
            return Err(Error::DimensionMismatch { index, want_w: w, want_h: h, got_w: iw, got_h: ih });
        }
        let set = decompose(img, block_size, margin)?;
        info!(image = index, particles = set.len(), block_size, "decomposed image");
        sets.push(set);
    }

    let (width, height) = canvas_size(w, h, margin)?;
    let scene = Scene {
        width,
        height,
        block_size,
        margin,
        sets: sets.into(),
    };
    if !scene.footprints_match() {
        let counts: Vec<usize> = scene.sets.iter().map(ParticleSet::len).collect();
        warn!(?counts, "images have different opaque footprints; slot indices do not line up across images");
    }
    Ok(scene)
}

/// The image placed on its padded canvas, exactly as the decomposer sees it.
/// Rejects the same margins `decompose` does.
pub fn with_margin(image: &RgbaImage, margin: u32) -> Result<RgbaImage> {
    let (iw, ih) = image.dimensions();
    let (cw, ch) = canvas_size(iw, ih, margin)?;
    let mut out = RgbaImage::new(cw, ch);
    for (x, y, px) in image.enumerate_pixels() {
        out.put_pixel(x + margin, y + margin, *px);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn opaque(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn full_image_gives_one_block_per_cell() {
        let set = decompose(&opaque(100, 100), 10, 0).unwrap();
        assert_eq!(set.len(), 100);
        assert_eq!(set.cell(0), Some(GridCell { x: 0, y: 0 }));
        assert_eq!(set.cell(1), Some(GridCell { x: 10, y: 0 }));
        assert_eq!(set.cell(10), Some(GridCell { x: 0, y: 10 }));
        // Block content is row-major relative to the cell.
        let b = set.block(11).unwrap();
        assert_eq!(b.rgba(3, 4), [13, 14, 7, 255]);
    }

    #[test]
    fn transparent_cells_are_omitted() {
        let mut img = opaque(20, 20);
        for y in 0..10 {
            for x in 10..20 {
                img.put_pixel(x, y, Rgba([9, 9, 9, 0]));
            }
        }
        let set = decompose(&img, 10, 0).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.slot_of(GridCell { x: 10, y: 0 }), None);
        assert_eq!(set.slot_of(GridCell { x: 0, y: 10 }), Some(1));
    }

    #[test]
    fn partially_transparent_block_is_kept_as_is() {
        let mut img = RgbaImage::new(4, 4);
        img.put_pixel(1, 1, Rgba([1, 2, 3, 4]));
        let set = decompose(&img, 4, 0).unwrap();
        assert_eq!(set.len(), 1);
        let b = set.block(0).unwrap();
        assert_eq!(b.samples().len(), 64);
        assert_eq!(b.rgba(1, 1), [1, 2, 3, 4]);
        assert_eq!(b.rgba(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn margin_cells_are_transparent() {
        // 10x10 image, margin 10, block 10: only the center cell is visible.
        let set = decompose(&opaque(10, 10), 10, 10).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.cell(0), Some(GridCell { x: 10, y: 10 }));
    }

    #[test]
    fn overhanging_blocks_read_transparent_outside_canvas() {
        // 7x7 canvas with block 5: right/bottom blocks overhang by 3 pixels.
        let set = decompose(&opaque(7, 7), 5, 0).unwrap();
        assert_eq!(set.len(), 4);
        let corner = set.block_at(GridCell { x: 5, y: 5 }).unwrap();
        assert_eq!(corner.rgba(1, 1)[3], 255);
        assert_eq!(corner.rgba(2, 0)[3], 0);
        assert_eq!(corner.rgba(0, 2)[3], 0);
    }

    #[test]
    fn decomposition_is_deterministic() {
        let img = opaque(33, 21);
        let a = decompose(&img, 5, 3).unwrap();
        let b = decompose(&img, 5, 3).unwrap();
        assert_eq!(a.cells(), b.cells());
        assert!(a.iter().zip(b.iter()).all(|(x, y)| x == y));
    }

    #[test]
    fn decompose_all_rejects_bad_inputs() {
        assert!(matches!(decompose_all(&[], 5, 0), Err(Error::NoImages)));
        assert!(matches!(
            decompose_all(&[RgbaImage::new(0, 4)], 5, 0),
            Err(Error::EmptyImage { index: 0, .. })
        ));
        assert!(matches!(
            decompose_all(&[opaque(10, 10), opaque(10, 12)], 5, 0),
            Err(Error::DimensionMismatch { index: 1, .. })
        ));
        assert!(matches!(decompose(&opaque(4, 4), 0, 0), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn scene_reports_canvas_and_footprints() {
        let mut holed = opaque(20, 20);
        for y in 0..10 {
            for x in 0..10 {
                holed.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        let scene = decompose_all(&[opaque(20, 20), holed], 10, 5).unwrap();
        assert_eq!((scene.width, scene.height), (30, 30));
        assert_eq!(scene.image_count(), 2);
        assert!(!scene.footprints_match());

        let scene = decompose_all(&[opaque(20, 20), opaque(20, 20)], 10, 5).unwrap();
        assert!(scene.footprints_match());
    }

    #[test]
    fn with_margin_shifts_image() {
        let canvas = with_margin(&opaque(3, 3), 2).unwrap();
        assert_eq!(canvas.dimensions(), (7, 7));
        assert_eq!(canvas.get_pixel(2, 2).0, [0, 0, 7, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn oversized_geometry_is_an_error() {
        let tiny = opaque(1, 1);
        assert!(matches!(decompose(&tiny, 40_000, 0), Err(Error::InvalidConfig(_))));
        assert!(matches!(decompose(&tiny, 5, 3_000_000_000), Err(Error::InvalidConfig(_))));
        assert!(matches!(decompose(&tiny, 5, MAX_MARGIN + 1), Err(Error::InvalidConfig(_))));
        assert!(matches!(decompose_all(&[tiny.clone()], 5, u32::MAX), Err(Error::InvalidConfig(_))));
        assert!(matches!(with_margin(&tiny, 3_000_000_000), Err(Error::InvalidConfig(_))));
        assert!(canvas_size(u32::MAX, 1, 1).is_err());
    }

    #[test]
    fn largest_geometry_still_decomposes() {
        let set = decompose(&opaque(2, 2), MAX_BLOCK_SIZE, 0).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.block(0).unwrap().samples().len(), 1024 * 1024 * 4);
        assert_eq!(canvas_size(1, 1, MAX_MARGIN).unwrap(), (2 * MAX_MARGIN + 1, 2 * MAX_MARGIN + 1));
    }
}
