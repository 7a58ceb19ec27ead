// Core types shared by the decomposer, the simulation and the window.

use std::sync::Arc;

#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A frame filled with one color.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }
}

/// Top-left pixel of one B-aligned grid cell, in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    /// Scan order of the decomposer: rows first, then columns.
    #[inline]
    pub fn scan_key(self) -> (u32, u32) {
        (self.y, self.x)
    }
}

/// One B×B square of RGBA samples, row-major, length `B*B*4`.
/// Immutable once decomposed; cloning only bumps a refcount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorBlock {
    size: u32,
    samples: Arc<[u8]>,
}

impl ColorBlock {
    /// Wrap a sample run. Returns `None` when the length is not `size*size*4`.
    pub fn new(size: u32, samples: Vec<u8>) -> Option<Self> {
        let expected = (size as usize) * (size as usize) * 4;
        if size == 0 || samples.len() != expected {
            return None;
        }
        Some(Self { size, samples: samples.into() })
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// RGBA of the pixel at (px, py) inside the block.
    #[inline]
    pub fn rgba(&self, px: u32, py: u32) -> [u8; 4] {
        let i = ((py * self.size + px) * 4) as usize;
        [self.samples[i], self.samples[i + 1], self.samples[i + 2], self.samples[i + 3]]
    }

    /// True when every alpha sample is zero.
    pub fn is_fully_transparent(&self) -> bool {
        self.samples.chunks_exact(4).all(|px| px[3] == 0)
    }
}
