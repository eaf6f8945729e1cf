//! Geometry types produced by detection and cropping.

use serde::{Deserialize, Serialize};

/// Best detection, in the detector's fixed input space.
///
/// Top-left/width/height convention in the square the detector consumes, not
/// the original image. Every box a decoder returns satisfies `x, y >= 0`,
/// `width, height >= 1`, and `x + width`, `y + height` within the input side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Box width.
    pub width: f32,
    /// Box height.
    pub height: f32,
    /// Highest per-class score of the winning candidate.
    pub confidence: f32,
}

impl BoundingBox {
    /// Creates a bounding box.
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    /// Right edge (`x + width`).
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Pixel rectangle to cut from the original image.
///
/// Produced by the cropper, which guarantees the region is non-degenerate
/// and lies fully inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    /// Left edge in original-image pixels.
    pub x: u32,
    /// Top edge in original-image pixels.
    pub y: u32,
    /// Region width in pixels, at least 1.
    pub width: u32,
    /// Region height in pixels, at least 1.
    pub height: u32,
}

impl CropRegion {
    /// Creates a crop region.
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (`x + width`).
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (`y + height`).
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}
