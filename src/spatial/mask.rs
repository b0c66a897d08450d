//! Binary masks backed by 8-bit grayscale buffers
//!
//! Foreground pixels are stored as 255 and background as 0, the convention
//! used by the morphology and contour routines in `imageproc`.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use std::collections::HashSet;

/// Stored value of a foreground pixel
pub const FOREGROUND: u8 = 255;
/// Stored value of a background pixel
pub const BACKGROUND: u8 = 0;

/// Binary segmentation mask
///
/// Every refinement stage produces a new mask rather than mutating its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pixels: GrayImage,
}

impl Mask {
    /// Create an all-background mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    /// Build a mask by evaluating `is_foreground` at every pixel
    pub fn from_fn(width: u32, height: u32, mut is_foreground: impl FnMut(u32, u32) -> bool) -> Self {
        Self {
            pixels: GrayImage::from_fn(width, height, |x, y| {
                Luma([if is_foreground(x, y) {
                    FOREGROUND
                } else {
                    BACKGROUND
                }])
            }),
        }
    }

    /// Wrap a grayscale image, treating any non-zero pixel as foreground
    pub fn from_image(image: &GrayImage) -> Self {
        Self::from_fn(image.width(), image.height(), |x, y| {
            image.get_pixel(x, y).0[0] != BACKGROUND
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Whether the pixel at (x, y) is foreground; out-of-range reads as background
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        self.pixels
            .get_pixel_checked(x, y)
            .is_some_and(|p| p.0[0] != BACKGROUND)
    }

    /// Mark or clear a pixel; out-of-range writes are ignored
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        if let Some(pixel) = self.pixels.get_pixel_mut_checked(x, y) {
            pixel.0[0] = if foreground { FOREGROUND } else { BACKGROUND };
        }
    }

    /// Number of foreground pixels
    pub fn area(&self) -> usize {
        self.pixels
            .as_raw()
            .iter()
            .filter(|&&v| v != BACKGROUND)
            .count()
    }

    /// True when the mask has no foreground pixels
    pub fn is_empty(&self) -> bool {
        self.pixels.as_raw().iter().all(|&v| v == BACKGROUND)
    }

    /// Number of 8-connected foreground regions
    pub fn component_count(&self) -> usize {
        let labels = connected_components(&self.pixels, Connectivity::Eight, Luma([BACKGROUND]));
        labels
            .as_raw()
            .iter()
            .filter(|&&label| label != 0)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Borrow the underlying 0/255 buffer
    pub const fn as_image(&self) -> &GrayImage {
        &self.pixels
    }

    /// Consume the mask, returning the underlying 0/255 buffer
    pub fn into_image(self) -> GrayImage {
        self.pixels
    }
}
