//! Segmentation model boundary and the resolution round trip around it
//!
//! The model sees a fixed square grayscale input scaled to [0, 1] and returns
//! a per-pixel head probability of the same shape. Probabilities are
//! quantised to 8 bits, resized back to the source resolution and thresholded.

use crate::io::error::{Result, invalid_input};
use crate::spatial::mask::Mask;
use image::imageops::{FilterType, resize};
use image::{GrayImage, Luma};
use ndarray::Array2;

/// Opaque pretrained segmentation model
///
/// Implementations take a `(rows, cols)` array of intensities in [0, 1] and
/// return a probability map of the same shape.
pub trait Segmenter {
    /// Run one inference call
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot evaluate the input
    fn segment(&mut self, input: &Array2<f32>) -> Result<Array2<f32>>;
}

impl<F> Segmenter for F
where
    F: FnMut(&Array2<f32>) -> Result<Array2<f32>>,
{
    fn segment(&mut self, input: &Array2<f32>) -> Result<Array2<f32>> {
        self(input)
    }
}

/// Resize an image to the square model resolution and scale to [0, 1]
///
/// # Errors
///
/// Returns an error if the image or the requested size is empty
pub fn prepare_input(image: &GrayImage, size: u32) -> Result<Array2<f32>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(invalid_input(&"image has zero width or height"));
    }
    if size == 0 {
        return Err(invalid_input(&"model input size must be positive"));
    }

    let resized = resize(image, size, size, FilterType::Triangle);
    let side = size as usize;

    Ok(Array2::from_shape_fn((side, side), |(row, col)| {
        let value = resized
            .get_pixel_checked(col as u32, row as u32)
            .map_or(0, |p| p.0[0]);
        f32::from(value) / 255.0
    }))
}

/// Turn a model probability map into a binary mask at the source resolution
///
/// Values are clamped to [0, 1] and truncated to 8 bits before resizing, and
/// a pixel is foreground when its resized value exceeds `threshold`.
///
/// # Errors
///
/// Returns an error if the map is empty, not square, contains NaN, or the
/// target size is empty
pub fn probability_to_mask(
    probabilities: &Array2<f32>,
    width: u32,
    height: u32,
    threshold: f32,
) -> Result<Mask> {
    let (rows, cols) = probabilities.dim();
    if rows == 0 || cols == 0 || rows != cols {
        return Err(invalid_input(&format!(
            "probability map must be square and non-empty, got {rows}x{cols}"
        )));
    }
    if width == 0 || height == 0 {
        return Err(invalid_input(&"target mask has zero width or height"));
    }
    if probabilities.iter().any(|p| p.is_nan()) {
        return Err(invalid_input(&"probability map contains NaN"));
    }

    let quantised = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let p = probabilities
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(0.0);
        Luma([(p.clamp(0.0, 1.0) * 255.0) as u8])
    });

    let restored = resize(&quantised, width, height, FilterType::Triangle);

    Ok(Mask::from_fn(width, height, |x, y| {
        f32::from(restored.get_pixel(x, y).0[0]) / 255.0 > threshold
    }))
}
