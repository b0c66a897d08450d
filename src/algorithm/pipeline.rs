//! Linear prediction pipeline: inference, refinement, ellipse fit, biometry
//!
//! Each stage either hands a value to the next or stops with the error class
//! that describes why, so callers can distinguish a failed model call from an
//! image in which no head was found.

use crate::analysis::refinement::refine;
use crate::analysis::segmentation::{Segmenter, prepare_input, probability_to_mask};
use crate::io::configuration::{MODEL_INPUT_SIZE, PROBABILITY_THRESHOLD};
use crate::io::error::{BiometryError, Result, invalid_input};
use crate::math::biometry::{Biometry, effective_pixel_size, measure};
use crate::math::ellipse::{Ellipse, fit_ellipse};
use crate::spatial::contour::external_contour;
use crate::spatial::mask::Mask;
use image::GrayImage;
use tracing::debug;

/// Tunable pipeline parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Side of the square model input
    pub input_size: u32,
    /// Probability above which a pixel is foreground
    pub threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_size: MODEL_INPUT_SIZE,
            threshold: PROBABILITY_THRESHOLD,
        }
    }
}

/// Result of one successful prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Ellipse fitted to the head outline, in source pixels
    pub ellipse: Ellipse,
    /// Measurements derived from the ellipse
    pub biometry: Biometry,
    /// Pixel size actually applied, in millimetres
    pub pixel_size_mm: f64,
}

/// Segment the image and return the refined head mask at source resolution
///
/// # Errors
///
/// Returns an error if the image is empty, the model fails, or the model
/// output has the wrong shape
pub fn segment_head(
    segmenter: &mut dyn Segmenter,
    image: &GrayImage,
    config: &PipelineConfig,
) -> Result<Mask> {
    let input = prepare_input(image, config.input_size)?;
    let probabilities = segmenter.segment(&input)?;

    if probabilities.dim() != input.dim() {
        let (rows, cols) = probabilities.dim();
        return Err(invalid_input(&format!(
            "model returned a {rows}x{cols} map for a {side}x{side} input",
            side = config.input_size
        )));
    }

    let mask = probability_to_mask(
        &probabilities,
        image.width(),
        image.height(),
        config.threshold,
    )?;
    debug!(area = mask.area(), "thresholded mask");

    let refined = refine(&mask);
    debug!(area = refined.area(), "refined mask");
    Ok(refined)
}

/// Fit the head ellipse and derive measurements from a refined mask
///
/// # Errors
///
/// Returns [`BiometryError::NoDetection`] for an empty mask and
/// [`BiometryError::EllipseFit`] when the outline cannot be fitted
pub fn measure_mask(mask: &Mask, pixel_size_mm: f64) -> Result<Measurement> {
    let contour = external_contour(mask).ok_or(BiometryError::NoDetection)?;
    debug!(points = contour.len(), "external contour");

    let ellipse = fit_ellipse(&contour)?;
    debug!(?ellipse, "fitted ellipse");

    let pixel_size_mm = effective_pixel_size(pixel_size_mm);
    Ok(Measurement {
        ellipse,
        biometry: measure(&ellipse, pixel_size_mm),
        pixel_size_mm,
    })
}

/// Run the whole pipeline for one image
///
/// # Errors
///
/// Propagates the first failing stage's error
pub fn run_prediction(
    segmenter: &mut dyn Segmenter,
    image: &GrayImage,
    pixel_size_mm: f64,
    config: &PipelineConfig,
) -> Result<Measurement> {
    let mask = segment_head(segmenter, image, config)?;
    measure_mask(&mask, pixel_size_mm)
}
