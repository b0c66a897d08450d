//! Fetal head biometry from ultrasound segmentations
//!
//! A pretrained model outlines the fetal head; the mask is cleaned up, an
//! ellipse is fitted to its outer border, and head circumference, biparietal
//! and occipito-frontal diameters and gestational age are derived from it.

#![forbid(unsafe_code)]

/// Prediction pipeline and the current-image session
pub mod algorithm;
/// Segmentation model boundary and mask refinement
pub mod analysis;
/// Input/output, configuration, logging and error handling
pub mod io;
/// Ellipse fitting and clinical measurement formulas
pub mod math;
/// Binary masks and contour extraction
pub mod spatial;

pub use io::error::{BiometryError, Result};
