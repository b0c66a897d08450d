//! Prediction workflow

/// Linear stage runner from image to measurement
pub mod pipeline;
/// Load / predict / save state for one image at a time
pub mod session;

pub use pipeline::{Measurement, PipelineConfig};
pub use session::Session;
