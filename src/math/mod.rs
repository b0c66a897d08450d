//! Geometry and measurement formulas

/// Biometry derived from a fitted ellipse
pub mod biometry;
/// Direct least-squares ellipse fit
pub mod ellipse;

pub use ellipse::Ellipse;
