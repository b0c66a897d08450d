//! Input/output operations, configuration and error handling

/// Pixel size tables keyed by file name
pub mod calibration;
/// Command-line interface
pub mod cli;
/// Constants and file naming conventions
pub mod configuration;
/// Error types
pub mod error;
/// Image loading, drawing and export
pub mod image;
/// Logging setup
pub mod logging;
/// Batch progress display
pub mod progress;
/// Measurement labels and text report
pub mod report;
