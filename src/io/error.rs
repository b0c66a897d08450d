//! Error types and context management for the measurement pipeline

use std::fmt;
use std::path::{Path, PathBuf};

/// Main error type for all biometry operations
///
/// Each pipeline stage reports its own failure class so that callers can tell
/// a missing model apart from an image in which nothing was detected.
#[derive(Debug)]
pub enum BiometryError {
    /// A scan could not be opened or decoded
    ImageLoad {
        /// Scan that was being read
        path: PathBuf,
        /// Decoder error
        source: image::ImageError,
    },

    /// An annotated image or overlay could not be encoded
    ImageExport {
        /// Destination file
        path: PathBuf,
        /// Encoder error
        source: image::ImageError,
    },

    /// Reading, writing or listing a path failed
    FileSystem {
        /// Path being accessed
        path: PathBuf,
        /// Short verb phrase such as "write report"
        operation: &'static str,
        /// I/O error from the operating system
        source: std::io::Error,
    },

    /// A calibration table file could not be parsed
    Calibration {
        /// Path of the offending CSV file
        path: PathBuf,
        /// Underlying CSV error
        source: csv::Error,
    },

    /// The selected file has a format that is recognised but not processed
    UnsupportedFormat {
        /// Path of the selected file
        path: PathBuf,
        /// Short name of the format
        format: &'static str,
    },

    /// No segmentation model is loaded, prediction is disabled
    InferenceUnavailable,

    /// The segmentation model failed to produce a probability map
    Inference {
        /// Description of the failure
        reason: String,
    },

    /// Input data doesn't meet pipeline requirements
    InvalidInput {
        /// Description of what's wrong with the input
        reason: String,
    },

    /// The refined mask contains no foreground region
    NoDetection,

    /// An ellipse could not be fitted to the detected contour
    EllipseFit {
        /// Number of contour points handed to the fit
        points: usize,
        /// Explanation of why the fit failed
        reason: String,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Parameter name as shown to the user
        parameter: &'static str,
        /// Rejected text
        value: String,
        /// What an acceptable value looks like
        reason: String,
    },
}

impl fmt::Display for BiometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Cannot read scan '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Cannot write image '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "Could not {operation} '{}': {source}",
                    path.display()
                )
            }
            Self::Calibration { path, source } => {
                write!(
                    f,
                    "Failed to read calibration table '{}': {source}",
                    path.display()
                )
            }
            Self::UnsupportedFormat { path, format } => {
                write!(
                    f,
                    "{format} input is not supported yet: '{}'",
                    path.display()
                )
            }
            Self::InferenceUnavailable => {
                write!(f, "No segmentation model is loaded, prediction is disabled")
            }
            Self::Inference { reason } => write!(f, "Segmentation inference failed: {reason}"),
            Self::InvalidInput { reason } => write!(f, "Invalid input: {reason}"),
            Self::NoDetection => write!(f, "No head region detected in the segmentation"),
            Self::EllipseFit { points, reason } => {
                write!(
                    f,
                    "Ellipse fit failed on {points} contour points: {reason}"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Rejected {parameter} '{value}': {reason}")
            }
        }
    }
}

impl std::error::Error for BiometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Calibration { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for biometry results
pub type Result<T> = std::result::Result<T, BiometryError>;

/// Placeholder used by the blanket conversions until a real path is attached
pub const UNKNOWN_PATH: &str = "<unknown>";

/// Attaches the file path an operation was working on to its error
pub trait WithContext<T> {
    /// Replace a placeholder path in the error with `path`
    ///
    /// # Errors
    ///
    /// Propagates the original error with the path applied
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<BiometryError>,
{
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only path-carrying variants benefit from the context
            match &mut error {
                BiometryError::ImageLoad { path: slot, .. }
                | BiometryError::ImageExport { path: slot, .. }
                | BiometryError::FileSystem { path: slot, .. }
                | BiometryError::Calibration { path: slot, .. } => {
                    if slot.as_os_str() == UNKNOWN_PATH {
                        *slot = path.to_path_buf();
                    }
                }
                _ => {}
            }
            error
        })
    }
}

impl From<image::ImageError> for BiometryError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

impl From<std::io::Error> for BiometryError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from(UNKNOWN_PATH),
            operation: "access",
            source: err,
        }
    }
}

impl From<csv::Error> for BiometryError {
    fn from(err: csv::Error) -> Self {
        Self::Calibration {
            path: PathBuf::from(UNKNOWN_PATH),
            source: err,
        }
    }
}

#[cfg(feature = "onnx")]
impl From<ort::Error> for BiometryError {
    fn from(err: ort::Error) -> Self {
        Self::Inference {
            reason: err.to_string(),
        }
    }
}

/// Error for a rejected user-supplied value
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> BiometryError {
    BiometryError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid input error
pub fn invalid_input(reason: &impl ToString) -> BiometryError {
    BiometryError::InvalidInput {
        reason: reason.to_string(),
    }
}
