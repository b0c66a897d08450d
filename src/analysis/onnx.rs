//! ONNX Runtime backed segmentation model

use crate::analysis::segmentation::Segmenter;
use crate::io::error::{BiometryError, Result, invalid_input};
use ndarray::Array2;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use tracing::{debug, info};

/// Segmentation network exported to ONNX
///
/// The network takes a single NHWC tensor `[1, size, size, 1]` and produces
/// one output whose element count equals `size * size`.
pub struct OnnxSegmenter {
    session: Session,
}

impl OnnxSegmenter {
    /// Load the model file once and keep the session for repeated calls
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or ONNX Runtime rejects it
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(BiometryError::FileSystem {
                path: path.to_path_buf(),
                operation: "open model",
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let session = Session::builder()?.commit_from_file(path)?;
        info!(model = %path.display(), "segmentation model loaded");

        Ok(Self { session })
    }
}

impl Segmenter for OnnxSegmenter {
    fn segment(&mut self, input: &Array2<f32>) -> Result<Array2<f32>> {
        let (rows, cols) = input.dim();
        let batch = input
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((1, rows, cols, 1))
            .map_err(|e| invalid_input(&e))?;

        let tensor = TensorRef::from_array_view(&batch)?;
        let outputs = self.session.run(ort::inputs![tensor])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        debug!(?shape, "segmentation output");

        if data.len() != rows * cols {
            return Err(BiometryError::Inference {
                reason: format!(
                    "expected {} output values, model produced {}",
                    rows * cols,
                    data.len()
                ),
            });
        }

        Array2::from_shape_vec((rows, cols), data.to_vec()).map_err(|e| invalid_input(&e))
    }
}
