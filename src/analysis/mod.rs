//! Segmentation and mask post-processing

/// ONNX Runtime model backend
#[cfg(feature = "onnx")]
pub mod onnx;
/// Erosion, dilation and largest-component selection
pub mod refinement;
/// Model trait and probability map handling
pub mod segmentation;
