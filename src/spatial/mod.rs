//! Spatial data structures
//!
//! This module contains:
//! - Binary masks shared by every refinement stage
//! - Outer border extraction for the ellipse fit

/// Outer border extraction
pub mod contour;
/// Binary mask type
pub mod mask;

pub use mask::Mask;
