//! Input image loading, ellipse overlays and annotated JPEG export

use crate::io::configuration::{
    ANNOTATION_COLOR, ANNOTATION_THICKNESS, ELLIPSE_SEGMENTS, OVERLAY_COLOR, OVERLAY_THICKNESS,
};
use crate::io::error::{BiometryError, Result, WithContext};
use crate::math::ellipse::Ellipse;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::path::Path;

/// Kind of file selected for measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Raster image decoded as grayscale
    Raster,
    /// DICOM file, recognised but not decoded
    Dicom,
}

impl InputKind {
    /// Classify a path by its extension, case-insensitively
    pub fn from_path(path: &Path) -> Self {
        let is_dicom = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"));
        if is_dicom { Self::Dicom } else { Self::Raster }
    }
}

/// Load an image file as 8-bit grayscale
///
/// # Errors
///
/// Returns [`BiometryError::UnsupportedFormat`] for DICOM files and
/// [`BiometryError::ImageLoad`] if the file cannot be decoded
pub fn load_grayscale(path: &Path) -> Result<GrayImage> {
    if InputKind::from_path(path) == InputKind::Dicom {
        return Err(BiometryError::UnsupportedFormat {
            path: path.to_path_buf(),
            format: "DICOM",
        });
    }

    let image = image::open(path).with_path(path)?;
    Ok(image.to_luma8())
}

/// Stroke an ellipse outline onto an RGB canvas
///
/// Thickness is built from concentric outlines half a pixel apart.
pub fn draw_ellipse(canvas: &mut RgbImage, ellipse: &Ellipse, color: [u8; 3], thickness: u32) {
    let strokes = thickness.max(1) * 2 - 1;
    let half_width = f64::from(strokes - 1) / 4.0;

    for stroke in 0..strokes {
        let offset = f64::from(stroke) / 2.0 - half_width;
        let outline = ellipse.inflated(offset).sample_points(ELLIPSE_SEGMENTS);
        for (start, end) in outline.iter().zip(outline.iter().cycle().skip(1)) {
            draw_line_segment_mut(
                canvas,
                (start[0] as f32, start[1] as f32),
                (end[0] as f32, end[1] as f32),
                Rgb(color),
            );
        }
    }
}

/// Grayscale image as RGB with an optional thin ellipse overlay
pub fn render_overlay(image: &GrayImage, ellipse: Option<&Ellipse>) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
    if let Some(ellipse) = ellipse {
        draw_ellipse(&mut canvas, ellipse, OVERLAY_COLOR, OVERLAY_THICKNESS);
    }
    canvas
}

/// Copy of the image with the ellipse burned in for export
pub fn annotate(image: &GrayImage, ellipse: &Ellipse) -> RgbImage {
    let mut canvas = DynamicImage::ImageLuma8(image.clone()).to_rgb8();
    draw_ellipse(&mut canvas, ellipse, ANNOTATION_COLOR, ANNOTATION_THICKNESS);
    canvas
}

/// Save an RGB image, choosing the encoder from the file extension
///
/// Existing files are overwritten.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or encoding fails
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BiometryError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image.save(path).map_err(|e| BiometryError::ImageExport {
        path: path.to_path_buf(),
        source: e,
    })
}
