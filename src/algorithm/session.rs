//! Current-image session: one loaded file, at most one prediction
//!
//! Loading a file replaces the image and clears the measurement. Prediction
//! clears the measurement before running and stores a new one only on
//! success, so a failed run never leaves partial results behind.

use crate::algorithm::pipeline::{Measurement, PipelineConfig, run_prediction};
use crate::analysis::segmentation::Segmenter;
use crate::io::calibration::CalibrationTable;
use crate::io::error::{BiometryError, Result, invalid_input, invalid_parameter};
use crate::io::image::{annotate, load_grayscale, render_overlay, save_rgb};
use crate::io::report::{MeasurementLabels, annotation_path, metadata_path, write_metadata};
use crate::math::biometry::parse_pixel_size;
use image::{GrayImage, RgbImage};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Image currently shown to the user
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Bare file name used for calibration lookup and output naming
    pub file_name: String,
    /// Decoded grayscale pixels
    pub pixels: GrayImage,
}

/// Files written by one save action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    /// Plain-text report
    pub metadata: PathBuf,
    /// Annotated JPEG
    pub annotation: PathBuf,
}

/// Mutable state behind the load / predict / save workflow
pub struct Session {
    calibration: CalibrationTable,
    segmenter: Option<Box<dyn Segmenter>>,
    config: PipelineConfig,
    image: Option<LoadedImage>,
    pixel_size_text: String,
    measurement: Option<Measurement>,
}

impl Session {
    /// Create a session; without a segmenter it runs view-only
    pub fn new(calibration: CalibrationTable, segmenter: Option<Box<dyn Segmenter>>) -> Self {
        Self {
            calibration,
            segmenter,
            config: PipelineConfig::default(),
            image: None,
            pixel_size_text: String::new(),
            measurement: None,
        }
    }

    /// Replace the pipeline parameters
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load a file, replacing the current image and clearing results
    ///
    /// When the calibration table knows the file name its pixel size replaces
    /// the pixel-size text. On error the session is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error for DICOM files, undecodable files, or paths without
    /// a file name
    pub fn load_image(&mut self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| invalid_input(&format!("'{}' has no file name", path.display())))?;

        let pixels = load_grayscale(path)?;
        debug!(
            file = %file_name,
            width = pixels.width(),
            height = pixels.height(),
            "image loaded"
        );

        self.image = Some(LoadedImage { file_name, pixels });
        self.reset();

        if let Some(pixel_size) = self
            .image
            .as_ref()
            .and_then(|image| self.calibration.lookup(&image.file_name))
        {
            debug!(pixel_size, "pixel size from calibration table");
            self.pixel_size_text = pixel_size.to_string();
        }

        Ok(())
    }

    /// Set the pixel-size text as typed by the user
    ///
    /// Only digits and `.` are accepted; an empty string clears the field.
    ///
    /// # Errors
    ///
    /// Returns [`BiometryError::InvalidParameter`] for any other character,
    /// leaving the current text unchanged
    pub fn set_pixel_size_text(&mut self, text: &str) -> Result<()> {
        if !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(invalid_parameter(
                "pixel_size",
                &text,
                &"only digits and '.' are accepted",
            ));
        }
        text.clone_into(&mut self.pixel_size_text);
        Ok(())
    }

    /// Pipeline parameters applied by [`Session::predict`]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Current pixel-size text
    pub fn pixel_size_text(&self) -> &str {
        &self.pixel_size_text
    }

    /// Clear the measurement so labels show the reset state
    pub fn reset(&mut self) {
        self.measurement = None;
    }

    /// True when a model is loaded and an image is available
    pub const fn can_predict(&self) -> bool {
        self.segmenter.is_some() && self.image.is_some()
    }

    /// True after a successful prediction on the current image
    pub const fn can_save(&self) -> bool {
        self.measurement.is_some()
    }

    /// True when the session has no model and only displays images
    pub const fn is_view_only(&self) -> bool {
        self.segmenter.is_none()
    }

    /// Run the prediction pipeline on the current image
    ///
    /// # Errors
    ///
    /// Returns [`BiometryError::InferenceUnavailable`] without a model,
    /// [`BiometryError::InvalidInput`] without an image, or the error of the
    /// failing pipeline stage. The measurement stays cleared on error.
    pub fn predict(&mut self) -> Result<&Measurement> {
        self.reset();

        let segmenter = self
            .segmenter
            .as_deref_mut()
            .ok_or(BiometryError::InferenceUnavailable)?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| invalid_input(&"no image loaded"))?;

        let pixel_size = parse_pixel_size(&self.pixel_size_text);

        match run_prediction(segmenter, &image.pixels, pixel_size, &self.config) {
            Ok(measurement) => {
                info!(
                    file = %image.file_name,
                    hc_mm = measurement.biometry.hc_mm,
                    ga = %measurement.biometry.gestational_age,
                    "prediction complete"
                );
                Ok(self.measurement.insert(measurement))
            }
            Err(err) => {
                error!(file = %image.file_name, error = %err, "prediction failed");
                Err(err)
            }
        }
    }

    /// Labels for the current state, zeroed when nothing is measured
    pub fn labels(&self) -> MeasurementLabels {
        self.measurement
            .as_ref()
            .map_or_else(MeasurementLabels::default, |m| {
                MeasurementLabels::new(m.biometry)
            })
    }

    /// The current image with the fitted ellipse drawn when available
    pub fn render(&self) -> Option<RgbImage> {
        self.image.as_ref().map(|image| {
            render_overlay(
                &image.pixels,
                self.measurement.as_ref().map(|m| &m.ellipse),
            )
        })
    }

    /// Write the report and the annotated image into `output_dir`
    ///
    /// Files are named after the source file and silently overwrite earlier
    /// exports of the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing has been measured yet or a write fails
    pub fn save(&self, output_dir: &Path) -> Result<ExportedFiles> {
        let (Some(image), Some(measurement)) = (&self.image, &self.measurement) else {
            return Err(invalid_input(&"no measurement to save"));
        };

        let files = ExportedFiles {
            metadata: metadata_path(output_dir, &image.file_name),
            annotation: annotation_path(output_dir, &image.file_name),
        };

        write_metadata(&self.labels(), &files.metadata)?;
        save_rgb(
            &annotate(&image.pixels, &measurement.ellipse),
            &files.annotation,
        )?;

        info!(
            report = %files.metadata.display(),
            annotation = %files.annotation.display(),
            "results saved"
        );
        Ok(files)
    }

    /// Currently loaded image, if any
    pub const fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    /// Measurement from the last successful prediction
    pub const fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }
}
