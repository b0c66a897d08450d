//! Command-line front end for measuring one image or a directory of images

use crate::algorithm::pipeline::PipelineConfig;
use crate::algorithm::session::Session;
use crate::analysis::segmentation::Segmenter;
use crate::io::calibration::CalibrationTable;
use crate::io::configuration::{DEFAULT_MODEL_PATH, OVERLAY_SUFFIX, PROBABILITY_THRESHOLD};
use crate::io::error::{Result, WithContext, invalid_input};
use crate::io::image::save_rgb;
use crate::io::progress::ProgressManager;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "fetal-biometry")]
#[command(
    author,
    version,
    about = "Measure fetal head biometry (HC, BPD, OFD, GA) from ultrasound images"
)]
/// Command-line arguments for the measurement tool
pub struct Cli {
    /// Input PNG/DCM file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Segmentation model file
    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Directory holding the calibration CSV tables
    #[arg(short, long, default_value = ".")]
    pub calibration_dir: PathBuf,

    /// Directory receiving reports and annotated images
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Pixel size in millimetres, overrides the calibration table
    #[arg(short, long)]
    pub pixel_size: Option<String>,

    /// Probability above which a pixel counts as head, in [0, 1)
    #[arg(short, long, default_value_t = PROBABILITY_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f32,

    /// Write the metadata report and annotated JPEG for each measured image
    #[arg(short, long)]
    pub save: bool,

    /// Also write a PNG preview with the fitted ellipse overlaid
    #[arg(long)]
    pub overlay: bool,

    /// Suppress progress output and non-error logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase logging verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Outcome counts for one batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Files for which a measurement was produced
    pub measured: usize,
    /// Files that loaded but could not be measured
    pub failed: usize,
    /// Files that could not be loaded at all
    pub skipped: usize,
}

/// Drives a [`Session`] over every selected file
pub struct FileProcessor {
    cli: Cli,
    session: Session,
}

impl FileProcessor {
    /// Build a processor, loading calibration tables and the model
    ///
    /// A missing or unusable model leaves the session view-only.
    pub fn new(cli: Cli) -> Self {
        let calibration = CalibrationTable::load_dir(&cli.calibration_dir);
        if calibration.is_empty() {
            info!("no calibration table, pixel size defaults apply");
        }

        let segmenter = load_segmenter(&cli.model);
        if segmenter.is_none() {
            warn!(model = %cli.model.display(), "no model is loaded, running view-only");
        }

        let config = PipelineConfig {
            threshold: cli.threshold,
            ..PipelineConfig::default()
        };
        let session = Session::new(calibration, segmenter).with_config(config);
        Self::with_session(cli, session)
    }

    /// Build a processor around an existing session
    pub const fn with_session(cli: Cli, session: Session) -> Self {
        Self { cli, session }
    }

    /// Process files according to CLI arguments
    ///
    /// Per-file failures are logged and counted; they do not stop the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is neither a supported file nor a directory
    pub fn process(&mut self) -> Result<BatchSummary> {
        let files = self.collect_files()?;
        let mut summary = BatchSummary::default();

        let progress = if self.cli.quiet {
            ProgressManager::hidden(files.len())
        } else {
            ProgressManager::new(files.len())
        };

        for file in &files {
            progress.start_file(file);
            self.process_file(file, &progress, &mut summary);
            progress.complete_file();
        }

        progress.finish();
        info!(
            measured = summary.measured,
            failed = summary.failed,
            skipped = summary.skipped,
            "batch complete"
        );
        Ok(summary)
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if is_supported(target) {
                Ok(vec![target.clone()])
            } else {
                Err(invalid_input(&"target file must be a PNG or DCM image"))
            }
        } else if target.is_dir() {
            let mut files = Vec::new();
            for entry in std::fs::read_dir(target).with_path(target)? {
                let path = entry.with_path(target)?.path();
                if path.is_file() && is_supported(&path) {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_input(&"target must be a PNG/DCM file or a directory"))
        }
    }

    // Allow print for the measurement report, the tool's primary output
    #[allow(clippy::print_stdout)]
    fn process_file(&mut self, path: &Path, progress: &ProgressManager, summary: &mut BatchSummary) {
        if let Err(err) = self.session.load_image(path) {
            warn!(file = %path.display(), error = %err, "skipping file");
            summary.skipped += 1;
            return;
        }

        if let Some(text) = &self.cli.pixel_size {
            if let Err(err) = self.session.set_pixel_size_text(text) {
                warn!(error = %err, "ignoring pixel size override");
            }
        }

        if self.session.can_predict() && self.session.predict().is_ok() {
            summary.measured += 1;
        } else {
            summary.failed += 1;
        }

        let name = path.file_name().unwrap_or_default().to_string_lossy();
        let report = self.session.labels().lines().join("  ");
        progress.suspend(|| println!("{name}: {report}"));

        if self.cli.overlay {
            self.write_overlay(path);
        }

        if self.cli.save && self.session.can_save() {
            if let Err(err) = self.session.save(&self.cli.output_dir) {
                error!(file = %path.display(), error = %err, "failed to save results");
            }
        }
    }

    fn write_overlay(&self, input_path: &Path) {
        let Some(rendered) = self.session.render() else {
            return;
        };
        let stem = input_path.file_stem().unwrap_or_default().to_string_lossy();
        let overlay_path = self.cli.output_dir.join(format!("{stem}{OVERLAY_SUFFIX}"));
        if let Err(err) = save_rgb(&rendered, &overlay_path) {
            error!(file = %overlay_path.display(), error = %err, "failed to write overlay");
        }
    }

    /// Session state after the last processed file
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

fn parse_threshold(text: &str) -> std::result::Result<f32, String> {
    let value: f32 = text.parse().map_err(|e| format!("invalid number: {e}"))?;
    if (0.0..1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside [0, 1)"))
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png") || ext.eq_ignore_ascii_case("dcm"))
}

#[cfg(feature = "onnx")]
fn load_segmenter(model: &Path) -> Option<Box<dyn Segmenter>> {
    match crate::analysis::onnx::OnnxSegmenter::from_file(model) {
        Ok(segmenter) => Some(Box::new(segmenter)),
        Err(err) => {
            warn!(error = %err, "failed to load segmentation model");
            None
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn load_segmenter(model: &Path) -> Option<Box<dyn Segmenter>> {
    if model.is_file() {
        warn!("built without the `onnx` feature, the model cannot be evaluated");
    }
    None
}
