//! Per-file pixel size lookup from the dataset calibration tables

use crate::io::configuration::{TEST_CALIBRATION_FILE, TRAINING_CALIBRATION_FILE};
use crate::io::error::{Result, WithContext};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct CalibrationRow {
    filename: String,
    #[serde(rename = "pixel size(mm)")]
    pixel_size_mm: f64,
}

/// Read-only map from image file name to millimetres per pixel
#[derive(Debug, Clone, Default)]
pub struct CalibrationTable {
    pixel_sizes: HashMap<String, f64>,
}

impl CalibrationTable {
    /// Empty table; every lookup misses
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the training and test tables from `dir`
    ///
    /// Both files must exist, otherwise the table is empty. A file that
    /// exists but cannot be parsed is reported and also yields an empty table.
    pub fn load_dir(dir: &Path) -> Self {
        let training = dir.join(TRAINING_CALIBRATION_FILE);
        let test = dir.join(TEST_CALIBRATION_FILE);

        if !training.is_file() || !test.is_file() {
            debug!(dir = %dir.display(), "calibration tables not found");
            return Self::empty();
        }

        match Self::from_csv_files(&[training.as_path(), test.as_path()]) {
            Ok(table) => table,
            Err(error) => {
                warn!(%error, "ignoring calibration tables");
                Self::empty()
            }
        }
    }

    /// Concatenate CSV files with `filename` and `pixel size(mm)` columns
    ///
    /// Extra columns are ignored. When a file name appears more than once the
    /// first row wins.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be opened or a row cannot be parsed
    pub fn from_csv_files(paths: &[&Path]) -> Result<Self> {
        let mut table = Self::empty();

        for &path in paths {
            let mut reader = csv::Reader::from_path(path).with_path(path)?;
            for row in reader.deserialize::<CalibrationRow>() {
                let row = row.with_path(path)?;
                table.pixel_sizes.entry(row.filename).or_insert(row.pixel_size_mm);
            }
        }

        debug!(entries = table.len(), "calibration table loaded");
        Ok(table)
    }

    /// Pixel size for a bare file name such as `001_HC.png`
    pub fn lookup(&self, file_name: &str) -> Option<f64> {
        self.pixel_sizes.get(file_name).copied()
    }

    /// Number of distinct file names
    pub fn len(&self) -> usize {
        self.pixel_sizes.len()
    }

    /// True when no calibration rows were loaded
    pub fn is_empty(&self) -> bool {
        self.pixel_sizes.is_empty()
    }
}
