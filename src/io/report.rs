//! Measurement labels and the plain-text metadata report

use crate::io::configuration::{ANNOTATION_SUFFIX, METADATA_SUFFIX};
use crate::io::error::{BiometryError, Result};
use crate::math::biometry::Biometry;
use std::path::{Path, PathBuf};

/// Display labels for one set of measurements
///
/// A default record renders the reset state (`HC: 0.00 mm`, `GA: 0w 0d`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeasurementLabels {
    biometry: Biometry,
}

impl MeasurementLabels {
    /// Labels for the given measurements
    pub const fn new(biometry: Biometry) -> Self {
        Self { biometry }
    }

    /// Report entries as (key, value) in output order
    pub fn entries(&self) -> [(&'static str, String); 4] {
        let b = &self.biometry;
        [
            ("HC", format!("{:.2} mm", b.hc_mm)),
            ("GA", b.gestational_age.to_string()),
            ("OFD", format!("{:.2} mm", b.ofd_mm)),
            ("BPD", format!("{:.2} mm", b.bpd_mm)),
        ]
    }

    /// Entries formatted as `Key: Value` lines
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect()
    }

    /// Full report text, one entry per line with a trailing newline
    pub fn to_report(&self) -> String {
        self.lines().iter().map(|line| format!("{line}\n")).collect()
    }
}

/// Path of the text report for a source file name
pub fn metadata_path(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(format!("{file_name}{METADATA_SUFFIX}"))
}

/// Path of the annotated image for a source file name
pub fn annotation_path(output_dir: &Path, file_name: &str) -> PathBuf {
    output_dir.join(format!("{file_name}{ANNOTATION_SUFFIX}"))
}

/// Write the report next to other outputs, overwriting any previous one
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written
pub fn write_metadata(labels: &MeasurementLabels, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BiometryError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    std::fs::write(path, labels.to_report()).map_err(|e| BiometryError::FileSystem {
        path: path.to_path_buf(),
        operation: "write report",
        source: e,
    })
}
