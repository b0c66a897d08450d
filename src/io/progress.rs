//! Batch progress display for multi-file runs

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Single progress bar advanced once per processed file
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a bar for `file_count` files
    pub fn new(file_count: usize) -> Self {
        let bar = ProgressBar::new(file_count as u64);
        bar.set_style(Self::style());
        Self { bar }
    }

    /// Hidden bar that tracks position without drawing
    pub fn hidden(file_count: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(file_count as u64);
        Self { bar }
    }

    fn style() -> ProgressStyle {
        let template = format!(
            "[{{elapsed_precise}}] [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        );
        ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏ ")
    }

    /// Show which file is being processed
    pub fn start_file(&self, path: &Path) {
        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        self.bar.set_message(display_name);
    }

    /// Advance past the current file
    pub fn complete_file(&self) {
        self.bar.inc(1);
    }

    /// Number of files completed so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Run `f` with the bar hidden so terminal output does not tear it
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    /// Clear the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
