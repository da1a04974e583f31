//! Bundle creation reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Report of a bundle creation operation.
///
/// # Examples
///
/// ```
/// use distpack_core::creation::BundleReport;
///
/// let mut report = BundleReport::default();
/// report.files_added = 10;
/// report.bytes_written = 1024;
/// report.bytes_compressed = 512;
///
/// assert_eq!(report.compression_ratio(), 2.0);
/// assert_eq!(report.compression_percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BundleReport {
    /// Number of files added to the archive.
    pub files_added: usize,

    /// Total source bytes copied into the archive (uncompressed).
    pub bytes_written: u64,

    /// Size of the finished archive file on disk.
    pub bytes_compressed: u64,

    /// Number of files visited but left out (exclusions, the output
    /// archive itself, unusable symlinks).
    pub files_skipped: usize,

    /// Number of files whose pre-1980 timestamp was replaced.
    pub timestamps_clamped: usize,

    /// Declared package items that did not exist and were skipped.
    pub missing_sources: Vec<PathBuf>,

    /// Duration of the creation operation.
    pub duration: Duration,

    /// Warnings generated during creation.
    pub warnings: Vec<String>,
}

impl BundleReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the compression ratio (uncompressed / compressed).
    ///
    /// Returns 0.0 if either side is 0.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Returns the compression percentage (space saved).
    ///
    /// Archive overhead larger than the input counts as 0% saved.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        if self.bytes_compressed == 0 {
            return 100.0;
        }
        let saved = self.bytes_written.saturating_sub(self.bytes_compressed);
        (saved as f64 / self.bytes_written as f64) * 100.0
    }

    /// Archive size in mebibytes, as printed by the packaging summary.
    #[must_use]
    pub fn archive_size_mb(&self) -> f64 {
        self.bytes_compressed as f64 / (1024.0 * 1024.0)
    }
}
