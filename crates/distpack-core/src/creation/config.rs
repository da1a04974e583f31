//! Configuration for bundle creation.

use crate::BundleError;
use crate::Result;
use crate::creation::filters::ExclusionSet;
use std::path::PathBuf;

/// Default Deflate level, matching zlib's balanced setting.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Configuration for a single bundle build.
///
/// The packaging root and output path are passed to the builder directly;
/// everything else lives here so profiles can be constructed as plain
/// values.
///
/// # Examples
///
/// ```
/// use distpack_core::creation::BundleConfig;
/// use distpack_core::creation::ExclusionSet;
///
/// let config = BundleConfig::default()
///     .with_exclusions(ExclusionSet::parse(["*.log", "node_modules"]).unwrap())
///     .with_compression_level(9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Names pruned from the walk.
    ///
    /// Default: empty.
    pub exclusions: ExclusionSet,

    /// Compression level (0-9). `0` stores entries uncompressed.
    ///
    /// Default: `6`.
    pub compression_level: u8,

    /// Directory prepended to every archive entry name.
    ///
    /// Default: `None`.
    pub entry_prefix: Option<PathBuf>,

    /// Record Unix permission bits of each file.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            exclusions: ExclusionSet::new(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            entry_prefix: None,
            preserve_permissions: true,
        }
    }
}

impl BundleConfig {
    /// Creates a new `BundleConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exclusion set.
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the compression level.
    ///
    /// Out-of-range values are caught by [`BundleConfig::validate`].
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the entry prefix.
    #[must_use]
    pub fn with_entry_prefix(mut self, prefix: Option<PathBuf>) -> Self {
        self.entry_prefix = prefix;
        self
    }

    /// Sets whether to preserve permissions.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is above 9.
    pub fn validate(&self) -> Result<()> {
        if self.compression_level > 9 {
            return Err(BundleError::InvalidCompressionLevel {
                level: self.compression_level,
            });
        }
        Ok(())
    }
}
