//! Error types for bundling operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `BundleError`.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Errors that can occur while building a bundle.
#[derive(Error, Debug)]
pub enum BundleError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed.
    #[error("cannot traverse {path}: {reason}")]
    Walk {
        /// Path being visited when traversal failed.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// Packaging root does not exist or is not a directory.
    #[error("source not found: {path}")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Exclusion pattern does not fit the supported grammar.
    #[error("invalid exclusion pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern text.
        pattern: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Computed archive name would escape the packaging root.
    #[error("archive entry path escapes the packaging root: {path}")]
    InvalidEntryPath {
        /// The offending path.
        path: PathBuf,
    },

    /// ZIP writer reported a failure.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// Compression level outside the supported range.
    #[error("invalid compression level {level}, must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level.
        level: u8,
    },

    /// Output archive already exists and overwriting was not requested.
    #[error("output file already exists: {path}")]
    OutputExists {
        /// The existing output path.
        path: PathBuf,
    },
}

impl From<zip::result::ZipError> for BundleError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::Zip(other.to_string()),
        }
    }
}

impl From<walkdir::Error> for BundleError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        Self::Walk {
            path,
            reason: err.to_string(),
        }
    }
}
