//! Error conversion utilities for CLI.
//!
//! Converts distpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::Result;
use anyhow::anyhow;
use distpack_core::BundleError;
use std::path::Path;

/// Converts `BundleError` to user-friendly anyhow error with context
pub fn convert_bundle_error(err: BundleError, output: &Path) -> anyhow::Error {
    match err {
        BundleError::SourceNotFound { path } => {
            anyhow!(
                "Project root not found: '{}'\n\
                 HINT: Run from the project directory or pass ROOT explicitly.",
                path.display()
            )
        }
        BundleError::OutputExists { path } => {
            anyhow!(
                "Output file '{}' already exists\n\
                 HINT: Use --force to overwrite it or -o to choose another path.",
                path.display()
            )
        }
        BundleError::InvalidPattern { pattern, reason } => {
            anyhow!(
                "Invalid exclude pattern '{pattern}': {reason}\n\
                 HINT: Patterns take the forms '*text*', '*suffix', 'prefix*' or an exact name."
            )
        }
        BundleError::InvalidCompressionLevel { level } => {
            anyhow!(
                "Invalid compression level {level}\n\
                 HINT: Use 0 to store files uncompressed or 1-9 for deflate."
            )
        }
        BundleError::InvalidEntryPath { path } => {
            anyhow!(
                "Path '{}' would escape the bundle root\n\
                 HINT: Package items and renames must be relative paths without '..'.",
                path.display()
            )
        }
        BundleError::Walk { path, reason } => {
            anyhow!(
                "Failed to read '{}' while building '{}': {}\n\
                 HINT: Check that the directory is readable.",
                path.display(),
                output.display(),
                reason
            )
        }
        BundleError::Io(io_err) => {
            anyhow!(
                "I/O error while writing '{}': {}",
                output.display(),
                io_err
            )
        }
        BundleError::Zip(reason) => {
            anyhow!(
                "Failed to write archive '{}': {}\n\
                 HINT: A file timestamp may be outside the range ZIP can store (1980-2107).",
                output.display(),
                reason
            )
        }
    }
}

/// Adds context to a bundling result about the archive being written
pub fn add_bundle_context<T>(result: Result<T, BundleError>, output: &Path) -> anyhow::Result<T> {
    result.map_err(|e| convert_bundle_error(e, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_output_exists_error() {
        let err = BundleError::OutputExists {
            path: PathBuf::from("project-complete.zip"),
        };
        let converted = convert_bundle_error(err, Path::new("project-complete.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("already exists"));
        assert!(msg.contains("--force"));
    }

    #[test]
    fn test_convert_invalid_pattern_error() {
        let err = BundleError::InvalidPattern {
            pattern: "setup-*.js".to_string(),
            reason: "wildcard only allowed at the start or end",
        };
        let converted = convert_bundle_error(err, Path::new("out.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("setup-*.js"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_source_not_found_error() {
        let err = BundleError::SourceNotFound {
            path: PathBuf::from("/missing/project"),
        };
        let converted = convert_bundle_error(err, Path::new("out.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("/missing/project"));
        assert!(msg.contains("HINT"));
    }

    #[test]
    fn test_convert_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let converted = convert_bundle_error(BundleError::Io(io_err), Path::new("out.zip"));
        let msg = format!("{converted:?}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("out.zip"));
    }
}
