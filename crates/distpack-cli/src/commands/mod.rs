//! Subcommand implementations.

pub mod completion;
pub mod package;
pub mod project;

use crate::cli::CommonArgs;
use crate::config_file::ConfigFile;
use crate::error::convert_bundle_error;
use crate::progress::CliProgress;
use anyhow::Result;
use distpack_core::BundleError;
use distpack_core::BundleReport;
use distpack_core::NoopProgress;
use distpack_core::ProgressCallback;
use std::path::Path;
use std::path::PathBuf;

/// Everything a bundling command needs after flags and config are merged.
pub struct Invocation {
    pub root: PathBuf,
    pub output: PathBuf,
    pub config_file: ConfigFile,
}

impl Invocation {
    /// Resolves root, config file and output path.
    ///
    /// The output defaults to `default_output` in the current directory.
    /// Flags win over the config file.
    pub fn resolve(args: &CommonArgs, default_output: &str) -> Result<Self> {
        let config_file = match &args.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        let root = args.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let output = args
            .output
            .clone()
            .or_else(|| config_file.output.clone())
            .unwrap_or_else(|| PathBuf::from(default_output));

        if output.exists() && !args.force {
            return Err(convert_bundle_error(
                BundleError::OutputExists {
                    path: output.clone(),
                },
                &output,
            ));
        }

        Ok(Self {
            root,
            output,
            config_file,
        })
    }

    /// Compression level from the flag, then the config file.
    pub fn compression_level(&self, args: &CommonArgs) -> Option<u8> {
        args.compression_level
            .or(self.config_file.compression_level)
    }
}

/// Runs `bundle` with a progress bar when stdout is a terminal.
pub fn with_progress<F>(show: bool, bundle: F) -> Result<BundleReport, BundleError>
where
    F: FnOnce(&mut dyn ProgressCallback) -> Result<BundleReport, BundleError>,
{
    if show && CliProgress::should_show() {
        let mut progress = CliProgress::new("Bundling");
        bundle(&mut progress)
    } else {
        bundle(&mut NoopProgress)
    }
}

/// Absolute form of `path` for reporting, falling back to `path` itself.
pub fn display_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
