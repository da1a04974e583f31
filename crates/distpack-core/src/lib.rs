//! Exclusion-aware ZIP bundling of project source trees.
//!
//! `distpack-core` walks a project directory, prunes names matched by simple
//! wildcard patterns and writes what is left into a relocatable ZIP archive.
//! It also stages curated file lists (such as a desktop build kit) into a
//! package directory before zipping them.
//!
//! # Examples
//!
//! ```no_run
//! use distpack_core::bundle_project;
//! use distpack_core::profiles;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = profiles::project_config()?;
//! let report = bundle_project(".", profiles::PROJECT_OUTPUT, &config)?;
//! println!("Added {} files", report.files_added);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod creation;
pub mod error;
pub mod profiles;
pub mod report;
pub mod staging;

use std::path::Path;

// Re-export main API types
pub use creation::BundleConfig;
pub use creation::BundleReport;
pub use creation::ExclusionPattern;
pub use creation::ExclusionSet;
pub use error::BundleError;
pub use error::Result;
pub use report::NoopProgress;
pub use report::ProgressCallback;
pub use staging::PackagePlan;

/// Bundles every non-excluded file under `root` into `output`.
///
/// Convenience wrapper over [`creation::zip::create_zip`].
///
/// # Errors
///
/// Returns an error if the root is missing or any I/O fails.
pub fn bundle_project<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    output: Q,
    config: &BundleConfig,
) -> Result<BundleReport> {
    creation::zip::create_zip(output, root, config)
}

/// Bundles `root` with progress reporting.
///
/// # Errors
///
/// Returns an error if the root is missing or any I/O fails.
pub fn bundle_project_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    output: Q,
    config: &BundleConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<BundleReport> {
    creation::zip::create_zip_with_progress(output, root, config, progress)
}

/// Stages `plan` from `root` and writes the package archive to `output`.
///
/// # Errors
///
/// Returns an error if the plan is invalid, the root is missing, or any I/O
/// other than a missing declared item fails.
pub fn bundle_package<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    plan: &PackagePlan,
    output: Q,
    config: &BundleConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<BundleReport> {
    staging::build_package(root, plan, output, config, progress)
}
