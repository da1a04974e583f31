//! Bundle creation module.
//!
//! This module walks a packaging root, filters it by exclusion patterns and
//! writes the result as a ZIP archive.

pub mod filters;
pub mod walker;

pub mod config;
pub mod report;
pub mod timestamp;
pub mod zip;

// Re-exports for public API
pub use config::BundleConfig;
pub use filters::ExclusionPattern;
pub use filters::ExclusionSet;
pub use report::BundleReport;
pub use walker::BundleEntry;
pub use walker::FilteredWalker;
pub use walker::SkipReason;
pub use walker::WalkItem;
