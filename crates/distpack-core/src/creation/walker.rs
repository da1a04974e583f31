//! Directory tree walking with exclusion pruning.
//!
//! Traversal is top-down. Excluded directories are pruned before they are
//! read, so nothing underneath them is ever enumerated. Files are yielded
//! together with their computed archive path.

use crate::Result;
use crate::creation::config::BundleConfig;
use crate::creation::filters;
use std::ffi::OsStr;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use tracing::trace;
use walkdir::DirEntry;
use walkdir::WalkDir;

/// A file that passed every filter and is ready to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Full filesystem path to the file.
    pub path: PathBuf,

    /// Name to use inside the archive (relative, prefix applied).
    pub archive_path: PathBuf,

    /// Size in bytes at walk time.
    pub size: u64,
}

/// Why a file was left out of the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Base name matched an exclusion pattern.
    Excluded {
        /// Display form of the matching pattern.
        pattern: String,
    },
    /// File carries the output archive's own name.
    OutputArchive,
    /// Symlink pointing at a directory; links are not descended.
    SymlinkToDirectory,
    /// Symlink whose target cannot be read.
    BrokenSymlink,
    /// FIFO, socket or device node (directly or behind a symlink).
    SpecialFile,
}

/// One step of a filtered walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    /// File to add to the archive.
    File(BundleEntry),
    /// File that was visited but left out.
    Skipped {
        /// Path of the skipped file.
        path: PathBuf,
        /// Reason it was skipped.
        reason: SkipReason,
    },
}

/// Walks a packaging root, applying a `BundleConfig`'s exclusions.
///
/// # Examples
///
/// ```no_run
/// use distpack_core::creation::BundleConfig;
/// use distpack_core::creation::walker::FilteredWalker;
/// use distpack_core::creation::walker::WalkItem;
/// use std::path::Path;
///
/// let config = BundleConfig::default();
/// let walker = FilteredWalker::new(Path::new("./project"), &config);
///
/// for item in walker.walk() {
///     if let WalkItem::File(entry) = item? {
///         println!("Would add: {}", entry.archive_path.display());
///     }
/// }
/// # Ok::<(), distpack_core::BundleError>(())
/// ```
pub struct FilteredWalker<'a> {
    root: &'a Path,
    config: &'a BundleConfig,
    output_name: Option<OsString>,
}

impl<'a> FilteredWalker<'a> {
    /// Creates a new filtered walker for the given root directory.
    #[must_use]
    pub fn new(root: &'a Path, config: &'a BundleConfig) -> Self {
        Self {
            root,
            config,
            output_name: None,
        }
    }

    /// Skips any file whose name equals `name`.
    ///
    /// Used so that an archive written inside its own root never ends up
    /// inside itself.
    #[must_use]
    pub fn with_output_name(mut self, name: Option<&OsStr>) -> Self {
        self.output_name = name.map(OsStr::to_os_string);
        self
    }

    /// Returns an iterator over files in the tree.
    ///
    /// Directory entries are consumed internally; only files (and skipped
    /// files) are yielded. Entries are visited in file-name order.
    ///
    /// # Errors
    ///
    /// Items are errors if a directory cannot be read, metadata is
    /// unavailable, or an archive path cannot be computed.
    pub fn walk(&self) -> impl Iterator<Item = Result<WalkItem>> + '_ {
        let exclusions = &self.config.exclusions;

        WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                let prune = entry.depth() > 0
                    && entry.file_type().is_dir()
                    && filters::should_skip(entry.path(), exclusions);
                if prune {
                    trace!(path = %entry.path().display(), "pruned excluded directory");
                }
                !prune
            })
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_dir() => None,
                Ok(entry) => Some(self.classify(&entry)),
                Err(e) => Some(Err(e.into())),
            })
    }

    fn classify(&self, entry: &DirEntry) -> Result<WalkItem> {
        let path = entry.path();
        let skipped = |reason| {
            Ok(WalkItem::Skipped {
                path: path.to_path_buf(),
                reason,
            })
        };

        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if let Some(pattern) = self.config.exclusions.first_match(&name_str) {
            return skipped(SkipReason::Excluded {
                pattern: pattern.to_string(),
            });
        }

        if self.output_name.as_deref() == Some(name) {
            return skipped(SkipReason::OutputArchive);
        }

        let size = if entry.path_is_symlink() {
            match std::fs::metadata(path) {
                Ok(target) if target.is_dir() => return skipped(SkipReason::SymlinkToDirectory),
                Ok(target) if target.is_file() => target.len(),
                Ok(_) => return skipped(SkipReason::SpecialFile),
                Err(_) => return skipped(SkipReason::BrokenSymlink),
            }
        } else if entry.file_type().is_file() {
            entry.metadata()?.len()
        } else {
            return skipped(SkipReason::SpecialFile);
        };

        let archive_path =
            filters::compute_archive_path(path, self.root, self.config.entry_prefix.as_deref())?;

        Ok(WalkItem::File(BundleEntry {
            path: path.to_path_buf(),
            archive_path,
            size,
        }))
    }
}

/// Collects the walk into a vector so the total is known before writing.
pub fn collect_items(
    root: &Path,
    config: &BundleConfig,
    output_name: Option<&OsStr>,
) -> Result<Vec<WalkItem>> {
    FilteredWalker::new(root, config)
        .with_output_name(output_name)
        .walk()
        .collect()
}
