//! Staged packaging of a declared file list.
//!
//! Some bundles are not a filtered copy of the whole tree but a curated
//! selection: a handful of top-level files and source directories, a renamed
//! manifest, and a generated README. The selection is copied into a scratch
//! directory which is then zipped with every entry under the package name.

use crate::BundleError;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::BundleConfig;
use crate::creation::BundleReport;
use crate::creation::zip::create_zip_with_progress;
use std::fs;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::warn;
use walkdir::WalkDir;

/// A file written into the package that does not come from the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path inside the package directory.
    pub path: PathBuf,
    /// File contents.
    pub contents: String,
}

/// Declares what goes into a staged package.
///
/// # Examples
///
/// ```
/// use distpack_core::staging::PackagePlan;
///
/// let plan = PackagePlan::new("my-app")
///     .with_item("main.js")
///     .with_item("src")
///     .with_rename("package-electron.json", "package.json")
///     .with_generated_file("README.md", "# my-app\n");
/// assert!(plan.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlan {
    /// Directory name every archive entry is placed under.
    pub name: String,

    /// Files and directories to copy, relative to the project root. Each is
    /// staged under its own base name; missing items are skipped.
    pub items: Vec<PathBuf>,

    /// `(from, to)` renames applied inside the package after copying.
    pub renames: Vec<(PathBuf, PathBuf)>,

    /// Files written after copying and renaming.
    pub generated: Vec<GeneratedFile>,
}

impl PackagePlan {
    /// Creates an empty plan for a package directory called `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            renames: Vec::new(),
            generated: Vec::new(),
        }
    }

    /// Adds a file or directory to copy.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<PathBuf>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Adds a rename applied inside the staged package.
    #[must_use]
    pub fn with_rename(mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        self.renames.push((from.into(), to.into()));
        self
    }

    /// Adds a generated file.
    #[must_use]
    pub fn with_generated_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.generated.push(GeneratedFile {
            path: path.into(),
            contents: contents.into(),
        });
        self
    }

    /// Sets the package directory name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Checks that every path stays inside the root or the package.
    ///
    /// # Errors
    ///
    /// Returns `BundleError::InvalidEntryPath` for an empty or multi-component
    /// package name, or for any item, rename or generated path that is
    /// absolute or contains `..`.
    pub fn validate(&self) -> Result<()> {
        let name = Path::new(&self.name);
        let single = name.components().count() == 1 && is_contained(name);
        if !single {
            return Err(BundleError::InvalidEntryPath {
                path: name.to_path_buf(),
            });
        }

        let paths = self
            .items
            .iter()
            .chain(self.renames.iter().flat_map(|(from, to)| [from, to]))
            .chain(self.generated.iter().map(|g| &g.path));
        for path in paths {
            if !is_contained(path) {
                return Err(BundleError::InvalidEntryPath { path: path.clone() });
            }
        }
        Ok(())
    }
}

fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Stages `plan` from `root` and writes it to `output` as a ZIP archive.
///
/// Missing items are listed in `BundleReport::missing_sources`; any other
/// failure aborts. The staging directory is removed when this returns,
/// whether or not it succeeded.
///
/// # Errors
///
/// Returns an error if the plan is invalid, the root is missing, or any copy
/// or archive write fails.
pub fn build_package<P: AsRef<Path>, Q: AsRef<Path>>(
    root: P,
    plan: &PackagePlan,
    output: Q,
    config: &BundleConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<BundleReport> {
    let root = root.as_ref();
    plan.validate()?;
    config.validate()?;

    if !root.is_dir() {
        return Err(BundleError::SourceNotFound {
            path: root.to_path_buf(),
        });
    }

    let staging = tempfile::Builder::new().prefix("distpack-").tempdir()?;
    let package_dir = staging.path().join(&plan.name);
    fs::create_dir(&package_dir)?;

    let missing = stage_items(root, &plan.items, &package_dir)?;

    for (from, to) in &plan.renames {
        let from = package_dir.join(from);
        if from.exists() {
            let to = package_dir.join(to);
            debug!(from = %from.display(), to = %to.display(), "rename");
            fs::rename(from, to)?;
        }
    }

    for generated in &plan.generated {
        let target = package_dir.join(&generated.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, &generated.contents)?;
    }

    let bundle_config = config
        .clone()
        .with_entry_prefix(Some(PathBuf::from(&plan.name)));
    let mut report = create_zip_with_progress(output, &package_dir, &bundle_config, progress)?;
    report.missing_sources = missing;

    Ok(report)
}

/// Copies each declared item into `package_dir`, returning the ones that
/// did not exist.
fn stage_items(root: &Path, items: &[PathBuf], package_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut missing = Vec::new();

    for item in items {
        let source = root.join(item);
        let metadata = match fs::metadata(&source) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(item = %item.display(), "declared item not found, skipping");
                missing.push(item.clone());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let name = source
            .file_name()
            .ok_or_else(|| BundleError::InvalidEntryPath { path: item.clone() })?;
        let target = package_dir.join(name);

        if metadata.is_dir() {
            copy_dir_all(&source, &target)?;
        } else {
            copy_file(&source, &target)?;
        }
    }

    Ok(missing)
}

/// Recursively copies a directory, following symlinks.
fn copy_dir_all(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| BundleError::InvalidEntryPath {
                path: entry.path().to_path_buf(),
            })?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            copy_file(entry.path(), &destination)?;
        }
    }
    Ok(())
}

/// Copies file contents and permissions, then carries over the
/// modification time so archive timestamps follow the source file.
fn copy_file(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target)?;
    let modified = fs::metadata(source)?.modified()?;
    File::options()
        .write(true)
        .open(target)?
        .set_modified(modified)?;
    Ok(())
}
