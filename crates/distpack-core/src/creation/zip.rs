//! ZIP bundle creation.
//!
//! Walks a packaging root, drops excluded names and writes the surviving
//! files into a single Deflate-compressed ZIP archive. Entry names are
//! relative to the root and always use `/` separators.

use crate::BundleError;
use crate::ProgressCallback;
use crate::Result;
use crate::creation::config::BundleConfig;
use crate::creation::filters;
use crate::creation::report::BundleReport;
use crate::creation::timestamp::ZipTimestamp;
use crate::creation::timestamp::zip_timestamp;
use crate::creation::walker::BundleEntry;
use crate::creation::walker::SkipReason;
use crate::creation::walker::WalkItem;
use crate::creation::walker::collect_items;
use crate::report::NoopProgress;
use std::fs::File;
use std::fs::Metadata;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::debug;
use tracing::info;
use tracing::warn;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Creates a ZIP bundle of `root` at `output`.
///
/// # Examples
///
/// ```no_run
/// use distpack_core::creation::BundleConfig;
/// use distpack_core::creation::ExclusionSet;
/// use distpack_core::creation::zip::create_zip;
///
/// let config = BundleConfig::default()
///     .with_exclusions(ExclusionSet::parse(["node_modules", "*.log"])?);
/// let report = create_zip("project-complete.zip", ".", &config)?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), distpack_core::BundleError>(())
/// ```
///
/// # Errors
///
/// Returns an error if:
/// - The root does not exist or is not a directory
/// - The configuration is invalid
/// - The output file cannot be created
/// - Any file cannot be read or written
pub fn create_zip<P: AsRef<Path>, Q: AsRef<Path>>(
    output: P,
    root: Q,
    config: &BundleConfig,
) -> Result<BundleReport> {
    create_zip_with_progress(output, root, config, &mut NoopProgress)
}

/// Creates a ZIP bundle with progress reporting.
///
/// The callback receives `on_entry_start`/`on_entry_complete` for every
/// file written, `on_bytes_written` for each copied chunk (up to 64 KB), and
/// a single `on_complete` once the archive has been finished.
///
/// The archive is written to a temporary file next to `output` and renamed
/// into place only once it is complete. On error nothing is left at
/// `output`, and an existing file there keeps its previous contents.
///
/// # Errors
///
/// Same as [`create_zip`].
pub fn create_zip_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    output: P,
    root: Q,
    config: &BundleConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<BundleReport> {
    let output = output.as_ref();
    let root = root.as_ref();
    config.validate()?;

    if !root.is_dir() {
        return Err(BundleError::SourceNotFound {
            path: root.to_path_buf(),
        });
    }

    // Walk before the output exists so a fresh archive is never visited.
    let items = collect_items(root, config, output.file_name())?;

    let mut temp = staging_file(output)?;
    let report = write_zip(temp.as_file_mut(), &items, config, progress)?;
    temp.persist(output).map_err(|e| BundleError::Io(e.error))?;

    info!(
        output = %output.display(),
        files = report.files_added,
        bytes = report.bytes_compressed,
        "bundle written"
    );
    Ok(report)
}

/// Opens the scratch file an archive is written to before being moved to
/// `output`. It lives in the same directory so the final rename stays on one
/// filesystem, and is removed on drop if never persisted.
fn staging_file(output: &Path) -> Result<NamedTempFile> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".distpack-").suffix(".tmp");
    // Same mode as `File::create`; the umask still applies.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    Ok(builder.tempfile_in(dir)?)
}

/// Writes pre-collected walk items into `writer` as a ZIP archive.
///
/// `bytes_compressed` in the returned report is the writer position after
/// the central directory has been written, which equals the archive size for
/// a freshly created file.
pub fn write_zip<W: Write + Seek>(
    writer: W,
    items: &[WalkItem],
    config: &BundleConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<BundleReport> {
    let start = Instant::now();
    let mut zip = ZipWriter::new(writer);
    let mut report = BundleReport::default();

    let options = base_options(config.compression_level);
    let total_files = items
        .iter()
        .filter(|item| matches!(item, WalkItem::File(_)))
        .count();

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut current = 0;

    for item in items {
        match item {
            WalkItem::File(entry) => {
                current += 1;
                progress.on_entry_start(&entry.archive_path, total_files, current);
                add_file_to_zip(
                    &mut zip,
                    entry,
                    config,
                    options,
                    &mut report,
                    progress,
                    &mut buffer,
                )?;
                progress.on_entry_complete(&entry.archive_path);
            }
            WalkItem::Skipped { path, reason } => {
                record_skip(path, reason, &mut report);
            }
        }
    }

    let mut writer = zip.finish()?;
    report.bytes_compressed = writer.stream_position()?;
    report.duration = start.elapsed();

    progress.on_complete();

    Ok(report)
}

fn base_options(level: u8) -> SimpleFileOptions {
    if level == 0 {
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
    } else {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
    }
}

fn record_skip(path: &Path, reason: &SkipReason, report: &mut BundleReport) {
    report.files_skipped += 1;
    match reason {
        SkipReason::Excluded { pattern } => {
            debug!(path = %path.display(), %pattern, "excluded");
        }
        SkipReason::OutputArchive => {
            debug!(path = %path.display(), "skipped output archive");
        }
        SkipReason::SymlinkToDirectory => {
            warn!(path = %path.display(), "symlink to directory skipped");
            report.add_warning(format!("Skipped symlink to directory: {}", path.display()));
        }
        SkipReason::BrokenSymlink => {
            warn!(path = %path.display(), "broken symlink skipped");
            report.add_warning(format!("Skipped broken symlink: {}", path.display()));
        }
        SkipReason::SpecialFile => {
            warn!(path = %path.display(), "not a regular file, skipped");
            report.add_warning(format!("Skipped special file: {}", path.display()));
        }
    }
}

/// Adds a single file, recording its modification time when representable.
fn add_file_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &BundleEntry,
    config: &BundleConfig,
    options: SimpleFileOptions,
    report: &mut BundleReport,
    progress: &mut dyn ProgressCallback,
    buffer: &mut [u8],
) -> Result<()> {
    let mut file = File::open(&entry.path)?;
    let metadata = file.metadata()?;

    let mut file_options = options.large_file(metadata.len() >= u64::from(u32::MAX));

    match zip_timestamp(metadata.modified()?)? {
        ZipTimestamp::Exact(dt) => {
            file_options = file_options.last_modified_time(dt);
        }
        ZipTimestamp::Clamped(dt) => {
            warn!(
                path = %entry.path.display(),
                "modification time predates 1980, recording 1980-01-01"
            );
            file_options = file_options.last_modified_time(dt);
            report.timestamps_clamped += 1;
            report.add_warning(format!(
                "Fixed pre-1980 timestamp: {}",
                entry.archive_path.display()
            ));
        }
    }

    if config.preserve_permissions {
        file_options = with_permissions(file_options, &metadata);
    }

    let archive_name = filters::normalize_zip_path(&entry.archive_path)?;
    zip.start_file(archive_name.as_str(), file_options)?;

    let mut bytes_written = 0u64;
    loop {
        let bytes_read = file.read(buffer)?;
        if bytes_read == 0 {
            break;
        }
        zip.write_all(&buffer[..bytes_read])?;
        bytes_written += bytes_read as u64;
        progress.on_bytes_written(bytes_read as u64);
    }

    debug!(entry = %archive_name, bytes = bytes_written, "added");
    report.files_added += 1;
    report.bytes_written += bytes_written;

    Ok(())
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, metadata: &Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _metadata: &Metadata) -> SimpleFileOptions {
    options
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Allow unwrap in tests for brevity
mod tests {
    use super::*;
    use crate::creation::filters::ExclusionSet;
    use std::fs;
    use std::io::Cursor;
    use std::time::Duration;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn entry_names(path: &Path) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        names
    }

    fn exclusions(patterns: &[&str]) -> BundleConfig {
        BundleConfig::default().with_exclusions(ExclusionSet::parse(patterns).unwrap())
    }

    #[test]
    fn test_create_zip_directory() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("output.zip");
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("file1.txt"), "content1").unwrap();
        fs::write(source.path().join("file2.txt"), "content2").unwrap();
        fs::create_dir(source.path().join("subdir")).unwrap();
        fs::write(source.path().join("subdir/file3.txt"), "content3").unwrap();

        let report = create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        assert_eq!(report.files_added, 3);
        assert_eq!(report.bytes_written, 24);
        assert_eq!(report.bytes_compressed, fs::metadata(&output).unwrap().len());
        assert_eq!(
            entry_names(&output),
            vec!["file1.txt", "file2.txt", "subdir/file3.txt"]
        );
    }

    #[test]
    fn test_create_zip_exclusions() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.log"), "log").unwrap();
        fs::write(source.path().join("keep.ts"), "keep").unwrap();
        fs::create_dir(source.path().join("node_modules")).unwrap();
        fs::write(source.path().join("node_modules/dep.js"), "dep").unwrap();

        let report = create_zip(
            &output,
            source.path(),
            &exclusions(&["*.log", "node_modules"]),
        )
        .unwrap();

        assert_eq!(entry_names(&output), vec!["keep.ts"]);
        assert_eq!(report.files_added, 1);
        assert_eq!(report.files_skipped, 1);
    }

    #[test]
    fn test_create_zip_inside_own_root() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("index.ts"), "export {}").unwrap();
        // Leftover from a previous run.
        fs::write(root.path().join("bundle.zip"), "stale").unwrap();
        let output = root.path().join("bundle.zip");

        let report = create_zip(&output, root.path(), &BundleConfig::default()).unwrap();

        assert_eq!(entry_names(&output), vec!["index.ts"]);
        assert_eq!(report.files_skipped, 1);
    }

    #[test]
    fn test_create_zip_clamps_pre_1980_timestamp() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");
        let source = TempDir::new().unwrap();
        let old = source.path().join("old.txt");
        fs::write(&old, "vintage").unwrap();
        File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400))
            .unwrap();

        let report = create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        assert_eq!(report.files_added, 1);
        assert_eq!(report.timestamps_clamped, 1);
        assert!(report.has_warnings());

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let mut entry = archive.by_name("old.txt").unwrap();
        let dt = entry.last_modified().unwrap();
        assert_eq!(
            (dt.year(), dt.month(), dt.day(), dt.hour(), dt.minute(), dt.second()),
            (1980, 1, 1, 0, 0, 0)
        );
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "vintage");
    }

    #[test]
    fn test_create_zip_stored_level_zero() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("stored.zip");
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "a".repeat(1000)).unwrap();

        let config = BundleConfig::default().with_compression_level(0);
        create_zip(&output, source.path(), &config).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn test_create_zip_deflates_by_default() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("deflated.zip");
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "a".repeat(10_000)).unwrap();

        let report = create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(
            archive.by_index(0).unwrap().compression(),
            CompressionMethod::Deflated
        );
        assert!(report.bytes_compressed < report.bytes_written);
    }

    #[cfg(unix)]
    #[test]
    fn test_create_zip_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("output.zip");
        let source = TempDir::new().unwrap();
        let script = source.path().join("build-exe.bat");
        fs::write(&script, "@echo off").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let entry = archive.by_name("build-exe.bat").unwrap();
        assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_create_zip_skips_socket_with_warning() {
        use std::os::unix::net::UnixListener;

        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("index.ts"), "x").unwrap();
        let _listener = UnixListener::bind(source.path().join("dev.sock")).unwrap();

        let report = create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        assert_eq!(entry_names(&output), vec!["index.ts"]);
        assert_eq!(report.files_skipped, 1);
        assert!(report.warnings.iter().any(|w| w.contains("dev.sock")));
    }

    #[test]
    fn test_create_zip_missing_root() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");

        let err = create_zip(&output, temp.path().join("absent"), &BundleConfig::default())
            .unwrap_err();

        assert!(matches!(err, BundleError::SourceNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_create_zip_rejects_invalid_level() {
        let temp = TempDir::new().unwrap();
        let config = BundleConfig::default().with_compression_level(11);
        let err = create_zip(temp.path().join("o.zip"), temp.path(), &config).unwrap_err();
        assert!(matches!(
            err,
            BundleError::InvalidCompressionLevel { level: 11 }
        ));
    }

    #[test]
    fn test_write_zip_in_memory_with_progress() {
        #[derive(Default)]
        struct Recorder {
            started: Vec<(String, usize, usize)>,
            bytes: u64,
            completed: usize,
            finished: bool,
        }

        impl ProgressCallback for Recorder {
            fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
                self.started
                    .push((path.display().to_string(), total, current));
            }

            fn on_bytes_written(&mut self, bytes: u64) {
                self.bytes += bytes;
            }

            fn on_entry_complete(&mut self, _path: &Path) {
                self.completed += 1;
            }

            fn on_complete(&mut self) {
                self.finished = true;
            }
        }

        let source = TempDir::new().unwrap();
        fs::write(source.path().join("one.txt"), "1").unwrap();
        fs::write(source.path().join("two.txt"), "22").unwrap();
        fs::write(source.path().join("skip.log"), "x").unwrap();

        let config = exclusions(&["*.log"]);
        let items = collect_items(source.path(), &config, None).unwrap();
        let mut progress = Recorder::default();

        let report = write_zip(Cursor::new(Vec::new()), &items, &config, &mut progress).unwrap();

        assert_eq!(report.files_added, 2);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(progress.bytes, 3);
        assert_eq!(progress.completed, 2);
        assert!(progress.finished);
        assert_eq!(
            progress.started,
            vec![
                ("one.txt".to_string(), 2, 1),
                ("two.txt".to_string(), 2, 2)
            ]
        );
    }

    #[test]
    fn test_write_zip_fails_when_source_vanishes() {
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "a").unwrap();
        fs::write(source.path().join("b.txt"), "b").unwrap();

        let config = BundleConfig::default();
        let items = collect_items(source.path(), &config, None).unwrap();
        fs::remove_file(source.path().join("b.txt")).unwrap();

        let err = write_zip(Cursor::new(Vec::new()), &items, &config, &mut NoopProgress)
            .unwrap_err();
        assert!(matches!(err, BundleError::Io(_)));
    }

    #[test]
    fn test_create_zip_failure_leaves_no_output() {
        struct RemoveNext(std::path::PathBuf);

        impl ProgressCallback for RemoveNext {
            fn on_entry_start(&mut self, _path: &Path, _total: usize, current: usize) {
                if current == 1 {
                    fs::remove_file(&self.0).unwrap();
                }
            }
            fn on_bytes_written(&mut self, _bytes: u64) {}
            fn on_entry_complete(&mut self, _path: &Path) {}
            fn on_complete(&mut self) {}
        }

        let out = TempDir::new().unwrap();
        let output = out.path().join("out.zip");
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "a").unwrap();
        fs::write(source.path().join("b.txt"), "b").unwrap();

        let mut progress = RemoveNext(source.path().join("b.txt"));
        let err = create_zip_with_progress(
            &output,
            source.path(),
            &BundleConfig::default(),
            &mut progress,
        )
        .unwrap_err();

        assert!(matches!(err, BundleError::Io(_)));
        assert!(!output.exists());
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_create_zip_replaces_existing_output() {
        let out = TempDir::new().unwrap();
        let output = out.path().join("out.zip");
        fs::write(&output, "previous").unwrap();
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "a").unwrap();

        create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        assert_eq!(entry_names(&output), vec!["a.txt"]);
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_create_zip_output_mode_matches_plain_file() {
        use std::os::unix::fs::PermissionsExt;

        let out = TempDir::new().unwrap();
        let output = out.path().join("out.zip");
        let plain = out.path().join("plain.txt");
        fs::write(&plain, "x").unwrap();
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.txt"), "a").unwrap();

        create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&output), mode(&plain));
    }

    #[test]
    fn test_create_zip_empty_root() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("empty.zip");
        let source = TempDir::new().unwrap();

        let report = create_zip(&output, source.path(), &BundleConfig::default()).unwrap();

        assert_eq!(report.files_added, 0);
        assert!(entry_names(&output).is_empty());
    }
}
