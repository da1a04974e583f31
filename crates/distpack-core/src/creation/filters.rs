//! Exclusion pattern matching for bundle creation.
//!
//! Patterns are tested against a file or directory's base name only. Four
//! shapes are supported:
//!
//! - `*substring*`: name contains `substring`
//! - `*suffix`: name ends with `suffix`
//! - `prefix*`: name starts with `prefix`
//! - `literal`: name equals `literal`
//!
//! Matching is case-sensitive. A `*` anywhere other than the first or last
//! position is rejected when the pattern is parsed.

use crate::BundleError;
use crate::Result;
use std::ffi::OsStr;
use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

const WILDCARD: char = '*';

/// A single parsed exclusion pattern.
///
/// # Examples
///
/// ```
/// use distpack_core::creation::ExclusionPattern;
///
/// let pattern = ExclusionPattern::parse("*.log").unwrap();
/// assert!(pattern.matches("server.log"));
/// assert!(!pattern.matches("server.log.gz"));
///
/// assert!(ExclusionPattern::parse("*-broken*.ts").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExclusionPattern {
    /// `*text*`: name contains the text.
    Contains(String),
    /// `*text`: name ends with the text.
    Suffix(String),
    /// `text*`: name starts with the text.
    Prefix(String),
    /// `text`: name equals the text.
    Exact(String),
}

impl ExclusionPattern {
    /// Parses a pattern string, classifying it by its leading and trailing
    /// wildcards.
    ///
    /// `*` and `**` are accepted and match every name.
    ///
    /// # Errors
    ///
    /// Returns `BundleError::InvalidPattern` if the pattern is empty, has a
    /// wildcard in an interior position, or contains a path separator.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason| BundleError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if pattern.contains(['/', '\\']) {
            return Err(invalid("patterns match base names and cannot contain separators"));
        }

        let leading = pattern.starts_with(WILDCARD);
        let trailing = pattern.len() > 1 && pattern.ends_with(WILDCARD);
        let start = usize::from(leading);
        let end = pattern.len() - usize::from(trailing);
        let body = &pattern[start..end];

        if body.contains(WILDCARD) {
            return Err(invalid("wildcard allowed only at start or end"));
        }

        let body = body.to_string();
        Ok(match (leading, trailing) {
            (true, true) => Self::Contains(body),
            (true, false) => Self::Suffix(body),
            (false, true) => Self::Prefix(body),
            (false, false) => Self::Exact(body),
        })
    }

    /// Tests a base name against this pattern.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Contains(text) => name.contains(text.as_str()),
            Self::Suffix(text) => name.ends_with(text.as_str()),
            Self::Prefix(text) => name.starts_with(text.as_str()),
            Self::Exact(text) => name == text,
        }
    }
}

impl fmt::Display for ExclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(text) => write!(f, "*{text}*"),
            Self::Suffix(text) => write!(f, "*{text}"),
            Self::Prefix(text) => write!(f, "{text}*"),
            Self::Exact(text) => f.write_str(text),
        }
    }
}

/// Ordered set of exclusion patterns combined with logical OR.
///
/// # Examples
///
/// ```
/// use distpack_core::creation::ExclusionSet;
///
/// let set = ExclusionSet::parse(["node_modules", "*.log", ".env*"]).unwrap();
/// assert!(set.is_excluded("node_modules"));
/// assert!(set.is_excluded("debug.log"));
/// assert!(set.is_excluded(".env.local"));
/// assert!(!set.is_excluded("index.ts"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    patterns: Vec<ExclusionPattern>,
}

impl ExclusionSet {
    /// Creates an empty set that excludes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every pattern, failing on the first invalid one.
    pub fn parse<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| ExclusionPattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Parses and appends more patterns.
    pub fn extend_parsed<I, S>(&mut self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.patterns.push(ExclusionPattern::parse(pattern.as_ref())?);
        }
        Ok(())
    }

    /// Returns the first pattern matching `name`, if any.
    #[must_use]
    pub fn first_match(&self, name: &str) -> Option<&ExclusionPattern> {
        self.patterns.iter().find(|p| p.matches(name))
    }

    /// Returns whether `name` matches any pattern.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        self.first_match(name).is_some()
    }

    /// Returns the parsed patterns in order.
    #[must_use]
    pub fn patterns(&self) -> &[ExclusionPattern] {
        &self.patterns
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Tests a path's base name against the set.
///
/// Names that are not valid UTF-8 are compared lossily. Paths without a
/// base name (such as `/` or `..`) are never excluded.
#[must_use]
pub fn should_skip(path: &Path, exclusions: &ExclusionSet) -> bool {
    path.file_name()
        .is_some_and(|name| name_excluded(name, exclusions))
}

fn name_excluded(name: &OsStr, exclusions: &ExclusionSet) -> bool {
    match name.to_str() {
        Some(name) => exclusions.is_excluded(name),
        None => exclusions.is_excluded(&name.to_string_lossy()),
    }
}

/// Computes the archive path of `source_path` relative to `root`, with
/// `prefix` prepended when given.
///
/// # Errors
///
/// Returns `BundleError::InvalidEntryPath` if the source is not under the
/// root or the result would contain a root, prefix or `..` component.
///
/// # Examples
///
/// ```
/// use distpack_core::creation::filters;
/// use std::path::Path;
///
/// let root = Path::new("/home/user/project");
/// let source = Path::new("/home/user/project/src/main.ts");
///
/// let archive_path = filters::compute_archive_path(source, root, None).unwrap();
/// assert_eq!(archive_path, Path::new("src/main.ts"));
///
/// let prefixed =
///     filters::compute_archive_path(source, root, Some(Path::new("bundle"))).unwrap();
/// assert_eq!(prefixed, Path::new("bundle/src/main.ts"));
/// ```
pub fn compute_archive_path(
    source_path: &Path,
    root: &Path,
    prefix: Option<&Path>,
) -> Result<PathBuf> {
    let relative =
        source_path
            .strip_prefix(root)
            .map_err(|_| BundleError::InvalidEntryPath {
                path: source_path.to_path_buf(),
            })?;

    let archive_path = match prefix {
        Some(prefix) => prefix.join(relative),
        None => relative.to_path_buf(),
    };

    let escapes = archive_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes || archive_path.as_os_str().is_empty() {
        return Err(BundleError::InvalidEntryPath { path: archive_path });
    }

    Ok(archive_path)
}

/// Converts an archive path to a ZIP entry name with `/` separators.
pub fn normalize_zip_path(path: &Path) -> Result<String> {
    let parts = path
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str().ok_or_else(|| {
                BundleError::Io(std::io::Error::other(format!(
                    "path is not valid UTF-8: {}",
                    path.display()
                )))
            }),
            _ => Err(BundleError::InvalidEntryPath {
                path: path.to_path_buf(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}
