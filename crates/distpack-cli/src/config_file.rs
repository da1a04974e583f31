//! JSON configuration file overriding the built-in profiles.
//!
//! ```json
//! {
//!   "output": "export.zip",
//!   "extra_exclude": ["*.tmp", "coverage"],
//!   "compression_level": 9,
//!   "package": { "name": "my-app-win", "items": ["main.js", "src/"] }
//! }
//! ```

use anyhow::Context;
use anyhow::Result;
use distpack_core::BundleError;
use distpack_core::ExclusionSet;
use distpack_core::PackagePlan;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Output archive path.
    pub output: Option<PathBuf>,

    /// Replaces the profile's exclusion list when present.
    pub exclude: Option<Vec<String>>,

    /// Appended to the exclusion list.
    #[serde(default)]
    pub extra_exclude: Vec<String>,

    pub compression_level: Option<u8>,

    pub package: Option<PackageSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageSection {
    pub name: Option<String>,

    /// Replaces the declared item list when present.
    pub items: Option<Vec<PathBuf>>,

    /// Replaces the rename list when present.
    pub renames: Option<Vec<Rename>>,

    /// Replaces the generated README contents.
    pub readme: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl ConfigFile {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config file '{}'", path.display()))
    }

    /// Applies the exclusion overrides to `base`.
    pub fn apply_exclusions(&self, base: ExclusionSet) -> Result<ExclusionSet, BundleError> {
        let mut set = match &self.exclude {
            Some(patterns) => ExclusionSet::parse(patterns)?,
            None => base,
        };
        set.extend_parsed(&self.extra_exclude)?;
        Ok(set)
    }

    /// Applies the package overrides to `plan`.
    pub fn apply_package(&self, mut plan: PackagePlan) -> PackagePlan {
        let Some(package) = &self.package else {
            return plan;
        };
        if let Some(name) = &package.name {
            plan.name.clone_from(name);
        }
        if let Some(items) = &package.items {
            plan.items.clone_from(items);
        }
        if let Some(renames) = &package.renames {
            plan.renames = renames
                .iter()
                .map(|r| (r.from.clone(), r.to.clone()))
                .collect();
        }
        if let Some(readme) = &package.readme {
            plan.generated.retain(|g| g.path != Path::new("README.md"));
            plan = plan.with_generated_file("README.md", readme.as_str());
        }
        plan
    }
}
