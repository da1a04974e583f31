//! Built-in packaging profiles.
//!
//! Each profile is returned as a value; nothing here is global state. The
//! CLI starts from a profile and layers config-file and flag overrides on
//! top.

use crate::Result;
use crate::creation::BundleConfig;
use crate::creation::ExclusionSet;
use crate::staging::PackagePlan;

/// Output file of the full project export.
pub const PROJECT_OUTPUT: &str = "project-complete.zip";

/// Names left out of the full project export.
///
/// Dependency caches, build output, logs, local environment files, previous
/// exports, one-off database maintenance scripts and Python tooling state.
pub const PROJECT_EXCLUDES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "*.log",
    ".env*",
    "project-complete.*",
    "create-project-zip.js",
    "create_project_zip.py",
    "apply-schema-fixes.js",
    "check-and-complete-questions.js",
    "create-vendor-responses.js",
    "execute-schema-fix.js",
    "fix-order-status.js",
    "house-relocation-questions-script.js",
    "user-manual",
    "*-backup.ts",
    "__pycache__",
    "*.pyc",
    ".cache",
    ".pythonlibs",
    ".uv",
    "pyproject.toml",
    "uv.lock",
    "*.sql",
];

/// Package directory name of the Windows desktop build.
pub const WINDOWS_PACKAGE_NAME: &str = "juno-fast-windows-exe";

/// Output file of the Windows desktop build package.
pub const WINDOWS_OUTPUT: &str = "juno-fast-windows-exe.zip";

/// Files and directories the Electron toolchain needs to build the EXE.
pub const WINDOWS_ITEMS: &[&str] = &[
    "electron-main.js",
    "package-electron.json",
    "build-exe.bat",
    "BUILD_EXE_GUIDE.md",
    "WINDOWS_EXE_INSTRUCTIONS.md",
    "server/",
    "client/",
    "shared/",
    "drizzle.config.ts",
    "tsconfig.json",
    "vite.config.ts",
    "tailwind.config.ts",
    "postcss.config.js",
    "components.json",
];

const WINDOWS_README: &str = "\
# Juno Fast - Windows EXE Builder

## Quick Start
1. Install Node.js from https://nodejs.org/
2. Open Command Prompt in this folder
3. Run: npm install
4. Run: npm run build-exe
5. Find your .exe in dist-electron/ folder

## Files Included
- electron-main.js - Main Electron app
- All source code (client, server, shared)
- Build configurations
- Complete documentation

## Requirements
- Windows 10/11
- Node.js 16+
- 2GB free space

Your app will be a complete desktop version of Juno Fast admin dashboard!
";

/// Exclusion set of the full project export.
pub fn project_exclusions() -> Result<ExclusionSet> {
    ExclusionSet::parse(PROJECT_EXCLUDES)
}

/// Bundle configuration of the full project export.
///
/// # Examples
///
/// ```
/// use distpack_core::profiles;
///
/// let config = profiles::project_config().unwrap();
/// assert!(config.exclusions.is_excluded("node_modules"));
/// assert!(config.exclusions.is_excluded(".env.production"));
/// assert!(!config.exclusions.is_excluded("package.json"));
/// ```
pub fn project_config() -> Result<BundleConfig> {
    Ok(BundleConfig::default().with_exclusions(project_exclusions()?))
}

/// Staging plan of the Windows desktop build package.
///
/// The Electron manifest is shipped as `package-electron.json` in the
/// project and renamed to `package.json` inside the package.
#[must_use]
pub fn windows_plan() -> PackagePlan {
    let plan = WINDOWS_ITEMS
        .iter()
        .fold(PackagePlan::new(WINDOWS_PACKAGE_NAME), |plan, item| {
            plan.with_item(*item)
        });
    plan.with_rename("package-electron.json", "package.json")
        .with_generated_file("README.md", WINDOWS_README)
}
