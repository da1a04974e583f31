//! Integration tests for distpack-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;

fn distpack_cmd() -> Command {
    cargo_bin_cmd!("distpack")
}

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

fn sample_project() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");
    write_files(
        temp.path(),
        &[
            ("package.json", "{}"),
            ("server/index.ts", "listen();"),
            ("server/old-backup.ts", "// stale"),
            ("node_modules/dep/index.js", "dep"),
            ("app.log", "log"),
            ("notes.tmp", "scratch"),
        ],
    );
    temp
}

fn archive_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn test_version_flag() {
    distpack_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("distpack"));
}

#[test]
fn test_help_flag() {
    distpack_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("project"))
        .stdout(predicate::str::contains("package"));
}

#[test]
fn test_project_help() {
    distpack_cmd()
        .args(["project", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-default-excludes"));
}

#[test]
fn test_project_default_excludes() {
    let project = sample_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("export.zip");

    distpack_cmd()
        .arg("project")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive created"));

    assert_eq!(
        archive_names(&output),
        vec!["notes.tmp", "package.json", "server/index.ts"]
    );
}

#[test]
fn test_project_default_output_in_current_directory() {
    let project = sample_project();

    distpack_cmd()
        .current_dir(project.path())
        .arg("project")
        .assert()
        .success();

    let output = project.path().join("project-complete.zip");
    assert!(output.exists());
    assert!(!archive_names(&output).contains(&"project-complete.zip".to_string()));
}

#[test]
fn test_project_extra_exclude() {
    let project = sample_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("export.zip");

    distpack_cmd()
        .arg("project")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .args(["-x", "*.tmp", "-x", "server"])
        .assert()
        .success();

    assert_eq!(archive_names(&output), vec!["package.json"]);
}

#[test]
fn test_project_no_default_excludes() {
    let project = sample_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("export.zip");

    distpack_cmd()
        .arg("project")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .arg("--no-default-excludes")
        .assert()
        .success();

    assert!(archive_names(&output).contains(&"node_modules/dep/index.js".to_string()));
}

#[test]
fn test_project_json_output() {
    let project = sample_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("export.zip");

    let assert = distpack_cmd()
        .arg("--json")
        .arg("project")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["operation"], "project");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["files_added"], 3);
    assert!(json["data"]["bytes_compressed"].as_u64().unwrap() > 0);
}

#[test]
fn test_existing_output_requires_force() {
    let project = sample_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("export.zip");
    fs::write(&output, "occupied").unwrap();

    distpack_cmd()
        .arg("project")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&output).unwrap(), "occupied");

    distpack_cmd()
        .arg("project")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .arg("--force")
        .assert()
        .success();

    assert_eq!(archive_names(&output).len(), 3);
}

#[test]
fn test_invalid_pattern_fails() {
    let project = sample_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("export.zip");

    distpack_cmd()
        .arg("project")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .args(["-x", "setup-*.js"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid exclude pattern"))
        .stderr(predicate::str::contains("HINT"));

    assert!(!output.exists());
}

#[test]
fn test_missing_root_fails() {
    let temp = TempDir::new().unwrap();

    distpack_cmd()
        .arg("project")
        .arg(temp.path().join("missing"))
        .arg("-o")
        .arg(temp.path().join("export.zip"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project root not found"));
}

#[test]
fn test_invalid_compression_level_rejected() {
    distpack_cmd()
        .args(["project", "-l", "12"])
        .assert()
        .failure();
}

#[test]
fn test_config_file_overrides() {
    let project = sample_project();
    let out = TempDir::new().unwrap();
    let output = out.path().join("from-config.zip");
    let config = out.path().join("distpack.json");
    fs::write(
        &config,
        format!(
            r#"{{"output": {}, "extra_exclude": ["*.tmp"], "compression_level": 0}}"#,
            serde_json::to_string(&output).unwrap()
        ),
    )
    .unwrap();

    distpack_cmd()
        .arg("project")
        .arg(project.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert_eq!(
        archive_names(&output),
        vec!["package.json", "server/index.ts"]
    );
    let mut archive = zip::ZipArchive::new(File::open(&output).unwrap()).unwrap();
    assert_eq!(
        archive.by_name("package.json").unwrap().compression(),
        zip::CompressionMethod::Stored
    );
}

#[test]
fn test_package_command() {
    let project = TempDir::new().unwrap();
    write_files(
        project.path(),
        &[
            ("electron-main.js", "app"),
            ("package-electron.json", "{}"),
            ("server/index.ts", "srv"),
        ],
    );
    let out = TempDir::new().unwrap();
    let output = out.path().join("win.zip");

    let assert = distpack_cmd()
        .arg("--json")
        .arg("package")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .args(["--name", "my-app"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["operation"], "package");
    assert_eq!(json["status"], "warning");
    assert!(
        json["data"]["missing_sources"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p == "build-exe.bat")
    );

    assert_eq!(
        archive_names(&output),
        vec![
            "my-app/README.md",
            "my-app/electron-main.js",
            "my-app/package.json",
            "my-app/server/index.ts",
        ]
    );
}

#[test]
fn test_package_lists_missing_item_once() {
    let project = TempDir::new().unwrap();
    write_files(project.path(), &[("electron-main.js", "app")]);
    let out = TempDir::new().unwrap();
    let output = out.path().join("win.zip");

    let assert = distpack_cmd()
        .arg("package")
        .arg(project.path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Not found (skipped):"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.matches("build-exe.bat").count(), 1);
}

#[test]
fn test_completion_bash() {
    distpack_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distpack"));
}
