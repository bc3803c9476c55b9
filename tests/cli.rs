use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn project(temp: &TempDir, name: &str) -> PathBuf {
    let dir = temp.path().join(name);
    fs::create_dir_all(dir.join("params")).unwrap();
    fs::write(dir.join("params").join("bup_targets.txt"), "data\nmodels\n").unwrap();
    dir
}

fn pbup(project_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pbup").unwrap();
    cmd.current_dir(project_dir).env_remove("PBUP_PROJECT_DIR");
    cmd
}

/// Build `<name>.tar` holding a single `.bup` directory
fn legacy_bundle(temp: &TempDir, file_name: &str) -> PathBuf {
    let src = temp.path().join("bundle-src");
    let store = src.join(".bup");
    fs::create_dir_all(store.join("refs")).unwrap();
    fs::write(store.join("config"), "[core]\n").unwrap();
    fs::write(store.join("refs").join("local-data"), "abc123\n").unwrap();

    let archive = temp.path().join(file_name);
    let status = std::process::Command::new("tar")
        .arg("-cf")
        .arg(&archive)
        .arg("-C")
        .arg(&src)
        .arg(".bup")
        .status()
        .unwrap();
    assert!(status.success());
    archive
}

#[test]
fn help_lists_modes() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");

    pbup(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unbundle"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn unknown_mode_fails() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");

    pbup(&dir).arg("prune").assert().failure();
}

#[test]
fn version_requires_store() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");

    pbup(&dir)
        .arg("version")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup store not found"));
}

#[test]
fn init_refuses_existing_store() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    fs::create_dir(dir.join(".bup")).unwrap();

    pbup(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn backup_rejects_unlisted_target() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    fs::create_dir(dir.join(".bup")).unwrap();

    pbup(&dir)
        .args(["backup", "secrets"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid backup target"));
}

#[test]
fn backup_requires_target() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    fs::create_dir(dir.join(".bup")).unwrap();

    pbup(&dir)
        .arg("backup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a target"));
}

#[test]
fn unbundle_installs_store() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    let archive = legacy_bundle(&temp, "alpha_2024-01-01-000000.tar");

    pbup(&dir)
        .arg("unbundle")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Installed store at version 2024-01-01-000000",
        ));

    assert_eq!(fs::read_to_string(dir.join(".bup").join("config")).unwrap(), "[core]\n");
    assert_eq!(
        fs::read_to_string(dir.join(".bup").join("refs").join("local-data")).unwrap(),
        "abc123\n"
    );
}

#[test]
fn unbundle_twice_fails() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    let archive = legacy_bundle(&temp, "alpha_2024-01-01-000000.tar");

    pbup(&dir).arg("unbundle").arg(&archive).assert().success();
    pbup(&dir)
        .arg("unbundle")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn unbundle_rejects_other_project() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    let archive = legacy_bundle(&temp, "beta_2024-01-01-000000.tar");

    pbup(&dir)
        .arg("unbundle")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected 'alpha'"));

    assert!(!dir.join(".bup").exists());
}

#[test]
fn unbundle_rejects_wrong_extension() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    let archive = legacy_bundle(&temp, "alpha_2024-01-01-000000.tgz");

    pbup(&dir)
        .arg("unbundle")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains(".tar extension"));
}

#[test]
fn project_dir_from_environment() {
    let temp = TempDir::new().unwrap();
    let dir = project(&temp, "alpha");
    let archive = legacy_bundle(&temp, "alpha_2024-01-01-000000.tar");

    Command::cargo_bin("pbup")
        .unwrap()
        .current_dir(temp.path())
        .env("PBUP_PROJECT_DIR", &dir)
        .arg("unbundle")
        .arg(&archive)
        .assert()
        .success();

    assert!(dir.join(".bup").is_dir());
}
