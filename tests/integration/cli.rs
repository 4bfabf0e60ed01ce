//! CLI surface tests: exit codes and the stderr `Error:` contract.
//!
//! Nothing here touches the network; sources that fail to parse are
//! rejected before any request is issued.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn almd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("almd").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

fn initialized() -> TempDir {
    let temp = TempDir::new().unwrap();
    almd(&temp).arg("init").assert().success();
    temp
}

#[test]
fn init_creates_manifest() {
    let temp = TempDir::new().unwrap();
    almd(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("project.toml"));
    assert!(temp.path().join("project.toml").exists());
}

#[test]
fn init_refuses_second_run_without_force() {
    let temp = initialized();
    almd(&temp)
        .arg("init")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("already exists"));
    almd(&temp).args(["init", "--force"]).assert().success();
}

#[test]
fn add_rejects_malformed_source() {
    let temp = initialized();
    almd(&temp)
        .args(["add", "github:u/r/file.lua"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("invalid source"));
}

#[test]
fn add_rejects_unsupported_host() {
    let temp = initialized();
    almd(&temp)
        .args(["add", "https://gitlab.com/u/r/blob/main/a.lua"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported host"));
}

#[test]
fn add_rejects_tree_url() {
    let temp = initialized();
    almd(&temp)
        .args(["add", "https://github.com/u/r/tree/main/dir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("directory"));
}

#[test]
fn remove_without_dependencies_fails() {
    let temp = initialized();
    almd(&temp)
        .args(["remove", "ghost"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no dependencies"));
}

#[test]
fn list_on_fresh_project_succeeds() {
    let temp = initialized();
    almd(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependencies"));
}

#[test]
fn install_on_fresh_project_succeeds() {
    let temp = initialized();
    almd(&temp)
        .arg("install")
        .assert()
        .success()
        .stdout(predicate::str::contains("No dependencies to install"));
}

#[test]
fn commands_fail_without_manifest() {
    let temp = TempDir::new().unwrap();
    for args in [["list"], ["install"]] {
        almd(&temp)
            .args(args)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("project.toml"));
    }
}
