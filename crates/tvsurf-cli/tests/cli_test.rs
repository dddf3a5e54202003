#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvsurf");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("channels"))
        .stdout(predicate::str::contains("epg"));
}

#[test]
fn test_epg_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvsurf");
    cmd.args(["epg", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--channel"));
}

#[test]
fn test_epg_missing_channel() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("tvsurf");
    cmd.arg("epg")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--channel"));
}

#[test]
fn test_watch_without_channels_fails() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvsurf");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No channels are defined"));
}

#[test]
fn test_channels_without_channels_fails() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("tvsurf");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("channels")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No channels are defined"));
}

#[test]
fn test_init_then_channels() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let mut init = cargo_bin_cmd!("tvsurf");
    init.arg("--dir").arg(dir.path()).arg("init").assert().success();

    // Act & Assert
    assert!(dir.path().join("config.toml").exists());
    let mut cmd = cargo_bin_cmd!("tvsurf");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("channels")
        .assert()
        .success()
        .stderr(predicate::str::contains("Channel 1"))
        .stderr(predicate::str::contains("ch3"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let mut first = cargo_bin_cmd!("tvsurf");
    first.arg("--dir").arg(dir.path()).arg("init").assert().success();

    // Act & Assert
    let mut second = cargo_bin_cmd!("tvsurf");
    second
        .arg("--dir")
        .arg(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config already exists"));
}

#[test]
fn test_log_file_option() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("logs").join("tvsurf.log");

    // Act
    let mut cmd = cargo_bin_cmd!("tvsurf");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("--log-file")
        .arg(&log_path)
        .arg("init")
        .assert()
        .success();

    // Assert
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("config.toml"));
}
