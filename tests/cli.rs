//! CLI surface smoke tests.
//!
//! Only parsing behavior is exercised here; nothing below spawns adb,
//! scrcpy, or docker.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_names_every_subcommand() {
    let mut cmd = Command::cargo_bin("vivus").unwrap();
    let mut assert = cmd.arg("--help").assert().success();
    for subcommand in ["doctor", "mirror", "env", "build", "up", "down", "logs", "key"] {
        assert = assert.stdout(predicate::str::contains(subcommand));
    }
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    Command::cargo_bin("vivus")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unknown_subcommands_are_rejected() {
    Command::cargo_bin("vivus")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure();
}

#[test]
fn key_set_requires_a_value() {
    Command::cargo_bin("vivus")
        .unwrap()
        .args(["key", "set"])
        .assert()
        .failure();
}

#[test]
fn version_prints_the_package_version() {
    Command::cargo_bin("vivus")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
