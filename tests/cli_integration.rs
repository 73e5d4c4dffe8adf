//! Integration tests for the VaultKeeper CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Commands that talk to a server need interactive prompts or a running
//! server, so we focus on non-interactive cases (--help, version, keygen,
//! completions) and on failures that happen before any network call.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

/// Helper: get a Command pointing at the vaultkeeper binary.
fn vaultkeeper() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("vaultkeeper").expect("binary should exist");
    cmd.env_remove("VAULTKEEPER_CONFIG")
        .env_remove("VAULTKEEPER_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_flag_shows_usage() {
    vaultkeeper()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted personal vault"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("signup"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("keygen"));
}

#[test]
fn version_flag_shows_version() {
    vaultkeeper()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vaultkeeper"));
}

#[test]
fn no_args_shows_help() {
    vaultkeeper()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn add_help_lists_item_kinds() {
    vaultkeeper()
        .args(["add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("card"))
        .stdout(predicate::str::contains("text"))
        .stdout(predicate::str::contains("binary"));
}

#[test]
fn list_help_shows_category_flags() {
    vaultkeeper()
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--logins"))
        .stdout(predicate::str::contains("--cards"))
        .stdout(predicate::str::contains("--texts"))
        .stdout(predicate::str::contains("--binaries"));
}

#[test]
fn keygen_prints_a_32_byte_base64_key() {
    let output = vaultkeeper().arg("keygen").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let key = stdout.lines().next().unwrap();
    assert!(vaultkeeper::crypto::VaultKey::from_base64(key).is_ok());
}

#[test]
fn completions_for_bash() {
    vaultkeeper()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vaultkeeper"));
}

#[test]
fn completions_for_unknown_shell_fails() {
    vaultkeeper()
        .args(["completions", "csh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'csh'"));
}

#[test]
fn malformed_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.child("vaultkeeper.toml");
    config.write_str("port = \"not a number\"\n").unwrap();

    vaultkeeper()
        .args(["--login", "alice", "login"])
        .arg("--config")
        .arg(config.path())
        .env("VAULTKEEPER_PASSWORD", "pw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file error"));
}

#[test]
fn missing_key_is_reported_before_connecting() {
    let tmp = TempDir::new().unwrap();
    tmp.child("vaultkeeper.toml")
        .write_str("port = 1\n")
        .unwrap();

    vaultkeeper()
        .args(["--login", "alice", "login"])
        .current_dir(tmp.path())
        .env("VAULTKEEPER_PASSWORD", "pw")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no client key configured"));
}
