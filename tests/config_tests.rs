//! Configuration loading tests
//!
//! Environment overrides are process-global, so these run serially.

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

use assert_cmd::Command;
use bb_release::config::load_config;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

const ENV_VARS: [&str; 3] = ["BITBUCKET_USERNAME", "BITBUCKET_APP_PASSWORD", "SLACK_TOKEN"];

#[allow(unsafe_code)]
fn clear_env() {
    for var in ENV_VARS {
        // SAFETY: serialized tests, no other thread reads the environment
        unsafe { std::env::remove_var(var) };
    }
}

#[allow(unsafe_code)]
fn set_env(var: &str, value: &str) {
    // SAFETY: serialized tests, no other thread reads the environment
    unsafe { std::env::set_var(var, value) };
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_missing_file_gives_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();

    assert_eq!(config.bitbucket.host, "bitbucket.org");
    assert_eq!(config.bitbucket.api_url, "https://api.bitbucket.org/2.0");
    assert!(config.bitbucket.required_reviewers.is_empty());
    assert!(config.release_channel().is_none());
}

#[test]
#[serial]
fn test_load_from_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[bitbucket]
main_branch = "master"
username = "file-user"
current_user_uuid = "{bot}"

[[bitbucket.required_reviewers]]
uuid = "{test-uid}"
slack_uid = "TESTSLACKID"

[slack]
release_channel = "releases"
release_channel_message_enabled = true
"#,
    );

    let config = load_config(Some(&path)).unwrap();

    assert_eq!(config.bitbucket.main_branch, "master");
    assert_eq!(config.bitbucket.host, "bitbucket.org");
    assert_eq!(config.bitbucket.username.as_deref(), Some("file-user"));
    assert_eq!(config.bitbucket.required_reviewers.len(), 1);
    assert_eq!(config.bitbucket.required_reviewers[0].mention(), "<@TESTSLACKID>");
    assert_eq!(config.release_channel(), Some("releases"));
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[bitbucket]\nusername = \"file-user\"\n");
    set_env("BITBUCKET_USERNAME", "env-user");
    set_env("BITBUCKET_APP_PASSWORD", "env-secret");
    set_env("SLACK_TOKEN", "xoxb-env");

    let config = load_config(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.bitbucket.username.as_deref(), Some("env-user"));
    assert_eq!(config.bitbucket.app_password.as_deref(), Some("env-secret"));
    assert_eq!(config.slack.token.as_deref(), Some("xoxb-env"));
}

#[test]
#[serial]
fn test_invalid_file_names_path() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[bitbucket\nhost = ");

    let err = load_config(Some(&path)).unwrap_err();

    assert!(err.to_string().starts_with("configuration error: failed to parse"));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
#[serial]
fn test_cli_release_without_links() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let mut cmd = Command::cargo_bin("bb-release").unwrap();
    cmd.arg("--config")
        .arg(&path)
        .args(["release", "--channel", "C1", "--user", "U1", "please", "release"])
        .env("NO_COLOR", "1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "I can't find any pull-request in your message",
        ))
        .stdout(predicate::str::contains("Nothing to release"));
}

#[test]
#[serial]
fn test_cli_reads_message_from_stdin() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    let mut cmd = Command::cargo_bin("bb-release").unwrap();
    cmd.arg("--config")
        .arg(&path)
        .args(["release", "--dry-run"])
        .write_stdin("nothing to see here\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "I can't find any pull-request in your message",
        ));
}
