//! End-to-end tests for the `validate-setup` binary.
//!
//! Each test writes a manifest of POSIX commands to a temp file, points the
//! binary at it through `VALIDATE_CHECKS_FILE` and checks stdout and the exit
//! status.

#![cfg(unix)]
#![allow(clippy::expect_used, clippy::indexing_slicing)]

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn manifest(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write manifest");
    file
}

fn run_with(file: &NamedTempFile, extra: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_validate-setup"));
    command
        .env_clear()
        .env("PATH", std::env::var("PATH").unwrap_or_default())
        .env("VALIDATE_CHECKS_FILE", file.path());
    for (key, value) in extra {
        command.env(key, value);
    }
    command.output().expect("run validate-setup")
}

#[test]
fn test_all_passing_exits_zero() {
    let file = manifest(
        r#"{"groups": [
            {"label": "basics", "cases": [
                {"name": "true succeeds", "command": ["true"]},
                {"name": "false fails", "command": "false", "expect": "failure"}
            ]}
        ]}"#,
    );

    let output = run_with(&file, &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("== basics =="));
    assert!(stdout.contains("[SUCCESS] true succeeds"));
    assert!(stdout.contains("[SUCCESS] false fails (expected failure)"));
    assert!(stdout.contains("Total:  2"));
    assert!(stdout.contains("Passed: 2"));
    assert!(stdout.contains("Failed: 0"));
}

#[test]
fn test_any_failure_exits_one() {
    let file = manifest(
        r#"{"groups": [
            {"label": "a", "cases": [{"name": "ok", "command": "exit 0"}]},
            {"label": "b", "cases": [
                {"name": "broken", "command": "exit 2"},
                {"name": "missing tool", "command": ["no-such-tool-8c2e"]}
            ]}
        ]}"#,
    );

    let output = run_with(&file, &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("[ERROR] broken"));
    assert!(stdout.contains("[ERROR] missing tool"));
    assert!(stdout.contains("Failed: 2"));
}

#[test]
fn test_empty_manifest_exits_zero() {
    let file = manifest("{}");

    let output = run_with(&file, &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Total:  0"));
}

#[test]
fn test_json_summary() {
    let file = manifest(
        r#"{"groups": [{"label": "g", "cases": [
            {"name": "nope", "command": "false"}
        ]}]}"#,
    );

    let output = run_with(&file, &[("VALIDATE_JSON_SUMMARY", "true")]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().expect("summary line");
    let summary: serde_json::Value = serde_json::from_str(last).expect("valid JSON summary");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["failed_cases"][0], "g: nope");
    assert!(summary["run_id"].is_string());
}

#[test]
fn test_invalid_manifest_exits_one_without_running() {
    let file = manifest(r#"{"groups": [{"label": "g", "cases": [{"name": "x"}]}]}"#);

    let output = run_with(&file, &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(!stdout.contains("Total:"));
}

#[test]
fn test_invalid_config_exits_one() {
    let file = manifest("{}");

    let output = run_with(&file, &[("VALIDATE_COMMAND_TIMEOUT_SECONDS", "0")]);

    assert_eq!(output.status.code(), Some(1));
}
