//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data
//! directory and verify outputs. Only read-only (or non-persisting)
//! commands are exercised so parallel test runs stay deterministic.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "fastvault-cli", "--"])
        .args(args)
        .env("FASTVAULT_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0, "help failed");
    assert!(stdout.contains("Fastvault CLI"));
    assert!(stdout.contains("fast"));
    assert!(stdout.contains("vault"));
}

#[test]
fn test_config_show() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    assert!(stdout.contains("[fasting]"));
    assert!(stdout.contains("[vault]"));
    assert!(stdout.contains("deposit_minor"));
}

#[test]
fn test_config_rejects_unknown_plan() {
    let (_, stderr, code) = run_cli(&["config", "set-plan", "12:12"]);
    assert_ne!(code, 0, "unknown plan unexpectedly accepted");
    assert!(stderr.contains("unknown fasting plan"));
}

#[test]
fn test_fast_status_runs() {
    let (stdout, _, code) = run_cli(&["fast", "status"]);
    assert_eq!(code, 0, "fast status failed");
    let parsed: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("status output is JSON");
    assert!(parsed.is_object());
}

#[test]
fn test_vault_status_runs() {
    let (stdout, _, code) = run_cli(&["vault", "status"]);
    assert_eq!(code, 0, "vault status failed");
    let parsed: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("vault output is JSON");
    assert!(parsed.is_object());
}

#[test]
fn test_stats_summary_runs() {
    let (stdout, _, code) = run_cli(&["stats", "summary"]);
    assert_eq!(code, 0, "stats summary failed");
    assert!(stdout.contains("total_fasts"));
}
