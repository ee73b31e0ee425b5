//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "sentinel-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("FinOps Sentinel"),
        "Should show app name"
    );
    assert!(stdout.contains("scan"), "Should show scan command");
    assert!(stdout.contains("check"), "Should show check command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "sentinel-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("finops"), "Should show binary name");
}

/// Test scan subcommand help
#[test]
fn test_scan_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "sentinel-cli", "--", "scan", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Scan help should succeed");
    assert!(
        stdout.contains("--no-dispatch"),
        "Should show no-dispatch flag"
    );
}

/// Test that check fails cleanly without required configuration
#[test]
fn test_check_reports_missing_configuration() {
    let output = Command::new("cargo")
        .args(["run", "-p", "sentinel-cli", "--", "check"])
        .env_remove("SENTINEL_SUBSCRIPTION_ID")
        .env_remove("SENTINEL_STORAGE_ACCOUNT")
        .output()
        .expect("Failed to execute command");

    assert!(
        !output.status.success(),
        "Check should fail without required settings"
    );
}
