//! CLI smoke tests for the modulith-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, and module wiring checks.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Helper to run the modulith-server binary with a private HOME
fn run_modulith_server(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_modulith-server"))
        .args(args)
        .env("HOME", home)
        .env_remove("APP__BUS__BROADCAST_MODE")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute modulith-server")
}

/// Helper to run the modulith-server binary with timeout
async fn run_modulith_server_with_timeout(
    home: &Path,
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_modulith-server"));
    cmd.args(args)
        .env("HOME", home)
        .kill_on_drop(true)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Writes `body` as a config whose home_dir lives inside the temp dir.
fn write_config(dir: &TempDir, name: &str, body: &str) -> String {
    let home = dir.path().join("home");
    let content = format!("home_dir: \"{}\"\n{body}", home.display());
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_str().unwrap().to_owned()
}

const LOGGING: &str = r#"
logging:
  default:
    console_level: info
    file: "logs/modulith.log"
    file_level: debug
    max_backups: 3
    max_size_mb: 10
"#;

#[test]
fn test_cli_help_command() {
    let home = TempDir::new().unwrap();
    let output = run_modulith_server(home.path(), &["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("modulith-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(
        stdout.contains("--broadcast-mode"),
        "Should mention broadcast mode option"
    );
}

#[test]
fn test_cli_version_command() {
    let home = TempDir::new().unwrap();
    let output = run_modulith_server(home.path(), &["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("modulith-server"), "Should contain binary name");
    assert!(
        stdout.chars().any(|c| c.is_ascii_digit()),
        "Should contain version numbers"
    );
}

#[test]
fn test_cli_invalid_command() {
    let home = TempDir::new().unwrap();
    let output = run_modulith_server(home.path(), &["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let home = TempDir::new().unwrap();
    let output = run_modulith_server(
        home.path(),
        &["--config", "/nonexistent/config.yaml", "check"],
    );

    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file not found"),
        "Should mention config file issue: {}",
        stderr
    );
}

#[test]
fn test_cli_config_flag_short_form() {
    let home = TempDir::new().unwrap();
    let output = run_modulith_server(home.path(), &["-c", "/nonexistent/config.yaml", "check"]);

    assert!(
        !output.status.success(),
        "Should fail with missing config file"
    );
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed").unwrap();

    let output = run_modulith_server(
        temp_dir.path(),
        &["--config", config_path.to_str().unwrap(), "check"],
    );

    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid configuration"),
        "Should mention configuration issue: {}",
        stderr
    );
}

#[test]
fn test_cli_unknown_bus_setting_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "typo.yaml", "bus:\n  broadcast_mood: parallel\n");

    let output = run_modulith_server(temp_dir.path(), &["--config", &config, "check"]);

    assert!(!output.status.success(), "Unknown bus field should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broadcast_mood"), "{}", stderr);
}

#[test]
fn test_cli_check_lists_modules_and_handlers() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "valid.yaml", LOGGING);

    let output = run_modulith_server(temp_dir.path(), &["--config", &config, "check"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "Should succeed with valid config\nSTDOUT: {}\nSTDERR: {}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("catalog, identity, media, sellers"), "{}", stdout);
    assert!(stdout.contains("identity.create_account"), "{}", stdout);
    assert!(stdout.contains("catalog.product_deleted"), "{}", stdout);
    assert!(stdout.contains("sellers.seller_registered"), "{}", stdout);
    assert!(
        temp_dir.path().join("home").is_dir(),
        "home_dir should be created"
    );
}

#[test]
fn test_cli_check_with_strict_requests() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "strict.yaml", "bus:\n  strict_requests: true\n");

    let output = run_modulith_server(temp_dir.path(), &["--config", &config, "check"]);

    assert!(
        output.status.success(),
        "Shipped modules have one handler per request: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "print.yaml", "bus:\n  broadcast_mode: sequential\n");

    let output = run_modulith_server(
        temp_dir.path(),
        &[
            "--config",
            &config,
            "--broadcast-mode",
            "parallel",
            "--print-config",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("broadcast_mode: parallel"), "{}", stdout);
}

#[test]
fn test_cli_env_overrides_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "env.yaml", "bus:\n  broadcast_mode: sequential\n");

    let output = Command::new(env!("CARGO_BIN_EXE_modulith-server"))
        .args(["--config", &config, "--print-config"])
        .env("HOME", temp_dir.path())
        .env("APP__BUS__BROADCAST_MODE", "parallel")
        .output()
        .expect("Failed to execute modulith-server");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("broadcast_mode: parallel"), "{}", stdout);
}

#[test]
fn test_cli_invalid_broadcast_mode() {
    let home = TempDir::new().unwrap();
    let output = run_modulith_server(home.path(), &["--broadcast-mode", "random", "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown broadcast mode"), "{}", stderr);
}

#[tokio::test]
async fn test_cli_run_command_starts_modules() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "run.yaml", LOGGING);

    let result = run_modulith_server_with_timeout(
        temp_dir.path(),
        &["--config", &config, "run"],
        Duration::from_secs(5),
    )
    .await;

    // Running until killed is the expected outcome.
    match result {
        Err(err) => assert!(
            err.to_string().contains("elapsed"),
            "Server failed to start: {}",
            err
        ),
        Ok(output) => panic!(
            "Server exited early\nSTDOUT: {}\nSTDERR: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ),
    }
}

#[test]
fn test_cli_subcommand_help() {
    let home = TempDir::new().unwrap();
    let output = run_modulith_server(home.path(), &["run", "--help"]);
    assert!(output.status.success(), "Run subcommand help should succeed");

    let output = run_modulith_server(home.path(), &["check", "--help"]);
    assert!(output.status.success(), "Check subcommand help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Validate configuration"));
}
