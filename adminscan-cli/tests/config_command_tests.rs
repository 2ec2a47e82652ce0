//! Integration tests for configuration loading with command-line overrides.
//!
//! Mirrors the binary's startup order: file and environment first, flags
//! second, validation last.

use std::fs;

use clap::Parser;
use tempfile::TempDir;

use adminscan_cli::cli::Cli;
use adminscan_cli::error::CliError;
use adminscan_core::config::AdminscanConfig;

const BAD_ENDPOINT: &str = "[backend]\nendpoint = \"ftp://bad\"\n";

async fn load(args: &[&str]) -> Result<AdminscanConfig, CliError> {
    let cli = Cli::try_parse_from(args).expect("should parse flags");
    let mut config = AdminscanConfig::load_unvalidated(&cli.config).await?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

#[tokio::test]
async fn test_endpoint_flag_replaces_invalid_file_value() {
    // Given: A config file with a non-HTTP endpoint
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("adminscan.toml");
    fs::write(&config_path, BAD_ENDPOINT).expect("should write config");
    let path = config_path.to_str().expect("utf-8 path");

    // When: Loading with --endpoint
    let config = load(&["adminscan", "--config", path, "--endpoint", "https://ok/scan"])
        .await
        .expect("flag should win over the file");

    // Then: The flag value is used
    assert_eq!(config.backend.endpoint, "https://ok/scan");
}

#[tokio::test]
async fn test_invalid_file_value_without_flag_is_config_error() {
    // Given: The same invalid file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("adminscan.toml");
    fs::write(&config_path, BAD_ENDPOINT).expect("should write config");
    let path = config_path.to_str().expect("utf-8 path");

    // When: Loading without an override
    let result = load(&["adminscan", "--config", path]).await;

    // Then: Validation fails with exit code 2
    let err = result.expect_err("invalid endpoint should be rejected");
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_invalid_log_level_flag_is_rejected() {
    // Given: No config file at all
    let temp_dir = TempDir::new().expect("should create temp dir");
    let missing = temp_dir.path().join("missing.toml");
    let path = missing.to_str().expect("utf-8 path");

    // When: Passing an unknown log level
    let result = load(&["adminscan", "--config", path, "--log-level", "loud"]).await;

    // Then: Defaults load, but the flag value fails validation
    assert_eq!(result.expect_err("unknown level").exit_code(), 2);
}
