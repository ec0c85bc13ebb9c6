//! Configuration resolution and graceful degradation tests
//!
//! Tests that manipulate CTOWER_CONFIG are marked with #[serial] so they do
//! not race each other on the process environment.

use ctower_common::config::{
    load_config, read_toml_config, resolve_config_source, write_toml_config, CalculationMode,
    ConfigSource, EngineConfig, LoggingConfig, TomlConfig, CONFIG_ENV_VAR,
};
use ctower_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_environment_source_used_without_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let source = resolve_config_source(None, CONFIG_ENV_VAR);
    assert_eq!(source, ConfigSource::Environment(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_arg_overrides_environment() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/from-env.toml");

    let cli = PathBuf::from("/tmp/from-cli.toml");
    let source = resolve_config_source(Some(&cli), CONFIG_ENV_VAR);
    assert_eq!(source, ConfigSource::CommandLine(cli));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_environment_value_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "   ");

    let source = resolve_config_source(None, CONFIG_ENV_VAR);
    assert!(!matches!(source, ConfigSource::Environment(_)));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
fn test_missing_explicit_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let result = load_config(&ConfigSource::CommandLine(missing));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_vanished_user_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("config.toml");

    let config = load_config(&ConfigSource::UserConfig(missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_write_then_read_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.toml");

    let config = TomlConfig {
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        engine: EngineConfig {
            mode: CalculationMode::Extended,
            event_capacity: 16,
        },
        range_table: None,
    };

    write_toml_config(&config, &path).unwrap();
    let loaded = load_config(&ConfigSource::CommandLine(path)).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.toml");
    std::fs::write(&path, "[engine\nmode = ").unwrap();

    let result = read_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_zero_event_capacity_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("zero.toml");
    std::fs::write(&path, "[engine]\nevent_capacity = 0\n").unwrap();

    let result = read_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_unknown_mode_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("mode.toml");
    std::fs::write(&path, "[engine]\nmode = \"turbo\"\n").unwrap();

    assert!(read_toml_config(&path).is_err());
}
