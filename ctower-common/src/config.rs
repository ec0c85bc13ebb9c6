//! Configuration loading and config file resolution
//!
//! Configuration is bootstrap-only: it is read once at startup and handed to
//! the engine as immutable values. Resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config file (`<config dir>/ctower/config.toml`)
//! 4. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CTOWER_CONFIG";

/// Raw range table as written in TOML:
/// `category -> metric -> bucket -> [min, max]`
pub type RangeTableConfig = BTreeMap<String, BTreeMap<String, BTreeMap<String, [f64; 2]>>>;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Engine behaviour (optional)
    #[serde(default)]
    pub engine: EngineConfig,

    /// Full range table override (optional, replaces the built-in table)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_table: Option<RangeTableConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Which calculation path the engine runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    /// Seven canonical metrics, two recommendations
    #[default]
    Standard,
    /// Adds guardrail violations and the best-practice recommendations
    Extended,
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: CalculationMode,

    /// Workflow event channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: CalculationMode::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_capacity() -> usize {
    100
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserConfig(PathBuf),
    Defaults,
}

impl ConfigSource {
    /// Path of the file to load, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p) | ConfigSource::Environment(p) | ConfigSource::UserConfig(p) => {
                Some(p.as_path())
            }
            ConfigSource::Defaults => None,
        }
    }

    /// Explicitly requested sources must exist; discovered ones may not
    pub fn is_explicit(&self) -> bool {
        matches!(self, ConfigSource::CommandLine(_) | ConfigSource::Environment(_))
    }
}

/// Resolve the config file location following the priority order
pub fn resolve_config_source(cli_arg: Option<&Path>, env_var_name: &str) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::CommandLine(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: User config file
    if let Some(path) = user_config_path() {
        if path.exists() {
            return ConfigSource::UserConfig(path);
        }
    }

    // Priority 4: Compiled defaults
    ConfigSource::Defaults
}

/// Default user config file path for the platform
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ctower").join("config.toml"))
}

/// Load configuration from a resolved source
///
/// A missing explicitly requested file is an error. A discovered user config
/// that disappeared between resolution and load falls back to defaults.
pub fn load_config(source: &ConfigSource) -> Result<TomlConfig> {
    let Some(path) = source.path() else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        if source.is_explicit() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        warn!(path = %path.display(), "Config file vanished, using compiled defaults");
        return Ok(TomlConfig::default());
    }

    let config = read_toml_config(path)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    if config.engine.event_capacity == 0 {
        return Err(Error::Config(
            "engine.event_capacity must be greater than zero".to_string(),
        ));
    }

    Ok(config)
}

/// Write a config file, creating parent directories as needed
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
