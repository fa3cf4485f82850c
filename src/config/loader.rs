//! Configuration file loading with precedence handling.

use crate::model::Source;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CATALOG_LIST_CONFIG";

/// Environment variable overriding the backend source.
pub const SOURCE_ENV_VAR: &str = "CATALOG_LIST_SOURCE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// An override carried a value that cannot be used.
    #[error("Invalid value {value:?} for {name}")]
    InvalidValue {
        /// Variable or flag name.
        name: &'static str,
        value: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/catalog-list/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Backend variant: "standard" or "lofi".
    #[serde(default)]
    pub source: Option<Source>,

    /// Entries per page served by the fixture gateway.
    #[serde(default)]
    pub page_size: Option<usize>,

    /// Window for the second back press that exits, in milliseconds.
    #[serde(default)]
    pub exit_interval_ms: Option<u64>,

    /// Simulated latency of each fixture fetch, in milliseconds.
    #[serde(default)]
    pub fetch_latency_ms: Option<u64>,

    /// Number of submitted searches remembered.
    #[serde(default)]
    pub history_capacity: Option<usize>,

    /// JSON catalog to serve instead of the built-in one.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub source: Source,
    pub page_size: usize,
    pub exit_interval_ms: u64,
    pub fetch_latency_ms: u64,
    pub history_capacity: usize,
    /// `None` serves the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            source: Source::Standard,
            page_size: 5,
            exit_interval_ms: 2000,
            fetch_latency_ms: 0,
            history_capacity: 100,
            catalog_path: None,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    pub fn exit_interval(&self) -> Duration {
        Duration::from_millis(self.exit_interval_ms)
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/catalog-list/catalog-list.log` on Linux, or the
/// platform state directory elsewhere. Falls back to the current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("catalog-list").join("catalog-list.log"),
        None => PathBuf::from("catalog-list.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/catalog-list/config.toml` on Linux, the platform config
/// directory elsewhere, or `None` if it cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("catalog-list").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CATALOG_LIST_CONFIG` environment variable
/// 3. Default path `~/.config/catalog-list/config.toml`
///
/// Missing config files are not errors.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `CATALOG_LIST_SOURCE` ("standard" or "lofi").
///
/// # Errors
///
/// `InvalidValue` if the variable is set to an unknown source.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(value) = std::env::var(SOURCE_ENV_VAR) {
        config.source = Source::from_name(&value).ok_or(ConfigError::InvalidValue {
            name: SOURCE_ENV_VAR,
            value,
        })?;
    }

    Ok(config)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        source: config.source.unwrap_or(defaults.source),
        page_size: config.page_size.unwrap_or(defaults.page_size).max(1),
        exit_interval_ms: config.exit_interval_ms.unwrap_or(defaults.exit_interval_ms),
        fetch_latency_ms: config.fetch_latency_ms.unwrap_or(defaults.fetch_latency_ms),
        history_capacity: config
            .history_capacity
            .unwrap_or(defaults.history_capacity),
        catalog_path: config.catalog_path.or(defaults.catalog_path),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence. Only flags the user actually set
/// are applied.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    source_override: Option<Source>,
    page_size_override: Option<usize>,
    latency_override: Option<u64>,
    catalog_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(source) = source_override {
        config.source = source;
    }

    if let Some(page_size) = page_size_override {
        config.page_size = page_size.max(1);
    }

    if let Some(latency) = latency_override {
        config.fetch_latency_ms = latency;
    }

    if let Some(path) = catalog_override {
        config.catalog_path = Some(path);
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
