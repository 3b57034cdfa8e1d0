//! Configuration file loading with precedence handling.

use crate::engine::ContentConfig;
use crate::engine::DEFAULT_SCROLL_THROTTLE;
use crate::chunk::DEFAULT_CHUNK_SIZE;
use crate::model::ContentType;
use crate::view_state::window::{WindowMode, DEFAULT_THRESHOLD};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "VCONTENT_CONFIG";
/// Environment variable overriding the chunk size.
pub const CHUNK_SIZE_ENV: &str = "VCONTENT_CHUNK_SIZE";
/// Environment variable overriding the threshold.
pub const THRESHOLD_ENV: &str = "VCONTENT_THRESHOLD";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
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
}

/// TOML configuration file structure.
///
/// All fields are optional; missing ones fall back to defaults.
/// Corresponds to `~/.config/vcontent/config.toml`:
///
/// ```toml
/// chunk_size = 4096
/// threshold = 3
/// append = false
/// content_type = "text"
/// scroll_throttle_ms = 100
/// log_file_path = "/tmp/vcontent.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Maximum chunk length in characters.
    #[serde(default)]
    pub chunk_size: Option<usize>,

    /// Chunks kept on each side of the pointer.
    #[serde(default)]
    pub threshold: Option<usize>,

    /// Use the growing append window instead of the sliding replace window.
    #[serde(default)]
    pub append: Option<bool>,

    /// How loaded content is interpreted.
    #[serde(default)]
    pub content_type: Option<ContentType>,

    /// Scroll throttle interval in milliseconds.
    #[serde(default)]
    pub scroll_throttle_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Threshold radius.
    pub threshold: usize,
    /// Append mode.
    pub append: bool,
    /// Content interpretation.
    pub content_type: ContentType,
    /// Scroll throttle interval.
    pub scroll_throttle: Duration,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            threshold: DEFAULT_THRESHOLD,
            append: false,
            content_type: ContentType::Html,
            scroll_throttle: DEFAULT_SCROLL_THROTTLE,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Engine configuration for one instance.
    pub fn content_config(&self) -> ContentConfig {
        ContentConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_threshold(self.threshold)
            .with_mode(WindowMode::from_append(self.append))
            .with_content_type(self.content_type)
            .with_scroll_throttle(self.scroll_throttle)
    }
}

/// Overrides taken from command-line flags. `None` leaves the value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `--chunk-size`
    pub chunk_size: Option<usize>,
    /// `--threshold`
    pub threshold: Option<usize>,
    /// `--append`
    pub append: Option<bool>,
    /// `--text` / `--html`
    pub content_type: Option<ContentType>,
    /// `--throttle-ms`
    pub scroll_throttle_ms: Option<u64>,
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/vcontent/vcontent.log` on Linux, the platform state
/// directory elsewhere, or `vcontent.log` in the current directory as a fallback.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("vcontent").join("vcontent.log"),
        None => PathBuf::from("vcontent.log"),
    }
}

/// Resolve default config file path (`~/.config/vcontent/config.toml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vcontent").join("config.toml"))
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if the file doesn't exist.
///
/// # Errors
///
/// Returns error if the file exists but has read or parse errors.
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

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `VCONTENT_CONFIG` environment variable
/// 3. Default path
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

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        chunk_size: config.chunk_size.unwrap_or(defaults.chunk_size),
        threshold: config.threshold.unwrap_or(defaults.threshold),
        append: config.append.unwrap_or(defaults.append),
        content_type: config.content_type.unwrap_or(defaults.content_type),
        scroll_throttle: config
            .scroll_throttle_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.scroll_throttle),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply `VCONTENT_CHUNK_SIZE` and `VCONTENT_THRESHOLD`.
///
/// Values that do not parse as unsigned integers are ignored with a warning.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(chunk_size) = env_usize(CHUNK_SIZE_ENV) {
        config.chunk_size = chunk_size;
    }
    if let Some(threshold) = env_usize(THRESHOLD_ENV) {
        config.threshold = threshold;
    }
    config
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring non-numeric environment override");
            None
        }
    }
}

/// Apply CLI overrides. Highest precedence.
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: &CliOverrides) -> ResolvedConfig {
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if let Some(append) = cli.append {
        config.append = append;
    }
    if let Some(content_type) = cli.content_type {
        config.content_type = content_type;
    }
    if let Some(ms) = cli.scroll_throttle_ms {
        config.scroll_throttle = Duration::from_millis(ms);
    }
    config
}

/// Defaults → config file → environment → CLI.
///
/// # Errors
///
/// Propagates config file read/parse errors.
pub fn resolve(
    config_path: Option<PathBuf>,
    cli: &CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let config = apply_env_overrides(merge_config(file));
    Ok(apply_cli_overrides(config, cli))
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
