//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`INKMIND_*`)
//! 2. Config file (`~/.inkmind/config.toml`)
//! 3. Defaults
//!
//! The API key itself is never read from the file; only the name of the
//! environment variable holding it is configurable.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Environment variable consulted when the configured key variable is unset.
pub const FALLBACK_API_KEY_ENV: &str = "API_KEY";

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,

    /// Completion API configuration.
    pub api: ApiConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the inkmind home directory.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_inkmind_home(),
        }
    }
}

/// Completion API configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Generative Language API.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl ApiConfig {
    /// Read the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the configured variable nor `API_KEY` is set.
    pub fn api_key(&self) -> Result<String> {
        [self.api_key_env.as_str(), FALLBACK_API_KEY_ENV]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "no API key found; set {} or {FALLBACK_API_KEY_ENV}",
                    self.api_key_env
                ))
            })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. "warn" or "inkmind=debug".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Get the default inkmind home directory.
fn default_inkmind_home() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".inkmind"), |h| h.join(".inkmind"))
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    let config_path = get_config_path();
    if config_path.exists() {
        let contents = fs::read_to_string(&config_path).map_err(Error::Storage)?;
        config = parse_config(&contents)?;
    }

    apply_env_overrides(&mut config, |name| env::var(name).ok());

    Ok(config)
}

/// Parse a TOML config document.
///
/// # Errors
///
/// Returns an error if the document is not valid TOML for [`Config`].
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("INKMIND_CONFIG") {
        return PathBuf::from(path);
    }

    if let Ok(home) = env::var("INKMIND_HOME") {
        return PathBuf::from(home).join("config.toml");
    }

    default_inkmind_home().join("config.toml")
}

/// Apply environment variable overrides to config.
fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(path) = var("INKMIND_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    } else if let Some(home) = var("INKMIND_HOME") {
        config.storage.path = PathBuf::from(home);
    }

    if let Some(base_url) = var("INKMIND_API_BASE") {
        config.api.base_url = base_url;
    }

    if let Some(model) = var("INKMIND_MODEL") {
        config.api.model = model;
    }

    if let Some(val) = var("INKMIND_TIMEOUT_SECONDS") {
        if let Ok(secs) = val.parse() {
            config.api.timeout_seconds = secs;
        }
    }

    if let Some(level) = var("INKMIND_LOG") {
        config.logging.level = level;
    }
}
