//! Application configuration.
//!
//! Loaded from `config.toml` in the platform config directory. Every field
//! has a default, so a missing or partial file is valid. The curator
//! credential is never stored in the file; the file only names the
//! environment variable it is read from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::curator::{ApiKey, RetryPolicy};

/// Which generative backend the curator talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Gemini REST API, called directly
    #[default]
    Gemini,
    /// Task relay that holds the model credential itself
    Relay,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Gemini => write!(f, "gemini"),
            BackendKind::Relay => write!(f, "relay"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Curator gateway settings
    pub curator: CuratorSettings,
    /// Search and ranking settings
    pub discovery: DiscoverySettings,
}

/// Curator-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorSettings {
    /// Backend selection
    pub backend: BackendKind,
    /// Model id for the Gemini backend
    pub model: String,
    /// Gemini API root
    pub endpoint: String,
    /// Relay URL for the relay backend
    pub relay_url: Option<String>,
    /// Environment variable holding the credential
    pub api_key_env: String,
    /// Per-attempt timeout in seconds
    pub request_timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// First backoff delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Backoff cap in milliseconds
    pub max_backoff_ms: u64,
}

impl Default for CuratorSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gemini,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            relay_url: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            request_timeout_secs: 8,
            max_retries: 2,
            initial_backoff_ms: 1000,
            max_backoff_ms: 8000,
        }
    }
}

impl CuratorSettings {
    /// Retry policy described by these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            attempt_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Read the credential from the configured environment variable.
    pub fn api_key_from_env(&self) -> Option<ApiKey> {
        std::env::var(&self.api_key_env).ok().and_then(ApiKey::new)
    }
}

/// Search and ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Search radius R in kilometers, applied to every source
    pub search_radius_km: f64,
    /// Two candidates closer than this are the same place
    pub duplicate_threshold_km: f64,
    /// The name rule only merges candidates closer than this; `None` lifts the limit
    pub name_match_max_km: Option<f64>,
    /// Result cap, applied after filtering, dedup and sorting
    pub max_results: usize,
    /// Catalog entries shown before the first search
    pub spotlight_count: usize,
    /// Replacement catalog dataset
    pub catalog_path: Option<PathBuf>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            search_radius_km: 50.0,
            duplicate_threshold_km: 0.2,
            name_match_max_km: Some(1.0),
            max_results: 16,
            spotlight_count: 8,
            catalog_path: None,
        }
    }
}

impl AppConfig {
    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.discovery;
        if !d.search_radius_km.is_finite() || d.search_radius_km <= 0.0 {
            return Err(ConfigError::Invalid(
                "discovery.search_radius_km must be a positive number".to_string(),
            ));
        }
        if !d.duplicate_threshold_km.is_finite() || d.duplicate_threshold_km < 0.0 {
            return Err(ConfigError::Invalid(
                "discovery.duplicate_threshold_km must be zero or positive".to_string(),
            ));
        }
        if let Some(limit) = d.name_match_max_km {
            if !limit.is_finite() || limit < 0.0 {
                return Err(ConfigError::Invalid(
                    "discovery.name_match_max_km must be zero or positive".to_string(),
                ));
            }
        }
        if d.max_results == 0 {
            return Err(ConfigError::Invalid(
                "discovery.max_results must be at least 1".to_string(),
            ));
        }
        if self.curator.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "curator.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.curator.api_key_env.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "curator.api_key_env must name an environment variable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Get the application config directory.
pub fn get_config_dir() -> PathBuf {
    directories::ProjectDirs::from("nl", "sculptuur", "SculptuurRadar")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load application configuration from `path`; a missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.validate()?;

    Ok(config)
}

/// Save application configuration to `path`.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
