//! Configuration file parsing for the server.
//!
//! Loads settings from TOML: bind address, API key, signing secret, field
//! length limits, rate limit, and the gate's exclusion list. The signing
//! secret and API key are provisioned out-of-band and never logged.

use memvault_domain::ValidationLimits;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Expected API key for the access gate
    pub api_key: String,

    /// HMAC signing secret for fact signatures
    pub secret_key: String,

    /// SQLite database path (":memory:" for ephemeral)
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Maximum content length in characters
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Maximum source_id length in characters
    #[serde(default = "default_max_source_id_length")]
    pub max_source_id_length: usize,

    /// Maximum recorded_by length in characters
    #[serde(default = "default_max_recorded_by_length")]
    pub max_recorded_by_length: usize,

    /// Per-key write budget per one-minute window
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    /// Paths that bypass the access gate entirely
    #[serde(default = "default_exclude_paths")]
    pub exclude_paths: Vec<String>,
}

fn default_database_path() -> String {
    "memvault.db".to_string()
}

fn default_max_content_length() -> usize {
    1000
}

fn default_max_source_id_length() -> usize {
    200
}

fn default_max_recorded_by_length() -> usize {
    100
}

fn default_rate_limit_per_minute() -> u32 {
    60
}

fn default_exclude_paths() -> Vec<String> {
    vec!["/health".to_string()]
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;

        if config.api_key.is_empty() {
            return Err(ConfigError::MissingField("api_key".to_string()));
        }
        if config.secret_key.is_empty() {
            return Err(ConfigError::MissingField("secret_key".to_string()));
        }

        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            api_key: "test-api-key-do-not-use-in-production".to_string(),
            secret_key: "test-secret-key-do-not-use-in-production".to_string(),
            database_path: ":memory:".to_string(),
            max_content_length: default_max_content_length(),
            max_source_id_length: default_max_source_id_length(),
            max_recorded_by_length: default_max_recorded_by_length(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            exclude_paths: default_exclude_paths(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Field length limits for the validation policy
    pub fn limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_content_length: self.max_content_length,
            max_source_id_length: self.max_source_id_length,
            max_recorded_by_length: self.max_recorded_by_length,
        }
    }
}
