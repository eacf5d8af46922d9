//! # Shelf Config - Configuration Management
//!
//! Handles configuration loading from files and environment variables.

use std::path::{Path, PathBuf};

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one collection directory per entity.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Backend selector ("flatfile" or "memory").
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Partition files per collection.
    #[serde(default = "default_partitions")]
    pub partitions: usize,

    /// The settings collection keeps a smaller partition set.
    #[serde(default = "default_settings_partitions")]
    pub settings_partitions: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from("config")
}

fn default_backend() -> String {
    "flatfile".to_string()
}

fn default_partitions() -> usize {
    5
}

fn default_settings_partitions() -> usize {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for access-token signing. Must be supplied via
    /// configuration or the SHELF__AUTH__TOKEN_SECRET environment variable.
    #[serde(default)]
    pub token_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            backend: default_backend(),
            partitions: default_partitions(),
            settings_partitions: default_settings_partitions(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { token_secret: String::new() }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Load configuration from file and environment
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let builder = ConfigBuilder::builder()
        .add_source(File::from(path.as_ref()).required(false))
        .add_source(Environment::with_prefix("SHELF").separator("__"))
        .build()?;

    builder.try_deserialize()
}

/// Load configuration with defaults
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
    load(path).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.root, PathBuf::from("config"));
        assert_eq!(config.storage.backend, "flatfile");
        assert_eq!(config.storage.partitions, 5);
        assert_eq!(config.storage.settings_partitions, 2);
        assert!(config.auth.token_secret.is_empty());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = load_or_default("does-not-exist.yaml");
        assert_eq!(config.storage.backend, "flatfile");
    }
}
