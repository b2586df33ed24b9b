//! Configuration module for treestore.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, StoreError};

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Pool size. One connection serializes every storage operation.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
    /// Default deadline for a single storage operation in milliseconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_ms: u64,
}

fn default_db_path() -> String {
    "data/treestore.db".to_string()
}

fn default_max_connections() -> u32 {
    1
}

fn default_busy_timeout() -> u64 {
    5000
}

fn default_operation_timeout() -> u64 {
    10_000
}

impl DatabaseConfig {
    /// Operation deadline as a `Duration`.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_ms: default_busy_timeout(),
            operation_timeout_ms: default_operation_timeout(),
        }
    }
}

/// Blob storage limits.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Maximum size of a single file in megabytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u64,
    /// Name given to a user's root folder when it is provisioned.
    #[serde(default = "default_root_folder_name")]
    pub root_folder_name: String,
}

fn default_max_file_size() -> u64 {
    64
}

fn default_root_folder_name() -> String {
    "root".to_string()
}

impl StorageConfig {
    /// Maximum file size in bytes, or `None` if the configured value overflows.
    pub fn checked_max_file_size_bytes(&self) -> Option<u64> {
        self.max_file_size_mb.checked_mul(1024 * 1024)
    }

    /// Maximum file size in bytes, saturating at `u64::MAX`.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.checked_max_file_size_bytes().unwrap_or(u64::MAX)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size(),
            root_folder_name: default_root_folder_name(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/treestore.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults with environment overrides.
    ///
    /// Only a missing file falls back; a file that fails to parse or validate
    /// is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StoreError::Config(format!("config parse error: {e}")))
    }

    /// Apply overrides from environment variables.
    ///
    /// - `TREESTORE_DB_PATH` replaces `database.path`
    /// - `TREESTORE_LOG_LEVEL` replaces `logging.level`
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TREESTORE_DB_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(level) = std::env::var("TREESTORE_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(StoreError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.operation_timeout_ms == 0 {
            return Err(StoreError::Config(
                "database.operation_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.storage.max_file_size_mb == 0 {
            return Err(StoreError::Config(
                "storage.max_file_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.storage.checked_max_file_size_bytes().is_none() {
            return Err(StoreError::Config(format!(
                "storage.max_file_size_mb is too large: {}",
                self.storage.max_file_size_mb
            )));
        }
        crate::file::validate_name(&self.storage.root_folder_name)
            .map_err(|e| StoreError::Config(format!("storage.root_folder_name: {e}")))?;
        Ok(())
    }
}
