//! Configuration module for entrygate
//!
//! Configuration is resolved once at startup into a [`StartupConfig`] and then
//! passed explicitly to every phase. Nothing downstream reads the environment.
//!
//! # Configuration Precedence
//!
//! 1. Environment variables (highest priority, including values from `.env`)
//! 2. Configuration file (TOML, path from `ENTRYGATE_CONFIG`)
//! 3. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use entrygate::config::StartupConfig;
//!
//! let config = StartupConfig::default();
//! assert_eq!(config.database.host, "db");
//! assert_eq!(config.database.port, 5432);
//!
//! let toml = r#"
//! [wait]
//! timeout_seconds = 30
//! "#;
//! let config: StartupConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.wait.timeout_seconds, 30);
//! assert_eq!(config.wait.retry_delay_seconds, 3);
//! ```

pub mod database;
pub mod error;
pub mod logging;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

// Phase configs live next to the code that uses them
pub use crate::migrate::MigrationConfig;
pub use crate::wait::WaitConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Environment variable names understood by [`StartupConfig::with_env_overrides`].
pub mod env {
    pub const CONFIG_PATH: &str = "ENTRYGATE_CONFIG";
    pub const DB_HOST: &str = "POSTGRES_HOST";
    pub const DB_PORT: &str = "POSTGRES_PORT";
    pub const DB_USER: &str = "POSTGRES_USER";
    pub const DB_PASSWORD: &str = "POSTGRES_PASSWORD";
    pub const DB_NAME: &str = "POSTGRES_DB";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    pub const WAIT_ENABLED: &str = "DB_WAIT_ENABLED";
    pub const WAIT_TIMEOUT: &str = "DB_WAIT_TIMEOUT";
    pub const CONNECT_TIMEOUT: &str = "DB_CONNECT_TIMEOUT";
    pub const RETRY_DELAY: &str = "RETRY_DELAY";
    pub const MIGRATION_COMMAND: &str = "MIGRATION_COMMAND";
    pub const MIGRATION_MAX_ATTEMPTS: &str = "MIGRATION_MAX_ATTEMPTS";
    pub const LOG_LEVEL: &str = "ENTRYGATE_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "ENTRYGATE_LOG_FORMAT";
}

/// Unified configuration for one startup run.
///
/// # Example
///
/// ```rust
/// use entrygate::config::StartupConfig;
///
/// let config = StartupConfig::default();
/// assert!(config.wait.enabled);
/// assert_eq!(config.migration.max_attempts, 5);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StartupConfig {
    /// Database target
    pub database: DatabaseConfig,
    /// Reachability phase
    pub wait: WaitConfig,
    /// Migration phase
    pub migration: MigrationConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl StartupConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Values that fail to parse are rejected, never replaced by defaults.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Database target
        if let Some(host) = lookup(env::DB_HOST) {
            self.database.host = host;
        }
        if let Some(port) = lookup(env::DB_PORT) {
            self.database.port = parse_var(env::DB_PORT, &port)?;
        }
        if let Some(user) = lookup(env::DB_USER) {
            self.database.user = user;
        }
        if let Some(password) = lookup(env::DB_PASSWORD) {
            self.database.password = password;
        }
        if let Some(name) = lookup(env::DB_NAME) {
            self.database.name = name;
        }
        if let Some(url) = lookup(env::DATABASE_URL) {
            self.database.url = Some(url);
        }
        // Running the app on the host against a published port
        if lookup(env::ENVIRONMENT)
            .map(|e| e.eq_ignore_ascii_case("development"))
            .unwrap_or(false)
        {
            self.database.host = "localhost".to_string();
        }

        // Wait phase
        if let Some(enabled) = lookup(env::WAIT_ENABLED) {
            self.wait.enabled = parse_bool(env::WAIT_ENABLED, &enabled)?;
        }
        if let Some(timeout) = lookup(env::WAIT_TIMEOUT) {
            self.wait.timeout_seconds = parse_var(env::WAIT_TIMEOUT, &timeout)?;
        }
        if let Some(timeout) = lookup(env::CONNECT_TIMEOUT) {
            self.wait.connect_timeout_seconds = parse_var(env::CONNECT_TIMEOUT, &timeout)?;
        }

        // Shared by both phases
        if let Some(delay) = lookup(env::RETRY_DELAY) {
            let delay: u64 = parse_var(env::RETRY_DELAY, &delay)?;
            self.wait.retry_delay_seconds = delay;
            self.migration.retry_delay_seconds = delay;
        }

        // Migration phase
        if let Some(command) = lookup(env::MIGRATION_COMMAND) {
            self.migration.command = command.split_whitespace().map(String::from).collect();
        }
        if let Some(attempts) = lookup(env::MIGRATION_MAX_ATTEMPTS) {
            self.migration.max_attempts = parse_var(env::MIGRATION_MAX_ATTEMPTS, &attempts)?;
        }

        // Logging settings
        if let Some(level) = lookup(env::LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = lookup(env::LOG_FORMAT) {
            self.logging.format = LogFormat::from_str(&format).map_err(|message| {
                ConfigError::InvalidEnv {
                    var: env::LOG_FORMAT.to_string(),
                    value: format.clone(),
                    message,
                }
            })?;
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.host.trim().is_empty() {
            return Err(ConfigError::validation(
                "database.host",
                "host cannot be empty",
            ));
        }
        if self.database.port == 0 {
            return Err(ConfigError::validation(
                "database.port",
                "port must be non-zero",
            ));
        }
        if self.wait.enabled && self.wait.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "wait.timeout_seconds",
                "timeout must be non-zero when waiting is enabled",
            ));
        }
        if self.migration.max_attempts == 0 {
            return Err(ConfigError::validation(
                "migration.max_attempts",
                "at least one attempt is required",
            ));
        }
        if self.migration.command.is_empty() || self.migration.command[0].is_empty() {
            return Err(ConfigError::validation(
                "migration.command",
                "command cannot be empty",
            ));
        }
        if let Err(message) = crate::logging::parse_filter(&self.logging.level) {
            return Err(ConfigError::validation("logging.level", &message));
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnv {
            var: var.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}

fn parse_bool(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            var: var.to_string(),
            value: value.to_string(),
            message: "expected true or false".to_string(),
        }),
    }
}
