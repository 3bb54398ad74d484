//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Invalid environment variable {var}={value:?}: {message}")]
    InvalidEnv {
        var: String,
        value: String,
        message: String,
    },

    #[error("Failed to load .env file: {0}")]
    DotEnv(String),
}

impl ConfigError {
    pub(crate) fn validation(field: &str, message: &str) -> Self {
        ConfigError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
