//! Top-level startup errors and their exit statuses.

use crate::config::ConfigError;
use crate::launch::LaunchError;
use crate::migrate::MigrateError;
use crate::wait::WaitError;
use thiserror::Error;

pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_DB_UNREACHABLE: i32 = 3;
pub const EXIT_MIGRATIONS_FAILED: i32 = 4;

/// Any failure that ends a startup run.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    DbUnreachable(#[from] WaitError),

    #[error(transparent)]
    MigrationsFailed(#[from] MigrateError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            StartupError::Config(_) => EXIT_CONFIG,
            StartupError::DbUnreachable(_) => EXIT_DB_UNREACHABLE,
            StartupError::MigrationsFailed(_) => EXIT_MIGRATIONS_FAILED,
            StartupError::Launch(e) => e.exit_code(),
            StartupError::Logging(_) => 1,
        }
    }
}
