//! Error types for the migration phase.

use thiserror::Error;

/// Why a single migration invocation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationAttemptError {
    /// The command could not be started at all
    #[error("failed to spawn '{program}': {message}")]
    Spawn { program: String, message: String },

    /// The command ran and exited non-zero
    #[error("exited with status {0}")]
    ExitStatus(i32),

    /// The command was killed by a signal
    #[error("terminated by signal")]
    Terminated,
}

/// The migration phase used up its attempt budget.
#[derive(Debug, Clone, Error)]
pub enum MigrateError {
    #[error("migrations failed after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        last_error: MigrationAttemptError,
    },
}
