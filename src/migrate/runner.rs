//! Migration runners.
//!
//! The retrier only knows the [`MigrationRunner`] trait, so tests can count
//! invocations without spawning processes.

use super::error::MigrationAttemptError;
use super::MigrationConfig;
use async_trait::async_trait;
use tokio::process::Command;

/// One invocation of the migration tool.
///
/// Implementations must be safe to call repeatedly: the retrier re-invokes
/// after every failure and does no rollback of its own.
#[async_trait]
pub trait MigrationRunner: Send + Sync {
    async fn run(&self) -> Result<(), MigrationAttemptError>;

    /// Human-readable name for log lines.
    fn describe(&self) -> String;
}

/// Runs the migration tool as a child process with inherited stdio.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    command: Vec<String>,
    env: Vec<(String, String)>,
}

impl CommandRunner {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            env: Vec::new(),
        }
    }

    pub fn from_config(config: &MigrationConfig) -> Self {
        Self::new(config.command.clone())
    }

    /// Add a variable to the child's environment on top of the inherited one.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
impl MigrationRunner for CommandRunner {
    async fn run(&self) -> Result<(), MigrationAttemptError> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(MigrationAttemptError::Spawn {
                program: String::new(),
                message: "empty command".to_string(),
            });
        };

        let status = Command::new(program)
            .args(args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .await
            .map_err(|e| MigrationAttemptError::Spawn {
                program: program.clone(),
                message: e.to_string(),
            })?;

        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(MigrationAttemptError::ExitStatus(code)),
            None => Err(MigrationAttemptError::Terminated),
        }
    }

    fn describe(&self) -> String {
        self.command.join(" ")
    }
}
