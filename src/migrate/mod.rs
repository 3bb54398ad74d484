//! Migration phase: invoke the external migration tool until it succeeds.
//!
//! Retries are bounded by attempt count with a fixed delay between
//! attempts. Each invocation is independent; resuming a half-applied
//! migration is the tool's job.

mod config;
mod error;
mod runner;


pub use config::*;
pub use error::*;
pub use runner::{CommandRunner, MigrationRunner};

use std::time::Duration;

/// What a successful migration phase cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Invocations made, including the successful one
    pub attempts: u32,
}

/// Re-invokes a [`MigrationRunner`] until it succeeds or the budget is spent.
#[derive(Debug, Clone)]
pub struct MigrationRetrier {
    max_attempts: u32,
    retry_delay: Duration,
}

impl MigrationRetrier {
    pub fn new(config: &MigrationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: config.retry_delay(),
        }
    }

    /// Override the pause between failed attempts.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Run migrations, retrying failed invocations.
    ///
    /// The runner is invoked at most `max_attempts` times. A budget of zero
    /// is treated as one attempt.
    pub async fn run(
        &self,
        runner: &dyn MigrationRunner,
    ) -> Result<MigrationOutcome, MigrateError> {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            tracing::info!(
                command = %runner.describe(),
                attempt,
                max_attempts,
                "Running migrations"
            );

            match runner.run().await {
                Ok(()) => {
                    tracing::info!(attempts = attempt, "migrations applied");
                    return Ok(MigrationOutcome { attempts: attempt });
                }
                Err(error) if attempt >= max_attempts => {
                    return Err(MigrateError::Exhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %error,
                        retry_in_ms = self.retry_delay.as_millis() as u64,
                        "Migration attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }
    }
}
