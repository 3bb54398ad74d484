//! Startup orchestration: wait for the database, migrate, then hand off.

mod error;
mod state;

pub use error::*;
pub use state::StartupState;

use crate::config::{env, StartupConfig};
use crate::launch::LaunchSpec;
use crate::migrate::{CommandRunner, MigrationRetrier, MigrationRunner};
use crate::wait::ReachabilityWaiter;

/// Runs the startup phases in order and tracks the state machine.
pub struct Startup {
    config: StartupConfig,
    waiter: ReachabilityWaiter,
    retrier: MigrationRetrier,
    runner: Box<dyn MigrationRunner>,
    state: StartupState,
}

impl Startup {
    /// Build the phases from configuration.
    ///
    /// The migration command gets `DATABASE_URL` derived from the database
    /// target unless the configuration already carries a preset URL.
    pub fn new(config: StartupConfig) -> Self {
        let waiter = ReachabilityWaiter::new(config.database.address(), &config.wait);
        let retrier = MigrationRetrier::new(&config.migration);
        let runner = CommandRunner::from_config(&config.migration)
            .with_env(env::DATABASE_URL, config.database.database_url());

        Self {
            config,
            waiter,
            retrier,
            runner: Box::new(runner),
            state: StartupState::Start,
        }
    }

    /// Replace the migration runner (for testing).
    pub fn with_runner(mut self, runner: Box<dyn MigrationRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Replace the reachability waiter (for sub-second timings in tests).
    pub fn with_waiter(mut self, waiter: ReachabilityWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    /// Replace the migration retrier.
    pub fn with_retrier(mut self, retrier: MigrationRetrier) -> Self {
        self.retrier = retrier;
        self
    }

    pub fn state(&self) -> StartupState {
        self.state
    }

    /// Run the wait phase (if enabled) and the migration phase.
    ///
    /// On `Ok` the state is `ExecApp` and the caller should hand off. Any
    /// error leaves the machine in a terminal failure state; there is no
    /// way to resume a run.
    pub async fn run(&mut self) -> Result<(), StartupError> {
        if self.state != StartupState::Start {
            tracing::warn!(state = %self.state, "Startup already ran");
        }

        tracing::debug!(
            database_url = %self.config.database.redacted_url(),
            "Resolved database target"
        );

        if self.config.wait.enabled {
            self.advance(StartupState::WaitingForDb);
            if let Err(e) = self.waiter.wait().await {
                self.advance(StartupState::DbUnreachable);
                return Err(e.into());
            }
        } else {
            tracing::info!("Database wait disabled, skipping reachability check");
        }

        self.advance(StartupState::RunningMigrations);
        if let Err(e) = self.retrier.run(self.runner.as_ref()).await {
            self.advance(StartupState::MigrationsFailed);
            return Err(e.into());
        }

        self.advance(StartupState::ExecApp);
        Ok(())
    }

    /// Attach the derived `DATABASE_URL` to the application command.
    pub fn prepare_launch(&self, spec: LaunchSpec) -> LaunchSpec {
        spec.with_default_env(env::DATABASE_URL, self.config.database.database_url())
    }

    fn advance(&mut self, next: StartupState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal startup transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(
            from = %self.state,
            to = %next,
            terminal = next.is_terminal(),
            "Startup state changed"
        );
        self.state = next;
    }
}
