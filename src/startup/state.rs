//! Startup state machine.

use std::fmt;

/// Where a startup run currently is.
///
/// The machine only moves forward:
/// `Start → WaitingForDb → RunningMigrations → ExecApp`, with `WaitingForDb`
/// skipped when the reachability phase is disabled. `DbUnreachable` and
/// `MigrationsFailed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartupState {
    #[default]
    Start,
    WaitingForDb,
    RunningMigrations,
    ExecApp,
    DbUnreachable,
    MigrationsFailed,
}

impl StartupState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: StartupState) -> bool {
        use StartupState::*;
        matches!(
            (self, next),
            (Start, WaitingForDb)
                | (Start, RunningMigrations)
                | (WaitingForDb, RunningMigrations)
                | (WaitingForDb, DbUnreachable)
                | (RunningMigrations, ExecApp)
                | (RunningMigrations, MigrationsFailed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StartupState::ExecApp | StartupState::DbUnreachable | StartupState::MigrationsFailed
        )
    }
}

impl fmt::Display for StartupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StartupState::Start => "START",
            StartupState::WaitingForDb => "WAITING_FOR_DB",
            StartupState::RunningMigrations => "RUNNING_MIGRATIONS",
            StartupState::ExecApp => "EXEC_APP",
            StartupState::DbUnreachable => "DB_UNREACHABLE",
            StartupState::MigrationsFailed => "MIGRATIONS_FAILED",
        };
        f.write_str(name)
    }
}
