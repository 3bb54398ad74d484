//! CLI module for entrygate
//!
//! The only argument is the application command to hand off to. All other
//! settings come from the environment (see [`crate::config`]).
//!
//! # Example
//!
//! ```bash
//! # Docker ENTRYPOINT ["entrygate"], CMD ["uvicorn", "app.main:app", "--host", "0.0.0.0"]
//! POSTGRES_HOST=db entrygate uvicorn app.main:app --host 0.0.0.0
//!
//! # Skip the reachability check, custom migration tool
//! DB_WAIT_ENABLED=false MIGRATION_COMMAND="sqlx migrate run" entrygate ./server
//! ```

pub mod run;

pub use run::{load_config, run};

use clap::Parser;

/// entrygate - wait for the database, migrate, then exec the application
#[derive(Parser, Debug)]
#[command(
    name = "entrygate",
    version,
    about = "Wait for the database, run migrations with retries, then exec the application"
)]
pub struct Cli {
    /// Application command (and its arguments) to exec once startup succeeds
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}
