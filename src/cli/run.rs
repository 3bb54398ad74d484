//! Run a full startup: resolve config, run the phases, hand off.

use crate::cli::Cli;
use crate::config::{env, ConfigError, StartupConfig};
use crate::launch::{self, LaunchSpec};
use crate::logging;
use crate::startup::{Startup, StartupError};
use std::convert::Infallible;
use std::path::PathBuf;

/// Resolve configuration: `.env`, optional TOML file, environment overrides.
pub fn load_config() -> Result<StartupConfig, ConfigError> {
    // Existing variables win over .env entries
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(ConfigError::DotEnv(e.to_string()));
        }
    }

    let path = std::env::var_os(env::CONFIG_PATH).map(PathBuf::from);
    let config = StartupConfig::load(path.as_deref())?.with_env_overrides()?;
    config.validate()?;

    Ok(config)
}

/// Main entry point. Only returns on failure; on success the process image
/// has been replaced by the application.
pub async fn run(cli: Cli) -> Result<Infallible, StartupError> {
    let spec = LaunchSpec::from_argv(cli.command)?;

    let config = load_config()?;
    logging::init_tracing(&config.logging).map_err(StartupError::Logging)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting entrygate");
    tracing::debug!(?config, "Loaded configuration");

    let mut startup = Startup::new(config);
    if let Err(e) = startup.run().await {
        tracing::error!(
            state = %startup.state(),
            exit_code = e.exit_code(),
            error = %e,
            "Startup failed"
        );
        return Err(e);
    }

    let spec = startup.prepare_launch(spec);
    let err = launch::handoff(&spec);
    tracing::error!(
        command = %spec.display(),
        exit_code = err.exit_code(),
        error = %err,
        "Application handoff failed"
    );
    Err(err.into())
}
