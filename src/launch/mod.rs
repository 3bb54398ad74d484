//! Handoff to the application process.
//!
//! On Unix the current process image is replaced with `execvp`, so the
//! application keeps the PID, the inherited environment and all open file
//! descriptors, and no parent remains to supervise it. Elsewhere the
//! application is spawned as a child and its exit code is propagated.

use std::process::Command;
use thiserror::Error;

/// Errors from building or performing the handoff.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no application command given")]
    EmptyCommand,

    #[error("failed to launch '{program}': {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    /// Exit status following the shell convention for failed execs.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::EmptyCommand => 2,
            LaunchError::Exec { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => 127,
                std::io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
        }
    }
}

/// The application command to hand control to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Added to (not replacing) the inherited environment
    pub env: Vec<(String, String)>,
}

impl LaunchSpec {
    /// Build a launch spec from an argv-style vector.
    pub fn from_argv(argv: Vec<String>) -> Result<Self, LaunchError> {
        let mut argv = argv.into_iter();
        let program = argv.next().ok_or(LaunchError::EmptyCommand)?;
        if program.is_empty() {
            return Err(LaunchError::EmptyCommand);
        }
        Ok(Self {
            program,
            args: argv.collect(),
            env: Vec::new(),
        })
    }

    /// Set `key` for the application unless it is already present.
    pub fn with_default_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if !self.env.iter().any(|(k, _)| *k == key) {
            self.env.push((key, value.into()));
        }
        self
    }

    /// Command line as a single string, for log output.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        command
    }
}

/// Replace the current process with the application.
///
/// Returns only if the handoff failed.
#[cfg(unix)]
pub fn handoff(spec: &LaunchSpec) -> LaunchError {
    use std::os::unix::process::CommandExt;

    tracing::info!(command = %spec.display(), "Handing off to application");
    let source = spec.to_command().exec();
    LaunchError::Exec {
        program: spec.program.clone(),
        source,
    }
}

/// Run the application as a child and exit with its status.
///
/// Returns only if the child could not be started.
#[cfg(not(unix))]
pub fn handoff(spec: &LaunchSpec) -> LaunchError {
    tracing::info!(command = %spec.display(), "Launching application");
    match spec.to_command().status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(1)),
        Err(source) => LaunchError::Exec {
            program: spec.program.clone(),
            source,
        },
    }
}
