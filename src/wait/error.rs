//! Error types for the reachability phase.

use std::time::Duration;
use thiserror::Error;

/// Why a single connection attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Attempt exceeded its connect timeout
    #[error("connect timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Host resolved but the connection was refused or reset
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Host name did not resolve (yet)
    #[error("DNS resolution failed: {0}")]
    DnsError(String),
}

/// The reachability phase ran out of time.
#[derive(Debug, Clone, Error)]
pub enum WaitError {
    #[error(
        "database at {address} unreachable after {}s ({attempts} attempts): {last_error}",
        .elapsed.as_secs()
    )]
    Unreachable {
        address: String,
        elapsed: Duration,
        attempts: u32,
        last_error: ProbeError,
    },
}
