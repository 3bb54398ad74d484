//! Configuration for the reachability phase.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for waiting on the database port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Whether the reachability phase runs at all
    pub enabled: bool,
    /// Wall-clock budget for the whole phase
    pub timeout_seconds: u64,
    /// Sleep between failed connection attempts
    pub retry_delay_seconds: u64,
    /// Ceiling for a single connection attempt
    pub connect_timeout_seconds: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_seconds: 15,
            retry_delay_seconds: 3,
            connect_timeout_seconds: 3,
        }
    }
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}
