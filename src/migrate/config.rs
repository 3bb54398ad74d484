//! Configuration for the migration phase.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for running the external migration tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Program followed by its arguments
    pub command: Vec<String>,
    /// Invocations allowed before giving up
    pub max_attempts: u32,
    /// Sleep between failed invocations
    pub retry_delay_seconds: u64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "alembic".to_string(),
                "upgrade".to_string(),
                "head".to_string(),
            ],
            max_attempts: 5,
            retry_delay_seconds: 3,
        }
    }
}

impl MigrationConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}
