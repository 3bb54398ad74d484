//! Reachability phase: poll the database port until it accepts connections.
//!
//! The waiter is a bounded polling loop. It is bounded by wall-clock time,
//! not by attempt count, and it does nothing further once the target
//! answers or the budget runs out.

mod config;
mod error;


pub use config::*;
pub use error::*;

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;

/// Lower bound for a single connect attempt and for the pause between attempts.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What a successful wait cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOutcome {
    /// Connection attempts made, including the successful one
    pub attempts: u32,
    /// Time from the first attempt until the port answered
    pub elapsed: Duration,
}

/// Polls a TCP endpoint until it accepts a connection or the budget elapses.
#[derive(Debug, Clone)]
pub struct ReachabilityWaiter {
    address: String,
    timeout: Duration,
    retry_delay: Duration,
    connect_timeout: Duration,
}

impl ReachabilityWaiter {
    /// Create a waiter for `address` (`host:port`) using the configured timings.
    pub fn new(address: impl Into<String>, config: &WaitConfig) -> Self {
        Self {
            address: address.into(),
            timeout: config.timeout(),
            retry_delay: config.retry_delay(),
            connect_timeout: config.connect_timeout(),
        }
    }

    /// Override the overall budget (sub-second values are allowed).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the pause between failed attempts.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Override the per-attempt connect ceiling.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Poll until the endpoint accepts a connection.
    ///
    /// Total time spent is bounded by the timeout plus one retry delay (and
    /// at most one [`MIN_POLL_INTERVAL`] of connect slack).
    pub async fn wait(&self) -> Result<WaitOutcome, WaitError> {
        let start = Instant::now();
        // A budget too large to represent as an instant never expires
        let deadline = start.checked_add(self.timeout);
        let remaining = || match deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        };
        let mut attempts = 0u32;

        tracing::info!(
            address = %self.address,
            timeout_ms = self.timeout.as_millis() as u64,
            "Waiting for database"
        );

        loop {
            attempts += 1;
            let attempt_timeout = self.connect_timeout.min(remaining()).max(MIN_POLL_INTERVAL);

            match self.probe(attempt_timeout).await {
                Ok(()) => {
                    let elapsed = start.elapsed();
                    tracing::info!(
                        address = %self.address,
                        attempts,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "database reachable"
                    );
                    return Ok(WaitOutcome { attempts, elapsed });
                }
                Err(error) => {
                    let remaining = remaining();
                    if remaining.is_zero() {
                        return Err(WaitError::Unreachable {
                            address: self.address.clone(),
                            elapsed: start.elapsed(),
                            attempts,
                            last_error: error,
                        });
                    }

                    let pause = self.retry_delay.min(remaining).max(MIN_POLL_INTERVAL);
                    tracing::warn!(
                        address = %self.address,
                        attempt = attempts,
                        error = %error,
                        retry_in_ms = pause.as_millis() as u64,
                        "Database not accepting connections yet, retrying"
                    );
                    tokio::time::sleep(pause).await;
                }
            }
        }
    }

    /// One connection attempt. The stream is closed as soon as it opens.
    async fn probe(&self, attempt_timeout: Duration) -> Result<(), ProbeError> {
        let attempt = async {
            let addrs: Vec<SocketAddr> = tokio::net::lookup_host(self.address.as_str())
                .await
                .map_err(|e| ProbeError::DnsError(e.to_string()))?
                .collect();
            if addrs.is_empty() {
                return Err(ProbeError::DnsError(format!(
                    "no addresses for {}",
                    self.address
                )));
            }

            let stream = TcpStream::connect(&addrs[..])
                .await
                .map_err(|e| ProbeError::ConnectionFailed(e.to_string()))?;
            drop(stream);
            Ok(())
        };

        match tokio::time::timeout(attempt_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(attempt_timeout)),
        }
    }
}
