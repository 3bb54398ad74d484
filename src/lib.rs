//! entrygate - container startup gate
//!
//! Waits for a database port to accept connections, runs schema migrations
//! with bounded retries, then replaces the current process with the
//! application command.

pub mod cli;
pub mod config;
pub mod launch;
pub mod logging;
pub mod migrate;
pub mod startup;
pub mod wait;
