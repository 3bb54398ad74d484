//! Shared test utilities for entrygate integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

/// Variables the gate reads; cleared so the host environment cannot leak in.
const GATE_VARS: &[&str] = &[
    "ENTRYGATE_CONFIG",
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "POSTGRES_DB",
    "DATABASE_URL",
    "ENVIRONMENT",
    "DB_WAIT_ENABLED",
    "DB_WAIT_TIMEOUT",
    "DB_CONNECT_TIMEOUT",
    "RETRY_DELAY",
    "MIGRATION_COMMAND",
    "MIGRATION_MAX_ATTEMPTS",
    "ENTRYGATE_LOG_LEVEL",
    "RUST_LOG",
];

/// The entrygate binary with a clean gate environment, JSON logs, running
/// in `workdir` so no stray `.env` is picked up.
pub fn gate(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("entrygate").unwrap();
    for var in GATE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("ENTRYGATE_LOG_FORMAT", "json");
    cmd.current_dir(workdir);
    cmd
}

/// Same environment as [`gate`], as a plain std command (for spawn/pid checks).
pub fn gate_std(workdir: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("entrygate"));
    for var in GATE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("ENTRYGATE_LOG_FORMAT", "json");
    cmd.current_dir(workdir);
    cmd
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// A bound listener standing in for the database. Connections queue in the
/// backlog, which is enough for a reachability check.
pub fn open_database() -> (std::net::TcpListener, u16) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Write an executable shell script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
pub fn occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
