//! End-to-end startup scenarios against the real binary.
//!
//! The "database" is a bound local listener; migrations and the application
//! are small shell commands.

#![cfg(unix)]

mod common;

use common::{closed_port, gate, gate_std, occurrences, open_database, write_script};
use predicates::prelude::*;
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[test]
fn test_reachable_database_hands_off_to_application() {
    let dir = TempDir::new().unwrap();
    let (_db, port) = open_database();

    let output = gate(dir.path())
        .env("POSTGRES_HOST", "127.0.0.1")
        .env("POSTGRES_PORT", port.to_string())
        .env("MIGRATION_COMMAND", "true")
        .args(["sh", "-c", "echo launched"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(stdout.trim(), "launched");
    assert_eq!(occurrences(&stderr, "database reachable"), 1, "{}", stderr);
    assert_eq!(occurrences(&stderr, "migrations applied"), 1, "{}", stderr);
    assert_eq!(occurrences(&stderr, "unreachable"), 0, "{}", stderr);
    let address = format!("\"address\":\"127.0.0.1:{}\"", port);
    assert!(occurrences(&stderr, &address) >= 1, "{}", stderr);
}

#[test]
fn test_handoff_replaces_process() {
    let dir = TempDir::new().unwrap();
    let (_db, port) = open_database();

    let child = gate_std(dir.path())
        .env("POSTGRES_HOST", "127.0.0.1")
        .env("POSTGRES_PORT", port.to_string())
        .env("MIGRATION_COMMAND", "true")
        .args(["sh", "-c", "echo $$"])
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .spawn()
        .unwrap();
    let pid = child.id();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let reported: u32 = String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse()
        .unwrap();
    assert_eq!(reported, pid, "application should run under the gate's PID");
}

#[test]
fn test_application_exit_status_is_the_process_exit_status() {
    let dir = TempDir::new().unwrap();

    gate(dir.path())
        .env("DB_WAIT_ENABLED", "false")
        .env("MIGRATION_COMMAND", "true")
        .args(["sh", "-c", "exit 42"])
        .assert()
        .code(42);
}

#[test]
fn test_application_receives_database_url() {
    let dir = TempDir::new().unwrap();

    gate(dir.path())
        .env("DB_WAIT_ENABLED", "false")
        .env("MIGRATION_COMMAND", "true")
        .env("POSTGRES_HOST", "pg")
        .env("POSTGRES_USER", "app")
        .env("POSTGRES_PASSWORD", "secret")
        .env("POSTGRES_DB", "appdb")
        .args(["sh", "-c", "echo $DATABASE_URL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgresql://app:secret@pg:5432/appdb"))
        .stderr(predicate::str::contains("secret").not());
}

#[test]
fn test_existing_database_url_is_not_overwritten() {
    let dir = TempDir::new().unwrap();

    gate(dir.path())
        .env("DB_WAIT_ENABLED", "false")
        .env("MIGRATION_COMMAND", "true")
        .env("DATABASE_URL", "postgresql://keep:me@here:1/db")
        .args(["sh", "-c", "echo $DATABASE_URL"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgresql://keep:me@here:1/db"));
}

#[test]
fn test_unreachable_database_never_launches_application() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("launched");

    let started = Instant::now();
    gate(dir.path())
        .env("POSTGRES_HOST", "127.0.0.1")
        .env("POSTGRES_PORT", closed_port().to_string())
        .env("DB_WAIT_TIMEOUT", "2")
        .env("RETRY_DELAY", "1")
        .env("DB_CONNECT_TIMEOUT", "1")
        .env("MIGRATION_COMMAND", "true")
        .args(["touch", marker.to_str().unwrap()])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("unreachable"));
    let spent = started.elapsed();

    assert!(!marker.exists(), "application must not be launched");
    assert!(spent >= Duration::from_secs(2), "gave up early: {:?}", spent);
    assert!(spent < Duration::from_secs(5), "overran budget: {:?}", spent);
}

#[test]
fn test_maximum_wait_timeout_is_accepted() {
    let dir = TempDir::new().unwrap();
    let (_db, port) = open_database();

    gate(dir.path())
        .env("POSTGRES_HOST", "127.0.0.1")
        .env("POSTGRES_PORT", port.to_string())
        .env("DB_WAIT_TIMEOUT", u64::MAX.to_string())
        .env("DB_CONNECT_TIMEOUT", u64::MAX.to_string())
        .env("MIGRATION_COMMAND", "true")
        .args(["sh", "-c", "echo launched"])
        .assert()
        .success()
        .stdout(predicate::str::contains("launched"))
        .stderr(predicate::str::contains("database reachable"));
}

#[test]
fn test_failing_migrations_exhaust_attempt_budget() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("launched");
    let calls = dir.path().join("calls");
    let migrate = write_script(
        dir.path(),
        "migrate.sh",
        &format!("echo x >> {}\nexit 1", calls.display()),
    );

    gate(dir.path())
        .env("DB_WAIT_ENABLED", "false")
        .env("MIGRATION_COMMAND", migrate.to_str().unwrap())
        .env("MIGRATION_MAX_ATTEMPTS", "3")
        .env("RETRY_DELAY", "0")
        .args(["touch", marker.to_str().unwrap()])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("migrations failed after 3 attempts"));

    assert!(!marker.exists());
    let invocations = std::fs::read_to_string(&calls).unwrap().lines().count();
    assert_eq!(invocations, 3);
}

#[test]
fn test_flaky_migration_succeeds_on_retry() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls");
    let migrate = write_script(
        dir.path(),
        "migrate.sh",
        &format!(
            "echo x >> {path}\ntest $(wc -l < {path}) -ge 2",
            path = calls.display()
        ),
    );

    gate(dir.path())
        .env("DB_WAIT_ENABLED", "false")
        .env("MIGRATION_COMMAND", migrate.to_str().unwrap())
        .env("MIGRATION_MAX_ATTEMPTS", "5")
        .env("RETRY_DELAY", "0")
        .args(["true"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Migration attempt failed, retrying"));

    let invocations = std::fs::read_to_string(&calls).unwrap().lines().count();
    assert_eq!(invocations, 2);
}

#[test]
fn test_second_run_against_migrated_database_succeeds() {
    let dir = TempDir::new().unwrap();
    let (_db, port) = open_database();
    let schema = dir.path().join("schema");
    // Idempotent: applies once, no-op afterwards
    let migrate = write_script(
        dir.path(),
        "migrate.sh",
        &format!("[ -f {path} ] || echo v1 > {path}", path = schema.display()),
    );

    for _ in 0..2 {
        gate(dir.path())
            .env("POSTGRES_HOST", "127.0.0.1")
            .env("POSTGRES_PORT", port.to_string())
            .env("MIGRATION_COMMAND", migrate.to_str().unwrap())
            .args(["true"])
            .assert()
            .success();
    }

    assert_eq!(std::fs::read_to_string(&schema).unwrap().trim(), "v1");
}

#[test]
fn test_missing_application_exits_127() {
    let dir = TempDir::new().unwrap();

    gate(dir.path())
        .env("DB_WAIT_ENABLED", "false")
        .env("MIGRATION_COMMAND", "true")
        .args(["entrygate-no-such-application"])
        .assert()
        .failure()
        .code(127)
        .stderr(predicate::str::contains("entrygate-no-such-application"));
}

#[test]
fn test_dotenv_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "DB_WAIT_ENABLED=false\nMIGRATION_COMMAND=true\n",
    )
    .unwrap();

    gate(dir.path())
        .args(["sh", "-c", "echo from-dotenv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-dotenv"))
        .stderr(predicate::str::contains("Database wait disabled"));
}

#[test]
fn test_environment_beats_dotenv() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".env"),
        "DB_WAIT_ENABLED=false\nMIGRATION_COMMAND=false\n",
    )
    .unwrap();

    gate(dir.path())
        .env("MIGRATION_COMMAND", "true")
        .args(["true"])
        .assert()
        .success();
}

#[test]
fn test_config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("entrygate.toml");
    std::fs::write(
        &config,
        r#"
[wait]
enabled = false

[migration]
command = ["sh", "-c", "exit 0"]
max_attempts = 1
"#,
    )
    .unwrap();

    gate(dir.path())
        .env("ENTRYGATE_CONFIG", &config)
        .args(["sh", "-c", "echo configured"])
        .assert()
        .success()
        .stdout(predicate::str::contains("configured"));
}
