//! CLI integration tests for catalog-meta.
//!
//! These tests cover argument parsing, help output, and exit codes for
//! configuration errors. None of them need a running database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the catalog-meta binary.
fn cmd() -> Command {
    Command::cargo_bin("catalog-meta").unwrap()
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("schemas"))
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("columns"))
        .stdout(predicate::str::contains("dump"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("catalog-meta"));
}

#[test]
fn test_global_flag_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: catalog.yaml]"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_dump_format_values() {
    cmd()
        .args(["dump", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("json"))
        .stdout(predicate::str::contains("yaml"));
}

#[test]
fn test_dump_rejects_unknown_format() {
    cmd()
        .args(["dump", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_columns_requires_schema_and_table() {
    cmd()
        .args(["columns", "public"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TABLE>"));
}

#[test]
fn test_tables_schema_flag() {
    cmd()
        .args(["tables", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--schema"));
}

#[test]
fn test_no_subcommand_shows_usage() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_1() {
    // A missing file is an IO error, not a configuration error.
    cmd()
        .args(["--config", "nonexistent_catalog.yaml", "health-check"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_invalid_yaml_exits_with_code_2() {
    let file = config_file("invalid: yaml: content: [\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_required_fields_exits_with_code_2() {
    let file = config_file("connection:\n  type: postgres\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "schemas"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("YAML error"));
}

#[test]
fn test_unknown_dialect_exits_with_code_2() {
    let file = config_file(
        "connection:\n  type: oracle\n  host: localhost\n  database: hr\n  user: scott\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "schemas"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown database type: 'oracle'"));
}

#[test]
fn test_zero_workers_exits_with_code_2() {
    let file = config_file(
        "connection:\n  host: localhost\n  database: hr\n  user: postgres\nintrospection:\n  workers: 0\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "dump"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("workers"));
}

#[test]
fn test_invalid_verbosity_exits_with_code_2() {
    let file = config_file("connection:\n  type: postgres\n");

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "--verbosity",
            "loud",
            "schemas",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid verbosity"));
}
