//! CLI Integration Tests
//!
//! Tests the CLI binary directly using assert_cmd to exercise main.rs code paths.
//! Store-backed commands run against the in-memory backend.

// Skipped during coverage builds, where the server loop is stubbed
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use tempfile::TempDir;

/// Command with no SHEETSTORE_* settings leaking in from the environment
fn sheetstore() -> Command {
    let mut cmd = Command::cargo_bin("sheetstore").unwrap();
    for var in [
        "SHEETSTORE_CONFIG",
        "SHEETSTORE_BACKEND",
        "SHEETSTORE_PROJECT_ID",
        "SHEETSTORE_API_KEY",
        "SHEETSTORE_HOST",
        "SHEETSTORE_PORT",
        "SHEETSTORE_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_scenario(dir: &TempDir) -> PathBuf {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in [["Name", "Age"], ["Ann", "30"], ["Bo", "41"]].iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    let path = dir.path().join("users.xlsx");
    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    sheetstore()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sheetstore"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    sheetstore()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_import_help() {
    sheetstore()
        .args(["import", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_missing_subcommand_fails() {
    sheetstore().assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// PREVIEW
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_preview_prints_numbered_rows() {
    let dir = TempDir::new().unwrap();
    let file = write_scenario(&dir);

    sheetstore()
        .arg("preview")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("#  Name  Age"))
        .stdout(predicate::str::contains("1  Ann   30"))
        .stdout(predicate::str::contains("2  Bo    41"))
        .stdout(predicate::str::contains("2 columns, 2 rows"));
}

#[test]
fn test_preview_needs_no_store_config() {
    // Firestore default without a project id is fine for preview
    let dir = TempDir::new().unwrap();
    let file = write_scenario(&dir);

    sheetstore().arg("preview").arg(&file).assert().success();
}

#[test]
fn test_preview_rejects_non_spreadsheet() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("users.csv");
    std::fs::write(&file, "name,age\nAnn,30\n").unwrap();

    sheetstore().arg("preview").arg(&file).assert().failure();
}

#[test]
fn test_preview_missing_file() {
    sheetstore()
        .args(["preview", "/nonexistent/users.xlsx"])
        .assert()
        .failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE COMMANDS (memory backend)
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_import_with_yes_writes_records() {
    let dir = TempDir::new().unwrap();
    let file = write_scenario(&dir);

    sheetstore()
        .args(["--backend", "memory", "import"])
        .arg(&file)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 records"))
        .stdout(predicate::str::contains("1  Ann   30"));
}

#[test]
fn test_import_declined_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let file = write_scenario(&dir);

    sheetstore()
        .args(["--backend", "memory", "import"])
        .arg(&file)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Send 2 rows?"))
        .stdout(predicate::str::contains("nothing was written"));
}

#[test]
fn test_list_empty_store() {
    sheetstore()
        .args(["--backend", "memory", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found."));
}

#[test]
fn test_export_writes_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.xlsx");

    sheetstore()
        .args(["--backend", "memory", "export", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export Complete"))
        .stdout(predicate::str::contains("Records: 0"));

    assert!(output.exists());
}

#[test]
fn test_import_bad_file_fails() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("broken.xlsx");
    std::fs::write(&file, b"not really a workbook").unwrap();

    sheetstore()
        .args(["--backend", "memory", "import"])
        .arg(&file)
        .arg("--yes")
        .assert()
        .failure();
}

#[test]
fn test_firestore_without_project_fails() {
    sheetstore()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("project_id"));
}

#[test]
fn test_config_file_selects_backend() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("sheetstore.yaml");
    std::fs::write(&config, "store:\n  backend: memory\n").unwrap();

    sheetstore()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found."));
}

#[test]
fn test_invalid_backend_rejected() {
    sheetstore()
        .args(["--backend", "postgres", "list"])
        .assert()
        .failure();
}
