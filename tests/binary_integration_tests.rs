//! Binary integration tests for sheetstore-server
//!
//! These tests run the actual binary as a subprocess to cover its entry point.

// Skipped during coverage builds, where the server loop is stubbed
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet
#![allow(clippy::zombie_processes)] // Processes are killed, wait() not needed

use assert_cmd::Command;
use predicates::prelude::*;
use std::process::{Child, Stdio};
use std::time::Duration;

fn server() -> Command {
    let mut cmd = Command::cargo_bin("sheetstore-server").unwrap();
    for var in [
        "SHEETSTORE_CONFIG",
        "SHEETSTORE_BACKEND",
        "SHEETSTORE_PROJECT_ID",
        "SHEETSTORE_API_KEY",
        "SHEETSTORE_HOST",
        "SHEETSTORE_PORT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_server_binary_help() {
    server()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SheetStore API Server"))
        .stdout(predicate::str::contains("/api/v1/import/submit"));
}

#[test]
fn test_server_binary_version() {
    server()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_server_requires_project_for_firestore() {
    server()
        .assert()
        .failure()
        .stderr(predicate::str::contains("project_id"));
}

#[test]
fn test_server_rejects_bad_host() {
    server()
        .args(["--backend", "memory", "--host", "not a host", "--port", "0"])
        .assert()
        .failure();
}

/// Free local port, released before the server binds it
fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn start_server(port: u16) -> Child {
    std::process::Command::new(env!("CARGO_BIN_EXE_sheetstore-server"))
        .args(["--backend", "memory", "--port", &port.to_string()])
        .env_remove("SHEETSTORE_CONFIG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to start sheetstore-server")
}

#[tokio::test]
async fn test_server_binary_serves_health() {
    let port = free_port();
    let mut child = start_server(port);
    let url = format!("http://127.0.0.1:{}/health", port);
    let client = reqwest::Client::new();

    let mut body = None;
    for _ in 0..50 {
        if let Ok(response) = client.get(&url).send().await {
            body = Some(response.text().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    child.kill().ok();

    let body = body.expect("server never answered /health");
    assert!(body.contains("healthy"));
}
