//! Binary integration tests for the fuelplan CLI
//!
//! These run the compiled binary as a subprocess against temp directories.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_plan(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Topolobampo").unwrap();
    sheet.write_string(1, 0, "DESTINO").unwrap();
    sheet.write_string(1, 1, "PREMIUM").unwrap();
    sheet.write_string(2, 0, "Los Mochis").unwrap();
    sheet.write_number(2, 1, 1234.0).unwrap();
    sheet.write_string(3, 0, "Culiacan").unwrap();
    sheet.write_number(3, 1, 4000.0).unwrap();
    workbook.save(path).unwrap();
}

fn fuelplan() -> Command {
    let mut cmd = Command::cargo_bin("fuelplan").unwrap();
    cmd.env_remove("FUELPLAN_CONFIG");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP / VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_help_lists_commands() {
    fuelplan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("load"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("snapshot"));
}

#[test]
fn test_version() {
    fuelplan()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_server_binary_help() {
    Command::cargo_bin("fuelplan-server")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--initial-load"));
}

#[test]
fn test_serve_initial_load_is_opt_in() {
    fuelplan()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--initial-load"))
        .stdout(predicate::str::contains("no-initial-load").not());
}

// ═══════════════════════════════════════════════════════════════════════════
// LOAD COMMAND TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_load_prints_kpis_and_writes_snapshot() {
    let dir = TempDir::new().unwrap();
    write_plan(&dir.path().join("PACIFICO.xlsx"));
    let snapshots = dir.path().join("historico");

    fuelplan()
        .current_dir(dir.path())
        .args(["load", "-d", "."])
        .arg("--snapshot-dir")
        .arg(&snapshots)
        .assert()
        .success()
        .stdout(predicate::str::contains("Topolobampo"))
        .stdout(predicate::str::contains("5,234"));

    assert_eq!(fs::read_dir(&snapshots).unwrap().count(), 1);
}

#[test]
fn test_load_no_snapshot() {
    let dir = TempDir::new().unwrap();
    write_plan(&dir.path().join("BASE PACIFICO.xlsx"));

    fuelplan()
        .current_dir(dir.path())
        .args(["load", "--no-snapshot"])
        .assert()
        .success();

    assert!(!dir.path().join("historico").exists());
}

#[test]
fn test_load_missing_workbook_fails() {
    let dir = TempDir::new().unwrap();

    fuelplan()
        .current_dir(dir.path())
        .arg("load")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Load failed"));
}

#[test]
fn test_load_custom_pattern() {
    let dir = TempDir::new().unwrap();
    write_plan(&dir.path().join("plan norte.xlsx"));

    fuelplan()
        .current_dir(dir.path())
        .args(["load", "--pattern", "PLANNORTE", "--no-snapshot"])
        .assert()
        .success();
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT / SNAPSHOT COMMAND TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_then_read_snapshot() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("PACIFICO.xlsx");
    write_plan(&input);
    let report = dir.path().join("reporte.xlsx");

    fuelplan()
        .arg("export")
        .arg(&report)
        .arg("--input")
        .arg(&input)
        .assert()
        .success();
    assert!(report.exists());

    fuelplan()
        .current_dir(dir.path())
        .arg("load")
        .assert()
        .success();
    let snapshot = fs::read_dir(dir.path().join("historico"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();

    fuelplan()
        .arg("snapshot")
        .arg(&snapshot)
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("Los Mochis"));
}

#[test]
fn test_snapshot_missing_file_fails() {
    fuelplan()
        .args(["snapshot", "no-such-file.csv.gz"])
        .assert()
        .failure();
}
