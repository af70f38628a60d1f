//! Tests for the testbridge binary.
//!
//! These exercise the compiled binary using assert_cmd.

use assert_cmd::Command;
use bridge_test_utils::{TestWorkspace, fixtures};
use predicates::prelude::*;

/// A command for the testbridge binary rooted at `ws`
fn testbridge(ws: &TestWorkspace) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("testbridge"));
    cmd.arg("--root").arg(ws.root()).env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Help and arguments
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let ws = TestWorkspace::new();
    testbridge(&ws)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("locator-groups"))
        .stdout(predicate::str::contains("step-groups"))
        .stdout(predicate::str::contains("sync"));
}

#[test]
fn test_version_output() {
    let ws = TestWorkspace::new();
    testbridge(&ws)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("testbridge"));
}

#[test]
fn test_unknown_direction_fails() {
    let ws = TestWorkspace::new();
    testbridge(&ws)
        .args(["sync", "--direction", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown direction"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_writes_config_once() {
    let ws = TestWorkspace::new();
    testbridge(&ws)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    ws.assert_file_contains(".testbridge/config.toml", "[paths]");

    testbridge(&ws)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ============================================================================
// Passes
// ============================================================================

#[test]
fn test_locators_pass_prints_itemized_summary() {
    let ws = TestWorkspace::new().with_sample_project();
    testbridge(&ws)
        .arg("locators")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 created"))
        .stdout(predicate::str::contains("login/usernameInput"));
    ws.assert_file_exists(".testbridge/store.json");
}

#[test]
fn test_pass_json_output_is_parseable() {
    let ws = TestWorkspace::new().with_sample_project();
    let output = testbridge(&ws)
        .args(["steps", "--json", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["dry_run"], true);
    assert_eq!(result["created"].as_array().map(Vec::len), Some(3));
    ws.assert_file_not_exists(".testbridge/store.json");
}

#[test]
fn test_item_errors_exit_non_zero() {
    let ws = TestWorkspace::new();
    ws.write_locators("stray.json", r##"{"a": "#a"}"##);
    testbridge(&ws)
        .arg("locators")
        .assert()
        .failure()
        .stdout(predicate::str::contains("errors"));
}

#[test]
fn test_cases_mint_ids_writes_tags_back() {
    let ws = TestWorkspace::new();
    ws.write(".testbridge/config.toml", "[sync]\nmint_identifiers = false\n");
    ws.write_feature("shop/checkout.feature", fixtures::UNTAGGED_FEATURE);

    testbridge(&ws).arg("cases").assert().success();
    assert!(!ws.read("features/shop/checkout.feature").contains("@tc_"));

    testbridge(&ws).args(["cases", "--mint-ids"]).assert().success();
    let text = ws.read("features/shop/checkout.feature");
    assert_eq!(text.matches("@tc_").count(), 2, "{text}");
}

#[test]
fn test_invalid_config_is_fatal() {
    let ws = TestWorkspace::new();
    ws.write(".testbridge/config.toml", "[paths]\nfeature = \"typo\"\n");
    testbridge(&ws)
        .arg("suites")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

// ============================================================================
// Sync
// ============================================================================

#[test]
fn test_sync_twice_reports_in_sync() {
    let ws = TestWorkspace::new().with_sample_project();
    testbridge(&ws)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("fs-to-db changed"));

    testbridge(&ws)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("fs-to-db is already in sync"));
}

#[test]
fn test_sync_round_trip_through_the_binary() {
    let ws = TestWorkspace::new().with_sample_project();
    testbridge(&ws).arg("sync").assert().success();
    ws.remove("features/users/login.feature");

    testbridge(&ws)
        .args(["sync", "--direction", "db-to-fs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feature files"));

    assert_eq!(ws.read("features/users/login.feature"), fixtures::LOGIN_FEATURE);
}

#[test]
fn test_sync_json_has_every_pass() {
    let ws = TestWorkspace::new().with_sample_project();
    let output = testbridge(&ws)
        .args(["sync", "--dry-run", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["direction"], "fs-to-db");
    assert_eq!(report["passes"].as_array().map(Vec::len), Some(7));
}

#[test]
fn test_missing_root_is_reported() {
    let ws = TestWorkspace::new();
    Command::new(assert_cmd::cargo::cargo_bin!("testbridge"))
        .arg("--root")
        .arg(ws.root().join("nowhere"))
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}
