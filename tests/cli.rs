//! CLI integration tests for query-perf binary.
//!
//! Tests the command-line interface behavior.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a Command for the query-perf binary.
fn query_perf() -> Command {
    cargo_bin_cmd!("query-perf")
}

/// Write a small trace file and return its directory and path.
fn write_trace(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("trace.json");
    fs::write(&path, content).unwrap();
    (temp, path)
}

const SAMPLE_TRACE: &str = r##"[
    {"op": "find", "selector": ".foo", "matched": 2, "duration_ms": 2},
    {"op": "find", "selector": ".foo", "matched": 2, "duration_ms": 3},
    {"op": "find", "selector": ".foo", "matched": 2, "duration_ms": 4},
    {"op": "find", "selector": "#bar .baz", "matched": 4, "duration_ms": 1},
    {"op": "bind", "selector": ".item", "event": "click", "matched": 3, "duration_ms": 1}
]"##;

#[test]
fn test_help_flag() {
    query_perf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Advisory diagnostics"));
}

#[test]
fn test_version_flag() {
    query_perf()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("query-perf"));
}

#[test]
fn test_rules_subcommand() {
    query_perf()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("pseudo-class"))
        .stdout(predicate::str::contains("repeated-selector"))
        .stdout(predicate::str::contains("delegation"))
        .stdout(predicate::str::contains("submit-control"));
}

#[test]
fn test_init_creates_config() {
    let temp = TempDir::new().unwrap();

    query_perf()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    assert!(temp.path().join("query-perf.toml").exists());
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("query-perf.toml"), "[analyzers]\n").unwrap();

    query_perf()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_replay_console_report() {
    let (_temp, path) = write_trace(SAMPLE_TRACE);

    query_perf()
        .arg("replay")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(".foo"))
        .stdout(predicate::str::contains("Selector/Event"))
        .stdout(predicate::str::contains("delegation"));
}

#[test]
fn test_replay_json_report() {
    let (_temp, path) = write_trace(SAMPLE_TRACE);

    let output = query_perf()
        .arg("replay")
        .arg(&path)
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let selectors = parsed["selectors"].as_array().unwrap();
    let foo = selectors
        .iter()
        .find(|row| row["name"] == ".foo")
        .expect("aggregate row for .foo");
    assert_eq!(foo["calls"], 3);
    assert_eq!(foo["total_millis"], 9);
    assert_eq!(foo["average_millis"], 3);
}

#[test]
fn test_replay_sorted_by_name() {
    let (_temp, path) = write_trace(SAMPLE_TRACE);

    let output = query_perf()
        .arg("replay")
        .arg(&path)
        .arg("--format")
        .arg("json")
        .arg("--sort")
        .arg("name")
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let names: Vec<&str> = parsed["selectors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["#bar .baz", ".foo"]);
}

#[test]
fn test_replay_missing_trace_fails() {
    query_perf()
        .arg("replay")
        .arg("/nonexistent/trace.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_replay_invalid_trace_fails() {
    let (_temp, path) = write_trace("{not json");

    query_perf()
        .arg("replay")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("trace"));
}

#[test]
fn test_replay_honors_config_gating() {
    let (temp, path) = write_trace(
        r##"[{"op": "find", "selector": "#bar .baz", "matched": 4, "duration_ms": 1}]"##,
    );
    fs::write(
        temp.path().join("query-perf.toml"),
        "[analyzers]\n\"id-descendant\" = false\n",
    )
    .unwrap();

    let output = query_perf()
        .arg("replay")
        .arg(&path)
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["warnings"].as_array().unwrap().len(), 0);
}
