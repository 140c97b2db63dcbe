//! E2E CLI tests for `iocg layers`, `iocg hierarchy` and `iocg analyze`.
//!
//! Each test runs the `iocg` binary as a subprocess against a snapshot file
//! written into an isolated temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test Harness
// ---------------------------------------------------------------------------

/// Build a Command targeting the `iocg` binary, isolated from user config.
fn iocg_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("iocg").expect("iocg binary must exist");
    cmd.current_dir(dir);
    // Point at a file that does not exist so defaults apply.
    cmd.env("IOCGRAPH_CONFIG", dir.join("no-config.toml"));
    cmd.env("IOCG_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd
}

fn write_snapshot(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).expect("serialize"))
        .expect("write snapshot");
    path
}

fn sample_snapshot() -> Value {
    json!({
        "records": [
            {"id": "a", "type": "Domain", "value": "evil.example", "time": "2024-01-01 10:00:00"},
            {"id": "b", "type": "IP", "value": "10.0.0.1", "isChild": true},
            {"id": "c", "type": "SHA256", "value": "abc", "isChild": true},
            {"id": "z", "type": "URL", "value": "http://lonely"}
        ],
        "edges": [
            {"fromNode": "a", "toNode": "b", "label": "resolves"},
            {"from": {"node": "b"}, "to": {"node": "c"}},
            {"source": "a", "target": "c"},
            {"fromNode": "a", "toNode": "ghost"}
        ]
    })
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = iocg_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("iocg should not crash");
    assert!(
        output.status.success(),
        "iocg {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("--json should produce valid JSON")
}

// ---------------------------------------------------------------------------
// layers
// ---------------------------------------------------------------------------

#[test]
fn layers_json_places_by_longest_path() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "snap.json", &sample_snapshot());

    let json = run_json(dir.path(), &["layers", snap.to_str().expect("utf8 path")]);
    assert_eq!(json["status"], "found");

    let layers = json["layers"].as_array().expect("layers array");
    let ids: Vec<Vec<&str>> = layers
        .iter()
        .map(|l| {
            l["entries"]
                .as_array()
                .expect("entries")
                .iter()
                .map(|e| e["id"].as_str().expect("id"))
                .collect()
        })
        .collect();
    // c is reachable at depth 1 via the shortcut but depth 2 via b.
    assert_eq!(ids, vec![vec!["a"], vec!["b"], vec!["c"]]);

    assert_eq!(json["isolatedNodes"][0]["id"], "z");
    assert_eq!(json["diagnostics"]["validConnectionCount"], 3);
    assert_eq!(json["diagnostics"]["droppedEdgeCount"], 1);
}

#[test]
fn layers_text_is_tab_separated() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "snap.json", &sample_snapshot());

    iocg_cmd(dir.path())
        .args(["--format", "text", "layers"])
        .arg(&snap)
        .assert()
        .success()
        .stdout(predicate::str::contains("layer\t2\tc\tSHA256\tabc"))
        .stdout(predicate::str::contains("edge\ta\tb\tresolves"))
        .stdout(predicate::str::contains("isolated\tz"));
}

#[test]
fn layers_reads_stdin() {
    let dir = TempDir::new().expect("tempdir");
    let body = serde_json::to_string(&sample_snapshot()).expect("serialize");

    iocg_cmd(dir.path())
        .args(["layers", "-", "--format", "text"])
        .write_stdin(body)
        .assert()
        .success()
        .stdout(predicate::str::contains("layer\t0\ta"));
}

#[test]
fn empty_records_report_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "empty.json", &json!({"records": [], "edges": []}));

    iocg_cmd(dir.path())
        .args(["--format", "pretty", "layers"])
        .arg(&snap)
        .assert()
        .success()
        .stdout(predicate::str::contains("graph not found"));
}

// ---------------------------------------------------------------------------
// hierarchy
// ---------------------------------------------------------------------------

#[test]
fn hierarchy_json_nests_child_chain() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "snap.json", &sample_snapshot());

    let json = run_json(dir.path(), &["hierarchy", snap.to_str().expect("utf8 path")]);
    let groups = json["groups"].as_array().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["parent"]["id"], "a");

    let children = groups[0]["children"].as_array().expect("children");
    assert_eq!(children[0]["kind"], "group");
    assert_eq!(children[0]["parent"]["id"], "b");
    assert_eq!(children[1]["kind"], "leaf");
    assert_eq!(children[1]["id"], "c");
    assert!(json["directionalErrors"].as_array().expect("errors").is_empty());
}

#[test]
fn hierarchy_reports_directional_error() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(
        dir.path(),
        "dir.json",
        &json!({
            "records": [
                {"id": "p", "type": "Domain"},
                {"id": "k", "type": "IP", "isChild": true},
                {"id": "q", "type": "Email", "value": "x@example"}
            ],
            "edges": [
                {"fromNode": "p", "toNode": "k"},
                {"fromNode": "k", "toNode": "q"}
            ]
        }),
    );

    iocg_cmd(dir.path())
        .args(["--format", "pretty", "hierarchy", "--reduced"])
        .arg(&snap)
        .assert()
        .success()
        .stdout(predicate::str::contains("Directional errors"))
        .stdout(predicate::str::contains("Email: x@example"));
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_json_has_both_views() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "snap.json", &sample_snapshot());

    let json = run_json(dir.path(), &["analyze", snap.to_str().expect("utf8 path")]);
    assert!(json["layers"]["layers"].is_array());
    assert!(json["hierarchy"]["groups"].is_array());
}

#[test]
fn hierarchy_matches_analyze_hierarchy() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "snap.json", &sample_snapshot());
    let path = snap.to_str().expect("utf8 path");

    let alone = run_json(dir.path(), &["hierarchy", path]);
    let combined = run_json(dir.path(), &["analyze", path]);
    assert_eq!(alone, combined["hierarchy"]);
}

#[test]
fn hierarchy_rejects_duplicate_ids() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(
        dir.path(),
        "dup.json",
        &json!({
            "records": [{"id": "a", "type": "IP"}, {"id": "a", "type": "IP"}],
            "edges": [{"fromNode": "a", "toNode": "a"}]
        }),
    );

    iocg_cmd(dir.path())
        .args(["hierarchy", "--json"])
        .arg(&snap)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2003"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn null_edges_is_contract_violation() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "bad.json", &json!({"records": [], "edges": null}));

    iocg_cmd(dir.path())
        .args(["layers", "--json"])
        .arg(&snap)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn duplicate_ids_fail() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(
        dir.path(),
        "dup.json",
        &json!({
            "records": [{"id": "a", "type": "IP"}, {"id": "a", "type": "IP"}],
            "edges": []
        }),
    );

    iocg_cmd(dir.path())
        .args(["analyze", "--json"])
        .arg(&snap)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2003"));
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().expect("tempdir");

    iocg_cmd(dir.path())
        .args(["layers", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read snapshot"));
}

#[test]
fn explicit_missing_config_fails() {
    let dir = TempDir::new().expect("tempdir");
    let snap = write_snapshot(dir.path(), "snap.json", &sample_snapshot());

    iocg_cmd(dir.path())
        .args(["layers", "--config", "nope.toml"])
        .arg(&snap)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn config_can_add_endpoint_fields() {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        "[edges]\nfrom_fields = [\"src.ref\"]\nto_fields = [\"dst.ref\"]\n",
    )
    .expect("write config");
    let snap = write_snapshot(
        dir.path(),
        "custom.json",
        &json!({
            "records": [{"id": "a", "type": "IP"}, {"id": "b", "type": "IP"}],
            "edges": [{"src": {"ref": "a"}, "dst": {"ref": "b"}}]
        }),
    );

    let json = run_json(
        dir.path(),
        &[
            "layers",
            "--config",
            config.to_str().expect("utf8 path"),
            snap.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(json["diagnostics"]["validConnectionCount"], 1);
    assert_eq!(json["layers"][1]["entries"][0]["id"], "b");
}
