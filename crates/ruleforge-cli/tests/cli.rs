//! Integration tests for the `ruleforge-cli` binary.
//!
//! Each test launches the binary via `assert_cmd`, writes any required
//! fixture files to a temp location, and asserts on exit code + output.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[allow(deprecated)]
fn ruleforge() -> Command {
    Command::cargo_bin("ruleforge-cli").expect("binary not found")
}

/// Write `contents` to a temporary file with the given suffix and return it.
fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const SSHD_DECODER: &str = r#"{
    "name": "decoder/sshd/0",
    "check": {"event.module": "sshd"},
    "map": {"decoder.name": "sshd"}
}"#;

const BROKEN_DECODER: &str = r#"{
    "name": "decoder/broken/0",
    "check": {"event.module": "+no_such_helper/1"}
}"#;

// ---------------------------------------------------------------------------
// build subcommand
// ---------------------------------------------------------------------------

#[test]
fn build_compiles_a_valid_definition() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["build", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("decoder/sshd/0 (decoder): compiled"));
}

#[test]
fn build_prints_the_tree_on_request() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["build", file.path().to_str().unwrap(), "--tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("decoder/sshd/0 (and)"))
        .stdout(predicate::str::contains("stage.check (and)"))
        .stdout(predicate::str::contains(
            "condition.value[/event/module==\"sshd\"]",
        ));
}

#[test]
fn build_reports_unknown_helpers() {
    let file = temp_file(".json", BROKEN_DECODER);
    ruleforge()
        .args(["build", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown helper 'no_such_helper'"));
}

#[test]
fn build_rejects_invalid_json() {
    let file = temp_file(".json", "{not json");
    ruleforge()
        .args(["build", file.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

// ---------------------------------------------------------------------------
// validate subcommand
// ---------------------------------------------------------------------------

#[test]
fn validate_reports_each_file_and_fails_on_any_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("good.json"), SSHD_DECODER).unwrap();
    std::fs::write(dir.path().join("bad.json"), BROKEN_DECODER).unwrap();
    std::fs::write(dir.path().join("ignored.txt"), "not a definition").unwrap();

    ruleforge()
        .args(["validate", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("ok   "))
        .stdout(predicate::str::contains("FAIL "))
        .stderr(predicate::str::contains("2 definition(s) checked, 1 failed."));
}

#[test]
fn validate_passes_a_clean_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sshd.json"), SSHD_DECODER).unwrap();

    ruleforge()
        .args(["validate", dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("decoder/sshd/0"))
        .stderr(predicate::str::contains("1 definition(s) checked, 0 failed."));
}

#[test]
fn validate_rejects_paths_with_no_definitions() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("readme.txt"), "nothing here").unwrap();

    ruleforge()
        .args(["validate", dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no definition files"));
}

// ---------------------------------------------------------------------------
// eval subcommand
// ---------------------------------------------------------------------------

#[test]
fn eval_matches_an_inline_event() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["eval", "--assets", file.path().to_str().unwrap()])
        .args(["--event", r#"{"event":{"module":"sshd"}}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""matches":["decoder/sshd/0"]"#))
        .stdout(predicate::str::contains(r#""name":"sshd""#));
}

#[test]
fn eval_reports_no_matches_for_a_non_matching_event() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["eval", "--assets", file.path().to_str().unwrap()])
        .args(["--event", r#"{"event":{"module":"nginx"}}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""matches":[]"#));
}

#[test]
fn eval_reads_ndjson_from_stdin() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["eval", "--assets", file.path().to_str().unwrap()])
        .write_stdin("{\"event\":{\"module\":\"sshd\"}}\n{\"event\":{\"module\":\"nginx\"}}\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Processed 2 events, 1 with matches."));
}

#[test]
fn eval_skips_invalid_json_lines() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["eval", "--assets", file.path().to_str().unwrap()])
        .write_stdin("not json\n{\"event\":{\"module\":\"sshd\"}}\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Invalid JSON on line 1"))
        .stderr(predicate::str::contains("Processed 2 events, 1 with matches."));
}

#[test]
fn eval_trace_goes_to_stderr() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["eval", "--assets", file.path().to_str().unwrap(), "--trace"])
        .args(["--event", r#"{"event":{"module":"sshd"}}"#])
        .assert()
        .success()
        .stderr(predicate::str::contains("-> Success"));
}

#[test]
fn eval_runs_assets_in_name_order_so_decoders_feed_rules() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("sshd.json"), SSHD_DECODER).unwrap();
    std::fs::write(
        dir.path().join("alert.json"),
        r#"{"name": "rule/sshd-seen/0", "check": {"decoder.name": "sshd"}}"#,
    )
    .unwrap();

    // "decoder/..." sorts before "rule/...", so the decoder's map runs
    // before the rule checks the mapped field.
    ruleforge()
        .args(["eval", "--assets", dir.path().to_str().unwrap()])
        .args(["--event", r#"{"event":{"module":"sshd"}}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#""matches":["decoder/sshd/0","rule/sshd-seen/0"]"#,
        ));
}

#[test]
fn eval_rejects_invalid_inline_events() {
    let file = temp_file(".json", SSHD_DECODER);
    ruleforge()
        .args(["eval", "--assets", file.path().to_str().unwrap()])
        .args(["--event", "{broken"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON event"));
}

// ---------------------------------------------------------------------------
// global flags
// ---------------------------------------------------------------------------

#[test]
fn version_flag_names_the_tool() {
    ruleforge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ruleforge"));
}
