use std::fs;

use crate::cli::support::TestEnv;
use predicates::prelude::*;

const SNIPPET_FILE: &str = "---METADATA---
# comment lines are ignored
Title: Retry with backoff
Description: Retries a fallible closure with exponential backoff
Language: rust
Tags: retry, backoff, async, errors, utility
---CODE---
fn retry() {}
// done
";

// ============================================================================
// snippet template / parse
// ============================================================================

#[test]
fn test_template_has_markers_and_language() {
    TestEnv::new()
        .cmd()
        .args(["snippet", "template", "--language", "python"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---METADATA---"))
        .stdout(predicate::str::contains("Language: python"))
        .stdout(predicate::str::contains("---CODE---"));
}

#[test]
fn test_parse_snippet_file() {
    let env = TestEnv::new();
    let file = env.path().join("snippet.txt");
    fs::write(&file, SNIPPET_FILE).unwrap();

    env.cmd()
        .args(["snippet", "parse"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Title: Retry with backoff"))
        .stdout(predicate::str::contains("Language: rust"))
        .stdout(predicate::str::contains(
            "Tags: retry, backoff, async, errors, utility",
        ))
        .stdout(predicate::str::contains("Code: 2 lines"));
}

#[test]
fn test_parse_snippet_file_json() {
    let env = TestEnv::new();
    let file = env.path().join("snippet.txt");
    fs::write(&file, SNIPPET_FILE).unwrap();

    let output = env
        .cmd()
        .args(["--format", "json", "snippet", "parse"])
        .arg(&file)
        .assert()
        .success()
        .get_output()
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["metadata"]["title"], "Retry with backoff");
    assert_eq!(json["metadata"]["tags"].as_array().unwrap().len(), 5);
    assert_eq!(json["code"], "fn retry() {}\n// done\n");
}

#[test]
fn test_parse_without_markers_is_data_error() {
    let env = TestEnv::new();
    let file = env.path().join("plain.txt");
    fs::write(&file, "Title: no markers here\n").unwrap();

    env.cmd()
        .args(["snippet", "parse"])
        .arg(&file)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("metadata section not found"));
}

#[test]
fn test_publish_without_signer_is_data_error() {
    let env = TestEnv::offline();
    let file = env.path().join("snippet.txt");
    fs::write(&file, SNIPPET_FILE).unwrap();

    env.cmd()
        .args(["snippet", "publish"])
        .arg(&file)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no signing key configured"));
}

#[test]
fn test_publish_rejects_empty_title() {
    let env = TestEnv::offline();
    let file = env.path().join("untitled.txt");
    fs::write(&file, SNIPPET_FILE.replace("Retry with backoff", "")).unwrap();

    env.cmd()
        .args(["snippet", "publish"])
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("title must not be empty"));
}
