//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use predicates::prelude::*;

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    // No path argument at all - error goes to stderr
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_missing_model_is_a_hard_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let empty_models = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("--quiet")
        .arg("--models-dir")
        .arg(empty_models.path())
        .arg(temp_dir.path());

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Model file not found"))
        .stderr(predicate::str::contains("models fetch"));
}

#[test]
fn test_explicit_model_path_must_exist() {
    let temp_dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("--quiet")
        .arg("--model")
        .arg("/nonexistent/weights.safetensors")
        .arg(temp_dir.path());

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Model file not found"));
}

// === Format Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("--format").arg("xml").arg("some.jpg");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("json").or(predicate::str::contains("jsonl")));
}

// === Compare Threshold Validation ===

#[test]
fn test_compare_threshold_rejects_out_of_range() {
    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("compare")
        .arg("a.jpg")
        .arg("b.jpg")
        .arg("--threshold")
        .arg("1.5");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("1.5 is not in 0.0..=1.0"));
}

#[test]
fn test_compare_threshold_rejects_non_numeric() {
    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("compare")
        .arg("a.jpg")
        .arg("b.jpg")
        .arg("--threshold")
        .arg("high");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("'high' is not a valid number"));
}

// === Models Subcommand ===

#[test]
fn test_models_path_prints_directory() {
    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("models").arg("path");

    cmd.assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_models_list_names_the_model() {
    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("models").arg("list");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("faceprint"))
        .stdout(predicate::str::contains("models installed"));
}

// === Help ===

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("faceprint").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("embed"))
        .stdout(predicate::str::contains("compare"))
        .stdout(predicate::str::contains("models"));
}
