//! Command-line behaviour of the `genoscreen` binary.

mod common;

use assert_cmd::Command;
use common::{fasta, unrelated_fasta, write_catalog, REFERENCE};
use genoscreen::utils::checksum::{md5_hex, sha256_hex};
use predicates::prelude::*;

fn genoscreen() -> Command {
    Command::cargo_bin("genoscreen").unwrap()
}

/// `checksum` prints the digest and size a client registers
#[test]
fn test_checksum_reports_digest_and_size() {
    let dir = tempfile::tempdir().unwrap();
    let content = fasta("sample", REFERENCE);
    let path = dir.path().join("sample.fasta");
    std::fs::write(&path, &content).unwrap();

    genoscreen()
        .arg("checksum")
        .arg(&path)
        .arg("--md5")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "SHA-256: {}",
            sha256_hex(content.as_bytes())
        )))
        .stdout(predicate::str::contains(format!(
            "MD5: {}",
            md5_hex(content.as_bytes())
        )))
        .stdout(predicate::str::contains(format!("Size: {} bytes", content.len())))
        .stdout(predicate::str::contains("FASTA: valid"));
}

/// `checksum` flags invalid FASTA without failing
#[test]
fn test_checksum_flags_invalid_fasta() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.fasta");
    std::fs::write(&path, ">sample\nACGU").unwrap();

    genoscreen()
        .args(["--format", "json", "checksum"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid_fasta\": false"));
}

/// `catalog list` shows every disease in manifest order
#[test]
fn test_catalog_list() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());

    genoscreen()
        .args(["catalog", "list", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Disease Catalog (2 diseases)"))
        .stdout(predicate::str::contains("Example Syndrome"))
        .stdout(predicate::str::contains("Second Disorder"));

    genoscreen()
        .args(["catalog", "list", "--format", "tsv", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id\tname\tseverity\tsequence_length\nD001\tExample Syndrome\t8\t"));
}

/// `catalog show` fails for unknown diseases
#[test]
fn test_catalog_show() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());

    genoscreen()
        .args(["catalog", "show", "D002", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Severity: 3"));

    genoscreen()
        .args(["catalog", "show", "D999", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Disease not found: D999"));
}

/// A missing sequence file is a fatal catalog error
#[test]
fn test_catalog_missing_sequence_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    std::fs::remove_file(dir.path().join("diseases").join("D002.fasta")).unwrap();

    genoscreen()
        .args(["catalog", "list", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("D002"));
}

/// `screen` runs the analyzer offline
#[test]
fn test_screen() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let matching = dir.path().join("match.fasta");
    let unrelated = dir.path().join("unrelated.fasta");
    std::fs::write(&matching, fasta("sample", REFERENCE)).unwrap();
    std::fs::write(&unrelated, unrelated_fasta()).unwrap();

    genoscreen()
        .arg("screen")
        .arg(&matching)
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("DETECTED D001 Example Syndrome (severity 8)"))
        .stdout(predicate::str::contains("D002").not());

    genoscreen()
        .arg("screen")
        .arg(&unrelated)
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No diseases detected"));

    // Nothing is written to the detection log
    assert!(!dir.path().join("disease_reports.csv").exists());
}

/// `screen --format json` emits the detection reports
#[test]
fn test_screen_json() {
    let dir = tempfile::tempdir().unwrap();
    write_catalog(dir.path());
    let matching = dir.path().join("match.fasta");
    std::fs::write(&matching, fasta("sample", REFERENCE)).unwrap();

    let output = genoscreen()
        .args(["--format", "json", "screen"])
        .arg(&matching)
        .arg("--data-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["disease_id"], "D001");
    assert_eq!(reports[0]["severity"], 8);
    assert_eq!(reports[0]["patient_id"], "OFFLINE");
    assert!(reports[0]["similarity"].as_f64().unwrap() >= 0.8);
    assert!(reports[0]["detected_at"].is_string());
}

/// `serve` refuses to start without TLS material unless told otherwise
#[test]
fn test_serve_requires_certificate() {
    genoscreen()
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cert"));
}

/// `serve` aborts when the catalog cannot be loaded
#[test]
fn test_serve_fails_without_catalog() {
    let dir = tempfile::tempdir().unwrap();

    genoscreen()
        .args(["serve", "--plaintext", "--address", "127.0.0.1", "--port", "0", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("disease_catalog.csv"));
}
