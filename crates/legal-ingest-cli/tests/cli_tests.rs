//! Integration tests for all CLI commands
//!
//! Each test writes a case file to a temp dir and runs the real binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a CLI command
fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_legal-ingest"))
}

const DEED_LINES: [&[&str]; 4] = [
    &["BEGINNING", "AT", "the", "corner"],
    &["thence", "North", "12°30′", "East", "40.00", "feet"],
    &["to", "the", "place", "of", "beginning."],
    &["NOTARY", "SEAL"],
];

/// Token JSON for the deed lines plus the ids of each line
fn deed_tokens() -> (Vec<Value>, Vec<Vec<String>>) {
    let mut tokens = Vec::new();
    let mut ids = Vec::new();
    let mut n = 0;
    for (line_no, words) in DEED_LINES.iter().enumerate() {
        let y0 = 100.0 + 40.0 * line_no as f64;
        let mut x0 = 50.0;
        let mut line_ids = Vec::new();
        for text in *words {
            let x1 = x0 + 10.0 * text.chars().count() as f64;
            let id = format!("w{n}");
            tokens.push(json!({
                "token_id": id,
                "text": text,
                "bbox": {"x0": x0, "y0": y0, "x1": x1, "y1": y0 + 20.0},
                "confidence": 91.0,
                "level": "word"
            }));
            line_ids.push(id);
            x0 = x1 + 8.0;
            n += 1;
        }
        ids.push(line_ids);
    }
    (tokens, ids)
}

fn case_json(uncertainties: Value) -> Value {
    let (tokens, ids) = deed_tokens();
    let lines: Vec<Value> = [1usize, 2]
        .iter()
        .map(|&l| {
            json!({
                "line_id": format!("l{l}"),
                "token_ids": ids[l],
                "original_text": DEED_LINES[l].join(" "),
                "text": DEED_LINES[l].join(" ")
            })
        })
        .collect();
    let reconstructed: Vec<Value> = [1usize, 2]
        .iter()
        .map(|&l| {
            json!({
                "line_id": format!("l{l}"),
                "page_number": 1,
                "token_ids": ids[l],
                "text": DEED_LINES[l].join(" ")
            })
        })
        .collect();

    json!({
        "bundle": {
            "document_id": "deed-42",
            "source": {"path": "deed-42.pdf", "sha256": "00", "page_count": 1},
            "ocr_runs": [{
                "engine": "tesseract",
                "engine_version": "5.3.0",
                "run_id": "r1",
                "pages": [{
                    "page_number": 1,
                    "width_px": 2550,
                    "height_px": 3300,
                    "resolution_dpi": 300,
                    "tokens": tokens
                }],
                "raw_artifact": null,
                "created_at": "2024-05-01T12:00:00Z"
            }],
            "created_at": "2024-05-01T12:00:00Z"
        },
        "reconstructed_lines": reconstructed,
        "corrected_lines": lines,
        "uncertainties": uncertainties
    })
}

fn write_case(dir: &TempDir, case: &Value) -> PathBuf {
    let path = dir.path().join("case.json");
    fs::write(&path, serde_json::to_string(case).unwrap()).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============ EXTRACT COMMAND TESTS ============

#[test]
fn test_extract_help() {
    cli()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("contract result"));
}

#[test]
fn test_extract_pass() {
    let dir = TempDir::new().unwrap();
    let path = write_case(&dir, &case_json(json!([])));

    let output = cli().arg("extract").arg(&path).output().unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let result = stdout_json(&output);
    assert_eq!(result["status"], "PASS");
    assert_eq!(
        result["final_description"]["text"],
        "thence North 12°30′ East 40.00 feet\nto the place of beginning."
    );
    assert_eq!(result["trace"]["selection_audit"]["decision_rule"], "SINGLE_TOP_SCORE");
    assert!(result.get("reason").is_none());
}

#[test]
fn test_extract_fail_exits_one() {
    let dir = TempDir::new().unwrap();
    let uncertain = json!([{"kind": "ILLEGIBLE", "token_ids": ["w8"], "detail": "digit"}]);
    let path = write_case(&dir, &case_json(uncertain));

    cli()
        .arg("extract")
        .arg(&path)
        .arg("--compact")
        .assert()
        .code(1)
        .stdout(predicate::str::diff(
            "{\"status\":\"FAIL\",\"final_description\":null,\"trace\":null,\"reason\":\"UNCERTAINTIES_PRESENT\"}\n",
        ));
}

#[test]
fn test_extract_with_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_case(&dir, &case_json(json!([])));
    let config = dir.path().join("pipeline.toml");
    fs::write(&config, "selection_threshold = 0.99\n").unwrap();

    let output = cli()
        .arg("extract")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout_json(&output)["reason"], "SCORE_TOO_LOW");
}

#[test]
fn test_extract_invalid_config_is_fault() {
    let dir = TempDir::new().unwrap();
    let path = write_case(&dir, &case_json(json!([])));
    let config = dir.path().join("pipeline.toml");
    fs::write(&config, "confidence_window = 0\n").unwrap();

    cli()
        .arg("extract")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn test_extract_unknown_trace_token_is_fault() {
    let dir = TempDir::new().unwrap();
    let mut case = case_json(json!([]));
    case["corrected_lines"][0]["token_ids"] = json!(["ghost"]);
    let path = write_case(&dir, &case);

    cli()
        .arg("extract")
        .arg(&path)
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_extract_missing_file() {
    cli()
        .arg("extract")
        .arg("does-not-exist.json")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to read case file"));
}

// ============ AUDIT COMMAND TESTS ============

#[test]
fn test_audit_lists_scored_spans() {
    let dir = TempDir::new().unwrap();
    let path = write_case(&dir, &case_json(json!([])));

    let output = cli().arg("audit").arg(&path).output().unwrap();
    assert!(output.status.success());

    let audit = stdout_json(&output);
    let spans = audit["all_scored_spans"].as_array().unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0]["validated"]["span"]["start_token_id"], "w2");
    assert_eq!(spans[0]["validated"]["span"]["end_token_id"], "w14");
    assert!(spans[0]["score_breakdown"]["LENGTH_SCORE"].is_number());
}

// ============ ORDER COMMAND TESTS ============

#[test]
fn test_order_prints_reading_order() {
    let dir = TempDir::new().unwrap();
    let path = write_case(&dir, &case_json(json!([])));

    let output = cli().arg("order").arg(&path).arg("--compact").output().unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["document_id"], "deed-42");
    assert_eq!(report["ordered_token_ids"][0], "w0");
    assert_eq!(report["ordered_token_ids"].as_array().unwrap().len(), 17);
    assert_eq!(report["page_stats"]["1"]["median_token_height"], 20.0);
}
