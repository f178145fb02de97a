//! Common test utilities and fixtures

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use legal_ingest_core::{
    BBox, CorrectedLine, CorrectionKind, CorrectionRecord, EvidenceBundle, EvidenceSource, OcrPage,
    OcrRun, OcrToken, ReconstructedLine, ReplayCollaborators, TokenLevel, UncertaintyRecord,
};

pub const WORD_HEIGHT: f64 = 20.0;
pub const CHAR_WIDTH: f64 = 10.0;
pub const LINE_PITCH: f64 = 40.0;

pub fn word(id: &str, text: &str, x0: f64, y0: f64, confidence: Option<f64>) -> OcrToken {
    let width = CHAR_WIDTH * text.chars().count().max(1) as f64;
    OcrToken {
        token_id: id.to_string(),
        text: text.to_string(),
        bbox: BBox::new(x0, y0, x0 + width, y0 + WORD_HEIGHT),
        confidence,
        level: TokenLevel::Word,
        engine_metadata: serde_json::Map::new(),
    }
}

pub fn page(page_number: u32, tokens: Vec<OcrToken>) -> OcrPage {
    OcrPage {
        page_number,
        width_px: 2550,
        height_px: 3300,
        resolution_dpi: Some(300),
        tokens,
        blocks: None,
    }
}

pub fn bundle(pages: Vec<OcrPage>) -> EvidenceBundle {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    EvidenceBundle {
        document_id: "deed-0001".to_string(),
        source: EvidenceSource {
            path: "scans/deed-0001.pdf".to_string(),
            sha256: "ab".repeat(32),
            page_count: pages.len() as u32,
        },
        ocr_runs: vec![OcrRun {
            engine: "tesseract".to_string(),
            engine_version: "5.3.0".to_string(),
            run_id: "run-1".to_string(),
            parameters: serde_json::Map::new(),
            pages,
            raw_artifact: Some(b"<hocr/>".to_vec()),
            created_at,
        }],
        created_at,
    }
}

/// Deed page text, one slice per visual line. Line 0 ends with the anchor, line 3 is a
/// heading that closes the description.
pub const DEED_LINES: [&[&str]; 5] = [
    &["Parcel", "one:", "BEGINNING", "AT"],
    &["an", "iron", "pin", "thence", "North", "45°30′15″", "East", "120.50", "feet;"],
    &[
        "thence", "South", "10°05′", "West", "80.00", "feet", "to", "the", "place", "of",
        "beginning.",
    ],
    &["EXHIBIT", "B"],
    &["Signed", "and", "sealed"],
];

/// Token ids of each deed line, `{prefix}w{n}` numbered across the page
pub fn deed_line_ids(prefix: &str) -> Vec<Vec<String>> {
    let mut next = 0;
    DEED_LINES
        .iter()
        .map(|words| {
            words
                .iter()
                .map(|_| {
                    let id = format!("{prefix}w{next}");
                    next += 1;
                    id
                })
                .collect()
        })
        .collect()
}

pub fn deed_page(page_number: u32, prefix: &str) -> OcrPage {
    let ids = deed_line_ids(prefix);
    let mut tokens = Vec::new();
    for (line_no, (words, line_ids)) in DEED_LINES.iter().zip(&ids).enumerate() {
        // heading sits one blank line lower
        let gap = if line_no >= 3 { LINE_PITCH } else { 0.0 };
        let y0 = 100.0 + LINE_PITCH * line_no as f64 + gap;
        let mut x0 = 50.0;
        for (text, id) in words.iter().zip(line_ids) {
            let token = word(id, text, x0, y0, Some(93.0));
            x0 = token.bbox.x1 + 8.0;
            tokens.push(token);
        }
    }
    page(page_number, tokens)
}

pub fn deed_bundle() -> EvidenceBundle {
    bundle(vec![deed_page(1, "")])
}

/// Token ids the description span should cover (body lines 1 and 2)
pub fn deed_span_ids(prefix: &str) -> Vec<String> {
    let ids = deed_line_ids(prefix);
    ids[1].iter().chain(&ids[2]).cloned().collect()
}

/// Recorded collaborator outputs for the deed page
pub fn deed_collaborators(uncertainties: Vec<UncertaintyRecord>) -> ReplayCollaborators {
    let ids = deed_line_ids("");
    let reconstructed_lines: Vec<ReconstructedLine> = [1, 2]
        .iter()
        .map(|&n| ReconstructedLine {
            line_id: format!("p1-l{n}"),
            page_number: 1,
            token_ids: ids[n].clone(),
            text: DEED_LINES[n].join(" "),
        })
        .collect();

    let corrected_lines = reconstructed_lines
        .iter()
        .map(|line| {
            let corrections = if line.line_id == "p1-l1" {
                vec![CorrectionRecord::new(
                    CorrectionKind::SymbolRepair,
                    vec![ids[1][5].clone()],
                    "45o30'15\"",
                    "45°30′15″",
                )]
            } else {
                Vec::new()
            };
            CorrectedLine {
                line_id: line.line_id.clone(),
                token_ids: line.token_ids.clone(),
                original_text: line.text.replace("45°30′15″", "45o30'15\""),
                text: line.text.clone(),
                corrections,
            }
        })
        .collect();

    ReplayCollaborators {
        reconstructed_lines,
        corrected_lines,
        uncertainties,
    }
}

pub fn illegible(token_id: &str) -> UncertaintyRecord {
    UncertaintyRecord {
        kind: "ILLEGIBLE_DIGIT".to_string(),
        token_ids: vec![token_id.to_string()],
        detail: "distance digit unreadable".to_string(),
    }
}
