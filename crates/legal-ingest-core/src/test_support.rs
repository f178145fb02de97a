//! Bundle builders shared by the unit tests

use chrono::{TimeZone, Utc};

use crate::evidence::{BBox, EvidenceBundle, EvidenceSource, OcrPage, OcrRun, OcrToken, TokenLevel};

pub(crate) const WORD_HEIGHT: f64 = 20.0;
pub(crate) const CHAR_WIDTH: f64 = 10.0;
pub(crate) const WORD_GAP: f64 = 8.0;

pub(crate) fn word(id: &str, text: &str, x0: f64, y0: f64, confidence: Option<f64>) -> OcrToken {
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

/// Words laid out left to right on one line, ids `{prefix}{n}`
pub(crate) fn line(prefix: &str, start: usize, y0: f64, words: &[&str]) -> Vec<OcrToken> {
    let mut x0 = 50.0;
    words
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let token = word(&format!("{prefix}{}", start + i), text, x0, y0, Some(92.0));
            x0 = token.bbox.x1 + WORD_GAP;
            token
        })
        .collect()
}

pub(crate) fn page(page_number: u32, tokens: Vec<OcrToken>) -> OcrPage {
    OcrPage {
        page_number,
        width_px: 2550,
        height_px: 3300,
        resolution_dpi: Some(300),
        tokens,
        blocks: None,
    }
}

pub(crate) fn bundle(pages: Vec<OcrPage>) -> EvidenceBundle {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    EvidenceBundle {
        document_id: "doc-test".to_string(),
        source: EvidenceSource {
            path: "fixtures/deed.pdf".to_string(),
            sha256: "0".repeat(64),
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
