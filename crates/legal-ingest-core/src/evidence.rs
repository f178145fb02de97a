//! Evidence bundle types
//!
//! An [`EvidenceBundle`] is the verbatim OCR output for one scanned document: every engine
//! run, every page, every token, plus the raw engine artifact. The pipeline only ever borrows
//! it; nothing downstream mutates evidence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// Geometry
// ============================================================================

/// Axis-aligned box in page-pixel space (top-left origin)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    #[inline]
    #[must_use = "bounding box is created but not used"]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

// ============================================================================
// Tokens and pages
// ============================================================================

/// Granularity of an OCR token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenLevel {
    Symbol,
    #[default]
    Word,
    Line,
}

impl std::fmt::Display for TokenLevel {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Symbol => "symbol",
            Self::Word => "word",
            Self::Line => "line",
        };
        write!(f, "{s}")
    }
}

/// One recognized token as emitted by the OCR engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcrToken {
    /// Unique within the owning evidence bundle
    pub token_id: String,
    pub text: String,
    pub bbox: BBox,
    /// Engine confidence (0-100); `None` when the engine reported none
    pub confidence: Option<f64>,
    pub level: TokenLevel,
    /// Opaque engine-specific fields, kept verbatim
    #[serde(default)]
    pub engine_metadata: serde_json::Map<String, serde_json::Value>,
}

impl OcrToken {
    #[inline]
    #[must_use]
    pub fn is_word(&self) -> bool {
        self.level == TokenLevel::Word
    }

    #[inline]
    #[must_use]
    pub fn has_confidence(&self) -> bool {
        self.confidence.is_some()
    }
}

/// Layout block type reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Line,
    Paragraph,
    Table,
    #[default]
    Unknown,
}

/// Engine-reported grouping of tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcrBlock {
    pub block_id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub token_ids: Vec<String>,
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcrPage {
    /// 1-based page number
    pub page_number: u32,
    pub width_px: u32,
    pub height_px: u32,
    pub resolution_dpi: Option<u32>,
    pub tokens: Vec<OcrToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<OcrBlock>>,
}

/// One engine execution over the whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OcrRun {
    pub engine: String,
    pub engine_version: String,
    pub run_id: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub pages: Vec<OcrPage>,
    /// Verbatim engine output (base64 in JSON)
    #[serde(default, with = "base64_bytes")]
    pub raw_artifact: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvidenceSource {
    pub path: String,
    pub sha256: String,
    pub page_count: u32,
}

/// Immutable OCR evidence for one source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvidenceBundle {
    pub document_id: String,
    pub source: EvidenceSource,
    pub ocr_runs: Vec<OcrRun>,
    pub created_at: DateTime<Utc>,
}

impl EvidenceBundle {
    /// Parse a bundle from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All pages across all runs, in run order then page order
    pub fn pages(&self) -> impl Iterator<Item = &OcrPage> {
        self.ocr_runs.iter().flat_map(|run| run.pages.iter())
    }

    /// Every token with its page number, in encounter order
    pub fn tokens(&self) -> impl Iterator<Item = (u32, &OcrToken)> {
        self.pages()
            .flat_map(|page| page.tokens.iter().map(move |token| (page.page_number, token)))
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
