//! Line reconstruction, text correction and uncertainty detection boundary
//!
//! These stages run after a span is selected and live outside this crate. The pipeline talks
//! to them through three traits; [`ReplayCollaborators`] feeds back outputs recorded earlier,
//! which is how case files and tests drive the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};
use crate::index::EvidenceIndex;

/// One visual line rebuilt from the selected span's tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconstructedLine {
    pub line_id: String,
    pub page_number: u32,
    pub token_ids: Vec<String>,
    pub text: String,
}

/// Allowed correction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CorrectionKind {
    /// Degree, minute and second marks restored
    SymbolRepair,
    /// Word split by a line-end hyphen rejoined
    HyphenationRepair,
    LexiconFix,
}

impl CorrectionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SymbolRepair => "SYMBOL_REPAIR",
            Self::HyphenationRepair => "HYPHENATION_REPAIR",
            Self::LexiconFix => "LEXICON_FIX",
        }
    }
}

impl fmt::Display for CorrectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrectionKind {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SYMBOL_REPAIR" => Ok(Self::SymbolRepair),
            "HYPHENATION_REPAIR" => Ok(Self::HyphenationRepair),
            "LEXICON_FIX" => Ok(Self::LexiconFix),
            other => Err(IngestError::InvalidCorrectionType(other.to_string())),
        }
    }
}

/// One edit applied to a line
///
/// `type` stays a string on the wire so records from other producers round-trip unchanged;
/// [`CorrectionRecord::kind`] checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrectionRecord {
    #[serde(rename = "type")]
    pub correction_type: String,
    pub token_ids: Vec<String>,
    pub original: String,
    pub corrected: String,
}

impl CorrectionRecord {
    #[must_use]
    pub fn new(
        kind: CorrectionKind,
        token_ids: Vec<String>,
        original: impl Into<String>,
        corrected: impl Into<String>,
    ) -> Self {
        Self {
            correction_type: kind.as_str().to_string(),
            token_ids,
            original: original.into(),
            corrected: corrected.into(),
        }
    }

    pub fn kind(&self) -> Result<CorrectionKind> {
        self.correction_type.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorrectedLine {
    pub line_id: String,
    pub token_ids: Vec<String>,
    pub original_text: String,
    pub text: String,
    #[serde(default)]
    pub corrections: Vec<CorrectionRecord>,
}

/// Something a reviewer must resolve before the text can be trusted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UncertaintyRecord {
    pub kind: String,
    pub token_ids: Vec<String>,
    #[serde(default)]
    pub detail: String,
}

pub trait LineReconstructor {
    fn reconstruct(
        &self,
        index: &EvidenceIndex<'_>,
        span_token_ids: &[String],
    ) -> Result<Vec<ReconstructedLine>>;
}

pub trait TextCorrector {
    fn correct(&self, lines: &[ReconstructedLine]) -> Result<Vec<CorrectedLine>>;
}

pub trait UncertaintyDetector {
    fn detect(&self, lines: &[CorrectedLine]) -> Result<Vec<UncertaintyRecord>>;
}

/// Collaborators that return previously recorded outputs verbatim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayCollaborators {
    #[serde(default)]
    pub reconstructed_lines: Vec<ReconstructedLine>,
    #[serde(default)]
    pub corrected_lines: Vec<CorrectedLine>,
    #[serde(default)]
    pub uncertainties: Vec<UncertaintyRecord>,
}

impl LineReconstructor for ReplayCollaborators {
    fn reconstruct(
        &self,
        _index: &EvidenceIndex<'_>,
        _span_token_ids: &[String],
    ) -> Result<Vec<ReconstructedLine>> {
        Ok(self.reconstructed_lines.clone())
    }
}

impl TextCorrector for ReplayCollaborators {
    fn correct(&self, _lines: &[ReconstructedLine]) -> Result<Vec<CorrectedLine>> {
        Ok(self.corrected_lines.clone())
    }
}

impl UncertaintyDetector for ReplayCollaborators {
    fn detect(&self, _lines: &[CorrectedLine]) -> Result<Vec<UncertaintyRecord>> {
        Ok(self.uncertainties.clone())
    }
}
