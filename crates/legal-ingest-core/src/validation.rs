//! Structural validation boundary
//!
//! Structural validity is decided outside the scoring core. The pipeline only sees the
//! [`StructuralValidator`] trait; [`PatternStructuralValidator`] is the reference
//! implementation used when no other validator is supplied.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::index::EvidenceIndex;
use crate::patterns::has_legal_pattern_signal;
use crate::spans::CandidateSpan;

/// Too many tokens in the span lack usable confidence
pub const LOW_CONFIDENCE_DENSITY: &str = "LOW_CONFIDENCE_DENSITY";
/// The span carries no metes-and-bounds signal at all
pub const NO_LEGAL_PATTERN: &str = "NO_LEGAL_PATTERN";
pub const EMPTY_SPAN: &str = "EMPTY_SPAN";

/// Candidate span with the structural verdict attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSpan {
    pub span: CandidateSpan,
    pub is_valid: bool,
    pub validation_failures: BTreeSet<String>,
}

impl ValidatedSpan {
    /// Verdict from a set of failure codes: valid iff there are none
    #[must_use]
    pub fn from_failures(span: CandidateSpan, validation_failures: BTreeSet<String>) -> Self {
        Self {
            span,
            is_valid: validation_failures.is_empty(),
            validation_failures,
        }
    }

    #[inline]
    #[must_use]
    pub fn has_failure(&self, code: &str) -> bool {
        self.validation_failures.contains(code)
    }
}

/// Decides whether a candidate span has the basic shape of a legal description
pub trait StructuralValidator {
    fn validate(&self, candidate: &CandidateSpan) -> Result<ValidatedSpan>;
}

impl<F> StructuralValidator for F
where
    F: Fn(&CandidateSpan) -> Result<ValidatedSpan>,
{
    fn validate(&self, candidate: &CandidateSpan) -> Result<ValidatedSpan> {
        self(candidate)
    }
}

/// Run a validator over every candidate, preserving order
pub fn validate_spans<V>(validator: &V, spans: &[CandidateSpan]) -> Result<Vec<ValidatedSpan>>
where
    V: StructuralValidator + ?Sized,
{
    spans.iter().map(|span| validator.validate(span)).collect()
}

/// Pattern- and confidence-based structural checks
pub struct PatternStructuralValidator<'i, 'a> {
    index: &'i EvidenceIndex<'a>,
    min_token_confidence: f64,
    max_low_confidence_ratio: f64,
}

impl<'i, 'a> PatternStructuralValidator<'i, 'a> {
    #[must_use]
    pub fn new(index: &'i EvidenceIndex<'a>, config: &PipelineConfig) -> Self {
        Self {
            index,
            min_token_confidence: config.min_token_confidence,
            max_low_confidence_ratio: config.low_confidence_ratio,
        }
    }
}

impl StructuralValidator for PatternStructuralValidator<'_, '_> {
    fn validate(&self, candidate: &CandidateSpan) -> Result<ValidatedSpan> {
        let mut failures = BTreeSet::new();
        if candidate.is_empty() {
            failures.insert(EMPTY_SPAN.to_string());
            return Ok(ValidatedSpan::from_failures(candidate.clone(), failures));
        }

        let tokens = candidate
            .token_ids
            .iter()
            .map(|token_id| self.index.lookup(token_id).map(|entry| entry.token))
            .collect::<Result<Vec<_>>>()?;

        if !has_legal_pattern_signal(&tokens) {
            failures.insert(NO_LEGAL_PATTERN.to_string());
        }

        let low = tokens
            .iter()
            .filter(|token| {
                token
                    .confidence
                    .map_or(true, |confidence| confidence < self.min_token_confidence)
            })
            .count();
        if low as f64 / tokens.len() as f64 > self.max_low_confidence_ratio {
            failures.insert(LOW_CONFIDENCE_DENSITY.to_string());
        }

        Ok(ValidatedSpan::from_failures(candidate.clone(), failures))
    }
}
