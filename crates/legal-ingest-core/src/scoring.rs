//! Heuristic scoring of validated spans
//!
//! Every span is scored, valid or not; filtering on validity is the selector's job. The
//! breakdown keeps the four weighted terms exactly as they were summed so a score can be
//! audited after the fact.

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::index::EvidenceIndex;
use crate::validation::{ValidatedSpan, LOW_CONFIDENCE_DENSITY};

/// Weighted score components; their sum (clamped) is the span score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    #[serde(rename = "LENGTH_SCORE")]
    pub length: f64,
    #[serde(rename = "CONFIDENCE_SCORE")]
    pub confidence: f64,
    #[serde(rename = "DENSITY_SCORE")]
    pub density: f64,
    #[serde(rename = "STRUCTURAL_SCORE")]
    pub structural: f64,
}

impl ScoreBreakdown {
    #[inline]
    #[must_use]
    pub fn total(&self) -> f64 {
        self.length + self.confidence + self.density + self.structural
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSpan {
    pub validated: ValidatedSpan,
    /// Clamped to 0.0-1.0
    pub score: f64,
    pub score_breakdown: ScoreBreakdown,
}

impl ScoredSpan {
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validated.is_valid
    }

    #[inline]
    #[must_use]
    pub fn token_ids(&self) -> &[String] {
        &self.validated.span.token_ids
    }
}

/// Score each span in input order.
pub fn score_validated_spans(
    index: &EvidenceIndex<'_>,
    spans: &[ValidatedSpan],
    config: &PipelineConfig,
) -> Result<Vec<ScoredSpan>> {
    spans
        .iter()
        .map(|validated| score_span(index, validated, config))
        .collect()
}

fn score_span(
    index: &EvidenceIndex<'_>,
    validated: &ValidatedSpan,
    config: &PipelineConfig,
) -> Result<ScoredSpan> {
    let token_ids = &validated.span.token_ids;
    let weights = &config.weights;

    let length_score = if token_ids.is_empty() {
        0.0
    } else {
        (token_ids.len() as f64 / config.length_normalizer as f64).min(1.0)
    };
    let confidence_score = confidence_fraction(index, token_ids)?;
    let density_score = if validated.has_failure(LOW_CONFIDENCE_DENSITY) {
        0.0
    } else {
        1.0
    };
    let structural_score = if validated.is_valid { 1.0 } else { 0.0 };

    let score_breakdown = ScoreBreakdown {
        length: weights.length * length_score,
        confidence: weights.confidence * confidence_score,
        density: weights.density * density_score,
        structural: weights.structural * structural_score,
    };

    Ok(ScoredSpan {
        validated: validated.clone(),
        score: score_breakdown.total().clamp(0.0, 1.0),
        score_breakdown,
    })
}

/// Share of tokens that carry a confidence value; unknown ids are an integrity fault
fn confidence_fraction(index: &EvidenceIndex<'_>, token_ids: &[String]) -> Result<f64> {
    if token_ids.is_empty() {
        return Ok(0.0);
    }
    let mut present = 0usize;
    for token_id in token_ids {
        if index.lookup(token_id)?.token.has_confidence() {
            present += 1;
        }
    }
    Ok(present as f64 / token_ids.len() as f64)
}
