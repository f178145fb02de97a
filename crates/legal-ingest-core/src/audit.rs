//! Selection audit: every scored span plus the rule that decided the outcome

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};
use crate::scoring::ScoredSpan;
use crate::selection::{SelectionFailure, SelectionReason, SelectionResult};

/// Rule that decided a selection, positive or negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionRule {
    NoValidSpans,
    ScoreTooLow,
    AmbiguousTopScore,
    SingleTopScore,
}

impl DecisionRule {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoValidSpans => "NO_VALID_SPANS",
            Self::ScoreTooLow => "SCORE_TOO_LOW",
            Self::AmbiguousTopScore => "AMBIGUOUS_TOP_SCORE",
            Self::SingleTopScore => "SINGLE_TOP_SCORE",
        }
    }
}

impl fmt::Display for DecisionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionRule {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NO_VALID_SPANS" => Ok(Self::NoValidSpans),
            "SCORE_TOO_LOW" => Ok(Self::ScoreTooLow),
            "AMBIGUOUS_TOP_SCORE" => Ok(Self::AmbiguousTopScore),
            "SINGLE_TOP_SCORE" => Ok(Self::SingleTopScore),
            other => Err(IngestError::InvalidDecisionRule(other.to_string())),
        }
    }
}

impl From<SelectionFailure> for DecisionRule {
    fn from(failure: SelectionFailure) -> Self {
        match failure {
            SelectionFailure::NoValidSpans => Self::NoValidSpans,
            SelectionFailure::ScoreTooLow => Self::ScoreTooLow,
            SelectionFailure::AmbiguousTopScore => Self::AmbiguousTopScore,
        }
    }
}

impl From<SelectionReason> for DecisionRule {
    fn from(reason: SelectionReason) -> Self {
        match reason {
            SelectionReason::SingleTopScore => Self::SingleTopScore,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionAudit {
    pub all_scored_spans: Vec<ScoredSpan>,
    pub selection_result: SelectionResult,
    pub decision_rule: DecisionRule,
}

/// Record the full scoring picture behind a selection.
///
/// The decision rule is the failure reason when present, otherwise the positive reason. A
/// result that carries neither, or both, or a span without a reason is rejected.
pub fn build_selection_audit(
    spans: &[ScoredSpan],
    result: &SelectionResult,
) -> Result<SelectionAudit> {
    if !result.is_consistent() {
        return Err(IngestError::InvalidDecisionRule(format!(
            "inconsistent selection result (selected: {}, reason: {:?}, failure_reason: {:?})",
            result.selected_span().is_some(),
            result.reason(),
            result.failure_reason(),
        )));
    }

    let decision_rule = match (result.failure_reason(), result.reason()) {
        (Some(failure), _) => DecisionRule::from(failure),
        (None, Some(reason)) => DecisionRule::from(reason),
        (None, None) => return Err(IngestError::InvalidDecisionRule("none".to_string())),
    };

    Ok(SelectionAudit {
        all_scored_spans: spans.to_vec(),
        selection_result: result.clone(),
        decision_rule,
    })
}
