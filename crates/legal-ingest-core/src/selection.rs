//! Single-winner span selection

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::scoring::ScoredSpan;

/// Why a span was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionReason {
    SingleTopScore,
}

impl SelectionReason {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SingleTopScore => "SINGLE_TOP_SCORE",
        }
    }
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why no span was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionFailure {
    NoValidSpans,
    ScoreTooLow,
    AmbiguousTopScore,
}

impl SelectionFailure {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoValidSpans => "NO_VALID_SPANS",
            Self::ScoreTooLow => "SCORE_TOO_LOW",
            Self::AmbiguousTopScore => "AMBIGUOUS_TOP_SCORE",
        }
    }
}

impl std::fmt::Display for SelectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`select_span`]
///
/// Built through [`SelectionResult::selected`] or [`SelectionResult::rejected`] only, so a
/// selected span always comes with a reason and a rejection always with a failure reason.
/// Deserialized values are not checked here; the audit builder checks them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    selected: Option<ScoredSpan>,
    reason: Option<SelectionReason>,
    failure_reason: Option<SelectionFailure>,
}

impl SelectionResult {
    #[must_use]
    pub fn selected(span: ScoredSpan, reason: SelectionReason) -> Self {
        Self {
            selected: Some(span),
            reason: Some(reason),
            failure_reason: None,
        }
    }

    #[must_use]
    pub fn rejected(failure: SelectionFailure) -> Self {
        Self {
            selected: None,
            reason: None,
            failure_reason: Some(failure),
        }
    }

    #[inline]
    #[must_use]
    pub fn selected_span(&self) -> Option<&ScoredSpan> {
        self.selected.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn reason(&self) -> Option<SelectionReason> {
        self.reason
    }

    #[inline]
    #[must_use]
    pub fn failure_reason(&self) -> Option<SelectionFailure> {
        self.failure_reason
    }

    /// Exactly one of `reason` / `failure_reason`, and a span iff `reason`
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match (&self.selected, self.reason, self.failure_reason) {
            (Some(_), Some(_), None) | (None, None, Some(_)) => true,
            _ => false,
        }
    }
}

/// Pick the single highest-scoring valid span.
///
/// The score floor is checked before the tie-break, so a tie below the threshold reports
/// `SCORE_TOO_LOW`. Ties are exact float equality.
#[must_use]
pub fn select_span(spans: &[ScoredSpan], config: &PipelineConfig) -> SelectionResult {
    let valid: Vec<&ScoredSpan> = spans.iter().filter(|span| span.is_valid()).collect();

    let Some(max_score) = valid
        .iter()
        .map(|span| span.score)
        .max_by(|a, b| a.total_cmp(b))
    else {
        debug!(candidates = spans.len(), "no valid spans");
        return SelectionResult::rejected(SelectionFailure::NoValidSpans);
    };

    if max_score < config.selection_threshold {
        debug!(max_score, threshold = config.selection_threshold, "top score below threshold");
        return SelectionResult::rejected(SelectionFailure::ScoreTooLow);
    }

    let top: Vec<&ScoredSpan> = valid
        .into_iter()
        .filter(|span| span.score == max_score)
        .collect();

    match top.as_slice() {
        [winner] => {
            debug!(score = max_score, start = %winner.validated.span.start_token_id, "span selected");
            SelectionResult::selected((*winner).clone(), SelectionReason::SingleTopScore)
        }
        _ => {
            debug!(score = max_score, tied = top.len(), "ambiguous top score");
            SelectionResult::rejected(SelectionFailure::AmbiguousTopScore)
        }
    }
}
