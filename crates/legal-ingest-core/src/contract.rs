//! Output contract: the only two shapes a caller ever receives
//!
//! ```json
//! {"status":"PASS","final_description":{"text":"..."},"trace":{...}}
//! {"status":"FAIL","final_description":null,"trace":null,"reason":"SCORE_TOO_LOW"}
//! ```
//!
//! [`validate_contract`] maps the pipeline's raw outputs (a description, a trace, or an
//! explicit failure signal) onto one of those shapes. Malformed combinations become FAIL
//! outcomes; malformed trace contents are integrity faults and come back as `Err`.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::collaborators::UncertaintyRecord;
use crate::error::{IngestError, Result};
use crate::trace::ExtractionTrace;

pub const FAIL_STATUS: &str = "FAIL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinalLegalDescription {
    pub text: String,
}

impl FinalLegalDescription {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Explicit failure signal raised upstream of the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionFailure {
    pub status: String,
    pub reason: String,
    pub uncertainties: Option<Vec<UncertaintyRecord>>,
}

impl ExtractionFailure {
    #[must_use]
    pub fn new(reason: impl Into<String>, uncertainties: Vec<UncertaintyRecord>) -> Self {
        Self {
            status: FAIL_STATUS.to_string(),
            reason: reason.into(),
            uncertainties: Some(uncertainties),
        }
    }
}

/// FAIL reason codes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailReason {
    InvalidOutcomeCombination,
    MissingTrace,
    EmptyFinalText,
    MissingSelectedSpanTokens,
    UncertaintiesPresent,
    InvalidFailureStatus,
    EmptyFailureReason,
    MissingFailureUncertainties,
    /// Reason carried by a well-formed upstream failure signal
    Upstream(String),
}

impl FailReason {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidOutcomeCombination => "INVALID_OUTCOME_COMBINATION",
            Self::MissingTrace => "MISSING_TRACE",
            Self::EmptyFinalText => "EMPTY_FINAL_TEXT",
            Self::MissingSelectedSpanTokens => "MISSING_SELECTED_SPAN_TOKENS",
            Self::UncertaintiesPresent => "UNCERTAINTIES_PRESENT",
            Self::InvalidFailureStatus => "INVALID_FAILURE_STATUS",
            Self::EmptyFailureReason => "EMPTY_FAILURE_REASON",
            Self::MissingFailureUncertainties => "MISSING_FAILURE_UNCERTAINTIES",
            Self::Upstream(reason) => reason,
        }
    }
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FailReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// PASS xor FAIL
#[derive(Debug, Clone, PartialEq)]
pub enum ContractValidationResult {
    Pass {
        final_description: FinalLegalDescription,
        trace: ExtractionTrace,
    },
    Fail {
        reason: FailReason,
    },
}

impl ContractValidationResult {
    #[inline]
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> &'static str {
        match self {
            Self::Pass { .. } => "PASS",
            Self::Fail { .. } => FAIL_STATUS,
        }
    }

    #[must_use]
    pub fn fail_reason(&self) -> Option<&FailReason> {
        match self {
            Self::Pass { .. } => None,
            Self::Fail { reason } => Some(reason),
        }
    }

    fn fail(reason: FailReason) -> Self {
        Self::Fail { reason }
    }
}

impl Serialize for ContractValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Pass {
                final_description,
                trace,
            } => {
                let mut state = serializer.serialize_struct("ContractValidationResult", 3)?;
                state.serialize_field("status", "PASS")?;
                state.serialize_field("final_description", final_description)?;
                state.serialize_field("trace", trace)?;
                state.end()
            }
            Self::Fail { reason } => {
                let mut state = serializer.serialize_struct("ContractValidationResult", 4)?;
                state.serialize_field("status", FAIL_STATUS)?;
                state.serialize_field("final_description", &None::<FinalLegalDescription>)?;
                state.serialize_field("trace", &None::<ExtractionTrace>)?;
                state.serialize_field("reason", reason)?;
                state.end()
            }
        }
    }
}

/// Map raw pipeline outputs onto the output contract.
///
/// Checks run in a fixed order and the first hit decides the FAIL reason. A description with
/// a complete trace passes only after every correction type is allowed and every correction
/// and uncertainty references at least one token; violations there are returned as `Err`.
pub fn validate_contract(
    final_description: Option<FinalLegalDescription>,
    trace: Option<ExtractionTrace>,
    failure: Option<ExtractionFailure>,
) -> Result<ContractValidationResult> {
    use ContractValidationResult as Outcome;

    match (final_description, trace, failure) {
        (None, None, None) | (Some(_), _, Some(_)) => {
            Ok(Outcome::fail(FailReason::InvalidOutcomeCombination))
        }
        (Some(_), None, None) => Ok(Outcome::fail(FailReason::MissingTrace)),
        (Some(description), Some(trace), None) => {
            if description.text.trim().is_empty() {
                return Ok(Outcome::fail(FailReason::EmptyFinalText));
            }
            if trace.selected_span_token_ids.is_empty() {
                return Ok(Outcome::fail(FailReason::MissingSelectedSpanTokens));
            }
            if !trace.uncertainties.is_empty() {
                return Ok(Outcome::fail(FailReason::UncertaintiesPresent));
            }
            validate_trace_records(&trace)?;
            Ok(Outcome::Pass {
                final_description: description,
                trace,
            })
        }
        (None, None, Some(failure)) => Ok(Outcome::fail(failure_reason(failure))),
        (None, Some(_), _) => Ok(Outcome::fail(FailReason::InvalidOutcomeCombination)),
    }
}

fn failure_reason(failure: ExtractionFailure) -> FailReason {
    if failure.status != FAIL_STATUS {
        FailReason::InvalidFailureStatus
    } else if failure.reason.is_empty() {
        FailReason::EmptyFailureReason
    } else if failure.uncertainties.is_none() {
        FailReason::MissingFailureUncertainties
    } else {
        FailReason::Upstream(failure.reason)
    }
}

fn validate_trace_records(trace: &ExtractionTrace) -> Result<()> {
    for correction in &trace.corrections {
        correction.kind()?;
        if correction.token_ids.is_empty() {
            return Err(IngestError::MissingCorrectionTokens);
        }
    }
    if trace.uncertainties.iter().any(|u| u.token_ids.is_empty()) {
        return Err(IngestError::MissingUncertaintyTokens);
    }
    Ok(())
}
