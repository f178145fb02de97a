//! End-to-end extraction over one evidence bundle

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::anchors::{detect_anchors, AnchorRecord};
use crate::audit::{build_selection_audit, SelectionAudit};
use crate::collaborators::{
    LineReconstructor, ReplayCollaborators, TextCorrector, UncertaintyDetector,
};
use crate::config::PipelineConfig;
use crate::contract::{
    validate_contract, ContractValidationResult, ExtractionFailure, FinalLegalDescription,
};
use crate::error::Result;
use crate::evidence::EvidenceBundle;
use crate::index::EvidenceIndex;
use crate::scoring::score_validated_spans;
use crate::selection::select_span;
use crate::spans::expand_candidate_spans;
use crate::trace::build_extraction_trace;
use crate::validation::{validate_spans, PatternStructuralValidator, StructuralValidator};
use crate::views::spatial_ordered_token_ids;

/// Everything besides the evidence that one extraction needs
pub struct ExtractionInputs<'c> {
    /// Upstream anchors; detected from `anchor_phrases` when `None`
    pub anchors: Option<&'c [AnchorRecord]>,
    /// Falls back to [`PatternStructuralValidator`] when `None`
    pub validator: Option<&'c dyn StructuralValidator>,
    pub reconstructor: &'c dyn LineReconstructor,
    pub corrector: &'c dyn TextCorrector,
    pub detector: &'c dyn UncertaintyDetector,
}

impl<'c> ExtractionInputs<'c> {
    /// Inputs that replay recorded collaborator outputs
    #[must_use]
    pub fn replay(collaborators: &'c ReplayCollaborators) -> Self {
        Self {
            anchors: None,
            validator: None,
            reconstructor: collaborators,
            corrector: collaborators,
            detector: collaborators,
        }
    }

    #[must_use]
    pub fn with_anchors(mut self, anchors: &'c [AnchorRecord]) -> Self {
        self.anchors = Some(anchors);
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: &'c dyn StructuralValidator) -> Self {
        self.validator = Some(validator);
        self
    }
}

/// Contract result plus the selection audit, which is kept even on FAIL
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub result: ContractValidationResult,
    pub audit: SelectionAudit,
}

/// Self-contained extraction case: evidence plus recorded collaborator outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionCase {
    pub bundle: EvidenceBundle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<Vec<AnchorRecord>>,
    #[serde(flatten)]
    pub collaborators: ReplayCollaborators,
}

impl ExtractionCase {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn run(&self, config: &PipelineConfig) -> Result<ExtractionOutcome> {
        let mut inputs = ExtractionInputs::replay(&self.collaborators);
        if let Some(anchors) = &self.anchors {
            inputs = inputs.with_anchors(anchors);
        }
        run_extraction(&self.bundle, &inputs, config)
    }

    /// Selection audit only, without the post-selection stages
    pub fn audit(&self, config: &PipelineConfig) -> Result<SelectionAudit> {
        config.validate()?;

        let index = EvidenceIndex::build(&self.bundle)?;
        let ordered = spatial_ordered_token_ids(&self.bundle);
        let validator = PatternStructuralValidator::new(&index, config);
        select_with_audit(&index, &ordered, self.anchors.as_deref(), &validator, config)
    }
}

/// Run every stage from evidence to contract result.
///
/// Business rejections come back as a FAIL result; `Err` means the inputs are inconsistent.
pub fn run_extraction(
    bundle: &EvidenceBundle,
    inputs: &ExtractionInputs<'_>,
    config: &PipelineConfig,
) -> Result<ExtractionOutcome> {
    config.validate()?;

    let index = EvidenceIndex::build(bundle)?;
    let ordered = spatial_ordered_token_ids(bundle);
    debug!(
        document_id = %bundle.document_id,
        tokens = index.len(),
        ordered = ordered.len(),
        "evidence indexed"
    );

    let default_validator = PatternStructuralValidator::new(&index, config);
    let validator: &dyn StructuralValidator = match inputs.validator {
        Some(validator) => validator,
        None => &default_validator,
    };
    let audit = select_with_audit(&index, &ordered, inputs.anchors, validator, config)?;

    let (description, trace, failure) = match audit.selection_result.selected_span() {
        Some(selected) => {
            let lines = inputs.reconstructor.reconstruct(&index, selected.token_ids())?;
            let corrected = inputs.corrector.correct(&lines)?;
            let uncertainties = inputs.detector.detect(&corrected)?;

            let text = corrected
                .iter()
                .map(|line| line.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let trace = build_extraction_trace(audit.clone(), lines, corrected, uncertainties);
            index.ensure_known(trace.referenced_token_ids())?;

            (Some(FinalLegalDescription::new(text)), Some(trace), None)
        }
        None => {
            let failure = ExtractionFailure::new(audit.decision_rule.as_str(), Vec::new());
            (None, None, Some(failure))
        }
    };

    let result = validate_contract(description, trace, failure)?;
    info!(
        document_id = %bundle.document_id,
        status = result.status(),
        decision_rule = %audit.decision_rule,
        reason = result.fail_reason().map(|r| r.as_str()).unwrap_or(""),
        "extraction finished"
    );

    Ok(ExtractionOutcome { result, audit })
}

fn select_with_audit(
    index: &EvidenceIndex<'_>,
    ordered: &[String],
    given_anchors: Option<&[AnchorRecord]>,
    validator: &dyn StructuralValidator,
    config: &PipelineConfig,
) -> Result<SelectionAudit> {
    let anchors = match given_anchors {
        Some(anchors) => {
            index.ensure_known(anchors.iter().flat_map(|anchor| &anchor.token_ids))?;
            anchors.to_vec()
        }
        None => detect_anchors(index, ordered, &config.anchor_phrases)?,
    };

    let candidates = expand_candidate_spans(index, ordered, &anchors, config)?;
    let validated = validate_spans(validator, &candidates)?;
    let scored = score_validated_spans(index, &validated, config)?;
    let selection = select_span(&scored, config);
    debug!(
        anchors = anchors.len(),
        candidates = candidates.len(),
        valid = validated.iter().filter(|span| span.is_valid).count(),
        "spans scored"
    );

    build_selection_audit(&scored, &selection)
}
