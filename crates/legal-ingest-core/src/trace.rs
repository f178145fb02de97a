//! Extraction trace: everything needed to audit a produced legal description

use serde::{Deserialize, Serialize};

use crate::audit::SelectionAudit;
use crate::collaborators::{CorrectedLine, CorrectionRecord, ReconstructedLine, UncertaintyRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionTrace {
    pub selected_span_token_ids: Vec<String>,
    pub reconstructed_lines: Vec<ReconstructedLine>,
    pub corrected_lines: Vec<CorrectedLine>,
    /// Every corrected line's corrections, in line order
    pub corrections: Vec<CorrectionRecord>,
    pub uncertainties: Vec<UncertaintyRecord>,
    pub selection_audit: SelectionAudit,
}

impl ExtractionTrace {
    /// Every token id the trace refers to, selected span first
    pub fn referenced_token_ids(&self) -> impl Iterator<Item = &String> + '_ {
        self.selected_span_token_ids
            .iter()
            .chain(self.reconstructed_lines.iter().flat_map(|l| &l.token_ids))
            .chain(self.corrected_lines.iter().flat_map(|l| &l.token_ids))
            .chain(self.corrections.iter().flat_map(|c| &c.token_ids))
            .chain(self.uncertainties.iter().flat_map(|u| &u.token_ids))
    }
}

#[must_use]
pub fn build_extraction_trace(
    audit: SelectionAudit,
    reconstructed_lines: Vec<ReconstructedLine>,
    corrected_lines: Vec<CorrectedLine>,
    uncertainties: Vec<UncertaintyRecord>,
) -> ExtractionTrace {
    let selected_span_token_ids = audit
        .selection_result
        .selected_span()
        .map(|span| span.token_ids().to_vec())
        .unwrap_or_default();

    let corrections = corrected_lines
        .iter()
        .flat_map(|line| line.corrections.iter().cloned())
        .collect();

    ExtractionTrace {
        selected_span_token_ids,
        reconstructed_lines,
        corrected_lines,
        corrections,
        uncertainties,
        selection_audit: audit,
    }
}
