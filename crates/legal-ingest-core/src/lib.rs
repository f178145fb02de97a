//! # legal-ingest-core
//!
//! Extracts the legal description (the metes-and-bounds text of a deed) from OCR evidence
//! of a scanned document, or refuses to.
//!
//! ## Pipeline
//!
//! 1. [`index::EvidenceIndex`] maps every token id to its token and page statistics
//! 2. [`views::spatial_ordered_token_ids`] puts confident word tokens in reading order
//! 3. [`anchors`] supplies trigger phrases ("BEGINNING AT"), given or detected
//! 4. [`spans::expand_candidate_spans`] grows one candidate span per anchor
//! 5. A [`validation::StructuralValidator`] judges each span
//! 6. [`scoring::score_validated_spans`] and [`selection::select_span`] pick at most one
//! 7. [`audit`] and [`trace`] record how the decision was made
//! 8. [`contract::validate_contract`] produces the only two output shapes, PASS or FAIL
//!
//! ## Example
//!
//! ```rust,no_run
//! use legal_ingest_core::{ExtractionCase, PipelineConfig};
//!
//! let json = std::fs::read_to_string("case.json")?;
//! let case = ExtractionCase::from_json(&json)?;
//! let outcome = case.run(&PipelineConfig::from_env())?;
//! println!("{}", serde_json::to_string_pretty(&outcome.result)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A document without a usable description is a normal FAIL result. [`IngestError`] is
//! reserved for inputs that contradict themselves.

pub mod anchors;
pub mod audit;
pub mod collaborators;
pub mod config;
pub mod contract;
pub mod error;
pub mod evidence;
pub mod index;
pub mod patterns;
pub mod pipeline;
pub mod scoring;
pub mod selection;
pub mod spans;
pub mod trace;
pub mod validation;
pub mod views;

#[cfg(test)]
mod test_support;

pub use anchors::{detect_anchors, AnchorRecord};
pub use audit::{build_selection_audit, DecisionRule, SelectionAudit};
pub use collaborators::{
    CorrectedLine, CorrectionKind, CorrectionRecord, LineReconstructor, ReconstructedLine,
    ReplayCollaborators, TextCorrector, UncertaintyDetector, UncertaintyRecord,
};
pub use config::{PipelineConfig, ScoreWeights};
pub use contract::{
    validate_contract, ContractValidationResult, ExtractionFailure, FailReason,
    FinalLegalDescription,
};
pub use error::{IngestError, Result};
pub use evidence::{
    BBox, BlockType, EvidenceBundle, EvidenceSource, OcrBlock, OcrPage, OcrRun, OcrToken,
    TokenLevel,
};
pub use index::{EvidenceIndex, IndexedToken, PageStats};
pub use pipeline::{run_extraction, ExtractionCase, ExtractionInputs, ExtractionOutcome};
pub use scoring::{score_validated_spans, ScoreBreakdown, ScoredSpan};
pub use selection::{select_span, SelectionFailure, SelectionReason, SelectionResult};
pub use spans::{expand_candidate_spans, CandidateSpan};
pub use trace::{build_extraction_trace, ExtractionTrace};
pub use validation::{validate_spans, PatternStructuralValidator, StructuralValidator, ValidatedSpan};
pub use views::{spatial_ordered_token_ids, token_filter_view};
