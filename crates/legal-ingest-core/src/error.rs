//! Integrity faults raised by the extraction pipeline.
//!
//! Business rejections (a document that simply has no usable legal description) are never
//! errors: they travel as [`crate::contract::FailReason`] codes inside a FAIL outcome.
//! The variants here mean the inputs are internally inconsistent, e.g. a span refers to a
//! token the evidence bundle never produced. Callers must not turn these into FAIL outcomes.

use thiserror::Error;

/// Integrity faults for legal description extraction.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A span, anchor, or trace line references a token id missing from the evidence bundle.
    #[error("token id not found in evidence bundle: {0}")]
    UnknownToken(String),

    /// The same token id appears twice in one evidence bundle.
    #[error("duplicate token id in evidence bundle: {0}")]
    DuplicateToken(String),

    /// The last token of an anchor is absent from the reading-order view.
    #[error("anchor token id not found in ordered token list: {0}")]
    AnchorNotOrdered(String),

    /// A selection result produced a decision rule outside the tracked set.
    #[error("invalid decision rule: {0}")]
    InvalidDecisionRule(String),

    /// A correction record carries a type outside the allowed set.
    #[error("invalid correction type: {0}")]
    InvalidCorrectionType(String),

    /// A correction record has no token ids.
    #[error("correction record has no token ids")]
    MissingCorrectionTokens,

    /// An uncertainty record has no token ids.
    #[error("uncertainty record has no token ids")]
    MissingUncertaintyTokens,

    /// Pipeline configuration holds an unusable value.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, IngestError>;
