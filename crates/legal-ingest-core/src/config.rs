//! Policy constants for span expansion, scoring, and selection
//!
//! Every threshold the pipeline applies lives here so it can be tuned without touching the
//! algorithms. Defaults reproduce the production policy.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Number of most recent appends inspected by the confidence-density stop
pub const DEFAULT_CONFIDENCE_WINDOW: usize = 20;

/// Share of absent-confidence appends in a full window that halts expansion
pub const DEFAULT_LOW_CONFIDENCE_RATIO: f64 = 0.30;

/// Pages a span may run past its anchor page
pub const DEFAULT_MAX_PAGE_LOOKAHEAD: u32 = 3;

/// Minimum vertical tolerance (pixels) for heading adjacency
pub const DEFAULT_HEADING_VERTICAL_FLOOR: f64 = 3.0;

/// Vertical tolerance as a fraction of the page's median token height
pub const DEFAULT_HEADING_VERTICAL_FACTOR: f64 = 0.25;

/// Horizontal tolerance as a multiple of the page's median character width
pub const DEFAULT_HEADING_HORIZONTAL_FACTOR: f64 = 1.5;

/// Minimum horizontal tolerance (pixels) for heading adjacency
pub const DEFAULT_HEADING_HORIZONTAL_FLOOR: f64 = 15.0;

/// Token count at which the length component saturates
pub const DEFAULT_LENGTH_NORMALIZER: usize = 200;

/// Minimum top score a span needs to be selected
pub const DEFAULT_SELECTION_THRESHOLD: f64 = 0.60;

/// Largest accepted `confidence_window`
pub const MAX_CONFIDENCE_WINDOW: usize = 10_000;

/// Confidence (0-100) below which the structural validator counts a token as low confidence
pub const DEFAULT_MIN_TOKEN_CONFIDENCE: f64 = 50.0;

/// Weights applied to the four score components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub length: f64,
    pub confidence: f64,
    pub density: f64,
    pub structural: f64,
}

impl Default for ScoreWeights {
    #[inline]
    fn default() -> Self {
        Self {
            length: 0.30,
            confidence: 0.30,
            density: 0.20,
            structural: 0.20,
        }
    }
}

/// Configuration for the extraction pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sliding window size for the confidence-density stop
    pub confidence_window: usize,

    /// Absent-confidence share (0.0-1.0) that rejects an append once the window is full
    pub low_confidence_ratio: f64,

    /// Maximum pages a span may extend beyond its anchor page
    pub max_page_lookahead: u32,

    pub heading_vertical_floor: f64,
    pub heading_vertical_factor: f64,
    pub heading_horizontal_factor: f64,
    pub heading_horizontal_floor: f64,

    /// Token count at which `LENGTH_SCORE` reaches its full weight
    pub length_normalizer: usize,

    pub weights: ScoreWeights,

    /// Top scores below this threshold fail with `SCORE_TOO_LOW`
    pub selection_threshold: f64,

    /// Used by the pattern structural validator only
    pub min_token_confidence: f64,

    /// Trigger phrases for anchor detection when a case carries no anchors
    pub anchor_phrases: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_window: DEFAULT_CONFIDENCE_WINDOW,
            low_confidence_ratio: DEFAULT_LOW_CONFIDENCE_RATIO,
            max_page_lookahead: DEFAULT_MAX_PAGE_LOOKAHEAD,
            heading_vertical_floor: DEFAULT_HEADING_VERTICAL_FLOOR,
            heading_vertical_factor: DEFAULT_HEADING_VERTICAL_FACTOR,
            heading_horizontal_factor: DEFAULT_HEADING_HORIZONTAL_FACTOR,
            heading_horizontal_floor: DEFAULT_HEADING_HORIZONTAL_FLOOR,
            length_normalizer: DEFAULT_LENGTH_NORMALIZER,
            weights: ScoreWeights::default(),
            selection_threshold: DEFAULT_SELECTION_THRESHOLD,
            min_token_confidence: DEFAULT_MIN_TOKEN_CONFIDENCE,
            anchor_phrases: vec!["BEGINNING AT".to_string(), "COMMENCING AT".to_string()],
        }
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables (unset or unparsable values keep the default):
    /// - `LEGAL_INGEST_CONFIDENCE_WINDOW`
    /// - `LEGAL_INGEST_LOW_CONFIDENCE_RATIO`
    /// - `LEGAL_INGEST_MAX_PAGE_LOOKAHEAD`
    /// - `LEGAL_INGEST_SELECTION_THRESHOLD`
    /// - `LEGAL_INGEST_MIN_TOKEN_CONFIDENCE`
    #[must_use = "creates config from environment variables"]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            confidence_window: env_or("LEGAL_INGEST_CONFIDENCE_WINDOW", defaults.confidence_window),
            low_confidence_ratio: env_or(
                "LEGAL_INGEST_LOW_CONFIDENCE_RATIO",
                defaults.low_confidence_ratio,
            ),
            max_page_lookahead: env_or(
                "LEGAL_INGEST_MAX_PAGE_LOOKAHEAD",
                defaults.max_page_lookahead,
            ),
            selection_threshold: env_or(
                "LEGAL_INGEST_SELECTION_THRESHOLD",
                defaults.selection_threshold,
            ),
            min_token_confidence: env_or(
                "LEGAL_INGEST_MIN_TOKEN_CONFIDENCE",
                defaults.min_token_confidence,
            ),
            ..defaults
        }
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the algorithms cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.confidence_window == 0 {
            return Err(IngestError::InvalidConfig(
                "confidence_window must be at least 1".to_string(),
            ));
        }
        if self.confidence_window > MAX_CONFIDENCE_WINDOW {
            return Err(IngestError::InvalidConfig(format!(
                "confidence_window must be at most {MAX_CONFIDENCE_WINDOW} (got {})",
                self.confidence_window
            )));
        }
        if !(0.0..=1.0).contains(&self.low_confidence_ratio) {
            return Err(IngestError::InvalidConfig(format!(
                "low_confidence_ratio must be within 0.0-1.0 (got {})",
                self.low_confidence_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.selection_threshold) {
            return Err(IngestError::InvalidConfig(format!(
                "selection_threshold must be within 0.0-1.0 (got {})",
                self.selection_threshold
            )));
        }
        if self.length_normalizer == 0 {
            return Err(IngestError::InvalidConfig(
                "length_normalizer must be at least 1".to_string(),
            ));
        }
        let w = &self.weights;
        if [w.length, w.confidence, w.density, w.structural]
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(IngestError::InvalidConfig(
                "score weights must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Vertical distance within which a token still joins a heading run
    #[inline]
    #[must_use]
    pub fn vertical_tolerance(&self, median_token_height: f64) -> f64 {
        self.heading_vertical_floor
            .max(self.heading_vertical_factor * median_token_height)
    }

    /// Horizontal gap within which a token still joins a heading run
    #[inline]
    #[must_use]
    pub fn horizontal_tolerance(&self, median_char_width: f64) -> f64 {
        (self.heading_horizontal_factor * median_char_width).max(self.heading_horizontal_floor)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
