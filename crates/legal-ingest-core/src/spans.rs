//! Candidate span expansion
//!
//! Each anchor grows one candidate span forward through the reading-order token sequence.
//! Growth stops at the next anchor, at page regressions or runaway page gaps, at confirmed
//! heading text, or once the recent appends are dominated by tokens without confidence.
//!
//! Heading suppression works on a small buffer: a non-empty all-uppercase word is held back
//! rather than appended. A second uppercase word adjacent to the buffered one (same line,
//! small horizontal gap) confirms heading text and ends the span before either token. Any
//! other token releases the buffer into the span.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::anchors::AnchorRecord;
use crate::config::{PipelineConfig, MAX_CONFIDENCE_WINDOW};
use crate::error::{IngestError, Result};
use crate::evidence::OcrToken;
use crate::index::EvidenceIndex;
use crate::views::positions;

/// Contiguous run of tokens grown from one anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpan {
    pub anchor: AnchorRecord,
    pub start_token_id: String,
    pub end_token_id: String,
    pub token_ids: Vec<String>,
    pub page_start: u32,
    pub page_end: u32,
}

impl CandidateSpan {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }
}

/// Why expansion of one span ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Exhausted,
    AnchorCollision,
    PageRegression,
    PageGap,
    HeadingConfirmed,
    LowConfidenceDensity,
}

impl StopReason {
    /// Stops that discard a pending heading buffer instead of releasing it
    fn drops_buffer(self) -> bool {
        matches!(self, Self::AnchorCollision | Self::HeadingConfirmed)
    }
}

/// Sliding record of whether recent appends lacked a confidence value
struct ConfidenceWindow {
    absent: VecDeque<bool>,
    size: usize,
    max_ratio: f64,
}

impl ConfidenceWindow {
    fn new(config: &PipelineConfig) -> Self {
        Self {
            absent: VecDeque::with_capacity(config.confidence_window.min(MAX_CONFIDENCE_WINDOW)),
            size: config.confidence_window,
            max_ratio: config.low_confidence_ratio,
        }
    }

    /// Record the token and report whether it may still be appended
    fn admit(&mut self, token: &OcrToken) -> bool {
        self.absent.push_back(!token.has_confidence());
        if self.absent.len() > self.size {
            self.absent.pop_front();
        }
        if self.absent.len() < self.size {
            return true;
        }
        let absent = self.absent.iter().filter(|flag| **flag).count() as f64;
        absent / self.absent.len() as f64 <= self.max_ratio
    }
}

/// Uppercase tokens held back until they prove to be body text
#[derive(Default)]
struct HeadingBuffer<'a> {
    tokens: Vec<&'a OcrToken>,
    page_number: u32,
}

impl<'a> HeadingBuffer<'a> {
    fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn restart(&mut self, token: &'a OcrToken, page_number: u32) {
        self.tokens.clear();
        self.tokens.push(token);
        self.page_number = page_number;
    }

    /// Same line as the first buffered token and close to the right edge of the last one
    fn is_adjacent(&self, token: &OcrToken, vertical_tol: f64, horizontal_tol: f64) -> bool {
        let (Some(first), Some(prev)) = (self.tokens.first(), self.tokens.last()) else {
            return false;
        };
        (token.bbox.y0 - first.bbox.y0).abs() <= vertical_tol
            && token.bbox.x0 - prev.bbox.x1 <= horizontal_tol
    }
}

/// Token ids accepted into the span so far
struct SpanBuilder {
    token_ids: Vec<String>,
    window: ConfidenceWindow,
    halted: bool,
}

impl SpanBuilder {
    fn new(config: &PipelineConfig) -> Self {
        Self {
            token_ids: Vec::new(),
            window: ConfidenceWindow::new(config),
            halted: false,
        }
    }

    /// Append through the confidence-density check; a rejection halts the span for good
    fn append(&mut self, token: &OcrToken) -> bool {
        if self.halted {
            return false;
        }
        if !self.window.admit(token) {
            self.halted = true;
            return false;
        }
        self.token_ids.push(token.token_id.clone());
        true
    }

    /// Release buffered tokens as ordinary content
    fn flush(&mut self, buffer: &mut HeadingBuffer<'_>) -> bool {
        let released = std::mem::take(&mut buffer.tokens);
        released.into_iter().all(|token| self.append(token))
    }
}

/// Non-empty word whose cased characters are all uppercase
#[must_use]
pub fn is_heading_candidate(token: &OcrToken) -> bool {
    if !token.is_word() || token.text.trim().is_empty() {
        return false;
    }
    let mut cased = false;
    for c in token.text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Grow one candidate span per anchor.
///
/// Anchors without tokens are skipped. An anchor whose last token is missing from
/// `ordered_token_ids`, or any token id unknown to `index`, is an integrity fault.
pub fn expand_candidate_spans(
    index: &EvidenceIndex<'_>,
    ordered_token_ids: &[String],
    anchors: &[AnchorRecord],
    config: &PipelineConfig,
) -> Result<Vec<CandidateSpan>> {
    let ordered_index = positions(ordered_token_ids);
    let anchor_starts: HashSet<&str> = anchors
        .iter()
        .filter_map(AnchorRecord::first_token_id)
        .collect();

    let mut spans = Vec::new();

    for anchor in anchors {
        let Some(last_anchor_id) = anchor.last_token_id() else {
            warn!(phrase = %anchor.phrase, "skipping anchor without tokens");
            continue;
        };
        let anchor_pos = *ordered_index
            .get(last_anchor_id)
            .ok_or_else(|| IngestError::AnchorNotOrdered(last_anchor_id.to_string()))?;
        let anchor_page = index.lookup(last_anchor_id)?.page_number;

        let (token_ids, stop) = grow_span(
            index,
            &ordered_token_ids[anchor_pos + 1..],
            &anchor_starts,
            anchor_page,
            config,
        )?;

        debug!(
            anchor = %last_anchor_id,
            tokens = token_ids.len(),
            stop = ?stop,
            "candidate span expanded"
        );

        let (Some(start_token_id), Some(end_token_id)) =
            (token_ids.first().cloned(), token_ids.last().cloned())
        else {
            continue;
        };
        let page_start = index.lookup(&start_token_id)?.page_number;
        let page_end = index.lookup(&end_token_id)?.page_number;

        spans.push(CandidateSpan {
            anchor: anchor.clone(),
            start_token_id,
            end_token_id,
            token_ids,
            page_start,
            page_end,
        });
    }

    Ok(spans)
}

fn grow_span<'a>(
    index: &EvidenceIndex<'a>,
    following: &[String],
    anchor_starts: &HashSet<&str>,
    anchor_page: u32,
    config: &PipelineConfig,
) -> Result<(Vec<String>, StopReason)> {
    let mut builder = SpanBuilder::new(config);
    let mut buffer = HeadingBuffer::default();
    let mut last_page_seen = anchor_page;
    let mut stop = StopReason::Exhausted;

    for token_id in following {
        if anchor_starts.contains(token_id.as_str()) {
            stop = StopReason::AnchorCollision;
            break;
        }

        let entry = index.lookup(token_id)?;
        let token = entry.token;
        let page_number = entry.page_number;

        if page_number < last_page_seen {
            stop = StopReason::PageRegression;
            break;
        }
        last_page_seen = page_number;
        if page_number > anchor_page.saturating_add(config.max_page_lookahead) {
            stop = StopReason::PageGap;
            break;
        }

        if is_heading_candidate(token) {
            let Some(stats) = index.page_stats(page_number) else {
                if !builder.flush(&mut buffer) {
                    stop = StopReason::LowConfidenceDensity;
                    break;
                }
                buffer.restart(token, page_number);
                continue;
            };

            if !buffer.is_empty() && buffer.page_number != page_number && !builder.flush(&mut buffer)
            {
                stop = StopReason::LowConfidenceDensity;
                break;
            }

            if buffer.is_empty() {
                buffer.restart(token, page_number);
                continue;
            }

            let vertical_tol = config.vertical_tolerance(stats.median_token_height);
            let horizontal_tol = config.horizontal_tolerance(stats.median_char_width);
            if buffer.is_adjacent(token, vertical_tol, horizontal_tol) {
                buffer.tokens.push(token);
                if buffer.tokens.len() >= 2 {
                    stop = StopReason::HeadingConfirmed;
                    break;
                }
                continue;
            }

            if !builder.flush(&mut buffer) {
                stop = StopReason::LowConfidenceDensity;
                break;
            }
            buffer.restart(token, page_number);
            continue;
        }

        if !builder.flush(&mut buffer) || !builder.append(token) {
            stop = StopReason::LowConfidenceDensity;
            break;
        }
    }

    if !stop.drops_buffer() && !buffer.is_empty() && !builder.flush(&mut buffer) {
        stop = StopReason::LowConfidenceDensity;
    }

    Ok((builder.token_ids, stop))
}
