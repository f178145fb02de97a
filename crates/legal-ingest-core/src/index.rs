//! Token lookup and per-page layout statistics over an evidence bundle

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{IngestError, Result};
use crate::evidence::{EvidenceBundle, OcrToken};

/// Median geometry of the word tokens on one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PageStats {
    pub median_token_height: f64,
    pub median_char_width: f64,
}

/// A token borrowed from the bundle together with its page
#[derive(Debug, Clone, Copy)]
pub struct IndexedToken<'a> {
    pub token: &'a OcrToken,
    pub page_number: u32,
}

/// O(1) token lookup plus layout statistics, borrowed from one [`EvidenceBundle`]
#[derive(Debug)]
pub struct EvidenceIndex<'a> {
    tokens: HashMap<&'a str, IndexedToken<'a>>,
    page_stats: BTreeMap<u32, PageStats>,
}

impl<'a> EvidenceIndex<'a> {
    /// Index every token of every run.
    ///
    /// Statistics are taken over word-level tokens with non-empty text. Pages without any
    /// such token still get an entry, with zero-valued statistics.
    pub fn build(bundle: &'a EvidenceBundle) -> Result<Self> {
        let mut tokens = HashMap::new();
        // Per page: token heights, then per-character widths
        let mut samples: BTreeMap<u32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

        for page in bundle.pages() {
            let (heights, char_widths) = samples.entry(page.page_number).or_default();

            for token in &page.tokens {
                let entry = IndexedToken {
                    token,
                    page_number: page.page_number,
                };
                if tokens.insert(token.token_id.as_str(), entry).is_some() {
                    return Err(IngestError::DuplicateToken(token.token_id.clone()));
                }

                if !token.is_word() || token.text.is_empty() {
                    continue;
                }
                let char_count = token.text.chars().count().max(1) as f64;
                heights.push(token.bbox.height());
                char_widths.push(token.bbox.width() / char_count);
            }
        }

        let page_stats = samples
            .into_iter()
            .map(|(page_number, (heights, char_widths))| {
                let stats = PageStats {
                    median_token_height: median(heights),
                    median_char_width: median(char_widths),
                };
                (page_number, stats)
            })
            .collect();

        Ok(Self { tokens, page_stats })
    }

    #[inline]
    #[must_use]
    pub fn get(&self, token_id: &str) -> Option<&IndexedToken<'a>> {
        self.tokens.get(token_id)
    }

    /// Look a token up, treating absence as an integrity fault.
    pub fn lookup(&self, token_id: &str) -> Result<&IndexedToken<'a>> {
        self.tokens
            .get(token_id)
            .ok_or_else(|| IngestError::UnknownToken(token_id.to_string()))
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, token_id: &str) -> bool {
        self.tokens.contains_key(token_id)
    }

    /// Fail on the first id the bundle does not know.
    pub fn ensure_known<'i, I>(&self, token_ids: I) -> Result<()>
    where
        I: IntoIterator<Item = &'i String>,
    {
        for token_id in token_ids {
            self.lookup(token_id)?;
        }
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn page_stats(&self, page_number: u32) -> Option<&PageStats> {
        self.page_stats.get(&page_number)
    }

    /// Statistics for every page, ordered by page number
    #[must_use]
    pub fn all_page_stats(&self) -> &BTreeMap<u32, PageStats> {
        &self.page_stats
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Median with the mean of the two middle values for even counts; 0.0 when empty
fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
