//! Anchor records and a phrase-based anchor detector
//!
//! An anchor marks where a legal description may begin ("BEGINNING AT ..."). Upstream
//! systems normally supply anchors; [`detect_anchors`] covers cases that arrive without them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::index::EvidenceIndex;

/// Ordered token ids of one trigger phrase occurrence
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorRecord {
    pub token_ids: Vec<String>,
    /// Trigger phrase that matched, as configured
    #[serde(default)]
    pub phrase: String,
}

impl AnchorRecord {
    #[must_use]
    pub fn new(token_ids: Vec<String>, phrase: impl Into<String>) -> Self {
        Self {
            token_ids,
            phrase: phrase.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn first_token_id(&self) -> Option<&str> {
        self.token_ids.first().map(String::as_str)
    }

    #[inline]
    #[must_use]
    pub fn last_token_id(&self) -> Option<&str> {
        self.token_ids.last().map(String::as_str)
    }
}

fn normalize(text: &str) -> String {
    text.trim_matches(|c: char| !c.is_alphanumeric())
        .to_uppercase()
}

/// Find non-overlapping occurrences of the trigger phrases in reading order.
///
/// Matching is case-insensitive and ignores surrounding punctuation. All tokens of one
/// occurrence must be consecutive in `ordered_token_ids` and sit on the same page.
pub fn detect_anchors(
    index: &EvidenceIndex<'_>,
    ordered_token_ids: &[String],
    phrases: &[String],
) -> Result<Vec<AnchorRecord>> {
    let patterns: Vec<(&String, Vec<String>)> = phrases
        .iter()
        .map(|phrase| {
            let words = phrase.split_whitespace().map(normalize).collect::<Vec<String>>();
            (phrase, words)
        })
        .filter(|(_, words)| !words.is_empty())
        .collect();

    let mut normalized = Vec::with_capacity(ordered_token_ids.len());
    for token_id in ordered_token_ids {
        let entry = index.lookup(token_id)?;
        normalized.push((normalize(&entry.token.text), entry.page_number));
    }

    let mut anchors = Vec::new();
    let mut i = 0;
    while i < normalized.len() {
        let matched = patterns.iter().find(|(_, words)| {
            let end = i + words.len();
            end <= normalized.len()
                && normalized[i..end]
                    .iter()
                    .zip(words)
                    .all(|((text, page), word)| text == word && *page == normalized[i].1)
        });

        match matched {
            Some((phrase, words)) => {
                let token_ids = ordered_token_ids[i..i + words.len()].to_vec();
                debug!(phrase = %phrase, start = %token_ids[0], "anchor detected");
                anchors.push(AnchorRecord::new(token_ids, phrase.as_str()));
                i += words.len();
            }
            None => i += 1,
        }
    }

    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bundle, line, page};
    use crate::views::spatial_ordered_token_ids;

    fn phrases() -> Vec<String> {
        vec!["BEGINNING AT".to_string(), "COMMENCING AT".to_string()]
    }

    #[test]
    fn test_detects_phrase_case_insensitive() {
        let mut tokens = line("w", 0, 100.0, &["Parcel", "one:", "Beginning", "at", "a", "point"]);
        tokens.extend(line("w", 6, 140.0, &["COMMENCING", "AT,", "the", "corner"]));
        let b = bundle(vec![page(1, tokens)]);
        let index = EvidenceIndex::build(&b).unwrap();
        let ordered = spatial_ordered_token_ids(&b);

        let anchors = detect_anchors(&index, &ordered, &phrases()).unwrap();
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].token_ids, vec!["w2", "w3"]);
        assert_eq!(anchors[0].phrase, "BEGINNING AT");
        assert_eq!(anchors[1].token_ids, vec!["w6", "w7"]);
        assert_eq!(anchors[1].first_token_id(), Some("w6"));
        assert_eq!(anchors[1].last_token_id(), Some("w7"));
    }

    #[test]
    fn test_phrase_split_across_pages_is_not_an_anchor() {
        let b = bundle(vec![
            page(1, line("a", 0, 3000.0, &["BEGINNING"])),
            page(2, line("b", 0, 100.0, &["AT", "the"])),
        ]);
        let index = EvidenceIndex::build(&b).unwrap();
        let ordered = spatial_ordered_token_ids(&b);
        assert!(detect_anchors(&index, &ordered, &phrases()).unwrap().is_empty());
    }

    #[test]
    fn test_blank_phrase_is_ignored() {
        let b = bundle(vec![page(1, line("w", 0, 100.0, &["Beginning", "at", "x"]))]);
        let index = EvidenceIndex::build(&b).unwrap();
        let ordered = spatial_ordered_token_ids(&b);
        let phrases = vec!["   ".to_string(), "beginning at".to_string()];

        let anchors = detect_anchors(&index, &ordered, &phrases).unwrap();
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].phrase, "beginning at");
        assert_eq!(anchors[0].token_ids, vec!["w0", "w1"]);
    }

    #[test]
    fn test_unknown_ordered_token_is_fault() {
        let b = bundle(vec![page(1, line("w", 0, 100.0, &["x"]))]);
        let index = EvidenceIndex::build(&b).unwrap();
        let ordered = vec!["ghost".to_string()];
        assert!(detect_anchors(&index, &ordered, &phrases()).is_err());
    }
}
