//! Reading-order views over an evidence bundle
//!
//! Only word-level tokens that carry a confidence value take part in span detection.

use crate::evidence::{EvidenceBundle, OcrToken};

#[inline]
fn is_ordered_candidate(token: &OcrToken) -> bool {
    token.is_word() && token.has_confidence()
}

/// Word tokens with a confidence value, in encounter order
#[must_use]
pub fn token_filter_view(bundle: &EvidenceBundle) -> Vec<&OcrToken> {
    bundle
        .tokens()
        .map(|(_, token)| token)
        .filter(|token| is_ordered_candidate(token))
        .collect()
}

/// Canonical reading order: page, then top edge, then left edge, then encounter order
///
/// The encounter sequence makes the order total, so tokens sharing exact coordinates keep
/// a stable relative position across runs.
#[must_use]
pub fn spatial_ordered_token_ids(bundle: &EvidenceBundle) -> Vec<String> {
    let mut ordered: Vec<(u32, f64, f64, usize, &str)> = bundle
        .tokens()
        .filter(|(_, token)| is_ordered_candidate(token))
        .enumerate()
        .map(|(seq, (page_number, token))| {
            (
                page_number,
                token.bbox.y0,
                token.bbox.x0,
                seq,
                token.token_id.as_str(),
            )
        })
        .collect();

    ordered.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| a.1.total_cmp(&b.1))
            .then_with(|| a.2.total_cmp(&b.2))
            .then_with(|| a.3.cmp(&b.3))
    });

    ordered
        .into_iter()
        .map(|(_, _, _, _, token_id)| token_id.to_string())
        .collect()
}

/// Position of each id in an ordered sequence
#[must_use]
pub(crate) fn positions(ordered_token_ids: &[String]) -> std::collections::HashMap<&str, usize> {
    ordered_token_ids
        .iter()
        .enumerate()
        .map(|(idx, token_id)| (token_id.as_str(), idx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::TokenLevel;
    use crate::test_support::{bundle, page, word};

    #[test]
    fn test_orders_by_page_then_y_then_x() {
        let b = bundle(vec![
            page(2, vec![word("p2a", "alpha", 10.0, 10.0, Some(90.0))]),
            page(
                1,
                vec![
                    word("p1c", "gamma", 10.0, 50.0, Some(90.0)),
                    word("p1b", "beta", 200.0, 10.0, Some(90.0)),
                    word("p1a", "alpha", 10.0, 10.0, Some(90.0)),
                ],
            ),
        ]);
        assert_eq!(spatial_ordered_token_ids(&b), vec!["p1a", "p1b", "p1c", "p2a"]);
    }

    #[test]
    fn test_exact_ties_keep_encounter_order() {
        let b = bundle(vec![page(
            1,
            vec![
                word("first", "x", 10.0, 10.0, Some(90.0)),
                word("second", "y", 10.0, 10.0, Some(90.0)),
            ],
        )]);
        assert_eq!(spatial_ordered_token_ids(&b), vec!["first", "second"]);
    }

    #[test]
    fn test_filters_non_words_and_missing_confidence() {
        let mut symbol = word("sym", "°", 0.0, 0.0, Some(99.0));
        symbol.level = TokenLevel::Symbol;
        let b = bundle(vec![page(
            1,
            vec![
                word("kept", "north", 0.0, 0.0, Some(80.0)),
                word("noconf", "south", 0.0, 30.0, None),
                symbol,
            ],
        )]);

        assert_eq!(spatial_ordered_token_ids(&b), vec!["kept"]);
        let view = token_filter_view(&b);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].token_id, "kept");
    }

    #[test]
    fn test_positions_map() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let map = positions(&ids);
        assert_eq!(map["b"], 1);
    }
}
