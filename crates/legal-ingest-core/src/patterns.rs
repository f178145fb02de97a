//! Metes-and-bounds pattern predicates over token sequences

use once_cell::sync::Lazy;
use regex::Regex;

use crate::evidence::OcrToken;

const DEGREE_SYMBOLS: [&str; 4] = ["°", "º", "′", "″"];

static NUMBERED_CALL: Lazy<Regex> = Lazy::new(|| {
    // "12." or "(12)"
    Regex::new(r"^(?:\d+\.|\(\d+\))$").expect("numbered call pattern is valid")
});

#[must_use]
pub fn contains_degree_symbol(tokens: &[&OcrToken]) -> bool {
    tokens
        .iter()
        .any(|token| DEGREE_SYMBOLS.iter().any(|symbol| token.text.contains(symbol)))
}

/// A standalone `N` or `S` followed anywhere later by a standalone `E` or `W`
#[must_use]
pub fn contains_bearing_letter_sequence(tokens: &[&OcrToken]) -> bool {
    tokens
        .iter()
        .position(|token| matches!(token.text.as_str(), "N" | "S"))
        .is_some_and(|start| {
            tokens[start + 1..]
                .iter()
                .any(|token| matches!(token.text.as_str(), "E" | "W"))
        })
}

#[must_use]
pub fn contains_thence_keyword(tokens: &[&OcrToken]) -> bool {
    tokens.iter().any(|token| token.text == "THENCE")
}

#[must_use]
pub fn contains_beginning_at_phrase(tokens: &[&OcrToken]) -> bool {
    tokens
        .windows(2)
        .any(|pair| pair[0].text == "BEGINNING" && pair[1].text == "AT")
}

#[must_use]
pub fn contains_numbered_calls(tokens: &[&OcrToken]) -> bool {
    tokens.iter().any(|token| NUMBERED_CALL.is_match(&token.text))
}

/// True when any metes-and-bounds signal is present
#[must_use]
pub fn has_legal_pattern_signal(tokens: &[&OcrToken]) -> bool {
    contains_degree_symbol(tokens)
        || contains_bearing_letter_sequence(tokens)
        || contains_thence_keyword(tokens)
        || contains_beginning_at_phrase(tokens)
        || contains_numbered_calls(tokens)
}
