//! Canonicalizes typographic Unicode variants out of scraped text.
//!
//! The parsers downstream match on literal ASCII delimiters (`": "`, `" @ "`,
//! `"-"`, label strings), so every string lifted out of the feed HTML goes
//! through [`normalize`] first.

/// Replace en/em dashes, curly quotes and non-breaking spaces with their ASCII
/// counterparts and trim surrounding whitespace. Pure and idempotent.
pub fn normalize(text: &str) -> String {
    text.replace('\u{2013}', "-")
        .replace('\u{2014}', "-")
        .replace('\u{2019}', "'")
        .replace('\u{00a0}', " ")
        .replace('\u{201c}', "\"")
        .replace('\u{201d}', "\"")
        .trim()
        .to_string()
}
