//! Outbound text sanitization.
//!
//! Applied to user-authored text before it is written to the store: first
//! every URL is replaced, then every forbidden word is masked. Ordering
//! matters so that a forbidden word inside a URL is removed along with the
//! URL rather than leaving a partially masked link behind.

use crate::constants::{LINK_PLACEHOLDER, WORD_MASK};
use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"https?://[^\s]+").expect("static url pattern"))
}

/// Sanitizes a piece of user-authored text against the forbidden word list.
///
/// URLs are replaced with [`LINK_PLACEHOLDER`], then each forbidden word is
/// masked with [`WORD_MASK`] wherever it appears as a whole word, case
/// insensitively. Words that fail to compile into a pattern are skipped.
pub fn sanitize(text: &str, forbidden_words: &[String]) -> String {
    let mut out = url_pattern().replace_all(text, LINK_PLACEHOLDER).into_owned();
    for word in forbidden_words {
        if word.is_empty() {
            continue;
        }
        let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
        if let Ok(re) = Regex::new(&pattern) {
            out = re.replace_all(&out, WORD_MASK).into_owned();
        }
    }
    out
}

/// Sanitizes optional text, mapping absent input to the empty string.
pub fn sanitize_opt(text: Option<&str>, forbidden_words: &[String]) -> String {
    match text {
        Some(t) => sanitize(t, forbidden_words),
        None => String::new(),
    }
}
