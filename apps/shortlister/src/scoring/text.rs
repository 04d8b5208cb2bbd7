//! Text scanning helpers shared by the gate, keyword and bonus/malus scorers.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use regex::Regex;

static YEAR_SPAN_RE: OnceLock<Regex> = OnceLock::new();
static YEARS_MENTION_RE: OnceLock<Regex> = OnceLock::new();

fn year_span_re() -> &'static Regex {
    YEAR_SPAN_RE.get_or_init(|| {
        Regex::new(r"\b(\d{4})\s*-\s*(\d{4}|present|current)\b").expect("valid year span regex")
    })
}

fn years_mention_re() -> &'static Regex {
    YEARS_MENTION_RE
        .get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s+years?").expect("valid years regex"))
}

/// Compiled `\b<term>\b` patterns keyed by lowercased term.
static WORD_PATTERNS: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();

fn word_pattern(term: &str) -> Option<Regex> {
    let cache = WORD_PATTERNS.get_or_init(Default::default);
    if let Some(re) = cache.read().ok().and_then(|map| map.get(term).cloned()) {
        return Some(re);
    }
    let re = Regex::new(&format!(r"\b{}\b", regex::escape(term))).ok()?;
    if let Ok(mut map) = cache.write() {
        map.insert(term.to_string(), re.clone());
    }
    Some(re)
}

/// Whole-word, case-insensitive containment. `term` is matched literally.
pub fn contains_word(haystack_lower: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    match word_pattern(&term) {
        Some(re) => re.is_match(haystack_lower),
        None => haystack_lower.contains(&term),
    }
}

/// APPROXIMATE years-of-experience heuristic. Not a tenure calculation.
///
/// `1.5 × (number of "YYYY-YYYY" / "YYYY-present|current" spans) + 1.0 × (number of "N year(s)" mentions)`.
/// A span contributes 1.5 regardless of its length. Expects lowercased text; uncapped.
pub fn estimate_years(text_lower: &str) -> f64 {
    let spans = year_span_re().find_iter(text_lower).count() as f64;
    let mentions = years_mention_re().find_iter(text_lower).count() as f64;
    spans * 1.5 + mentions
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
