//! Keyword scorer: weighted whole-word matching over critical and desired dictionaries.
//!
//! Critical hits count double. A keyword listed in both dictionaries scores in both,
//! and its hit-map entry is the sum of the two contributions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scoring::config::Keywords;
use crate::scoring::text::contains_word;

const CRITICAL_MULTIPLIER: u64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordOutcome {
    /// Normalized to [0, 1].
    pub score: f64,
    pub hits: BTreeMap<String, u64>,
}

pub fn keyword_score(cv_text: &str, keywords: &Keywords) -> KeywordOutcome {
    let text = cv_text.to_lowercase();
    let mut raw: u64 = 0;
    let mut hits: BTreeMap<String, u64> = BTreeMap::new();

    for (keyword, &weight) in &keywords.critical {
        if contains_word(&text, keyword) {
            let gained = CRITICAL_MULTIPLIER * u64::from(weight);
            raw += gained;
            hits.insert(keyword.clone(), gained);
        }
    }

    for (keyword, &weight) in &keywords.desired {
        if contains_word(&text, keyword) {
            let gained = u64::from(weight);
            raw += gained;
            *hits.entry(keyword.clone()).or_insert(0) += gained;
        }
    }

    let max_possible = CRITICAL_MULTIPLIER * sum_weights(&keywords.critical)
        + sum_weights(&keywords.desired);

    KeywordOutcome {
        score: raw as f64 / max_possible.max(1) as f64,
        hits,
    }
}

fn sum_weights(map: &BTreeMap<String, u32>) -> u64 {
    map.values().map(|&w| u64::from(w)).sum()
}
