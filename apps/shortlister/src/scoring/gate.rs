//! Must-have gate: a hard pass/fail filter, independent of the weighted score.

use serde::{Deserialize, Serialize};

use crate::scoring::config::MustHaves;
use crate::scoring::text::{contains_word, estimate_years};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub pass: bool,
    /// One entry per failed requirement. Empty iff `pass`.
    pub reasons: Vec<String>,
}

/// Checks minimum experience and required skills. Never fails; pure text scan.
pub fn must_have_gate(cv_text: &str, must_haves: &MustHaves) -> GateOutcome {
    let text = cv_text.to_lowercase();
    let mut reasons = Vec::new();

    let years = estimate_years(&text);
    if years < must_haves.min_years_total {
        reasons.push(format!(
            "Years of experience {years:.1} < {}",
            must_haves.min_years_total
        ));
    }

    for skill in &must_haves.required_skills {
        if !contains_word(&text, skill) {
            reasons.push(format!("Missing required skill: {skill}"));
        }
    }

    GateOutcome {
        pass: reasons.is_empty(),
        reasons,
    }
}
