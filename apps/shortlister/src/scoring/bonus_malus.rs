//! Bonus/malus adjuster: independent additive pattern checks.

use std::sync::OnceLock;

use regex::Regex;

use crate::scoring::config::BonusMalusConfig;

/// More "month"/"year" tokens than this triggers the job-hop malus.
pub const JOB_HOP_TOKEN_THRESHOLD: usize = 40;

static LEADERSHIP_RE: OnceLock<Regex> = OnceLock::new();
static PUBLICATION_RE: OnceLock<Regex> = OnceLock::new();
static TENURE_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn leadership_re() -> &'static Regex {
    LEADERSHIP_RE.get_or_init(|| {
        Regex::new(r"\b(lead|manager|head|principal)\b").expect("valid leadership regex")
    })
}

fn publication_re() -> &'static Regex {
    PUBLICATION_RE.get_or_init(|| {
        Regex::new(r"\b(arxiv|publication|paper|peer-reviewed)\b").expect("valid publication regex")
    })
}

fn tenure_token_re() -> &'static Regex {
    TENURE_TOKEN_RE.get_or_init(|| Regex::new(r"\b(month|year)\b").expect("valid tenure regex"))
}

/// Sum of the triggered adjustments; sign and range are whatever the config says.
///
/// The job-hop check is a crude proxy: it counts singular "month"/"year" tokens,
/// which many short stints tend to produce. It does not compute tenure.
pub fn bonus_malus(cv_text: &str, config: &BonusMalusConfig) -> f64 {
    let text = cv_text.to_lowercase();
    let mut adjustment = 0.0;

    if leadership_re().is_match(&text) {
        adjustment += config.leadership_bonus;
    }
    if publication_re().is_match(&text) {
        adjustment += config.publication_bonus;
    }
    if tenure_token_re().find_iter(&text).count() > JOB_HOP_TOKEN_THRESHOLD {
        adjustment += config.job_hop_malus;
    }

    adjustment
}
