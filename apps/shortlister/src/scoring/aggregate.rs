//! Weighted total and ranking.

use std::cmp::Ordering;

use crate::models::ranking::{ScoreResult, SignalScores};
use crate::scoring::config::SignalWeights;

/// `w_kw·kw + w_sem·sem + w_rubric·rubric + w_bm·(0.5 + bm/2)`.
///
/// The bonus/malus term is re-centered on 0.5, so a zero adjustment still
/// contributes half of its weight.
pub fn total_score(scores: &SignalScores, weights: &SignalWeights) -> f64 {
    weights.keywords * scores.keywords
        + weights.semantic * scores.semantic
        + weights.rubric * scores.rubric
        + weights.bonus_malus * (0.5 + scores.bonus_malus / 2.0)
}

/// Gate pass first, then higher total. `sort_by` is stable, so ties keep input order.
pub fn rank(results: &mut [ScoreResult]) {
    results.sort_by(ranking_order);
}

fn ranking_order(a: &ScoreResult, b: &ScoreResult) -> Ordering {
    b.gate_pass
        .cmp(&a.gate_pass)
        .then_with(|| b.total_score.total_cmp(&a.total_score))
}
