use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::rubric::RubricItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalScores {
    pub keywords: f64,
    pub semantic: f64,
    pub rubric: f64,
    pub bonus_malus: f64,
}

/// One row of the ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub file: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gate_pass: bool,
    /// Empty iff `gate_pass`.
    pub gate_reasons: Vec<String>,
    pub scores: SignalScores,
    pub hits: BTreeMap<String, u64>,
    pub rubric_details: Vec<RubricItem>,
    pub overall_comment: String,
    pub total_score: f64,
    /// Set when scoring this candidate failed; all scores are then zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreResult {
    /// A zeroed row that passes an empty gate.
    pub fn empty(file: &str) -> Self {
        Self {
            file: file.to_string(),
            name: None,
            email: None,
            phone: None,
            gate_pass: true,
            gate_reasons: vec![],
            scores: SignalScores::default(),
            hits: BTreeMap::new(),
            rubric_details: vec![],
            overall_comment: String::new(),
            total_score: 0.0,
            error: None,
        }
    }
}

/// Candidates ordered by (gate pass, total score), both descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedTable {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ScoreResult>,
    /// Candidates abandoned by cancellation before scoring started.
    pub cancelled: usize,
}
