//! Rubric evaluator: asks the generation service to score the CV against named questions.
//!
//! Failure modes, in order of severity:
//! - response lacks a `{` or a `}` → soft failure `(0.0, [], "Parser failed")`, no error;
//! - braces present but out of order or the JSON inside is invalid → `LlmError::Malformed` / `Parse`, retried;
//! - service unreachable → `LlmError::Http` / `Api`, retried, then returned to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{extract_json_object, GenerationService, LlmError};
use crate::scoring::config::RubricQuestion;
use crate::scoring::prompts::build_rubric_prompt;

/// CV characters sent to the model; bounds the prompt size.
pub const MAX_CV_CHARS: usize = 20_000;
pub const MAX_ITEM_SCORE: i64 = 5;
pub const PARSER_FAILED: &str = "Parser failed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricItem {
    pub name: String,
    /// Clipped to 0–5.
    pub score: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricOutcome {
    /// Mean of item scores normalized to [0, 1].
    pub score: f64,
    pub items: Vec<RubricItem>,
    pub overall_comment: String,
}

impl RubricOutcome {
    fn parser_failed() -> Self {
        Self {
            score: 0.0,
            items: vec![],
            overall_comment: PARSER_FAILED.to_string(),
        }
    }
}

/// Runs prompt → generate → parse under `retry`.
pub async fn evaluate_rubric(
    generator: &dyn GenerationService,
    retry: &RetryPolicy,
    model: &str,
    jd_text: &str,
    cv_text: &str,
    questions: &[RubricQuestion],
) -> Result<RubricOutcome, LlmError> {
    let cv: String = cv_text.chars().take(MAX_CV_CHARS).collect();
    let prompt = build_rubric_prompt(jd_text, &cv, questions);

    let outcome = retry
        .run("Rubric evaluation", || async {
            let content = generator.generate(model, &prompt).await?;
            parse_rubric_response(&content)
        })
        .await?;

    debug!(
        "Rubric scored {} items, mean={:.3}",
        outcome.items.len(),
        outcome.score
    );
    Ok(outcome)
}

/// Parses a raw model response into a rubric outcome.
pub fn parse_rubric_response(content: &str) -> Result<RubricOutcome, LlmError> {
    let Some(json) = extract_json_object(content.trim())? else {
        warn!("Rubric response contained no JSON object");
        return Ok(RubricOutcome::parser_failed());
    };

    let data: Value = serde_json::from_str(json)?;

    let mut items = Vec::new();
    if let Some(entries) = data.get("rubric").and_then(Value::as_array) {
        for entry in entries.iter().filter(|e| e.is_object()) {
            let score = coerce_score(entry.get("score"))?.clamp(0, MAX_ITEM_SCORE);
            items.push(RubricItem {
                name: text_field(entry.get("name")),
                score: score as u8,
                reason: text_field(entry.get("reason")),
            });
        }
    }

    let score = if items.is_empty() {
        0.0
    } else {
        items
            .iter()
            .map(|it| f64::from(it.score) / MAX_ITEM_SCORE as f64)
            .sum::<f64>()
            / items.len() as f64
    };

    Ok(RubricOutcome {
        score,
        items,
        overall_comment: text_field(data.get("overall_comment")),
    })
}

/// Integer score from a number or numeric string; a missing score counts as 0.
fn coerce_score(value: Option<&Value>) -> Result<i64, LlmError> {
    let Some(value) = value else {
        return Ok(0);
    };
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    };
    parsed.ok_or_else(|| LlmError::Malformed(format!("non-numeric rubric score: {value}")))
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
