//! JD Parser: extracts title, skills, responsibilities and minimum experience from a raw job description.
//!
//! Model output that cannot be parsed degrades to an empty `ParsedJD`; only
//! service failures are errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::jd::prompts::JD_PARSE_PROMPT_TEMPLATE;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{extract_json_object, GenerationService, LlmError};
use crate::scoring::config::{Keywords, MustHaves};

/// Full structured output of JD parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedJD {
    pub title: String,
    pub required_skills: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub responsibilities: Vec<String>,
    pub min_years_total: f64,
}

impl ParsedJD {
    /// Gate section implied by the JD.
    pub fn suggested_must_haves(&self) -> MustHaves {
        MustHaves {
            min_years_total: self.min_years_total.max(0.0),
            required_skills: normalized(&self.required_skills),
        }
    }

    /// Required skills become critical keywords and nice-to-haves desired ones, each weight 1.
    pub fn suggested_keywords(&self) -> Keywords {
        let as_map = |skills: &[String]| -> BTreeMap<String, u32> {
            normalized(skills).into_iter().map(|s| (s, 1)).collect()
        };
        Keywords {
            critical: as_map(&self.required_skills),
            desired: as_map(&self.nice_to_have),
        }
    }
}

fn normalized(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.trim().to_lowercase();
        if !skill.is_empty() && !out.contains(&skill) {
            out.push(skill);
        }
    }
    out
}

/// Parses a job description with the generation service.
pub async fn parse_jd(
    jd_text: &str,
    generator: &dyn GenerationService,
    retry: &RetryPolicy,
    model: &str,
) -> Result<ParsedJD, LlmError> {
    let prompt = JD_PARSE_PROMPT_TEMPLATE.replace("{jd_text}", jd_text);
    let content = retry
        .run("JD parsing", || generator.generate(model, &prompt))
        .await?;
    Ok(parse_jd_response(&content))
}

/// Best-effort decode of the model output; falls back to an empty `ParsedJD`.
pub fn parse_jd_response(content: &str) -> ParsedJD {
    let parsed = extract_json_object(content)
        .map_err(|e| e.to_string())
        .and_then(|json| json.ok_or_else(|| "no JSON object in response".to_string()))
        .and_then(|json| serde_json::from_str::<ParsedJD>(json).map_err(|e| e.to_string()));

    match parsed {
        Ok(jd) => jd,
        Err(reason) => {
            warn!("JD parse fell back to defaults: {}", reason);
            ParsedJD::default()
        }
    }
}
