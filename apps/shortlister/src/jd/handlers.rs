use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jd::parser::{parse_jd, ParsedJD};
use crate::scoring::config::{Keywords, MustHaves};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseJdRequest {
    pub jd_text: String,
}

/// Config sections a recruiter can paste into the scoring YAML.
#[derive(Debug, Serialize)]
pub struct SuggestedConfig {
    pub must_haves: MustHaves,
    pub keywords: Keywords,
}

#[derive(Debug, Serialize)]
pub struct ParseJdResponse {
    pub parsed_jd: ParsedJD,
    pub suggested: SuggestedConfig,
}

/// POST /api/v1/jd/parse
pub async fn handle_parse_jd(
    State(state): State<AppState>,
    Json(req): Json<ParseJdRequest>,
) -> Result<Json<ParseJdResponse>, AppError> {
    let jd_text = req.jd_text.trim();
    if jd_text.is_empty() {
        return Err(AppError::Validation("jd_text must not be empty".to_string()));
    }

    let parsed_jd = parse_jd(
        jd_text,
        state.services.generator.as_ref(),
        &state.services.retry,
        &state.scoring.models.llm,
    )
    .await?;

    let suggested = SuggestedConfig {
        must_haves: parsed_jd.suggested_must_haves(),
        keywords: parsed_jd.suggested_keywords(),
    };
    Ok(Json(ParseJdResponse {
        parsed_jd,
        suggested,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{GenerationService, LlmError};
    use crate::state::tests::test_state;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct CannedGenerator;

    #[async_trait]
    impl GenerationService for CannedGenerator {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, LlmError> {
            Ok(r#"{"title":"Data Engineer","required_skills":["SQL","Airflow"],
                   "nice_to_have":["dbt"],"min_years_total":4}"#
                .to_string())
        }
    }

    struct DownGenerator;

    #[async_trait]
    impl GenerationService for DownGenerator {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 503,
                message: "loading model".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_parse_returns_suggestions() {
        let state = test_state(Arc::new(CannedGenerator));
        let Json(response) = handle_parse_jd(
            State(state),
            Json(ParseJdRequest {
                jd_text: "Data Engineer, 4 years, SQL and Airflow".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.parsed_jd.title, "Data Engineer");
        assert_eq!(response.suggested.must_haves.required_skills, vec!["sql", "airflow"]);
        assert_eq!(response.suggested.must_haves.min_years_total, 4.0);
        assert_eq!(response.suggested.keywords.desired["dbt"], 1);
    }

    #[tokio::test]
    async fn test_blank_jd_rejected() {
        let state = test_state(Arc::new(CannedGenerator));
        let result = handle_parse_jd(
            State(state),
            Json(ParseJdRequest {
                jd_text: "   \n".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_service_failure_surfaces() {
        let state = test_state(Arc::new(DownGenerator));
        let result = handle_parse_jd(
            State(state),
            Json(ParseJdRequest {
                jd_text: "Backend engineer".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }
}
