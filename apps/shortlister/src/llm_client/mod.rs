/// LLM Client: the single point of entry for the embedding and generation backends.
///
/// ARCHITECTURAL RULE: No other module may talk HTTP to the model daemon directly.
/// Scorers depend on the `EmbeddingService` / `GenerationService` traits; the
/// concrete `OllamaClient` is built once at startup and shared through `AppState`.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod mock;
pub mod prompts;
pub mod retry;

use prompts::JSON_ONLY_SYSTEM;

const EMBED_PATH: &str = "/api/embed";
const GENERATE_PATH: &str = "/api/generate";
/// Low temperature keeps rubric scores close to repeatable.
const GENERATION_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl LlmError {
    /// Whether a fresh attempt could plausibly succeed.
    /// Transport failures, 429/5xx and unparseable model output are transient;
    /// any other 4xx (unknown model, bad request) is not.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_)
            | LlmError::Parse(_)
            | LlmError::Malformed(_)
            | LlmError::EmptyContent => true,
            LlmError::Api { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || *status >= 500
            }
            LlmError::RetriesExhausted { .. } => false,
        }
    }
}

/// Batch text embedding capability.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embeds every text in one round trip. The output has one vector per input, in order.
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Single-shot text completion capability.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// HTTP client for an Ollama-compatible model daemon.
/// Serves both embeddings and completions; cheap to clone.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs a JSON body and maps non-success statuses to `LlmError::Api`.
    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!("Model daemon returned {}: {}", status, body);
        }
        let message = serde_json::from_str::<OllamaError>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl EmbeddingService for OllamaClient {
    async fn embed(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let response = self
            .post_json(EMBED_PATH, &EmbedRequest { model, input: texts })
            .await?;
        let parsed: EmbedResponse = response.json().await?;

        if parsed.embeddings.len() != texts.len() {
            return Err(LlmError::Malformed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        debug!("Embedded {} texts with {}", texts.len(), model);
        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl GenerationService for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model,
            prompt,
            system: JSON_ONLY_SYSTEM,
            stream: false,
            options: GenerateOptions {
                temperature: GENERATION_TEMPERATURE,
            },
        };
        let response = self.post_json(GENERATE_PATH, &request).await?;
        let parsed: GenerateResponse = response.json().await?;

        debug!(
            "Generation succeeded: model={}, prompt_tokens={:?}, output_tokens={:?}",
            model, parsed.prompt_eval_count, parsed.eval_count
        );

        if parsed.response.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(parsed.response)
    }
}

/// Returns the slice between the first `{` and the last `}` (inclusive).
/// Tolerates prose or markdown fences around the JSON object the model was asked for.
///
/// `Ok(None)` when either brace is missing. A `}` that precedes every `{` is a
/// malformed (retryable) response rather than an absent one.
pub fn extract_json_object(text: &str) -> Result<Option<&str>, LlmError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Ok(None);
    };
    if end < start {
        return Err(LlmError::Malformed(
            "closing brace precedes opening brace".to_string(),
        ));
    }
    Ok(Some(&text[start..=end]))
}
