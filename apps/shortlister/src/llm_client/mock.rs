//! In-process service doubles for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{EmbeddingService, GenerationService, LlmError};

/// Embeds every text as a fixed-length bag of lowercase letter counts.
/// Texts sharing vocabulary get high cosine similarity.
pub struct LetterEmbedder;

#[async_trait]
impl EmbeddingService for LetterEmbedder {
    async fn embed(&self, _model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = vec![0.0_f32; 26];
                for c in t.to_lowercase().chars().filter(char::is_ascii_lowercase) {
                    v[(c as u8 - b'a') as usize] += 1.0;
                }
                v
            })
            .collect())
    }
}

/// Always fails with a non-transient error.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingService for FailingEmbedder {
    async fn embed(&self, _model: &str, _texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(LlmError::Api {
            status: 404,
            message: "model 'nomic-embed-text' not found".to_string(),
        })
    }
}

/// Returns a rubric whose single item score is the first digit found in the CV
/// section of the prompt (0 when none). Optionally sleeps before replying.
pub struct DigitRubricGenerator {
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl DigitRubricGenerator {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for DigitRubricGenerator {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let cv = prompt
            .split("CV:\n<<<")
            .nth(1)
            .and_then(|rest| rest.split(">>>").next())
            .unwrap_or("");
        let score = cv
            .chars()
            .find(char::is_ascii_digit)
            .and_then(|c| c.to_digit(10))
            .unwrap_or(0);
        Ok(format!(
            r#"{{"rubric": [{{"name": "fit", "score": {score}, "reason": "mock"}}], "overall_comment": "mock review"}}"#
        ))
    }
}
