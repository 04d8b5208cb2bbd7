//! Semantic scorer: JD-to-CV embedding similarity over overlapping character chunks.
//!
//! The JD and every chunk go to the embedding service in ONE batch call.
//! Score = 0.6 × best chunk similarity + 0.4 × mean of the top-k similarities.

use tracing::debug;

use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{EmbeddingService, LlmError};
use crate::scoring::text::normalize_whitespace;

pub const CHUNK_CHARS: usize = 1500;
pub const CHUNK_OVERLAP: usize = 150;
const COSINE_EPSILON: f64 = 1e-8;
const MAX_WEIGHT: f64 = 0.6;
const MEAN_WEIGHT: f64 = 0.4;

/// Splits whitespace-normalized text into windows of `max_chars` characters,
/// each starting `max_chars - overlap` after the previous one.
pub fn chunk_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let normalized = normalize_whitespace(text);
    let chars: Vec<char> = normalized.chars().collect();
    let stride = max_chars.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + max_chars).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        start += stride;
    }
    chunks
}

/// Cosine similarity with the denominator floored at 1e-8, so zero vectors give 0.0.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = (norm_a.sqrt() * norm_b.sqrt()).max(COSINE_EPSILON);
    dot / denom
}

/// `0.6 × max + 0.4 × mean` over the `topk` highest similarities (`[0.0]` when empty).
pub fn aggregate_top_k(mut similarities: Vec<f64>, topk: usize) -> f64 {
    similarities.sort_by(|a, b| b.total_cmp(a));
    similarities.truncate(topk);
    if similarities.is_empty() {
        similarities.push(0.0);
    }
    let best = similarities[0];
    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
    MAX_WEIGHT * best + MEAN_WEIGHT * mean
}

/// Embeds the JD with the CV chunks and aggregates their similarities.
/// An empty CV makes no service call and scores 0.0.
pub async fn semantic_score(
    embedder: &dyn EmbeddingService,
    retry: &RetryPolicy,
    model: &str,
    jd_text: &str,
    cv_text: &str,
    topk: usize,
) -> Result<f64, LlmError> {
    let chunks = chunk_text(cv_text, CHUNK_CHARS, CHUNK_OVERLAP);
    if chunks.is_empty() {
        return Ok(aggregate_top_k(Vec::new(), topk));
    }

    let mut batch = Vec::with_capacity(chunks.len() + 1);
    batch.push(jd_text.to_string());
    batch.extend(chunks);

    let vectors = retry
        .run("Embedding", || embedder.embed(model, &batch))
        .await?;

    let (jd_vec, chunk_vecs) = vectors
        .split_first()
        .ok_or_else(|| LlmError::Malformed("embedding service returned no vectors".to_string()))?;

    let similarities: Vec<f64> = chunk_vecs.iter().map(|v| cosine(jd_vec, v)).collect();
    debug!(
        "Semantic similarity over {} chunks (topk={})",
        similarities.len(),
        topk
    );

    Ok(aggregate_top_k(similarities, topk))
}
