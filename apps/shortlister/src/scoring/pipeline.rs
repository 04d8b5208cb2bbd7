//! Scoring pipeline: scores candidates and assembles the ranked table.
//!
//! Flow per candidate: gate, keywords, bonus/malus (pure scans) then
//! semantic ‖ rubric (concurrent service calls) → weighted total.
//! Across candidates: up to `max_concurrency` in flight, results collected in
//! input order and sorted afterwards, so completion order never affects ranking.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::extraction::fields::ProfileParser;
use crate::extraction::load_candidate;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{EmbeddingService, GenerationService, LlmError};
use crate::models::candidate::Candidate;
use crate::models::ranking::{RankedTable, ScoreResult, SignalScores};
use crate::scoring::aggregate::{rank, total_score};
use crate::scoring::bonus_malus::bonus_malus;
use crate::scoring::config::ScoringConfig;
use crate::scoring::gate::must_have_gate;
use crate::scoring::keywords::keyword_score;
use crate::scoring::rubric::evaluate_rubric;
use crate::scoring::semantic::semantic_score;

/// Shared, stateless backend handles. Built once and cloned into each run.
#[derive(Clone)]
pub struct ScoringServices {
    pub embedder: Arc<dyn EmbeddingService>,
    pub generator: Arc<dyn GenerationService>,
    pub retry: RetryPolicy,
}

/// Cooperative cancellation checked between candidates.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns a guard that cancels the flag when dropped.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

pub struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct RankOptions {
    pub max_concurrency: usize,
    pub cancel: CancelFlag,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            cancel: CancelFlag::default(),
        }
    }
}

/// Scores one candidate. Service failures abort this candidate only.
pub async fn score_candidate(
    candidate: &Candidate,
    jd_text: &str,
    config: &ScoringConfig,
    services: &ScoringServices,
) -> Result<ScoreResult, LlmError> {
    let text = candidate.raw_text.as_str();

    let gate = must_have_gate(text, &config.must_haves);
    let keywords = keyword_score(text, &config.keywords);
    let adjustment = bonus_malus(text, &config.bonus_malus);

    let (semantic, rubric) = tokio::try_join!(
        semantic_score(
            services.embedder.as_ref(),
            &services.retry,
            &config.models.embeddings,
            jd_text,
            text,
            config.semantic.topk,
        ),
        evaluate_rubric(
            services.generator.as_ref(),
            &services.retry,
            &config.models.llm,
            jd_text,
            text,
            &config.rubric,
        ),
    )?;

    let scores = SignalScores {
        keywords: keywords.score,
        semantic,
        rubric: rubric.score,
        bonus_malus: adjustment,
    };

    Ok(ScoreResult {
        file: candidate.file.clone(),
        name: candidate.derived.name.clone(),
        email: candidate.derived.email.clone(),
        phone: candidate.derived.phone.clone(),
        gate_pass: gate.pass,
        gate_reasons: gate.reasons,
        scores,
        hits: keywords.hits,
        rubric_details: rubric.items,
        overall_comment: rubric.overall_comment,
        total_score: total_score(&scores, &config.weights),
        error: None,
    })
}

/// Row for a candidate whose scoring failed: zero scores, gate failed, error recorded.
pub fn failed_result(candidate: &Candidate, err: &LlmError) -> ScoreResult {
    let message = err.to_string();
    ScoreResult {
        name: candidate.derived.name.clone(),
        email: candidate.derived.email.clone(),
        phone: candidate.derived.phone.clone(),
        gate_pass: false,
        gate_reasons: vec![format!("Scoring failed: {message}")],
        error: Some(message),
        ..ScoreResult::empty(&candidate.file)
    }
}

/// Scores every candidate and returns them ranked.
pub async fn rank_candidates(
    candidates: Vec<Candidate>,
    jd_text: &str,
    config: &ScoringConfig,
    services: &ScoringServices,
    options: &RankOptions,
) -> RankedTable {
    let run_id = Uuid::new_v4();
    let total = candidates.len();
    info!(
        "Ranking run {}: {} candidates, concurrency {}",
        run_id, total, options.max_concurrency
    );

    let outcomes: Vec<Option<ScoreResult>> = stream::iter(candidates)
        .map(|candidate| async move {
            if options.cancel.is_cancelled() {
                return None;
            }
            let candidate = &candidate;
            let row = match score_candidate(candidate, jd_text, config, services).await {
                Ok(row) => row,
                Err(e) => {
                    error!("Scoring failed for {}: {}", candidate.file, e);
                    failed_result(candidate, &e)
                }
            };
            Some(row)
        })
        .buffered(options.max_concurrency.max(1))
        .collect()
        .await;

    let mut rows: Vec<ScoreResult> = outcomes.into_iter().flatten().collect();
    let cancelled = total - rows.len();
    if cancelled > 0 {
        warn!("Ranking run {}: {} candidates cancelled", run_id, cancelled);
    }

    rank(&mut rows);
    info!("Ranking run {} complete: {} rows", run_id, rows.len());

    RankedTable {
        run_id,
        generated_at: Utc::now(),
        rows,
        cancelled,
    }
}

/// A stored document and the file name it was uploaded as.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub file_name: String,
}

/// Extracts the documents under the same concurrency bound and cancel flag,
/// then ranks the resulting candidates.
pub async fn rank_documents(
    documents: &[Document],
    jd_text: &str,
    config: &ScoringConfig,
    services: &ScoringServices,
    parser: ProfileParser,
    options: &RankOptions,
) -> RankedTable {
    let extracted: Vec<Option<Candidate>> = stream::iter(documents.to_vec())
        .map(|doc| async move {
            if options.cancel.is_cancelled() {
                return None;
            }
            Some(load_candidate(&doc.path, &doc.file_name, parser).await)
        })
        .buffered(options.max_concurrency.max(1))
        .collect()
        .await;

    let skipped = extracted.iter().filter(|c| c.is_none()).count();
    let candidates: Vec<Candidate> = extracted.into_iter().flatten().collect();
    let mut table = rank_candidates(candidates, jd_text, config, services, options).await;
    table.cancelled += skipped;
    table
}
