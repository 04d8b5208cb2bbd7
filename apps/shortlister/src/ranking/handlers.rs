use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tempfile::TempDir;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::extract_text;
use crate::ranking::export::to_csv;
use crate::scoring::config::ScoringConfig;
use crate::scoring::pipeline::{rank_documents, CancelFlag, Document, RankOptions};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    fn from_query(query: &RankingQuery) -> Result<Self, AppError> {
        match query.format.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("json") => Ok(OutputFormat::Json),
            Some("csv") => Ok(OutputFormat::Csv),
            Some(other) => Err(AppError::Validation(format!(
                "unsupported format '{other}', expected json or csv"
            ))),
        }
    }
}

/// Parsed multipart body. Uploaded files live in `dir` until it is dropped.
struct RankingUpload {
    dir: TempDir,
    jd_text: String,
    cvs: Vec<Document>,
    config_yaml: Option<String>,
}

/// POST /api/v1/rankings
///
/// Multipart fields: `jd_text` or a `jd` file, one or more `cvs` files,
/// and an optional `config` YAML overriding the server's scoring config.
pub async fn handle_rank(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let format = OutputFormat::from_query(&query)?;
    let upload = read_upload(multipart).await?;

    if upload.jd_text.trim().is_empty() {
        return Err(AppError::Validation(
            "a job description is required (jd_text or jd file)".to_string(),
        ));
    }
    if upload.cvs.is_empty() {
        return Err(AppError::Validation(
            "at least one CV file is required".to_string(),
        ));
    }

    let config = match &upload.config_yaml {
        Some(yaml) => Arc::new(ScoringConfig::from_yaml_str(yaml)?),
        None => Arc::clone(&state.scoring),
    };

    info!(
        "Ranking request: {} CVs, config override: {}",
        upload.cvs.len(),
        upload.config_yaml.is_some()
    );

    // Dropping this handler future (client gone) stops candidates not yet started.
    let cancel = CancelFlag::default();
    let _guard = cancel.cancel_on_drop();
    let options = RankOptions {
        max_concurrency: state.config.max_concurrent_candidates,
        cancel,
    };
    let services = state.services.clone();
    let parser = state.config.profile_parser;

    let table = tokio::spawn(async move {
        let RankingUpload {
            dir, jd_text, cvs, ..
        } = upload;
        let table = rank_documents(&cvs, &jd_text, &config, &services, parser, &options).await;
        drop(dir);
        table
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("ranking task failed: {e}")))?;

    match format {
        OutputFormat::Json => Ok(Json(table).into_response()),
        OutputFormat::Csv => {
            let body = to_csv(&table)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"ranking.csv\"",
                    ),
                ],
                body,
            )
                .into_response())
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<RankingUpload, AppError> {
    let dir = TempDir::new().map_err(|e| AppError::Internal(e.into()))?;
    let mut jd_text = String::new();
    let mut jd_file: Option<PathBuf> = None;
    let mut cvs = Vec::new();
    let mut config_yaml = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "jd_text" => jd_text = field_text(field).await?,
            "jd" => {
                let file_name = sanitize_file_name(field.file_name(), "jd.txt");
                let path = dir.path().join(format!("jd-{file_name}"));
                save_field(field, &path).await?;
                jd_file = Some(path);
            }
            "cvs" => {
                let fallback = format!("cv-{}.txt", cvs.len() + 1);
                let file_name = sanitize_file_name(field.file_name(), &fallback);
                let path = dir.path().join(format!("{:03}-{file_name}", cvs.len()));
                save_field(field, &path).await?;
                cvs.push(Document { path, file_name });
            }
            "config" => config_yaml = Some(field_text(field).await?),
            other => {
                return Err(AppError::Validation(format!(
                    "unexpected multipart field '{other}'"
                )))
            }
        }
    }

    if jd_text.trim().is_empty() {
        if let Some(path) = jd_file {
            jd_text = extract_text(&path)
                .await
                .map_err(|e| AppError::Validation(format!("could not read jd file: {e}")))?;
        }
    }

    Ok(RankingUpload {
        dir,
        jd_text,
        cvs,
        config_yaml,
    })
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart field: {e}")))
}

async fn save_field(field: Field<'_>, path: &Path) -> Result<(), AppError> {
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart file: {e}")))?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// Keeps only the final path component of a client-supplied file name.
fn sanitize_file_name(raw: Option<&str>, fallback: &str) -> String {
    raw.and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
