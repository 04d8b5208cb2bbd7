//! Text extraction: turns an uploaded CV document into plain text plus derived fields.
//!
//! Extraction never aborts a ranking run: an unreadable document is logged and the
//! candidate continues with empty text.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

mod docx;
pub mod fields;

use crate::models::candidate::Candidate;
use fields::{derive_fields, ProfileParser};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Reads a document as plain text. PDF and DOCX are parsed on the blocking pool;
/// every other file is read as lossy UTF-8.
pub async fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
                .await
                .map_err(|e| ExtractionError::Pdf(e.to_string()))?
                .map_err(|e| ExtractionError::Pdf(e.to_string()))
        }
        "docx" => {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || docx::extract_docx(&owned))
                .await
                .map_err(|e| ExtractionError::Docx(e.to_string()))?
        }
        _ => {
            let bytes = tokio::fs::read(path).await?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Builds a candidate from a document, falling back to empty text on extraction failure.
pub async fn load_candidate(path: &Path, file_name: &str, parser: ProfileParser) -> Candidate {
    let raw_text = match extract_text(path).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Could not extract text from {}: {}", file_name, e);
            String::new()
        }
    };
    debug!("Extracted {} characters from {}", raw_text.len(), file_name);

    let derived = derive_fields(&raw_text, parser);
    Candidate {
        file: file_name.to_string(),
        raw_text,
        derived,
    }
}
