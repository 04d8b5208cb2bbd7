//! CSV rendering of a ranked table. Nested values (reasons, hits, rubric
//! details) are JSON-encoded into a single cell.

use anyhow::{Context, Result};

use crate::models::ranking::{RankedTable, ScoreResult};

pub const CSV_COLUMNS: [&str; 15] = [
    "file",
    "name",
    "email",
    "phone",
    "gate_pass",
    "gate_reasons",
    "total_score",
    "keywords",
    "semantic",
    "rubric",
    "bonus_malus",
    "hits",
    "rubric_details",
    "overall_comment",
    "error",
];

/// Renders the rows in rank order, header first.
pub fn to_csv(table: &RankedTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS)?;
    for row in &table.rows {
        writer.write_record(csv_record(row)?)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {}", e.error()))
}

fn csv_record(row: &ScoreResult) -> Result<Vec<String>> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    Ok(vec![
        row.file.clone(),
        opt(&row.name),
        opt(&row.email),
        opt(&row.phone),
        row.gate_pass.to_string(),
        serde_json::to_string(&row.gate_reasons).context("encoding gate_reasons")?,
        row.total_score.to_string(),
        row.scores.keywords.to_string(),
        row.scores.semantic.to_string(),
        row.scores.rubric.to_string(),
        row.scores.bonus_malus.to_string(),
        serde_json::to_string(&row.hits).context("encoding hits")?,
        serde_json::to_string(&row.rubric_details).context("encoding rubric_details")?,
        row.overall_comment.clone(),
        opt(&row.error),
    ])
}
