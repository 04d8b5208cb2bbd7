use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::scoring::config::ScoringConfig;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "shortlister"
    }))
}

/// GET /api/v1/config
/// The scoring config applied when a ranking request carries no override.
pub async fn config_handler(State(state): State<AppState>) -> Json<ScoringConfig> {
    Json(state.scoring.as_ref().clone())
}
