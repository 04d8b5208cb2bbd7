pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jd::handlers as jd;
use crate::ranking::handlers as ranking;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/config", get(health::config_handler))
        .route("/api/v1/rankings", post(ranking::handle_rank))
        .route("/api/v1/jd/parse", post(jd::handle_parse_jd))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
