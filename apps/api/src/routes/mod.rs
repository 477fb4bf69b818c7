pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ats::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // ATS API
        .route("/api/v1/ats/parse-jd", post(handlers::handle_parse_jd))
        .route(
            "/api/v1/ats/normalize-resume",
            post(handlers::handle_normalize_resume),
        )
        .route("/api/v1/ats/score", post(handlers::handle_score_upload))
        .route("/api/v1/ats/score/text", post(handlers::handle_score_text))
        .route("/api/v1/ats/scans/:id", get(handlers::handle_get_scan))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
