use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Connectivity probe used by the frontend on startup.
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Backend connected successfully!" }))
}

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "internly-ats"
    }))
}
