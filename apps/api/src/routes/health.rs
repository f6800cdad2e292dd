use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and embedding backend.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let embedding_backend = if state.config.embedding_api_url.is_some() {
        "http"
    } else {
        "hashing"
    };

    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "embedding_backend": embedding_backend,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
