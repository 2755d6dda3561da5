use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and whether the report store answers.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let store = match state.reports.ping().await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("Health check could not read report store: {e}");
            "unavailable"
        }
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "memoria-api",
        "store": store
    }))
}
