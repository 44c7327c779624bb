use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /test
/// Liveness probe reporting the configured model.
pub async fn test_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "CV Assistant API is running",
        "timestamp": Utc::now().to_rfc3339(),
        "model": state.config.gemini_model,
    }))
}
