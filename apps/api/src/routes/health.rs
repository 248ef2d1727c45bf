use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::MISSING_KEY_HINT;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "skillsync-api"
    }))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// True when a host-managed key is configured and no user key is needed.
    pub credential_loaded: bool,
    pub models: Vec<String>,
    pub hint: Option<&'static str>,
}

/// GET /api/v1/status
/// Tells the front-end whether to show "credential loaded" or ask for a key.
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let credential_loaded = state.config.gemini_api_key.is_some();
    Json(StatusResponse {
        credential_loaded,
        models: state.analyzer.candidates().to_vec(),
        hint: (!credential_loaded).then_some(MISSING_KEY_HINT),
    })
}
