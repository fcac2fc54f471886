// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{client::ApiClient, mcp::SERVER_NAME};

/// Liveness check. Does not call the backend.
pub async fn health(State(client): State<ApiClient>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "api_url": client.base_url().as_str(),
    }))
}
