//! API route handlers
//!
//! - `health`: Health checks, readiness, and metrics
//! - `webhook`: Delivery intake

pub mod health;
pub mod webhook;

use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Service info
///
/// Root endpoint (GET /).
///
/// # Response
///
/// ```json
/// {
///   "name": "Thryve Webhook",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "name": "Thryve Webhook",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            format!("POST {}", state.config.webhook_path),
            "GET /health".to_string(),
            "GET /ready".to_string(),
            "GET /metrics".to_string(),
        ]
    }))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
