use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::error;

use crate::state::AppState;

// health handler
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

// Pinged by a cron job so the database never idles into suspension
pub async fn keep_alive_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "timestamp": timestamp,
                "message": "Database is alive"
            })),
        ),
        Err(e) => {
            error!(error = %e, "Keep-alive ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "timestamp": timestamp,
                    "message": "Database ping failed"
                })),
            )
        }
    }
}
