use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::entity::EntityKind;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("rate limit store error: {0}")]
    Store(String),
}

#[derive(Error, Debug)]
pub enum ToggleError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for ToggleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => ToggleError::NotFound { kind, id },
            other => ToggleError::Storage(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum InvalidationError {
    #[error("revalidation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("revalidation rejected with status {0}")]
    Status(u16),

    #[error("invalidation queue unavailable: {0}")]
    Queue(String),
}

// Errors surfaced to HTTP clients
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("Too many login attempts")]
    RateLimited {
        message: String,
        retry_after: i64,
        retry_after_secs: u64,
    },

    // Details stay in the logs
    #[error("Internal server error")]
    Internal(String),
}

impl From<ToggleError> for AppError {
    fn from(err: ToggleError) -> Self {
        match err {
            ToggleError::NotFound { kind, .. } => AppError::NotFound(kind),
            ToggleError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() }))).into_response()
            }
            AppError::RateLimited {
                ref message,
                retry_after,
                retry_after_secs,
            } => {
                let body = Json(json!({
                    "error": self.to_string(),
                    "message": message,
                    "retryAfter": retry_after,
                }));
                let mut res = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                res.headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
                res
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": self.to_string() })),
            )
                .into_response(),
        }
    }
}
