use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::service::StoreError;

/// Field name → problem description, as reported by the entity validators.
pub type Problems = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input: bad JSON, non-numeric id, missing query parameter.
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed: {} problem(s)", .0.len())]
    Problems(Problems),

    /// A referenced entity is absent, or the write would duplicate one.
    #[error("{0}")]
    Reference(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Translate a storage outcome, naming the entity for the 404 message.
    pub fn from_store(err: StoreError, entity: &str) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(format!("{} not found", entity)),
            StoreError::Duplicate => AppError::Reference(format!("{} already exists", entity)),
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Hash(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Problems(problems) => {
                tracing::debug!(?problems, "Rejected invalid entity");
                (StatusCode::BAD_REQUEST, Json(problems)).into_response()
            }
            AppError::BadRequest(msg) | AppError::Reference(msg) => {
                tracing::debug!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!("Request failed: {:#}", anyhow::Error::from(self));
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
