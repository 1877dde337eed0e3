//! Request extractors that reject malformed input with a plain-text 400
//! before any validator or storage call runs.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body whose decode failures (syntax, types, content type) all map to 400.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::BadRequest(format!(
                "Invalid request payload: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// Positive integer `{id}` path segment.
pub struct EntityId(pub i64);

impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("ID not provided".to_string()))?;

        parse_id(&raw)
            .map(EntityId)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid ID: {}", raw)))
    }
}

/// Parse a positive integer identifier. Zero and negatives count as missing.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Parse an optional query parameter; empty is treated as absent.
pub fn parse_optional_id(name: &str, raw: Option<&str>) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_id(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid {}", name))),
    }
}
