use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::extract::{EntityId, JsonBody};
use crate::api::validators::ensure_valid;
use crate::api::AppState;
use crate::db::models::user::{NewUser, User};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListUsersParams {
    name: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListUsersParams>,
) -> AppResult<Json<Vec<User>>> {
    let users = state
        .users
        .list(params.name.as_deref())
        .await
        .map_err(|e| AppError::from_store(e, "User"))?;
    Ok(Json(users))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> AppResult<Json<User>> {
    let user = state
        .users
        .get(id)
        .await
        .map_err(|e| AppError::from_store(e, "User"))?;
    Ok(Json(user))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NewUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    ensure_valid(&body)?;

    let user = state
        .users
        .create(body)
        .await
        .map_err(|e| AppError::from_store(e, "User"))?;

    tracing::info!(id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    JsonBody(body): JsonBody<NewUser>,
) -> AppResult<Json<User>> {
    ensure_valid(&body)?;

    let user = state
        .users
        .update(id, body)
        .await
        .map_err(|e| AppError::from_store(e, "User"))?;
    Ok(Json(user))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> AppResult<StatusCode> {
    state
        .users
        .delete(id)
        .await
        .map_err(|e| AppError::from_store(e, "User"))?;

    tracing::info!(id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
