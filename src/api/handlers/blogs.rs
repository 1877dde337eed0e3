use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::extract::{EntityId, JsonBody};
use crate::api::references::ensure_user_exists;
use crate::api::validators::ensure_valid;
use crate::api::AppState;
use crate::db::models::blog::{Blog, NewBlog};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ListBlogsParams {
    title: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListBlogsParams>,
) -> AppResult<Json<Vec<Blog>>> {
    let blogs = state
        .blogs
        .list(params.title.as_deref())
        .await
        .map_err(|e| AppError::from_store(e, "Blog"))?;
    Ok(Json(blogs))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> AppResult<Json<Blog>> {
    let blog = state
        .blogs
        .get(id)
        .await
        .map_err(|e| AppError::from_store(e, "Blog"))?;
    Ok(Json(blog))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NewBlog>,
) -> AppResult<(StatusCode, Json<Blog>)> {
    ensure_valid(&body)?;
    ensure_user_exists(state.users.as_ref(), body.author_id).await?;

    let blog = state
        .blogs
        .create(body)
        .await
        .map_err(|e| AppError::from_store(e, "Blog"))?;

    tracing::info!(id = blog.id, author_id = blog.author_id, "blog created");
    Ok((StatusCode::CREATED, Json(blog)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    JsonBody(body): JsonBody<NewBlog>,
) -> AppResult<Json<Blog>> {
    ensure_valid(&body)?;
    ensure_user_exists(state.users.as_ref(), body.author_id).await?;

    let blog = state
        .blogs
        .update(id, body)
        .await
        .map_err(|e| AppError::from_store(e, "Blog"))?;
    Ok(Json(blog))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> AppResult<StatusCode> {
    state
        .blogs
        .delete(id)
        .await
        .map_err(|e| AppError::from_store(e, "Blog"))?;

    tracing::info!(id, "blog deleted");
    Ok(StatusCode::NO_CONTENT)
}
