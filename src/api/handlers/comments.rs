use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::extract::{parse_optional_id, JsonBody};
use crate::api::references::{ensure_blog_exists, ensure_comment_absent, ensure_user_exists};
use crate::api::validators::ensure_valid;
use crate::api::AppState;
use crate::db::models::comment::{Comment, CommentFilter, CommentKey, NewComment};
use crate::error::{AppError, AppResult};

/// `?author_id=&blog_id=`, kept as raw strings so bad numbers get our own 400 text.
#[derive(Debug, Deserialize)]
pub struct CommentParams {
    author_id: Option<String>,
    blog_id: Option<String>,
}

impl CommentParams {
    fn filter(&self) -> AppResult<CommentFilter> {
        Ok(CommentFilter {
            user_id: parse_optional_id("author_id", self.author_id.as_deref())?,
            blog_id: parse_optional_id("blog_id", self.blog_id.as_deref())?,
        })
    }

    fn key(&self) -> AppResult<CommentKey> {
        match self.filter()? {
            CommentFilter {
                user_id: Some(user_id),
                blog_id: Some(blog_id),
            } => Ok(CommentKey { user_id, blog_id }),
            _ => Err(AppError::BadRequest(
                "author_id and blog_id are required query parameters".to_string(),
            )),
        }
    }
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommentParams>,
) -> AppResult<Json<Vec<Comment>>> {
    let filter = params.filter()?;
    let comments = state
        .comments
        .list(filter)
        .await
        .map_err(|e| AppError::from_store(e, "Comment"))?;
    Ok(Json(comments))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    ensure_valid(&body)?;
    ensure_user_exists(state.users.as_ref(), body.user_id).await?;
    ensure_blog_exists(state.blogs.as_ref(), body.blog_id).await?;
    ensure_comment_absent(state.comments.as_ref(), body.key()).await?;

    // A concurrent insert can still win the race; the primary key turns it
    // into StoreError::Duplicate, which maps to the same 400.
    let comment = state
        .comments
        .create(body)
        .await
        .map_err(|e| AppError::from_store(e, "Comment"))?;

    tracing::info!(user_id = comment.user_id, blog_id = comment.blog_id, "comment created");
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommentParams>,
    JsonBody(mut body): JsonBody<NewComment>,
) -> AppResult<Json<Comment>> {
    let key = params.key()?;

    // Ids in the body are optional but must agree with the query when given.
    if (body.user_id != 0 && body.user_id != key.user_id)
        || (body.blog_id != 0 && body.blog_id != key.blog_id)
    {
        return Err(AppError::BadRequest(
            "author_id and blog_id in the body must match the query parameters".to_string(),
        ));
    }
    body.user_id = key.user_id;
    body.blog_id = key.blog_id;

    ensure_valid(&body)?;
    ensure_user_exists(state.users.as_ref(), key.user_id).await?;
    ensure_blog_exists(state.blogs.as_ref(), key.blog_id).await?;

    let comment = state
        .comments
        .update(key, body.message)
        .await
        .map_err(|e| AppError::from_store(e, "Comment"))?;
    Ok(Json(comment))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CommentParams>,
) -> AppResult<StatusCode> {
    let key = params.key()?;

    state
        .comments
        .delete(key)
        .await
        .map_err(|e| AppError::from_store(e, "Comment"))?;

    tracing::info!(user_id = key.user_id, blog_id = key.blog_id, "comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
