//! Storage-backed existence checks run before a write.
//!
//! A failed check is the client's fault (400); a storage failure while
//! checking is ours (500).

use crate::db::models::comment::CommentKey;
use crate::error::{AppError, AppResult};
use crate::service::{BlogService, CommentService, StoreError, UserService};

pub async fn ensure_user_exists(users: &dyn UserService, id: i64) -> AppResult<()> {
    let exists = users
        .exists(id)
        .await
        .map_err(|e| AppError::from_store(e, "User"))?;

    if !exists {
        return Err(AppError::Reference(format!("User {} not found", id)));
    }
    Ok(())
}

pub async fn ensure_blog_exists(blogs: &dyn BlogService, id: i64) -> AppResult<()> {
    match blogs.get(id).await {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound) => Err(AppError::Reference(format!("Blog {} not found", id))),
        Err(e) => Err(AppError::from_store(e, "Blog")),
    }
}

pub async fn ensure_comment_absent(comments: &dyn CommentService, key: CommentKey) -> AppResult<()> {
    match comments.get(key).await {
        Ok(_) => Err(AppError::Reference(format!(
            "Comment already exists for user_id {} and blog_id {}",
            key.user_id, key.blog_id
        ))),
        Err(StoreError::NotFound) => Ok(()),
        Err(e) => Err(AppError::from_store(e, "Comment")),
    }
}
