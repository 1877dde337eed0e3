//! Storage-facing service interfaces, one per entity.
//!
//! Handlers only ever see these traits; the SQLite repositories in
//! [`crate::db::models`] implement them and are injected into
//! [`crate::api::AppState`] at startup.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::blog::{Blog, NewBlog};
use crate::db::models::comment::{Comment, CommentFilter, CommentKey, NewComment};
use crate::db::models::user::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no matching row")]
    NotFound,

    #[error("row already exists")]
    Duplicate,

    #[error("database error")]
    Database(#[source] sqlx::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Duplicate,
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn create(&self, user: NewUser) -> StoreResult<User>;

    async fn get(&self, id: i64) -> StoreResult<User>;

    async fn exists(&self, id: i64) -> StoreResult<bool>;

    /// Full replace of name, email and password.
    async fn update(&self, id: i64, patch: NewUser) -> StoreResult<User>;

    /// Removes the user together with their blogs and comments, all or nothing.
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Case-insensitive substring match on name; `None` or empty lists everyone.
    async fn list(&self, name: Option<&str>) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait BlogService: Send + Sync {
    async fn create(&self, blog: NewBlog) -> StoreResult<Blog>;

    async fn get(&self, id: i64) -> StoreResult<Blog>;

    async fn update(&self, id: i64, patch: NewBlog) -> StoreResult<Blog>;

    /// Removes the blog and the comments posted on it.
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// Case-insensitive substring match on title; `None` or empty lists all.
    async fn list(&self, title: Option<&str>) -> StoreResult<Vec<Blog>>;
}

#[async_trait]
pub trait CommentService: Send + Sync {
    /// Fails with [`StoreError::Duplicate`] when the (user, blog) pair is taken.
    async fn create(&self, comment: NewComment) -> StoreResult<Comment>;

    async fn get(&self, key: CommentKey) -> StoreResult<Comment>;

    async fn update(&self, key: CommentKey, message: String) -> StoreResult<Comment>;

    async fn delete(&self, key: CommentKey) -> StoreResult<()>;

    async fn list(&self, filter: CommentFilter) -> StoreResult<Vec<Comment>>;
}
