use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::query_as;

use crate::db::DbPool;
use crate::service::{CommentService, StoreError, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub user_id: i64,
    pub blog_id: i64,
    pub message: String,
    pub created_date: DateTime<Utc>,
}

/// Natural key: one comment per user per blog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentKey {
    pub user_id: i64,
    pub blog_id: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommentFilter {
    pub user_id: Option<i64>,
    pub blog_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewComment {
    #[serde(default, alias = "author_id")]
    pub user_id: i64,
    #[serde(default)]
    pub blog_id: i64,
    #[serde(default, alias = "content")]
    pub message: String,
}

impl NewComment {
    pub fn key(&self) -> CommentKey {
        CommentKey {
            user_id: self.user_id,
            blog_id: self.blog_id,
        }
    }
}

const COMMENT_COLUMNS: &str = "user_id, blog_id, message, created_date";

#[derive(Clone)]
pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentService for CommentRepository {
    async fn create(&self, comment: NewComment) -> StoreResult<Comment> {
        tracing::debug!(user_id = comment.user_id, blog_id = comment.blog_id, "Creating comment");
        let sql = format!(
            "INSERT INTO comments (user_id, blog_id, message, created_date)
             VALUES (?, ?, ?, ?)
             RETURNING {COMMENT_COLUMNS}"
        );
        let created = query_as::<_, Comment>(&sql)
            .bind(comment.user_id)
            .bind(comment.blog_id)
            .bind(comment.message.trim())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get(&self, key: CommentKey) -> StoreResult<Comment> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE user_id = ? AND blog_id = ?");
        query_as::<_, Comment>(&sql)
            .bind(key.user_id)
            .bind(key.blog_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, key: CommentKey, message: String) -> StoreResult<Comment> {
        tracing::debug!(user_id = key.user_id, blog_id = key.blog_id, "Updating comment");
        let sql = format!(
            "UPDATE comments SET message = ?
             WHERE user_id = ? AND blog_id = ?
             RETURNING {COMMENT_COLUMNS}"
        );
        query_as::<_, Comment>(&sql)
            .bind(message.trim())
            .bind(key.user_id)
            .bind(key.blog_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, key: CommentKey) -> StoreResult<()> {
        tracing::debug!(user_id = key.user_id, blog_id = key.blog_id, "Deleting comment");
        let result = sqlx::query("DELETE FROM comments WHERE user_id = ? AND blog_id = ?")
            .bind(key.user_id)
            .bind(key.blog_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, filter: CommentFilter) -> StoreResult<Vec<Comment>> {
        let mut conditions = Vec::<&str>::new();
        if filter.user_id.is_some() {
            conditions.push("user_id = ?");
        }
        if filter.blog_id.is_some() {
            conditions.push("blog_id = ?");
        }

        let mut sql = format!("SELECT {COMMENT_COLUMNS} FROM comments");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_date ASC, user_id ASC, blog_id ASC");
        tracing::debug!(%sql, ?filter, "Listing comments");

        let mut q = query_as::<_, Comment>(&sql);
        if let Some(user_id) = filter.user_id {
            q = q.bind(user_id);
        }
        if let Some(blog_id) = filter.blog_id {
            q = q.bind(blog_id);
        }

        Ok(q.fetch_all(&self.pool).await?)
    }
}
