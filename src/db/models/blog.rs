use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::query_as;

use crate::db::{filter_needle, DbPool};
use crate::service::{BlogService, StoreError, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBlog {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "user_id")]
    pub author_id: i64,
}

const BLOG_COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

#[derive(Clone)]
pub struct BlogRepository {
    pool: DbPool,
}

impl BlogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogService for BlogRepository {
    async fn create(&self, blog: NewBlog) -> StoreResult<Blog> {
        tracing::debug!(title = %blog.title, author_id = blog.author_id, "Creating blog");
        let now = Utc::now();

        let sql = format!(
            "INSERT INTO blogs (title, content, author_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {BLOG_COLUMNS}"
        );
        let created = query_as::<_, Blog>(&sql)
            .bind(blog.title.trim())
            .bind(&blog.content)
            .bind(blog.author_id)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn get(&self, id: i64) -> StoreResult<Blog> {
        tracing::debug!(id, "Reading blog");
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs WHERE id = ?");
        query_as::<_, Blog>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: i64, patch: NewBlog) -> StoreResult<Blog> {
        tracing::debug!(id, "Updating blog");
        let sql = format!(
            "UPDATE blogs SET title = ?, content = ?, author_id = ?, updated_at = ?
             WHERE id = ?
             RETURNING {BLOG_COLUMNS}"
        );
        query_as::<_, Blog>(&sql)
            .bind(patch.title.trim())
            .bind(&patch.content)
            .bind(patch.author_id)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        tracing::debug!(id, "Deleting blog");
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE blog_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list(&self, title: Option<&str>) -> StoreResult<Vec<Blog>> {
        tracing::debug!(?title, "Listing blogs");
        let sql = format!("SELECT {BLOG_COLUMNS} FROM blogs ORDER BY id ASC");
        let mut rows = query_as::<_, Blog>(&sql).fetch_all(&self.pool).await?;

        if let Some(needle) = filter_needle(title) {
            rows.retain(|b| b.title.to_lowercase().contains(&needle));
        }
        Ok(rows)
    }
}
