use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::query_as;

use crate::auth::password;
use crate::db::{filter_needle, DbPool};
use crate::service::{StoreError, StoreResult, UserService};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string, never sent to clients.
    #[serde(skip_serializing)]
    pub password: String,
}

/// Create / full-replace payload. Missing fields decode as empty so the
/// validator can report them by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Argon2 is CPU-bound for tens of milliseconds; keep it off the async workers.
async fn hash_password(plain: &str) -> StoreResult<String> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || password::hash(&plain))
        .await
        .map_err(|e| StoreError::Hash(format!("hashing task failed: {}", e)))?
        .map_err(|e| StoreError::Hash(e.to_string()))
}

#[async_trait]
impl UserService for UserRepository {
    async fn create(&self, user: NewUser) -> StoreResult<User> {
        tracing::debug!(name = %user.name, "Creating user");
        let password_hash = hash_password(&user.password).await?;

        let created = query_as::<_, User>(
            "INSERT INTO users (name, email, password)
             VALUES (?, ?, ?)
             RETURNING id, name, email, password"
        )
        .bind(user.name.trim())
        .bind(user.email.trim())
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get(&self, id: i64) -> StoreResult<User> {
        tracing::debug!(id, "Reading user");
        query_as::<_, User>("SELECT id, name, email, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        let (exists,): (i64,) = query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists != 0)
    }

    async fn update(&self, id: i64, patch: NewUser) -> StoreResult<User> {
        tracing::debug!(id, "Updating user");
        if !self.exists(id).await? {
            return Err(StoreError::NotFound);
        }
        let password_hash = hash_password(&patch.password).await?;

        query_as::<_, User>(
            "UPDATE users SET name = ?, email = ?, password = ?
             WHERE id = ?
             RETURNING id, name, email, password"
        )
        .bind(patch.name.trim())
        .bind(patch.email.trim())
        .bind(&password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        tracing::debug!(id, "Deleting user with blogs and comments");
        // Dropping `tx` on any early return rolls every step back.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM comments
             WHERE user_id = ?
                OR blog_id IN (SELECT id FROM blogs WHERE author_id = ?)"
        )
        .bind(id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM blogs WHERE author_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list(&self, name: Option<&str>) -> StoreResult<Vec<User>> {
        tracing::debug!(?name, "Listing users");
        let mut rows =
            query_as::<_, User>("SELECT id, name, email, password FROM users ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        // SQLite LIKE folds ASCII only, so match in Rust for full Unicode case folding
        if let Some(needle) = filter_needle(name) {
            rows.retain(|u| u.name.to_lowercase().contains(&needle));
        }
        Ok(rows)
    }
}
