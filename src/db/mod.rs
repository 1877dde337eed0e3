use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::config::DatabaseConfig;

pub mod models;

pub type DbPool = SqlitePool;

const MEMORY_PATH: &str = ":memory:";

pub async fn init(cfg: &DatabaseConfig) -> Result<DbPool> {
    let in_memory = cfg.path == MEMORY_PATH;
    let (options, max_connections) = if in_memory {
        // Every connection to :memory: opens its own empty database,
        // so the pool must hold exactly one and never recycle it.
        (SqliteConnectOptions::from_str("sqlite::memory:")?, 1)
    } else {
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", cfg.path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        (options, cfg.max_connections)
    };

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await?;

    sqlx::migrate!("./src/db/migrations").run(&pool).await?;

    tracing::info!("Database connected: {}", cfg.path);
    Ok(pool)
}

/// Normalize a list filter: blank or absent means no filter, anything else is
/// trimmed and lowercased for a case-insensitive substring match.
pub fn filter_needle(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filter_is_no_filter() {
        assert_eq!(filter_needle(None), None);
        assert_eq!(filter_needle(Some("")), None);
        assert_eq!(filter_needle(Some("  \t")), None);
    }

    #[test]
    fn test_filter_is_trimmed_and_folded() {
        assert_eq!(filter_needle(Some(" Jo ")).as_deref(), Some("jo"));
        assert_eq!(filter_needle(Some("JÖRG")).as_deref(), Some("jörg"));
        assert_eq!(filter_needle(Some("50%_off")).as_deref(), Some("50%_off"));
    }
}
