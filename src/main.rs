use anyhow::Result;
use tracing::info;

use blog_api::{api, config, db};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&cfg.log.level))?,
        )
        .init();

    info!("Starting blog-api v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded");

    let db_pool = db::init(&cfg.database).await?;
    info!("Database initialized");

    api::serve(cfg, db_pool).await
}
