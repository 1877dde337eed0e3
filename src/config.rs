use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Allowed CORS origins. Defaults to localhost dev ports.
    /// Set BLOG_API__API__CORS_ALLOWED_ORIGINS in production.
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: Vec<String>,
    /// Per-request deadline. Storage calls still in flight when it fires are dropped.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_api_port() -> u16 { 8000 }
fn default_request_timeout() -> u64 { 30 }
fn default_db_path() -> String { "./blog.db".to_string() }
fn default_max_connections() -> u32 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_cors_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8000".to_string(),
    ]
}

pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.api.port == 0 {
        anyhow::bail!("CONFIG ERROR: api.port must be non-zero");
    }

    if cfg.api.request_timeout_secs == 0 {
        anyhow::bail!("CONFIG ERROR: api.request_timeout_secs must be at least 1");
    }

    if cfg.database.max_connections == 0 {
        anyhow::bail!("CONFIG ERROR: database.max_connections must be at least 1");
    }

    // In-memory databases have no directory to check
    if cfg.database.path != ":memory:" {
        if let Some(parent) = std::path::Path::new(&cfg.database.path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                anyhow::bail!(
                    "CONFIG ERROR: Database directory does not exist: {}",
                    parent.display()
                );
            }
        }
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}

pub fn load() -> Result<Config> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name("config").required(false))
        .add_source(
            config::Environment::with_prefix("BLOG_API")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("api.cors_allowed_origins")
                .try_parsing(true),
        )
        .set_default("api.bind", default_bind())?
        .set_default("api.port", i64::from(default_api_port()))?
        .set_default("api.cors_allowed_origins", default_cors_allowed_origins())?
        .set_default("api.request_timeout_secs", default_request_timeout() as i64)?
        .set_default("database.path", default_db_path())?
        .set_default("database.max_connections", i64::from(default_max_connections()))?
        .set_default("log.level", default_log_level())?
        .build()?
        .try_deserialize()?;

    validate(&cfg)?;

    Ok(cfg)
}
