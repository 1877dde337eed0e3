use anyhow::Result;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::models::blog::BlogRepository;
use crate::db::models::comment::CommentRepository;
use crate::db::models::user::UserRepository;
use crate::db::DbPool;
use crate::service::{BlogService, CommentService, UserService};

pub mod extract;
pub mod handlers;
pub mod references;
pub mod router;
pub mod validators;

pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub blogs: Arc<dyn BlogService>,
    pub comments: Arc<dyn CommentService>,
}

impl AppState {
    /// Wire the SQLite repositories behind the service traits.
    pub fn sqlite(db: DbPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(db.clone())),
            blogs: Arc::new(BlogRepository::new(db.clone())),
            comments: Arc::new(CommentRepository::new(db)),
        }
    }
}

pub async fn serve(cfg: Config, db: DbPool) -> Result<()> {
    let bind_addr = format!("{}:{}", cfg.api.bind, cfg.api.port);
    let state = Arc::new(AppState::sqlite(db));
    let cors = build_cors_layer(&cfg.api.cors_allowed_origins);
    let app = build_app(state, cors, Duration::from_secs(cfg.api.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Blog API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured; CORS will block all cross-origin requests");
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: Arc<AppState>, cors: CorsLayer, request_timeout: Duration) -> Router {
    with_layers(router::routes(state), cors, request_timeout)
}

/// Requests still running at `request_timeout` are dropped and answered with 408.
fn with_layers(routes: Router, cors: CorsLayer, request_timeout: Duration) -> Router {
    Router::new()
        .merge(routes)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_slow_request_times_out_with_408() {
        let routes = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let app = with_layers(routes, CorsLayer::new(), Duration::from_millis(20));

        let req = Request::builder().uri("/slow").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_fast_request_passes_through() {
        let routes = Router::new().route("/fast", get(|| async { "ok" }));
        let app = with_layers(routes, CorsLayer::new(), Duration::from_secs(5));

        let req = Request::builder().uri("/fast").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
