use axum::{routing::get, Router};
use std::sync::Arc;

use super::handlers;
use super::AppState;

/// The full route table. Built fresh on every call; nothing is registered globally.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        // Users
        .route("/api/user", get(handlers::users::list).post(handlers::users::create))
        .route(
            "/api/user/{id}",
            get(handlers::users::get)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        // Blogs
        .route("/api/blog", get(handlers::blogs::list).post(handlers::blogs::create))
        .route(
            "/api/blog/{id}",
            get(handlers::blogs::get)
                .put(handlers::blogs::update)
                .delete(handlers::blogs::delete),
        )
        // Comments, addressed by ?author_id=&blog_id=
        .route(
            "/api/comments",
            get(handlers::comments::list)
                .post(handlers::comments::create)
                .put(handlers::comments::update)
                .delete(handlers::comments::delete),
        )
        .with_state(state)
}
