use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    tracing::debug!("health check called");
    Json(json!({ "status": "ok" }))
}
