use axum::Json;
use serde_json::{json, Value};

/// GET /api/health
pub async fn api_health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
