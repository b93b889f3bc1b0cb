use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Liveness only; does not call the generation service.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "techprep-api"
    }))
}
