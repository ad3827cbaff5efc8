use axum::Json;
use serde_json::{json, Value};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "MindCanvas API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /
/// API landing info for humans poking at the server.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to MindCanvas API",
        "description": "Transform abstract ideas into vivid visual descriptions",
        "endpoints": {
            "visualize": "/api/v1/visualize",
            "health": "/health"
        }
    }))
}
