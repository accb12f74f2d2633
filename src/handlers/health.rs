//! # Health Check Handler
//!
//! Used by load balancers and monitoring systems.

use axum::Json;
use serde_json::{json, Value};

/// Health check endpoint
///
/// ## Route
/// GET /api/health
///
/// ## Response
/// ```json
/// { "status": "Server is healthy" }
/// ```
///
/// Never fails, so it returns `Json<Value>` rather than `AppResult`.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "Server is healthy"
    }))
}
