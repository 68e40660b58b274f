//! Liveness endpoint

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

/// GET /health handler
pub async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
