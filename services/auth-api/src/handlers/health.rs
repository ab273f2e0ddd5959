//! Health check handlers

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health, GET /api/v1/health - Liveness probe (no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
