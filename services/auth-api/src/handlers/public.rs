//! Public handlers

use axum::Json;

use super::MessageResponse;

/// GET /api/v1/
pub async fn home() -> Json<MessageResponse> {
    Json(MessageResponse::new("public route ok"))
}

/// GET /api/v1/info
pub async fn info() -> Json<MessageResponse> {
    Json(MessageResponse::new("Public info"))
}
