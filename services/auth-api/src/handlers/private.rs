//! Handlers behind bearer authentication

use axum::Json;

use super::MessageResponse;
use crate::extractors::AuthUser;

/// GET /api/v1/dashboard
pub async fn dashboard(user: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("Hello, {}", user.subject)))
}

/// GET /api/v1/admin
///
/// Any authenticated caller; there is no role model.
pub async fn admin(user: AuthUser) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!("Admin panel for {}", user.subject)))
}
