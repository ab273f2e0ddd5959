//! Authentication handlers (provider login, me)

use axum::extract::State;
use axum::Json;
use jaka_auth_core::LoginAssertion;
use jaka_types::{AuthProvider, PrincipalSource, TokenResponse};
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: String,
    pub source: PrincipalSource,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/telegram
///
/// Exchange a Telegram Login Widget payload for a session token
pub async fn telegram_login(
    State(state): State<AppState>,
    Json(assertion): Json<LoginAssertion>,
) -> ApiResult<Json<TokenResponse>> {
    let issued = state.auth.login(&assertion).map_err(|e| {
        tracing::info!(
            provider = %AuthProvider::Telegram,
            code = e.error_code(),
            "Login rejected"
        );
        e
    })?;

    tracing::info!(
        provider = %AuthProvider::Telegram,
        subject = %issued.subject,
        "Session token issued"
    );

    let expires_in = issued.lifetime_secs();
    Ok(Json(TokenResponse::bearer(
        issued.token.into_string(),
        expires_in,
    )))
}

/// GET /api/v1/auth/me
///
/// Who the presented bearer resolves to
pub async fn me(user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        subject: user.subject.to_string(),
        source: user.source,
    })
}
