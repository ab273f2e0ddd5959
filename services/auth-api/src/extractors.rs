//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use jaka_types::{Principal, PrincipalSource, SubjectId};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller extracted from the bearer credential
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: SubjectId,
    pub source: PrincipalSource,
}

impl From<Principal> for AuthUser {
    fn from(principal: Principal) -> Self {
        Self {
            subject: principal.subject,
            source: principal.source,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_bearer(parts)?;

        let principal = app_state.auth.authenticate(token).map_err(|e| {
            tracing::debug!(code = e.error_code(), "Bearer authentication failed");
            ApiError::from(e)
        })?;

        Ok(AuthUser::from(principal))
    }
}

/// Extract the bearer credential from the Authorization header
fn extract_bearer(parts: &Parts) -> Result<&str, ApiError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::MissingToken);
    };

    let auth_str = auth_header.to_str().map_err(|_| ApiError::InvalidHeader)?;

    // Scheme is case-insensitive; the credential is taken verbatim
    let (scheme, token) = auth_str.split_once(' ').ok_or(ApiError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::MissingToken);
    }

    Ok(token)
}
