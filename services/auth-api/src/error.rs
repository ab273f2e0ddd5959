//! Error types for the Auth API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jaka_auth_core::AuthError;
use serde::Serialize;

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid Authorization header encoding")]
    InvalidHeader,

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InvalidHeader => StatusCode::BAD_REQUEST,
            Self::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::Auth(e) => e.error_code(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        match &self {
            Self::Auth(e) if !e.is_rejection() => {
                tracing::error!(error = ?e, "Internal API error");
            }
            _ => tracing::debug!(code, "Request rejected"),
        }

        // Internal details stay in the log.
        let message = match &self {
            Self::Auth(AuthError::Internal(_)) => "Internal error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_unauthorized() {
        for err in [
            AuthError::Expired,
            AuthError::SignatureMismatch,
            AuthError::InvalidSignature,
            AuthError::UnknownCredential,
            AuthError::missing_field("hash"),
        ] {
            let api = ApiError::from(err);
            assert_eq!(api.status_code(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(ApiError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidHeader.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_is_server_error() {
        let api = ApiError::from(AuthError::Internal("encoder failed".into()));
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_error_code_passthrough() {
        assert_eq!(ApiError::from(AuthError::Expired).error_code(), "EXPIRED");
        assert_eq!(ApiError::MissingToken.error_code(), "MISSING_TOKEN");
    }
}
