//! Auth errors

use thiserror::Error;

use crate::crypto::{HmacKeyError, ProviderSecretError};

/// Authentication errors
///
/// Every rejection kind stays distinct here even though the HTTP layer
/// answers all of them with the same status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required login assertion field is absent or empty
    #[error("missing field: {field}")]
    MissingField { field: String },

    /// The assertion timestamp is not an integer
    #[error("malformed timestamp")]
    MalformedTimestamp,

    /// The assertion subject is not an integer
    #[error("malformed subject")]
    MalformedSubject,

    /// Assertion outside the freshness window, or session token past expiry
    #[error("credential expired")]
    Expired,

    /// Assertion digest does not match the provider signature
    #[error("signature mismatch")]
    SignatureMismatch,

    /// Session token signature (or structure) does not verify
    #[error("invalid signature")]
    InvalidSignature,

    /// Session token has no subject claim
    #[error("missing subject")]
    MissingSubject,

    /// Bearer matches neither the fixed credential nor a session token
    #[error("unknown credential")]
    UnknownCredential,

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Build a missing-field rejection
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Internal(_) => 500,
            _ => 401,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::MalformedTimestamp => "MALFORMED_TIMESTAMP",
            Self::MalformedSubject => "MALFORMED_SUBJECT",
            Self::Expired => "EXPIRED",
            Self::SignatureMismatch => "SIGNATURE_MISMATCH",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::MissingSubject => "MISSING_SUBJECT",
            Self::UnknownCredential => "UNKNOWN_CREDENTIAL",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this is a credential rejection (as opposed to a fault)
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// Configuration errors, raised at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Provider secret could not be derived
    #[error("provider secret: {0}")]
    ProviderSecret(#[from] ProviderSecretError),

    /// Token signing key is unusable
    #[error("signing key: {0}")]
    SigningKey(#[from] HmacKeyError),

    /// Signing key reuses the provider secret material
    #[error("signing key must differ from the provider token")]
    ReusedKeyMaterial,

    /// Test mode enabled without a credential
    #[error("test mode requires a non-empty fixed credential")]
    EmptyTestCredential,

    /// A duration setting is out of range
    #[error("invalid duration for {0}")]
    InvalidDuration(&'static str),
}
