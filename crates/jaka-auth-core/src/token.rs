//! Session token issuance and verification
//!
//! Session tokens are HS256 JWTs signed with the [`SigningKey`]. They carry
//! only the subject and the issue/expiry instants; nothing is stored
//! server-side, so a token stays valid until `exp` passes.

use chrono::Utc;
use jaka_types::SubjectId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AuthConfig;
use crate::crypto::SigningKey;
use crate::{AuthError, ConfigError};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issued at (unix seconds)
    #[serde(default)]
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

impl SessionClaims {
    /// Whether the token is past its expiry at `now`
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}

/// Opaque signed session credential
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an encoded token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Encoded token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the encoded token
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("length", &self.0.len())
            .finish_non_exhaustive()
    }
}

/// A freshly issued token and its validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: SessionToken,
    pub subject: SubjectId,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds
    pub expires_at: i64,
}

impl IssuedToken {
    /// Seconds between issue and expiry
    pub fn lifetime_secs(&self) -> u64 {
        u64::try_from(self.expires_at.saturating_sub(self.issued_at)).unwrap_or(0)
    }
}

/// Mints session tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    header: Header,
    ttl_secs: i64,
}

impl TokenIssuer {
    /// Create an issuer
    ///
    /// # Errors
    /// Returns error if `ttl` does not fit in `i64` seconds.
    pub fn new(key: &SigningKey, ttl: Duration) -> Result<Self, ConfigError> {
        let ttl_secs =
            i64::try_from(ttl.as_secs()).map_err(|_| ConfigError::InvalidDuration("token_ttl"))?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            header: Header::new(Algorithm::HS256),
            ttl_secs,
        })
    }

    /// Create an issuer from auth config
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(&config.signing_key, config.token_ttl)
    }

    /// Issue a token valid from now
    pub fn issue(&self, subject: &SubjectId) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    /// Issue a token valid from `now` (unix seconds) for the configured TTL
    pub fn issue_at(&self, subject: &SubjectId, now: i64) -> Result<IssuedToken, AuthError> {
        let claims = SessionClaims {
            sub: Some(subject.to_string()),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        let token = encode(&self.header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {}", e);
            AuthError::Internal("Failed to issue token".to_string())
        })?;

        tracing::debug!(%subject, expires_at = claims.exp, "Issued session token");

        Ok(IssuedToken {
            token: SessionToken(token),
            subject: subject.clone(),
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

/// Validates session tokens and recovers the subject
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `verify_at`, in the
        // same call as the signature check.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Create a verifier from auth config
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.signing_key)
    }

    /// Verify against the wall clock
    pub fn verify(&self, token: &str) -> Result<SubjectId, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature, expiry and subject at `now` (unix seconds).
    ///
    /// The signature is checked first, so an expired token with a valid
    /// signature is reported as [`AuthError::Expired`].
    pub fn verify_at(&self, token: &str, now: i64) -> Result<SubjectId, AuthError> {
        let claims = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Session token validation failed: {}", e);
                AuthError::InvalidSignature
            })?
            .claims;

        if claims.is_expired_at(now) {
            tracing::debug!(exp = claims.exp, now, "Session token expired");
            return Err(AuthError::Expired);
        }

        match claims.sub {
            Some(sub) if !sub.is_empty() => Ok(SubjectId::new(sub)),
            _ => {
                tracing::debug!("Session token has no subject");
                Err(AuthError::MissingSubject)
            }
        }
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
