//! Bearer credential dispatch

use chrono::Utc;
use jaka_types::{Principal, SubjectId};

use crate::config::{AuthConfig, TestMode};
use crate::crypto::constant_time_str_eq;
use crate::token::TokenVerifier;
use crate::AuthError;

/// Shape of a presented bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind<'a> {
    /// Equal to the fixed test credential (test mode only), carrying its subject
    FixedCredential(&'a SubjectId),
    /// Three dot-separated segments, like a JWT
    SessionToken,
    /// Anything else
    Unknown,
}

impl<'a> CredentialKind<'a> {
    /// Classify a bearer value by shape alone; nothing is verified here
    pub fn classify(bearer: &str, test_mode: &'a TestMode) -> Self {
        if let TestMode::Enabled { token, subject } = test_mode {
            if constant_time_str_eq(bearer, token) {
                return Self::FixedCredential(subject);
            }
        }

        let segments = bearer.split('.').count();
        if segments == 3 && bearer.split('.').all(|s| !s.is_empty()) {
            Self::SessionToken
        } else {
            Self::Unknown
        }
    }
}

/// Routes a bearer credential to the verifier that understands it
#[derive(Debug, Clone)]
pub struct CredentialDispatcher {
    test_mode: TestMode,
    verifier: TokenVerifier,
}

impl CredentialDispatcher {
    pub fn new(test_mode: TestMode, verifier: TokenVerifier) -> Self {
        Self {
            test_mode,
            verifier,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        if let TestMode::Enabled { subject, .. } = &config.test_mode {
            tracing::warn!(
                %subject,
                "Fixed test credential is ENABLED; do not run this configuration in production"
            );
        }
        Self::new(config.test_mode.clone(), TokenVerifier::from_config(config))
    }

    /// Whether the fixed credential is accepted
    pub fn test_mode_enabled(&self) -> bool {
        self.test_mode.is_enabled()
    }

    /// Authenticate a bearer against the wall clock
    pub fn authenticate(&self, bearer: &str) -> Result<Principal, AuthError> {
        self.authenticate_at(bearer, Utc::now().timestamp())
    }

    /// Authenticate a bearer at `now` (unix seconds)
    pub fn authenticate_at(&self, bearer: &str, now: i64) -> Result<Principal, AuthError> {
        match CredentialKind::classify(bearer, &self.test_mode) {
            CredentialKind::FixedCredential(subject) => {
                tracing::info!(%subject, "Authenticated with fixed test credential");
                Ok(Principal::fixed(subject.clone()))
            }
            CredentialKind::SessionToken => {
                let subject = self.verifier.verify_at(bearer, now)?;
                Ok(Principal::from_session(subject))
            }
            CredentialKind::Unknown => {
                tracing::debug!(length = bearer.len(), "Unrecognized bearer credential");
                Err(AuthError::UnknownCredential)
            }
        }
    }
}
