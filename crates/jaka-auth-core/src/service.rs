//! Auth service - ties together assertion validation, token issuance and
//! bearer dispatch

use chrono::Utc;
use jaka_types::Principal;

use crate::{
    assertion::{AssertionValidator, LoginAssertion},
    config::AuthConfig,
    dispatch::CredentialDispatcher,
    token::{IssuedToken, TokenIssuer},
    AuthError, ConfigError,
};

/// Authentication service
///
/// Provides a single entry point for:
/// - Provider login (assertion in, session token out)
/// - Bearer authentication (fixed credential or session token)
///
/// All state is fixed at construction, so one instance can be shared behind
/// an `Arc` by every request handler.
pub struct AuthService {
    validator: AssertionValidator,
    issuer: TokenIssuer,
    dispatcher: CredentialDispatcher,
}

impl AuthService {
    /// Create a new auth service
    ///
    /// # Errors
    /// Returns error if a configured duration does not fit in whole seconds.
    pub fn new(config: AuthConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            validator: AssertionValidator::from_config(&config)?,
            issuer: TokenIssuer::from_config(&config)?,
            dispatcher: CredentialDispatcher::from_config(&config),
        })
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Exchange a provider login assertion for a session token
    pub fn login(&self, assertion: &LoginAssertion) -> Result<IssuedToken, AuthError> {
        self.login_at(assertion, Utc::now().timestamp())
    }

    /// Exchange a provider login assertion for a session token at `now`
    pub fn login_at(&self, assertion: &LoginAssertion, now: i64) -> Result<IssuedToken, AuthError> {
        let subject = self.validator.validate_at(assertion, now)?;
        let issued = self.issuer.issue_at(&subject, now)?;
        tracing::info!(%subject, expires_at = issued.expires_at, "Login succeeded");
        Ok(issued)
    }

    // =========================================================================
    // Bearer Authentication
    // =========================================================================

    /// Resolve a bearer credential to a principal
    pub fn authenticate(&self, bearer: &str) -> Result<Principal, AuthError> {
        self.dispatcher.authenticate(bearer)
    }

    /// Resolve a bearer credential to a principal at `now`
    pub fn authenticate_at(&self, bearer: &str, now: i64) -> Result<Principal, AuthError> {
        self.dispatcher.authenticate_at(bearer, now)
    }

    /// Whether the fixed test credential is accepted
    pub fn test_mode_enabled(&self) -> bool {
        self.dispatcher.test_mode_enabled()
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("issuer", &self.issuer)
            .field("test_mode", &self.test_mode_enabled())
            .finish_non_exhaustive()
    }
}
