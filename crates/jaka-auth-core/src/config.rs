//! Configuration types for auth service

use jaka_types::SubjectId;
use std::time::Duration;

use crate::assertion::AssertionFields;
use crate::crypto::{sha256, ProviderSecret, SigningKey};
use crate::ConfigError;

/// Fixed test credential settings.
///
/// Disabled unless a deployment opts in explicitly.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum TestMode {
    /// Only session tokens are accepted
    #[default]
    Disabled,
    /// `token` is accepted as a bearer and resolves to `subject`
    Enabled { token: String, subject: SubjectId },
}

impl TestMode {
    /// Default subject for the fixed credential
    pub const DEFAULT_SUBJECT: &'static str = "demo";

    /// Enable the fixed credential.
    ///
    /// # Errors
    /// Returns error if `token` is empty.
    pub fn enabled(token: impl Into<String>, subject: SubjectId) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyTestCredential);
        }
        Ok(Self::Enabled { token, subject })
    }

    /// Whether the fixed credential is accepted
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }
}

impl std::fmt::Debug for TestMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Enabled { subject, .. } => f
                .debug_struct("Enabled")
                .field("subject", subject)
                .finish_non_exhaustive(),
        }
    }
}

/// Auth service configuration
///
/// Built once at startup and handed to each component; nothing here changes
/// afterwards.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key for provider login assertions (SHA-256 of the bot token)
    pub provider_secret: ProviderSecret,
    /// HMAC key for this system's session tokens
    pub signing_key: SigningKey,
    /// Maximum age of a login assertion
    pub freshness_window: Duration,
    /// Session token lifetime
    pub token_ttl: Duration,
    /// Fixed test credential
    pub test_mode: TestMode,
    /// Wire names of the required assertion fields
    pub fields: AssertionFields,
}

impl AuthConfig {
    /// Default assertion freshness window (60 seconds)
    pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(60);
    /// Default session token lifetime (30 minutes)
    pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

    /// Create a new auth config
    ///
    /// # Errors
    /// - the provider token is empty
    /// - the signing key is shorter than 32 bytes
    /// - the signing key reuses the provider token or its derived secret
    pub fn try_new(provider_token: &str, signing_key: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
        let signing_key = signing_key.as_ref();
        if signing_key == provider_token.as_bytes()
            || signing_key == sha256(provider_token.as_bytes()).as_slice()
        {
            return Err(ConfigError::ReusedKeyMaterial);
        }

        Ok(Self {
            provider_secret: ProviderSecret::derive(provider_token)?,
            signing_key: SigningKey::new(signing_key)?,
            freshness_window: Self::DEFAULT_FRESHNESS_WINDOW,
            token_ttl: Self::DEFAULT_TOKEN_TTL,
            test_mode: TestMode::Disabled,
            fields: AssertionFields::default(),
        })
    }

    /// Set assertion freshness window
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    /// Set session token lifetime
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Set fixed test credential mode
    pub fn with_test_mode(mut self, test_mode: TestMode) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// Set assertion field names
    pub fn with_fields(mut self, fields: AssertionFields) -> Self {
        self.fields = fields;
        self
    }
}
