//! Configuration for the Auth API service.

use jaka_auth_core::{AuthConfig, TestMode};
use jaka_types::SubjectId;
use std::time::Duration;

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Auth core configuration
    pub auth: AuthConfig,

    /// Request timeout
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if it is set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        let http_port = parse_or(&lookup, "HTTP_PORT", 8080u16)?;
        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        // Provider and signing secrets
        let bot_token =
            lookup("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let secret_key = lookup("SECRET_KEY").ok_or(ConfigError::Missing("SECRET_KEY"))?;

        // Freshness window (default 60 seconds)
        let max_age_secs: u64 = parse_or(&lookup, "AUTH_MAX_AGE_SECS", 60)?;

        // Token lifetime (default 30 minutes)
        let expire_minutes: u64 = parse_or(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", 30)?;
        if expire_minutes == 0 {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_EXPIRE_MINUTES"));
        }
        let token_ttl_secs = expire_minutes
            .checked_mul(60)
            .ok_or(ConfigError::Invalid("ACCESS_TOKEN_EXPIRE_MINUTES"))?;

        // Fixed test credential (off unless asked for)
        let test_mode = if parse_flag(&lookup, "TEST_MODE_ENABLED")? {
            let token =
                lookup("TEST_MODE_TOKEN").ok_or(ConfigError::Missing("TEST_MODE_TOKEN"))?;
            let subject = lookup("TEST_MODE_SUBJECT")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| TestMode::DEFAULT_SUBJECT.to_string());
            TestMode::enabled(token, SubjectId::new(subject))?
        } else {
            TestMode::Disabled
        };

        let auth = AuthConfig::try_new(&bot_token, secret_key.as_bytes())?
            .with_freshness_window(Duration::from_secs(max_age_secs))
            .with_token_ttl(Duration::from_secs(token_ttl_secs))
            .with_test_mode(test_mode);

        Ok(Self {
            http_port,
            auth,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(_) => Err(ConfigError::Invalid(key)),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(#[from] jaka_auth_core::ConfigError),
}
