//! Common test utilities for jaka-auth-core integration tests

#![allow(dead_code)]

use jaka_auth_core::{AuthConfig, CanonicalPayload, LoginAssertion, ProviderSecret};

pub const BOT_TOKEN: &str = "123456789:AAH-test-bot-token";
pub const SIGNING_KEY: &str = "integration-signing-key-0123456789abcdef";
pub const NOW: i64 = 1_700_000_000;

/// Sign an assertion the way the provider does and attach the `hash` field
pub fn sign_assertion(bot_token: &str, assertion: LoginAssertion) -> LoginAssertion {
    let payload = CanonicalPayload::build(&assertion, "hash");
    let hash = ProviderSecret::derive(bot_token)
        .expect("bot token is non-empty")
        .digest_hex(payload.as_bytes());
    assertion.with("hash", hash)
}

/// A signed Telegram-style assertion for `id` at `auth_date`
pub fn telegram_assertion(id: i64, auth_date: i64) -> LoginAssertion {
    sign_assertion(
        BOT_TOKEN,
        LoginAssertion::new()
            .with("id", id.to_string())
            .with("auth_date", auth_date.to_string())
            .with("first_name", "Ana")
            .with("username", "ana_dev"),
    )
}

pub fn test_config() -> AuthConfig {
    AuthConfig::try_new(BOT_TOKEN, SIGNING_KEY).expect("test config is valid")
}
