//! Cryptographic utilities for secure operations
//!
//! This module provides security-critical primitives that must be implemented
//! correctly to prevent timing attacks and other side-channel vulnerabilities.
//!
//! Two keys live here and they must never be interchanged:
//! - [`ProviderSecret`] authenticates login assertions signed by the identity provider.
//! - [`SigningKey`] authenticates session tokens issued by this system.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Pre-keyed HMAC-SHA256 instance for efficient repeated signing operations.
///
/// Keying an HMAC from raw bytes has overhead. This struct keys once and
/// clones the keyed state for every signature.
#[derive(Clone)]
pub struct HmacKey {
    mac: Hmac<Sha256>,
    key_length: usize,
}

impl HmacKey {
    /// Minimum allowed key length in bytes (256 bits)
    pub const MIN_KEY_LENGTH: usize = 32;

    /// Create a new HMAC key from bytes.
    ///
    /// # Errors
    /// Returns error if key is too short (less than 32 bytes).
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        let key_bytes = key.as_ref();
        if key_bytes.len() < Self::MIN_KEY_LENGTH {
            return Err(HmacKeyError::KeyTooShort {
                actual: key_bytes.len(),
                minimum: Self::MIN_KEY_LENGTH,
            });
        }
        let mac = Hmac::<Sha256>::new_from_slice(key_bytes)
            .map_err(|_| HmacKeyError::InvalidLength)?;
        Ok(Self {
            mac,
            key_length: key_bytes.len(),
        })
    }

    /// Sign data and return the MAC bytes
    pub fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Sign data and return the lowercase hex MAC
    pub fn sign_hex(&self, data: &[u8]) -> String {
        hex::encode(self.sign(data))
    }
}

impl std::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacKey")
            .field("key_length", &self.key_length)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur when creating an HMAC key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HmacKeyError {
    #[error("HMAC key too short: got {actual} bytes, need at least {minimum}")]
    KeyTooShort { actual: usize, minimum: usize },

    #[error("HMAC key has an invalid length")]
    InvalidLength,
}

/// Secret shared with the identity provider.
///
/// Derived once from the provider (bot) token as `SHA-256(token)` and used as
/// the HMAC key for login assertion digests. The raw token is not retained.
#[derive(Clone)]
pub struct ProviderSecret {
    key: HmacKey,
}

impl ProviderSecret {
    /// Derive the secret from the configured provider token.
    ///
    /// # Errors
    /// Returns error if the token is empty.
    pub fn derive(provider_token: &str) -> Result<Self, ProviderSecretError> {
        if provider_token.is_empty() {
            return Err(ProviderSecretError::EmptyToken);
        }
        let digest = sha256(provider_token.as_bytes());
        // A SHA-256 digest is exactly the minimum HMAC key length.
        let key = HmacKey::new(digest).map_err(ProviderSecretError::Key)?;
        Ok(Self { key })
    }

    /// Lowercase hex HMAC-SHA256 of `data` under this secret
    pub fn digest_hex(&self, data: &[u8]) -> String {
        self.key.sign_hex(data)
    }
}

impl std::fmt::Debug for ProviderSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProviderSecret(<redacted>)")
    }
}

/// Errors that can occur when deriving the provider secret
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderSecretError {
    #[error("provider token is empty")]
    EmptyToken,

    #[error(transparent)]
    Key(HmacKeyError),
}

/// Key used to sign and verify this system's own session tokens.
#[derive(Clone)]
pub struct SigningKey {
    key_bytes: Arc<[u8]>,
}

impl SigningKey {
    /// Create a signing key from raw bytes.
    ///
    /// # Errors
    /// Returns error if key is shorter than [`HmacKey::MIN_KEY_LENGTH`].
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, HmacKeyError> {
        let key_bytes = key.as_ref();
        if key_bytes.len() < HmacKey::MIN_KEY_LENGTH {
            return Err(HmacKeyError::KeyTooShort {
                actual: key_bytes.len(),
                minimum: HmacKey::MIN_KEY_LENGTH,
            });
        }
        Ok(Self {
            key_bytes: Arc::from(key_bytes),
        })
    }

    /// Raw key bytes, for building JWT encoding/decoding keys
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.key_bytes
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_length", &self.key_bytes.len())
            .finish_non_exhaustive()
    }
}

/// Constant-time byte slice comparison.
///
/// The comparison time depends only on the length of the slices, not on
/// their contents.
///
/// # Security
/// - Returns `false` immediately if lengths differ (length is not secret)
/// - Compares all bytes even after finding a difference
#[inline]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Constant-time string comparison.
///
/// Wrapper around `constant_time_eq` for string comparisons.
#[inline]
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

/// One-way SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_eq_equal() {
        let a = b"hello world";
        let b = b"hello world";
        assert!(constant_time_eq(a, b));
    }

    #[test]
    fn test_constant_time_eq_different() {
        let a = b"hello world";
        let b = b"hello worle";
        assert!(!constant_time_eq(a, b));
    }

    #[test]
    fn test_constant_time_eq_different_lengths() {
        let a = b"hello";
        let b = b"hello world";
        assert!(!constant_time_eq(a, b));
    }

    #[test]
    fn test_constant_time_eq_empty() {
        let a: &[u8] = b"";
        let b: &[u8] = b"";
        assert!(constant_time_eq(a, b));
    }

    #[test]
    fn test_constant_time_str_eq() {
        assert!(constant_time_str_eq("secret", "secret"));
        assert!(!constant_time_str_eq("secret", "secreT"));
    }

    #[test]
    fn test_hmac_key_too_short() {
        let result = HmacKey::new("short");
        assert!(matches!(result, Err(HmacKeyError::KeyTooShort { .. })));
    }

    #[test]
    fn test_hmac_sign_is_deterministic() {
        let key = HmacKey::new("k".repeat(32)).unwrap();
        let data = b"test data to sign";
        assert_eq!(key.sign(data), key.sign(data));
        assert_ne!(key.sign(data), key.sign(b"wrong data"));
    }

    #[test]
    fn test_hmac_sign_hex_matches_raw() {
        let key = HmacKey::new("k".repeat(32)).unwrap();
        let raw = key.sign(b"payload");
        assert_eq!(key.sign_hex(b"payload"), hex::encode(raw));
        assert_eq!(key.sign_hex(b"payload").len(), 64);
    }

    #[test]
    fn test_provider_secret_rejects_empty_token() {
        assert!(matches!(
            ProviderSecret::derive(""),
            Err(ProviderSecretError::EmptyToken)
        ));
    }

    #[test]
    fn test_provider_secret_keys_hmac_with_token_digest() {
        let secret = ProviderSecret::derive("bot123").unwrap();
        let expected = {
            let mut mac = Hmac::<Sha256>::new_from_slice(&sha256(b"bot123")).unwrap();
            mac.update(b"auth_date=1\nid=2");
            hex::encode(mac.finalize().into_bytes())
        };
        assert_eq!(secret.digest_hex(b"auth_date=1\nid=2"), expected);
    }

    #[test]
    fn test_provider_secret_debug_is_redacted() {
        let secret = ProviderSecret::derive("bot123").unwrap();
        let rendered = format!("{secret:?}");
        assert!(!rendered.contains("bot123"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_signing_key_minimum_length() {
        assert!(SigningKey::new("a".repeat(31)).is_err());
        assert!(SigningKey::new("a".repeat(32)).is_ok());
        let key = SigningKey::new("a".repeat(40)).unwrap();
        assert!(format!("{key:?}").contains("key_length: 40"));
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
