//! Login assertion verification
//!
//! Verifies the signed payload the identity provider (Telegram Login Widget)
//! hands back after a user logs in. Verification is three layered checks:
//!
//! 1. structure: the subject, timestamp and signature fields are present
//! 2. freshness: the assertion is at most `freshness_window` old, and not
//!    from the future
//! 3. digest: `HMAC-SHA256(SHA-256(bot_token), canonical_payload)` matches
//!    the presented signature
//!
//! The canonical payload is a wire contract with the provider: every field
//! except the signature, with empty or absent values dropped, sorted by
//! name, rendered as `name=value` and joined with `\n`.

use jaka_types::SubjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::AuthConfig;
use crate::crypto::{constant_time_str_eq, ProviderSecret};
use crate::{AuthError, ConfigError};

/// Wire names of the fields every assertion must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFields {
    /// Stable subject identifier (integer-valued)
    pub subject: String,
    /// Authentication time, unix seconds
    pub timestamp: String,
    /// Hex-encoded HMAC digest
    pub signature: String,
}

impl AssertionFields {
    /// Custom field naming
    pub fn new(
        subject: impl Into<String>,
        timestamp: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            timestamp: timestamp.into(),
            signature: signature.into(),
        }
    }

    /// Telegram Login Widget naming: `id`, `auth_date`, `hash`
    pub fn telegram() -> Self {
        Self::new("id", "auth_date", "hash")
    }
}

impl Default for AssertionFields {
    fn default() -> Self {
        Self::telegram()
    }
}

/// Field map received from the identity provider.
///
/// Deserializes from a flat JSON object. Numbers and booleans are kept as
/// their JSON text (`42`, `true`) and `null` values are treated as absent, so
/// the map holds exactly what the provider rendered into its own digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, serde_json::Value>",
    into = "BTreeMap<String, String>"
)]
pub struct LoginAssertion {
    fields: BTreeMap<String, String>,
}

impl LoginAssertion {
    /// Create an empty assertion
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Field value, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Field value, if present and non-empty
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// Iterate fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the assertion has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LoginAssertion {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<BTreeMap<String, serde_json::Value>> for LoginAssertion {
    type Error = AssertionFormatError;

    fn try_from(raw: BTreeMap<String, serde_json::Value>) -> Result<Self, Self::Error> {
        use serde_json::Value;

        let mut fields = BTreeMap::new();
        for (name, value) in raw {
            let rendered = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AssertionFormatError::NestedValue(name))
                }
            };
            fields.insert(name, rendered);
        }
        Ok(Self { fields })
    }
}

impl From<LoginAssertion> for BTreeMap<String, String> {
    fn from(assertion: LoginAssertion) -> Self {
        assertion.fields
    }
}

/// Assertion JSON that cannot be represented as a flat field map
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssertionFormatError {
    #[error("field `{0}` must be a string, number, boolean or null")]
    NestedValue(String),
}

/// Deterministic HMAC input derived from an assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPayload(String);

impl CanonicalPayload {
    /// Build the canonical payload, excluding `signature_field`.
    ///
    /// The assertion is borrowed and left untouched.
    pub fn build(assertion: &LoginAssertion, signature_field: &str) -> Self {
        // BTreeMap iterates in byte order of the names, which is the sort the
        // provider applies.
        let lines: Vec<String> = assertion
            .iter()
            .filter(|(name, value)| *name != signature_field && !value.is_empty())
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Self(lines.join("\n"))
    }

    /// Payload text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Payload bytes (HMAC input)
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// Check a presented hex signature against the payload digest.
///
/// Never fails: any mismatch, including a malformed signature, is `false`.
pub fn verify_digest(secret: &ProviderSecret, payload: &CanonicalPayload, presented: &str) -> bool {
    let expected = secret.digest_hex(payload.as_bytes());
    constant_time_str_eq(&expected, presented)
}

/// Fresh iff `0 <= now - auth_timestamp <= max_age_secs`.
///
/// Timestamps from the future are never fresh.
pub fn is_fresh(auth_timestamp: i64, now: i64, max_age_secs: i64) -> bool {
    match now.checked_sub(auth_timestamp) {
        Some(age) => (0..=max_age_secs).contains(&age),
        None => false,
    }
}

/// Accept/reject decision over provider login assertions.
#[derive(Debug, Clone)]
pub struct AssertionValidator {
    secret: ProviderSecret,
    fields: AssertionFields,
    max_age_secs: i64,
}

impl AssertionValidator {
    /// Create a validator
    ///
    /// # Errors
    /// Returns error if `freshness_window` does not fit in `i64` seconds.
    pub fn new(
        secret: ProviderSecret,
        fields: AssertionFields,
        freshness_window: Duration,
    ) -> Result<Self, ConfigError> {
        let max_age_secs = i64::try_from(freshness_window.as_secs())
            .map_err(|_| ConfigError::InvalidDuration("freshness_window"))?;
        Ok(Self {
            secret,
            fields,
            max_age_secs,
        })
    }

    /// Create a validator from auth config
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.provider_secret.clone(),
            config.fields.clone(),
            config.freshness_window,
        )
    }

    /// Validate against the wall clock
    pub fn validate(&self, assertion: &LoginAssertion) -> Result<SubjectId, AuthError> {
        self.validate_at(assertion, chrono::Utc::now().timestamp())
    }

    /// Validate at `now` (unix seconds) and return the subject.
    ///
    /// Structural checks run before the digest is computed.
    pub fn validate_at(&self, assertion: &LoginAssertion, now: i64) -> Result<SubjectId, AuthError> {
        let subject = self.required(assertion, &self.fields.subject)?;
        let timestamp = self.required(assertion, &self.fields.timestamp)?;
        let signature = self.required(assertion, &self.fields.signature)?;

        let auth_timestamp: i64 = timestamp.parse().map_err(|_| {
            tracing::debug!(timestamp, "Assertion timestamp is not an integer");
            AuthError::MalformedTimestamp
        })?;

        if !is_fresh(auth_timestamp, now, self.max_age_secs) {
            tracing::debug!(
                age_secs = now.saturating_sub(auth_timestamp),
                max_age_secs = self.max_age_secs,
                "Assertion outside freshness window"
            );
            return Err(AuthError::Expired);
        }

        let subject = SubjectId::new(subject);
        if !subject.is_integer() {
            tracing::debug!(%subject, "Assertion subject is not an integer");
            return Err(AuthError::MalformedSubject);
        }

        let payload = CanonicalPayload::build(assertion, &self.fields.signature);
        if !verify_digest(&self.secret, &payload, signature) {
            tracing::warn!(%subject, "Assertion signature mismatch");
            return Err(AuthError::SignatureMismatch);
        }

        Ok(subject)
    }

    fn required<'a>(&self, assertion: &'a LoginAssertion, field: &str) -> Result<&'a str, AuthError> {
        assertion.non_empty(field).ok_or_else(|| {
            tracing::debug!(field, "Assertion missing required field");
            AuthError::missing_field(field)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn neutral_fields() -> AssertionFields {
        AssertionFields::new("subject_id", "auth_timestamp", "signature")
    }

    fn validator(token: &str) -> AssertionValidator {
        AssertionValidator::new(
            ProviderSecret::derive(token).unwrap(),
            neutral_fields(),
            Duration::from_secs(60),
        )
        .unwrap()
    }

    fn signed(token: &str, assertion: LoginAssertion) -> LoginAssertion {
        let secret = ProviderSecret::derive(token).unwrap();
        let payload = CanonicalPayload::build(&assertion, "signature");
        let sig = secret.digest_hex(payload.as_bytes());
        assertion.with("signature", sig)
    }

    fn ana(ts: i64) -> LoginAssertion {
        LoginAssertion::new()
            .with("subject_id", "42")
            .with("auth_timestamp", ts.to_string())
            .with("first_name", "Ana")
    }

    #[test]
    fn test_canonical_payload_format() {
        let assertion = ana(NOW).with("signature", "ff");
        let payload = CanonicalPayload::build(&assertion, "signature");
        assert_eq!(
            payload.as_str(),
            format!("auth_timestamp={NOW}\nfirst_name=Ana\nsubject_id=42")
        );
    }

    #[test]
    fn test_canonical_payload_drops_empty_values() {
        let assertion = ana(NOW).with("last_name", "").with("username", "ana");
        let payload = CanonicalPayload::build(&assertion, "signature");
        assert!(!payload.as_str().contains("last_name"));
        assert!(payload.as_str().ends_with("username=ana"));
    }

    #[test]
    fn test_canonical_payload_leaves_input_untouched() {
        let assertion = ana(NOW).with("signature", "abc");
        let before = assertion.clone();
        let _ = CanonicalPayload::build(&assertion, "signature");
        assert_eq!(assertion, before);
        assert_eq!(assertion.get("signature"), Some("abc"));
    }

    #[test]
    fn test_known_scenario_accepts() {
        let assertion = signed("bot123", ana(NOW));
        let subject = validator("bot123").validate_at(&assertion, NOW).unwrap();
        assert_eq!(subject.as_str(), "42");
    }

    #[test]
    fn test_known_scenario_tampered_field_rejected() {
        let assertion = signed("bot123", ana(NOW)).with("first_name", "Anna");
        let result = validator("bot123").validate_at(&assertion, NOW);
        assert_eq!(result, Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let assertion = signed("bot123", ana(NOW));
        let result = validator("bot456").validate_at(&assertion, NOW);
        assert_eq!(result, Err(AuthError::SignatureMismatch));
    }

    #[test]
    fn test_missing_fields_named() {
        let v = validator("bot123");
        let base = signed("bot123", ana(NOW));

        for field in ["subject_id", "auth_timestamp", "signature"] {
            let stripped: LoginAssertion = base.iter().filter(|(k, _)| *k != field).collect();
            assert_eq!(
                v.validate_at(&stripped, NOW),
                Err(AuthError::missing_field(field))
            );
        }

        let empty_sig = base.clone().with("signature", "");
        assert_eq!(
            v.validate_at(&empty_sig, NOW),
            Err(AuthError::missing_field("signature"))
        );
    }

    #[test]
    fn test_malformed_timestamp() {
        let assertion = ana(NOW).with("auth_timestamp", "yesterday").with("signature", "00");
        assert_eq!(
            validator("bot123").validate_at(&assertion, NOW),
            Err(AuthError::MalformedTimestamp)
        );
    }

    #[test]
    fn test_malformed_subject() {
        let assertion = signed("bot123", ana(NOW).with("subject_id", "ana"));
        assert_eq!(
            validator("bot123").validate_at(&assertion, NOW),
            Err(AuthError::MalformedSubject)
        );
    }

    #[test]
    fn test_freshness_window_edges() {
        let v = validator("bot123");
        let assertion = signed("bot123", ana(NOW));

        assert!(v.validate_at(&assertion, NOW + 60).is_ok());
        assert_eq!(v.validate_at(&assertion, NOW + 61), Err(AuthError::Expired));
        assert_eq!(v.validate_at(&assertion, NOW - 1), Err(AuthError::Expired));
    }

    #[test]
    fn test_is_fresh() {
        assert!(is_fresh(100, 100, 60));
        assert!(is_fresh(100, 160, 60));
        assert!(!is_fresh(100, 161, 60));
        assert!(!is_fresh(101, 100, 60));
        assert!(!is_fresh(i64::MIN, i64::MAX, 60));
        assert!(!is_fresh(i64::MAX, i64::MIN, 60));
    }

    #[test]
    fn test_verify_digest_rejects_malformed_signature() {
        let secret = ProviderSecret::derive("bot123").unwrap();
        let payload = CanonicalPayload::build(&ana(NOW), "signature");
        assert!(!verify_digest(&secret, &payload, ""));
        assert!(!verify_digest(&secret, &payload, "not-hex"));
        let good = secret.digest_hex(payload.as_bytes());
        assert!(verify_digest(&secret, &payload, &good));
        assert!(!verify_digest(&secret, &payload, &good.to_uppercase()));
    }

    #[test]
    fn test_telegram_field_names() {
        let v = AssertionValidator::new(
            ProviderSecret::derive("bot123").unwrap(),
            AssertionFields::telegram(),
            Duration::from_secs(60),
        )
        .unwrap();
        let unsigned = LoginAssertion::new()
            .with("id", "7")
            .with("auth_date", NOW.to_string())
            .with("username", "ana");
        let payload = CanonicalPayload::build(&unsigned, "hash");
        assert_eq!(payload.as_str(), format!("auth_date={NOW}\nid=7\nusername=ana"));
        let sig = ProviderSecret::derive("bot123")
            .unwrap()
            .digest_hex(payload.as_bytes());
        let assertion = unsigned.with("hash", sig);
        assert_eq!(v.validate_at(&assertion, NOW).unwrap().as_str(), "7");
    }

    #[test]
    fn test_deserialize_renders_scalars() {
        let assertion: LoginAssertion = serde_json::from_value(serde_json::json!({
            "id": 42,
            "auth_date": 1700000000,
            "hash": "ab",
            "first_name": "Ana",
            "last_name": null,
            "is_bot": false
        }))
        .unwrap();
        assert_eq!(assertion.get("id"), Some("42"));
        assert_eq!(assertion.get("auth_date"), Some("1700000000"));
        assert_eq!(assertion.get("is_bot"), Some("false"));
        assert_eq!(assertion.get("last_name"), None);
        assert_eq!(assertion.len(), 5);
    }

    #[test]
    fn test_deserialize_rejects_nested_values() {
        let result: Result<LoginAssertion, _> =
            serde_json::from_value(serde_json::json!({ "id": 1, "extra": { "a": 1 } }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_flat_map() {
        let assertion = LoginAssertion::new().with("id", "1").with("hash", "ab");
        let json = serde_json::to_value(&assertion).unwrap();
        assert_eq!(json, serde_json::json!({ "hash": "ab", "id": "1" }));
    }
}
