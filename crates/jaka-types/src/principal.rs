//! Subject and principal types

use serde::{Deserialize, Serialize};

/// Stable subject identifier as issued by the identity provider.
///
/// Telegram user ids are integers, but the value travels through session
/// tokens as a string claim, so it is stored in its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Create a subject id from its textual form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is a base-10 integer (the provider's native form)
    pub fn is_integer(&self) -> bool {
        self.0.parse::<i64>().is_ok()
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for SubjectId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// How a principal was authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalSource {
    /// Fixed test credential (test mode only)
    FixedCredential,
    /// Verified session token
    SessionToken,
}

impl std::fmt::Display for PrincipalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedCredential => write!(f, "fixed_credential"),
            Self::SessionToken => write!(f, "session_token"),
        }
    }
}

/// Authenticated identity resolved from a verified credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated subject
    pub subject: SubjectId,
    /// Verification path that produced this principal
    pub source: PrincipalSource,
}

impl Principal {
    /// Principal recovered from a session token
    pub fn from_session(subject: SubjectId) -> Self {
        Self {
            subject,
            source: PrincipalSource::SessionToken,
        }
    }

    /// Principal for the fixed test credential
    pub fn fixed(subject: SubjectId) -> Self {
        Self {
            subject,
            source: PrincipalSource::FixedCredential,
        }
    }
}
