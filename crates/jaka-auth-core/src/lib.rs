//! Jaka Auth Core - Authentication business logic
//!
//! Verifies third-party login assertions (Telegram Login Widget), issues
//! and verifies stateless session tokens, and resolves bearer credentials
//! to principals.

pub mod assertion;
pub mod config;
pub mod crypto;
pub mod dispatch;
pub mod error;
pub mod service;
pub mod token;

pub use assertion::{AssertionFields, AssertionValidator, CanonicalPayload, LoginAssertion};
pub use config::{AuthConfig, TestMode};
pub use crypto::{ProviderSecret, SigningKey};
pub use dispatch::{CredentialDispatcher, CredentialKind};
pub use error::*;
pub use service::*;
pub use token::{IssuedToken, SessionClaims, SessionToken, TokenIssuer, TokenVerifier};
