//! Jaka Types - Shared domain types
//!
//! This crate contains domain types used across Jaka services:
//! - Subject identity and authenticated principals
//! - Identity providers and token responses

pub mod auth;
pub mod principal;

pub use auth::*;
pub use principal::*;
