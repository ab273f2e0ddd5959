//! Application state

use std::sync::Arc;

use jaka_auth_core::AuthService;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Auth service for assertion login and bearer authentication
    pub auth: Arc<AuthService>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(auth: AuthService, config: Config) -> Self {
        Self {
            auth: Arc::new(auth),
            config: Arc::new(config),
        }
    }

    /// Build the auth service from config and wrap both
    pub fn from_config(config: Config) -> Result<Self, jaka_auth_core::ConfigError> {
        let auth = AuthService::new(config.auth.clone())?;
        Ok(Self::new(auth, config))
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
