//! HTTP handlers

mod auth;
mod health;
mod private;
mod public;

pub use auth::{me, telegram_login};
pub use health::health;
pub use private::{admin, dashboard};
pub use public::{home, info};

/// `{"message": ...}` body shared by the simple routes
#[derive(Debug, serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
