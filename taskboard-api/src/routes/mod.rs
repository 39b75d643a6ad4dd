/// API route handlers
///
/// - `health`: health check
/// - `auth`: login, session check and logout
/// - `users`: registration, profile, password change and reset
/// - `boards`: board aggregate CRUD

pub mod auth;
pub mod boards;
pub mod health;
pub mod users;

use serde::{Deserialize, Serialize};

/// Plain confirmation body
#[derive(Debug, Serialize, Deserialize)]
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
