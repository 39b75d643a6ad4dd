//! Shared fixtures for store tests
#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use taskboard_shared::email::RecordingEmailSender;
use taskboard_shared::store::memory::{MemoryBoardRepository, MemoryUserRepository};
use taskboard_shared::store::{AccountStore, BoardStore, Registration, ResetSettings};

pub const FRONTEND_URL: &str = "http://localhost:5173";

pub struct Harness {
    pub boards: BoardStore,
    pub board_repo: Arc<MemoryBoardRepository>,
    pub accounts: AccountStore,
    pub user_repo: Arc<MemoryUserRepository>,
    pub outbox: RecordingEmailSender,
}

/// In-memory stores with a reset token lifetime of `reset_ttl`
pub fn harness_with_ttl(reset_ttl: Duration) -> Harness {
    harness_with_sender(reset_ttl, RecordingEmailSender::new())
}

pub fn harness_with_sender(reset_ttl: Duration, outbox: RecordingEmailSender) -> Harness {
    let board_repo = Arc::new(MemoryBoardRepository::new());
    let user_repo = Arc::new(MemoryUserRepository::new());

    let accounts = AccountStore::new(
        user_repo.clone(),
        Arc::new(outbox.clone()),
        ResetSettings {
            frontend_url: FRONTEND_URL.to_string(),
            token_ttl: reset_ttl,
        },
    );

    Harness {
        boards: BoardStore::new(board_repo.clone()),
        board_repo,
        accounts,
        user_repo,
        outbox,
    }
}

pub fn harness() -> Harness {
    harness_with_ttl(Duration::hours(1))
}

pub fn registration(email: &str) -> Registration {
    Registration {
        name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        country: "UK".to_string(),
        profile_photo: None,
    }
}

/// Pulls the plaintext token out of the last reset email
pub fn token_from_last_email(outbox: &RecordingEmailSender) -> String {
    let email = outbox.last().expect("a reset email should have been sent");
    let marker = "/reset-password/";
    let start = email.body.find(marker).expect("body should contain a reset link") + marker.len();

    email.body[start..]
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}
