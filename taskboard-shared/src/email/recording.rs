/// In-memory email sender
///
/// Stores every message instead of delivering it. Clones share the same
/// outbox, so a test can hand one clone to the account store and inspect
/// the other.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{EmailError, EmailSender};

/// A captured message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct Outbox {
    sent: Vec<SentEmail>,
    fail_with: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    outbox: Arc<Mutex<Outbox>>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender whose every delivery fails with a transport error
    pub fn failing(reason: &str) -> Self {
        let sender = Self::default();
        sender.outbox().fail_with = Some(reason.to_string());
        sender
    }

    /// Messages delivered so far, oldest first
    pub fn sent(&self) -> Vec<SentEmail> {
        self.outbox().sent.clone()
    }

    /// Most recent message, if any
    pub fn last(&self) -> Option<SentEmail> {
        self.outbox().sent.last().cloned()
    }

    fn outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let mut outbox = self.outbox();

        if let Some(reason) = &outbox.fail_with {
            return Err(EmailError::Transport(reason.clone()));
        }

        outbox.sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
