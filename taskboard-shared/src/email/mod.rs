/// Outbound email delivery
///
/// The account store sends password reset links through an [`EmailSender`].
/// Implementations:
///
/// - [`SmtpEmailSender`]: SMTP relay via lettre
/// - [`LogEmailSender`]: records delivery in the log only (development)
/// - [`RecordingEmailSender`]: keeps messages in memory for assertions
///
/// # Example
///
/// ```
/// use taskboard_shared::email::{EmailSender, RecordingEmailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = RecordingEmailSender::new();
/// sender.send_email("ada@example.com", "Hello", "Body").await?;
/// assert_eq!(sender.sent().len(), 1);
/// # Ok(())
/// # }
/// ```

pub mod recording;
pub mod smtp;

use async_trait::async_trait;

pub use recording::{RecordingEmailSender, SentEmail};
pub use smtp::{SmtpConfig, SmtpEmailSender};

/// Error type for email delivery
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    /// Sender or recipient is not a valid mailbox
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(String),

    /// Transport rejected or failed to deliver the message
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Delivers a single plain-text email
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Sender that only logs the recipient and subject
///
/// Bodies are not logged since they may carry reset links.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

impl LogEmailSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send_email(&self, to: &str, subject: &str, _body: &str) -> Result<(), EmailError> {
        tracing::info!(recipient = %to, subject = %subject, "Email delivery skipped (log sender)");
        Ok(())
    }
}
