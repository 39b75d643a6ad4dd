/// SMTP email delivery via lettre
///
/// The transport sits behind the [`Mailer`] seam so message assembly can be
/// tested without a relay.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::{EmailError, EmailSender};

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// From address, e.g. `Taskboard <no-reply@example.com>`
    pub from: String,
}

/// Hands an assembled message to a transport
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Message) -> Result<(), EmailError>;
}

#[async_trait]
impl Mailer for AsyncSmtpTransport<Tokio1Executor> {
    async fn send(&self, email: Message) -> Result<(), EmailError> {
        AsyncTransport::send(self, email)
            .await
            .map(|_response| ())
            .map_err(|e| EmailError::Transport(e.to_string()))
    }
}

pub struct SmtpEmailSender {
    mailer: Box<dyn Mailer>,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Builds a STARTTLS relay transport from config
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the from address does not parse or the relay
    /// host is rejected by lettre.
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| EmailError::Transport(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Self::with_mailer(Box::new(builder.build()), &config.from)
    }

    /// Uses a custom transport
    pub fn with_mailer(mailer: Box<dyn Mailer>, from: &str) -> Result<Self, EmailError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", from, e)))?;

        Ok(Self { mailer, from })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, EmailError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| EmailError::InvalidAddress(format!("{}: {}", to, e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let message = self.build_message(to, subject, body)?;
        self.mailer.send(message).await?;

        tracing::debug!(recipient = %to, subject = %subject, "Email sent");
        Ok(())
    }
}
