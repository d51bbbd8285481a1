//! Mail dispatch over authenticated SMTP.
//!
//! Each send builds a `multipart/mixed` message (plain-text body plus an
//! optional base64 attachment) and hands it to a [`MailTransport`]. Failures
//! are reported as a [`SendResult`]; nothing is retried or queued.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpSettings;
use crate::domain::SendResult;

/// Sender address used when neither the caller nor the config supplies one.
pub const DEFAULT_SENDER: &str = "sender@demomailtrap.com";

/// Errors that can occur while building or sending a message.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid {field} address: {message}")]
    Address { field: &'static str, message: String },

    #[error("failed to read attachment {}: {source}", path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

/// A message ready to be sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// File to attach. `None` or an empty path sends the body alone.
    pub attachment_path: Option<PathBuf>,
}

impl OutgoingEmail {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
            attachment_path: None,
        }
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment_path = Some(path.into());
        self
    }

    fn attachment(&self) -> Option<&Path> {
        self.attachment_path
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }
}

fn parse_mailbox(field: &'static str, address: &str) -> Result<Mailbox, MailError> {
    address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        field,
        message: e.to_string(),
    })
}

/// Builds the MIME message for `email`, reading the attachment from disk.
pub async fn build_message(email: &OutgoingEmail) -> Result<Message, MailError> {
    let builder = Message::builder()
        .from(parse_mailbox("from", &email.sender)?)
        .to(parse_mailbox("to", &email.recipient)?)
        .subject(email.subject.clone());

    let mut body = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));

    if let Some(path) = email.attachment() {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| MailError::Attachment {
                path: path.to_path_buf(),
                source,
            })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        let content = Body::new_with_encoding(bytes, ContentTransferEncoding::Base64)
            .map_err(|_| MailError::Build("attachment could not be base64 encoded".to_string()))?;
        let content_type = ContentType::parse("application/octet-stream")
            .map_err(|e| MailError::Build(e.to_string()))?;

        tracing::debug!(file_name = %file_name, "Attaching file");
        body = body.singlepart(Attachment::new(file_name).body(content, content_type));
    }

    builder
        .multipart(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

/// Delivers a built message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<(), MailError>;
}

/// STARTTLS SMTP submission. Opens one session per message.
pub struct SmtpTransport {
    settings: SmtpSettings,
}

impl SmtpTransport {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn deliver(&self, message: Message) -> Result<(), MailError> {
        let credentials = SmtpCredentials::new(
            self.settings.username.clone(),
            self.settings.password.expose().to_string(),
        );

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.settings.host)
                .map_err(|e| MailError::Transport(format!("SMTP relay error: {}", e)))?
                .credentials(credentials)
                .port(self.settings.port)
                .build();

        mailer
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Sends composed email through a [`MailTransport`].
pub struct MailService<T> {
    transport: T,
}

impl<T: MailTransport> MailService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Builds and sends `email`, converting any failure into [`SendResult::Failed`].
    pub async fn send_email(&self, email: &OutgoingEmail) -> SendResult {
        match self.try_send(email).await {
            Ok(()) => {
                tracing::info!(to = %email.recipient, "Email sent via SMTP");
                SendResult::sent()
            }
            Err(e) => {
                tracing::error!(to = %email.recipient, error = %e, "Failed to send email");
                SendResult::failed(e)
            }
        }
    }

    async fn try_send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(email).await?;
        self.transport.deliver(message).await
    }
}
