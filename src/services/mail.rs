use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::info;

use crate::config::SmtpSettings;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("Failed to build email: {0}")]
    Build(String),
    #[error("Failed to send email: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
}

#[async_trait]
pub trait MailClient: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

pub type DynMailClient = Arc<dyn MailClient>;

/// SMTP si configuré, sinon les emails sont écrits dans les logs
pub fn create_mail_client(smtp: Option<&SmtpSettings>) -> Result<DynMailClient, MailError> {
    match smtp {
        Some(settings) => Ok(Arc::new(SmtpMailClient::new(settings)?)),
        None => Ok(Arc::new(ConsoleMailClient)),
    }
}

/// Backend de développement: log le message au lieu de l'envoyer
pub struct ConsoleMailClient;

#[async_trait]
impl MailClient for ConsoleMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            from = %message.from,
            to = ?message.to,
            subject = %message.subject,
            body = %message.body,
            "email (console backend)"
        );
        Ok(())
    }
}

pub struct SmtpMailClient {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailClient {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let creds = Credentials::new(settings.username.clone(), settings.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
            .map_err(|e| MailError::Transport(format!("Failed to create SMTP transport: {}", e)))?
            .port(settings.port)
            .credentials(creds)
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailClient for SmtpMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(parse_mailbox(&message.from)?)
            .subject(&message.subject);
        for to in &message.to {
            builder = builder.to(parse_mailbox(to)?);
        }

        let email = builder
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<lettre::message::Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Client de test: garde les messages en mémoire
#[cfg(test)]
#[derive(Default)]
pub struct RecordingMailClient {
    pub sent: std::sync::Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

#[cfg(test)]
impl RecordingMailClient {
    pub fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl MailClient for RecordingMailClient {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message);
        if self.fail {
            return Err(MailError::Transport("smtp down".to_string()));
        }
        Ok(())
    }
}
