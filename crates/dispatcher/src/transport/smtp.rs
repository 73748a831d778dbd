//! SmtpEmailSender - email delivery through an SMTP relay

use std::time::Duration;

use async_trait::async_trait;
use contracts::{ContractError, EmailMessage, EmailSender};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, instrument};

use crate::error::DispatcherError;

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Use implicit TLS relay; plain connection otherwise (local relays)
    pub tls: bool,
    pub timeout: Duration,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: None,
            password: None,
            tls: true,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Sends alert emails through an async SMTP transport
#[derive(Clone)]
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailSender {
    pub fn new(settings: &SmtpSettings) -> Result<Self, DispatcherError> {
        let builder = if settings.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| DispatcherError::transport("smtp", e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let mut builder = builder.port(settings.port).timeout(Some(settings.timeout));
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn build_message(message: &EmailMessage) -> Result<Message, String> {
        let from: Mailbox = message
            .from
            .parse()
            .map_err(|e| format!("invalid from address {:?}: {e}", message.from))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in &message.to {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|e| format!("invalid recipient address {to:?}: {e}"))?;
            builder = builder.to(mailbox);
        }

        builder.body(message.body.clone()).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    #[instrument(name = "smtp_send_email", skip(self, message), fields(recipients = message.to.len()))]
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ContractError> {
        let recipients = message.to.join(",");
        let email = Self::build_message(message).map_err(|e| ContractError::delivery(&recipients, e))?;
        self.transport
            .send(email)
            .await
            .map_err(|e| ContractError::delivery(&recipients, e.to_string()))?;
        debug!("Email relayed");
        Ok(())
    }
}
