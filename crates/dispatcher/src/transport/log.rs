//! LogTransport - writes deliveries to the log instead of the network

use async_trait::async_trait;
use contracts::{ContractError, EmailMessage, EmailSender, TopicPublisher, WebhookPoster};
use tracing::info;

use crate::sinks::redact_webhook_url;

/// Collaborator that logs a summary of every delivery
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

impl LogTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TopicPublisher for LogTransport {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), ContractError> {
        info!(topic, bytes = message.len(), message, "Topic publish (log transport)");
        Ok(())
    }
}

#[async_trait]
impl WebhookPoster for LogTransport {
    async fn post_json(&self, url: &str, body: &str) -> Result<(), ContractError> {
        info!(
            url = %redact_webhook_url(url),
            bytes = body.len(),
            "Webhook post (log transport)"
        );
        Ok(())
    }
}

#[async_trait]
impl EmailSender for LogTransport {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ContractError> {
        info!(
            from = %message.from,
            to = %message.to.join(","),
            subject = %message.subject,
            body = %message.body,
            "Email send (log transport)"
        );
        Ok(())
    }
}
