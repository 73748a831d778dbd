//! Collaborator traits - the I/O boundary of the engine
//!
//! Object storage, topic publishing, webhook posting and email sending are
//! injected as trait objects at construction time. Production transports
//! and in-memory fakes implement the same traits.

use async_trait::async_trait;
use bytes::Bytes;

use crate::ContractError;

/// Read access to an object store (bucket + key addressing)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's raw bytes
    ///
    /// # Errors
    /// Returns `ContractError::Fetch` when the object is missing or unreadable
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, ContractError>;
}

/// Publishes a message to a topic
#[async_trait]
pub trait TopicPublisher: Send + Sync {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), ContractError>;
}

/// Posts a JSON body to a webhook URL
#[async_trait]
pub trait WebhookPoster: Send + Sync {
    async fn post_json(&self, url: &str, body: &str) -> Result<(), ContractError>;
}

/// A plain-text email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Sends an email
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ContractError>;
}
