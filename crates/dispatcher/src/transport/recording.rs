//! RecordingTransport - in-memory collaborator for tests and local runs

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use contracts::{ContractError, EmailMessage, EmailSender, TopicPublisher, WebhookPoster};

#[derive(Debug, Default)]
struct Recorded {
    published: Vec<(String, String)>,
    posted: Vec<(String, String)>,
    sent: Vec<EmailMessage>,
    targets: Vec<String>,
    failing: HashSet<String>,
}

/// Records every delivery instead of performing it
///
/// Targets registered with [`RecordingTransport::fail_target`] reject
/// deliveries; failed attempts are not recorded.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    inner: Mutex<Recorded>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery to `target` (topic, URL or recipient) fail
    pub fn fail_target(&self, target: impl Into<String>) {
        self.lock().failing.insert(target.into());
    }

    /// `(topic, message)` pairs
    pub fn published(&self) -> Vec<(String, String)> {
        self.lock().published.clone()
    }

    /// `(url, body)` pairs
    pub fn posted(&self) -> Vec<(String, String)> {
        self.lock().posted.clone()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.lock().sent.clone()
    }

    /// Successful delivery targets in delivery order; emails are listed
    /// under their first recipient
    pub fn targets(&self) -> Vec<String> {
        self.lock().targets.clone()
    }

    /// Total successful deliveries
    pub fn len(&self) -> usize {
        self.lock().targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(recorded: &Recorded, targets: &[&str]) -> Result<(), ContractError> {
        match targets.iter().find(|t| recorded.failing.contains(**t)) {
            Some(_) => Err(ContractError::Other("injected delivery failure".to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TopicPublisher for RecordingTransport {
    async fn publish(&self, topic: &str, message: &str) -> Result<(), ContractError> {
        let mut recorded = self.lock();
        Self::check(&recorded, &[topic])?;
        recorded.published.push((topic.to_string(), message.to_string()));
        recorded.targets.push(topic.to_string());
        Ok(())
    }
}

#[async_trait]
impl WebhookPoster for RecordingTransport {
    async fn post_json(&self, url: &str, body: &str) -> Result<(), ContractError> {
        let mut recorded = self.lock();
        Self::check(&recorded, &[url])?;
        recorded.posted.push((url.to_string(), body.to_string()));
        recorded.targets.push(url.to_string());
        Ok(())
    }
}

#[async_trait]
impl EmailSender for RecordingTransport {
    async fn send_email(&self, message: &EmailMessage) -> Result<(), ContractError> {
        let mut recorded = self.lock();
        let recipients: Vec<&str> = message.to.iter().map(String::as_str).collect();
        Self::check(&recorded, &recipients)?;
        recorded.sent.push(message.clone());
        recorded
            .targets
            .push(message.to.first().cloned().unwrap_or_default());
        Ok(())
    }
}
