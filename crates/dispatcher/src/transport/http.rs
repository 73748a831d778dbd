//! HttpWebhookPoster - webhook delivery over HTTPS

use std::time::Duration;

use async_trait::async_trait;
use contracts::{ContractError, WebhookPoster};
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use crate::error::DispatcherError;
use crate::sinks::redact_webhook_url;

/// Default request timeout
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_ERROR_BODY: usize = 256;

/// Posts JSON bodies with a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpWebhookPoster {
    client: reqwest::Client,
}

impl HttpWebhookPoster {
    /// Build a poster whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, DispatcherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatcherError::transport("webhook", e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookPoster for HttpWebhookPoster {
    #[instrument(name = "http_webhook_post", skip(self, url, body), fields(url = %redact_webhook_url(url)))]
    async fn post_json(&self, url: &str, body: &str) -> Result<(), ContractError> {
        let redacted = redact_webhook_url(url);
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| ContractError::delivery(&redacted, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(ContractError::delivery(
                &redacted,
                format!("unexpected status {status}: {text}"),
            ));
        }

        debug!(status = %status, "Webhook accepted");
        Ok(())
    }
}
