//! WebhookSink - posts chat-webhook formatted alerts

use std::fmt;
use std::sync::Arc;

use contracts::{Alert, AlertSink, ContractError, DestinationConfig, DestinationKind, WebhookPoster};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::destination::Destination;
use crate::registry::DestinationLoader;

const ICON_EMOJI: &str = "red_circle";
const USERNAME: &str = "Cloudtrail Tattletail";
const ATTACHMENT_COLOR: &str = "danger";
const ATTACHMENT_TITLE: &str = "Cloudtrail Tattletail Event";
const FILTERED: &str = "**FILTERED**";

#[derive(Debug, Serialize, PartialEq)]
struct WebhookMessage {
    icon_emoji: &'static str,
    username: &'static str,
    attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize, PartialEq)]
struct Attachment {
    color: &'static str,
    title: &'static str,
    text: String,
    fields: Vec<AttachmentField>,
}

#[derive(Debug, Serialize, PartialEq)]
struct AttachmentField {
    title: &'static str,
    value: String,
    short: bool,
}

/// Replace the last path segment of a webhook URL, which carries its
/// secret token
pub fn redact_webhook_url(url: &str) -> String {
    let mut segments: Vec<&str> = url.split('/').collect();
    if segments.len() > 4 {
        if let Some(last) = segments.last_mut() {
            *last = FILTERED;
        }
    }
    segments.join("/")
}

/// Sink that posts to one webhook URL
pub struct WebhookSink {
    id: String,
    url: String,
    poster: Arc<dyn WebhookPoster>,
}

impl WebhookSink {
    /// Validate a `webhook` destination definition
    pub fn load(
        idx: usize,
        config: &DestinationConfig,
        poster: Arc<dyn WebhookPoster>,
    ) -> Result<Self, ContractError> {
        let kind = DestinationKind::Webhook.tag();
        super::require_id(kind, idx, &config.id)?;
        let url = super::require_field(kind, &config.id, "webhook_url", config.webhook_url.as_deref())?;

        Ok(Self {
            id: config.id.clone(),
            url: url.to_string(),
            poster,
        })
    }

    /// URL safe to print
    pub fn redacted_url(&self) -> String {
        redact_webhook_url(&self.url)
    }

    /// JSON body for one alert
    pub fn render(alert: &Alert<'_>) -> Result<String, ContractError> {
        let mut fields = vec![
            AttachmentField {
                title: "Alert Name",
                value: alert.rule_name.to_string(),
                short: true,
            },
            AttachmentField {
                title: "Description",
                value: alert.rule_description.to_string(),
                short: true,
            },
        ];
        if let Some(matched) = alert.distinct_match() {
            fields.push(AttachmentField {
                title: "Match",
                value: matched.to_json_pretty(),
                short: false,
            });
        }

        let message = WebhookMessage {
            icon_emoji: ICON_EMOJI,
            username: USERNAME,
            attachments: vec![Attachment {
                color: ATTACHMENT_COLOR,
                title: ATTACHMENT_TITLE,
                text: alert.record.to_json_pretty(),
                fields,
            }],
        };
        serde_json::to_string(&message).map_err(|e| ContractError::Other(e.to_string()))
    }
}

impl AlertSink for WebhookSink {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> DestinationKind {
        DestinationKind::Webhook
    }

    #[instrument(
        name = "webhook_sink_send",
        skip(self, alert),
        fields(destination = %self.id, rule = %alert.rule_name)
    )]
    async fn send(&self, alert: &Alert<'_>) -> Result<(), ContractError> {
        let body = Self::render(alert)?;
        self.poster.post_json(&self.url, &body).await.map_err(|e| {
            ContractError::delivery(
                &self.id,
                format!("webhook post failure url={}: {e}", self.redacted_url()),
            )
        })?;
        debug!(url = %self.redacted_url(), "Posted alert");
        Ok(())
    }
}

impl fmt::Display for WebhookSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{id: {} webhook_url: {}}}", self.id, self.redacted_url())
    }
}

/// Loader for `webhook` destinations
pub struct WebhookLoader {
    poster: Arc<dyn WebhookPoster>,
}

impl WebhookLoader {
    pub fn new(poster: Arc<dyn WebhookPoster>) -> Self {
        Self { poster }
    }
}

impl DestinationLoader for WebhookLoader {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Webhook
    }

    fn load(&self, idx: usize, config: &DestinationConfig) -> Result<Destination, ContractError> {
        WebhookSink::load(idx, config, self.poster.clone()).map(Destination::Webhook)
    }
}
