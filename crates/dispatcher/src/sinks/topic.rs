//! TopicSink - publishes alerts as compact JSON to a message topic

use std::fmt;
use std::sync::Arc;

use contracts::{Alert, AlertSink, ContractError, DestinationConfig, DestinationKind, TopicPublisher, Value};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::destination::Destination;
use crate::registry::DestinationLoader;

const TOPIC_PREFIX: &str = "arn:";

/// Message published to the topic
#[derive(Serialize)]
struct TopicPayload<'a> {
    name: &'a str,
    description: &'a str,
    record: &'a Value,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    matched: Option<&'a Value>,
}

/// Sink that publishes to one topic
pub struct TopicSink {
    id: String,
    topic: String,
    publisher: Arc<dyn TopicPublisher>,
}

impl TopicSink {
    /// Validate a `topic` destination definition
    ///
    /// # Errors
    /// `ConfigValidation` when the id or topic is missing, or the topic is
    /// not a full resource identifier.
    pub fn load(
        idx: usize,
        config: &DestinationConfig,
        publisher: Arc<dyn TopicPublisher>,
    ) -> Result<Self, ContractError> {
        let kind = DestinationKind::Topic.tag();
        super::require_id(kind, idx, &config.id)?;
        let topic = super::require_field(kind, &config.id, "topic", config.topic.as_deref())?;

        if !topic.starts_with(TOPIC_PREFIX) {
            return Err(ContractError::config_validation(
                format!("destination[id={}].topic", config.id),
                format!(
                    "({kind}) destination.topic must be a full resource identifier beginning with `{TOPIC_PREFIX}` for {:?}",
                    config.id
                ),
            ));
        }

        Ok(Self {
            id: config.id.clone(),
            topic: topic.to_string(),
            publisher,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Compact JSON message for one alert
    pub fn render(alert: &Alert<'_>) -> Result<String, ContractError> {
        let payload = TopicPayload {
            name: alert.rule_name,
            description: alert.rule_description,
            record: alert.record,
            matched: alert.distinct_match(),
        };
        serde_json::to_string(&payload).map_err(|e| ContractError::Other(e.to_string()))
    }
}

impl AlertSink for TopicSink {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> DestinationKind {
        DestinationKind::Topic
    }

    #[instrument(
        name = "topic_sink_send",
        skip(self, alert),
        fields(destination = %self.id, rule = %alert.rule_name)
    )]
    async fn send(&self, alert: &Alert<'_>) -> Result<(), ContractError> {
        let message = Self::render(alert)?;
        self.publisher
            .publish(&self.topic, &message)
            .await
            .map_err(|e| {
                ContractError::delivery(
                    &self.id,
                    format!("topic publish failure topic={:?}: {e}", self.topic),
                )
            })?;
        debug!(topic = %self.topic, bytes = message.len(), "Published alert");
        Ok(())
    }
}

impl fmt::Display for TopicSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{id: {} topic: {}}}", self.id, self.topic)
    }
}

/// Loader for `topic` destinations
pub struct TopicLoader {
    publisher: Arc<dyn TopicPublisher>,
}

impl TopicLoader {
    pub fn new(publisher: Arc<dyn TopicPublisher>) -> Self {
        Self { publisher }
    }
}

impl DestinationLoader for TopicLoader {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Topic
    }

    fn load(&self, idx: usize, config: &DestinationConfig) -> Result<Destination, ContractError> {
        TopicSink::load(idx, config, self.publisher.clone()).map(Destination::Topic)
    }
}
