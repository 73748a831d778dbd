//! Destination - closed set of configured sinks

use std::fmt;

use contracts::{Alert, AlertSink, ContractError, DestinationKind};

use crate::sinks::{EmailSink, TopicSink, WebhookSink};

/// A validated, ready-to-send destination
pub enum Destination {
    Topic(TopicSink),
    Webhook(WebhookSink),
    Email(EmailSink),
}

impl Destination {
    pub fn id(&self) -> &str {
        match self {
            Self::Topic(sink) => sink.id(),
            Self::Webhook(sink) => sink.id(),
            Self::Email(sink) => sink.id(),
        }
    }

    pub fn kind(&self) -> DestinationKind {
        match self {
            Self::Topic(sink) => sink.kind(),
            Self::Webhook(sink) => sink.kind(),
            Self::Email(sink) => sink.kind(),
        }
    }

    /// Deliver one alert through the underlying sink
    pub async fn send(&self, alert: &Alert<'_>) -> Result<(), ContractError> {
        match self {
            Self::Topic(sink) => sink.send(alert).await,
            Self::Webhook(sink) => sink.send(alert).await,
            Self::Email(sink) => sink.send(alert).await,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Topic(sink) => fmt::Display::fmt(sink, f),
            Self::Webhook(sink) => fmt::Display::fmt(sink, f),
            Self::Email(sink) => fmt::Display::fmt(sink, f),
        }
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Destination({} {self})", self.kind())
    }
}
