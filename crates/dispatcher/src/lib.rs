//! # Dispatcher
//!
//! Rule evaluation and alert delivery.
//!
//! Responsible for:
//! - validating destination definitions into a [`DestinationRegistry`]
//! - compiling rules and binding them to destinations ([`RuleSet`])
//! - evaluating rules against records ([`matcher::evaluate`])
//! - delivering matches, isolating each destination's failures ([`Dispatcher`])

pub mod destination;
pub mod dispatcher;
pub mod error;
pub mod matcher;
pub mod metrics;
pub mod registry;
pub mod rule;
pub mod sinks;
pub mod transport;

pub use contracts::{Alert, AlertSink};
pub use destination::Destination;
pub use dispatcher::Dispatcher;
pub use error::DispatcherError;
pub use matcher::{evaluate, MatchResult};
pub use metrics::{DeliveryCounts, DispatchReport};
pub use registry::{Collaborators, DestinationLoader, DestinationRegistry};
pub use rule::{CompiledRule, RuleSet};
pub use sinks::{redact_webhook_url, EmailSink, TopicSink, WebhookSink};
pub use transport::{HttpWebhookPoster, LogTransport, RecordingTransport, SmtpEmailSender, SmtpSettings};
