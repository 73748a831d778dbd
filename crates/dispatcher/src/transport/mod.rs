//! Collaborator implementations
//!
//! Production transports (HTTP webhook, SMTP) plus the log and recording
//! transports used for dry runs and tests.

mod http;
mod log;
mod recording;
mod smtp;

pub use http::{HttpWebhookPoster, DEFAULT_WEBHOOK_TIMEOUT};
pub use log::LogTransport;
pub use recording::RecordingTransport;
pub use smtp::{SmtpEmailSender, SmtpSettings};
