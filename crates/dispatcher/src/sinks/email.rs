//! EmailSink - sends plain-text alert emails

use std::fmt;
use std::sync::Arc;

use contracts::{
    Alert, AlertSink, ContractError, DestinationConfig, DestinationKind, EmailMessage, EmailSender,
};
use tracing::{debug, instrument};

use crate::destination::Destination;
use crate::registry::DestinationLoader;

pub const EMAIL_SUBJECT: &str = "Cloudtrail Tattletail event";

/// Sink that emails a fixed recipient list
pub struct EmailSink {
    id: String,
    to: Vec<String>,
    from: String,
    sender: Arc<dyn EmailSender>,
}

impl EmailSink {
    /// Validate an `email` destination definition
    pub fn load(
        idx: usize,
        config: &DestinationConfig,
        sender: Arc<dyn EmailSender>,
    ) -> Result<Self, ContractError> {
        let kind = DestinationKind::Email.tag();
        super::require_id(kind, idx, &config.id)?;

        let to: Vec<String> = config
            .to_emails
            .iter()
            .filter(|addr| !addr.trim().is_empty())
            .cloned()
            .collect();
        if to.is_empty() {
            return Err(ContractError::config_validation(
                format!("destination[id={}].to_emails", config.id),
                format!("({kind}) destination.to_emails must be set for {:?}", config.id),
            ));
        }
        let from = super::require_field(kind, &config.id, "from_email", config.from_email.as_deref())?;

        Ok(Self {
            id: config.id.clone(),
            to,
            from: from.to_string(),
            sender,
        })
    }

    pub fn recipients(&self) -> &[String] {
        &self.to
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    /// Plain-text body for one alert
    pub fn render_body(alert: &Alert<'_>) -> String {
        let mut body = format!(
            "Alert: {}\n\n{}\n\n\nevent:\n{}\n",
            alert.rule_name,
            alert.rule_description,
            alert.record.to_json_pretty()
        );
        if let Some(matched) = alert.distinct_match() {
            body.push_str("match: ");
            body.push_str(&matched.to_json_pretty());
            body.push('\n');
        }
        body
    }

    fn message(&self, alert: &Alert<'_>) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: EMAIL_SUBJECT.to_string(),
            body: Self::render_body(alert),
        }
    }
}

impl AlertSink for EmailSink {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> DestinationKind {
        DestinationKind::Email
    }

    #[instrument(
        name = "email_sink_send",
        skip(self, alert),
        fields(destination = %self.id, rule = %alert.rule_name, recipients = self.to.len())
    )]
    async fn send(&self, alert: &Alert<'_>) -> Result<(), ContractError> {
        let message = self.message(alert);
        self.sender
            .send_email(&message)
            .await
            .map_err(|e| ContractError::delivery(&self.id, format!("email send failure: {e}")))?;
        debug!("Sent alert email");
        Ok(())
    }
}

impl fmt::Display for EmailSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{id: {} from: {} to: {}}}",
            self.id,
            self.from,
            self.to.join(",")
        )
    }
}

/// Loader for `email` destinations
pub struct EmailLoader {
    sender: Arc<dyn EmailSender>,
}

impl EmailLoader {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }
}

impl DestinationLoader for EmailLoader {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Email
    }

    fn load(&self, idx: usize, config: &DestinationConfig) -> Result<Destination, ContractError> {
        EmailSink::load(idx, config, self.sender.clone()).map(Destination::Email)
    }
}
