//! Config - Config Loader output
//!
//! Human-authored rule and destination definitions. Semantic validation
//! (id uniqueness, reference resolution, kind-specific fields) happens when
//! the registry and rule set are built.

use serde::{Deserialize, Serialize};

/// Complete rule/destination configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rule definitions, in evaluation order
    #[serde(default, rename = "rule", alias = "rules")]
    pub rules: Vec<RuleConfig>,

    /// Destination definitions
    #[serde(default, rename = "destination", alias = "destinations")]
    pub destinations: Vec<DestinationConfig>,
}

/// A single match rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Rule name, used in alerts and error messages
    #[serde(default)]
    pub name: String,

    /// Free-form description forwarded with every alert
    #[serde(default, alias = "desc")]
    pub description: String,

    /// Query expression evaluated against each record
    #[serde(default, alias = "jq_match")]
    pub match_expression: String,

    /// Destination ids, in dispatch order
    #[serde(default)]
    pub destinations: Vec<String>,
}

/// A notification destination
///
/// The kind tag stays a plain string here so an unknown tag surfaces as a
/// validation error from the registry rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Unique identifier referenced by rules
    #[serde(default)]
    pub id: String,

    /// Kind tag: "topic" | "webhook" | "email"
    #[serde(default, rename = "type")]
    pub kind: String,

    /// Topic resource identifier (type "topic")
    #[serde(default, alias = "sns_arn", skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    /// Webhook URL (type "webhook")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Recipient addresses (type "email")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_emails: Vec<String>,

    /// Sender address (type "email")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
}

impl Config {
    /// Look up a destination definition by id
    pub fn destination(&self, id: &str) -> Option<&DestinationConfig> {
        self.destinations.iter().find(|d| d.id == id)
    }
}
