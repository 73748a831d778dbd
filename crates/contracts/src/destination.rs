//! Destination kinds and the alert payload handed to every destination

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Value;

/// Closed set of destination kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    /// Message topic publish
    Topic,
    /// HTTP webhook POST
    Webhook,
    /// Outbound email
    Email,
}

impl DestinationKind {
    /// All kinds, in registry order
    pub const ALL: [DestinationKind; 3] = [Self::Topic, Self::Webhook, Self::Email];

    /// Canonical configuration tag
    pub fn tag(self) -> &'static str {
        match self {
            Self::Topic => "topic",
            Self::Webhook => "webhook",
            Self::Email => "email",
        }
    }

    /// Resolve a configuration tag. Legacy tags (`sns`, `slack_webhook`,
    /// `ses`) map onto their generic kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "topic" | "sns" => Some(Self::Topic),
            "webhook" | "slack_webhook" => Some(Self::Webhook),
            "email" | "ses" => Some(Self::Email),
            _ => None,
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One matched record on its way to a destination
#[derive(Debug, Clone, Copy)]
pub struct Alert<'a> {
    /// Name of the rule that matched
    pub rule_name: &'a str,
    /// Description of the rule that matched
    pub rule_description: &'a str,
    /// The full audit record
    pub record: &'a Value,
    /// Value extracted by the match expression
    pub matched: &'a Value,
}

impl<'a> Alert<'a> {
    pub fn new(
        rule_name: &'a str,
        rule_description: &'a str,
        record: &'a Value,
        matched: &'a Value,
    ) -> Self {
        Self {
            rule_name,
            rule_description,
            record,
            matched,
        }
    }

    /// The match section to render, or `None` when the extracted value is
    /// structurally equal to the record.
    ///
    /// Every destination renders the match through this method so an
    /// expression that returns the whole record never shows it twice.
    pub fn distinct_match(&self) -> Option<&'a Value> {
        if self.matched == self.record {
            None
        } else {
            Some(self.matched)
        }
    }
}
