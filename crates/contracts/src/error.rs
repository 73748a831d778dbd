//! Layered error definitions
//!
//! Categorized by source: config / query / fetch / delivery

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Reading the raw configuration text failed
    #[error("config load error from {location}: {message}")]
    ConfigLoad { location: String, message: String },

    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Query Errors =====
    /// A rule's match expression failed to compile
    #[error("parse match_expression err for rule name={rule:?} idx={index}: {message}")]
    QueryCompile {
        rule: String,
        index: usize,
        message: String,
    },

    // ===== Batch Errors =====
    /// Fetching an object from the object store failed
    #[error("fetch error for '{location}': {message}")]
    Fetch { location: String, message: String },

    /// Decompressing or decoding a fetched object failed
    #[error("decode error for '{location}': {message}")]
    Decode { location: String, message: String },

    // ===== Delivery Errors =====
    /// A destination collaborator failed to deliver an alert
    #[error("delivery to '{destination}' failed: {message}")]
    Delivery {
        destination: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration load error
    pub fn config_load(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create query compile error
    pub fn query_compile(rule: impl Into<String>, index: usize, message: impl Into<String>) -> Self {
        Self::QueryCompile {
            rule: rule.into(),
            index,
            message: message.into(),
        }
    }

    /// Create object fetch error
    pub fn fetch(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create object decode error
    pub fn decode(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Create delivery error
    pub fn delivery(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Configuration-class errors abort configuration load
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigLoad { .. }
                | Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
                | Self::QueryCompile { .. }
        )
    }
}
