//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The object could not be read from the store
    #[error("failed to fetch {location}: {message}")]
    Fetch {
        /// `bucket/key`
        location: String,
        message: String,
    },

    /// The object was read but is not a valid log document
    #[error("failed to decode {location}: {message}")]
    Decode {
        /// `bucket/key`
        location: String,
        message: String,
    },

    /// The invocation event itself is malformed
    #[error("invalid invocation event: {0}")]
    InvalidEvent(String),
}

impl IngestionError {
    pub fn fetch(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn decode(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Fetch { location, message } => ContractError::fetch(location, message),
            IngestionError::Decode { location, message } => ContractError::decode(location, message),
            IngestionError::InvalidEvent(message) => ContractError::Other(message),
        }
    }
}

/// Ingestion Result alias
pub type Result<T> = std::result::Result<T, IngestionError>;
