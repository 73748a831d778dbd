//! Destination sink implementations
//!
//! One module per destination kind. Each sink owns its validated settings
//! and the collaborator it delivers through.

mod email;
mod topic;
mod webhook;

pub use email::{EmailLoader, EmailSink, EMAIL_SUBJECT};
pub use topic::{TopicLoader, TopicSink};
pub use webhook::{redact_webhook_url, WebhookLoader, WebhookSink};

use contracts::ContractError;

/// Reject a destination definition without an id
fn require_id(kind: &str, idx: usize, id: &str) -> Result<(), ContractError> {
    if id.is_empty() {
        return Err(ContractError::config_validation(
            format!("destination[{idx}].id"),
            format!("({kind}) destination.id must be set"),
        ));
    }
    Ok(())
}

/// Return the value of a required string field or a validation error
/// naming it
fn require_field<'a>(
    kind: &str,
    id: &str,
    field: &str,
    value: Option<&'a str>,
) -> Result<&'a str, ContractError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ContractError::config_validation(
            format!("destination[id={id}].{field}"),
            format!("({kind}) destination.{field} must be set for {id:?}"),
        )),
    }
}
