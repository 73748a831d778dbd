//! AlertSink trait - Dispatcher output interface
//!
//! Defines the send capability every destination kind implements.

use crate::{Alert, ContractError, DestinationKind};

/// Alert output trait
///
/// All destination implementations must implement this trait. Renderers
/// must honour [`Alert::distinct_match`] when deciding whether to include a
/// match section.
#[trait_variant::make(AlertSink: Send)]
pub trait LocalAlertSink {
    /// Destination id (used for logging/metrics)
    fn id(&self) -> &str;

    /// Destination kind
    fn kind(&self) -> DestinationKind;

    /// Deliver one alert
    ///
    /// # Errors
    /// Returns delivery error (should include context)
    async fn send(&self, alert: &Alert<'_>) -> Result<(), ContractError>;
}
