//! Invocation handler - one batch event from configuration to delivery.
//!
//! Configuration, registry and rule set are rebuilt on every call so an
//! updated rules file takes effect on the next invocation.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use config_loader::ConfigSource;
use contracts::ObjectStore;
use dispatcher::{Collaborators, Dispatcher, RuleSet};
use ingestion::{BatchEvent, LogFetcher, ObjectRef};
use tracing::{info, instrument, warn};

use super::InvocationStats;

/// Processes batch events against the configured rules
pub struct Handler {
    store: Arc<dyn ObjectStore>,
    collaborators: Collaborators,
    config_source: ConfigSource,
}

impl Handler {
    /// Create a handler reading logs (and an object-store configuration)
    /// from `store`
    pub fn new(store: Arc<dyn ObjectStore>, collaborators: Collaborators, config_source: ConfigSource) -> Self {
        Self {
            store,
            collaborators,
            config_source,
        }
    }

    pub fn config_source(&self) -> &ConfigSource {
        &self.config_source
    }

    /// Load the configuration and build the rule set
    ///
    /// # Errors
    /// Any configuration load, parse, validation or compile error
    #[instrument(name = "handler_load_rules", skip(self), fields(source = %self.config_source))]
    pub async fn load_rules(&self) -> Result<RuleSet> {
        let config = self
            .config_source
            .load(self.store.as_ref())
            .await
            .with_context(|| format!("Failed to load config from {}", self.config_source))?;

        for warning in config_loader::lint(&config) {
            warn!(warning = %warning, "Configuration warning");
        }

        RuleSet::build(&config, &self.collaborators).context("Failed to build rule set")
    }

    /// Handle one batch event
    ///
    /// Every object is fetched and dispatched in event order. A fetch or
    /// decode failure aborts the invocation; delivery failures do not.
    #[instrument(name = "handler_handle", skip_all, fields(objects = event.records.len()))]
    pub async fn handle(&self, event: &BatchEvent) -> Result<InvocationStats> {
        self.handle_objects(&event.objects()).await
    }

    /// Handle an explicit list of objects
    pub async fn handle_objects(&self, objects: &[ObjectRef]) -> Result<InvocationStats> {
        let started = Instant::now();
        let rules = self.load_rules().await?;
        let mut stats = InvocationStats {
            rules: rules.len(),
            ..Default::default()
        };

        let dispatcher = Dispatcher::new(rules);
        let fetcher = LogFetcher::new(self.store.clone());

        for object in objects {
            let records = fetcher
                .fetch(object)
                .await
                .with_context(|| format!("Failed to load log object {object}"))?;
            let report = dispatcher.dispatch_batch(&records).await;
            stats.objects += 1;
            stats.report.merge(&report);
        }

        stats.duration = started.elapsed();
        info!(
            objects = stats.objects,
            records = stats.report.records,
            matches = stats.report.matches,
            sent = stats.report.sent(),
            failed = stats.report.failed(),
            duration_ms = stats.duration.as_millis() as u64,
            "Invocation complete"
        );
        Ok(stats)
    }
}
