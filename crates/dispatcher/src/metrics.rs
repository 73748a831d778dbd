//! Dispatch report - in-process delivery counters

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Delivery outcomes for one destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryCounts {
    /// Alerts delivered
    pub sent: u64,
    /// Alerts whose delivery failed
    pub failed: u64,
}

/// Counters produced by dispatching one or more records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Records evaluated
    pub records: u64,
    /// (rule, record) pairs that matched
    pub matches: u64,
    /// Per destination id
    pub deliveries: BTreeMap<String, DeliveryCounts>,
}

impl DispatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one delivery attempt
    pub fn record_delivery(&mut self, destination: &str, success: bool) {
        let counts = self.deliveries.entry(destination.to_string()).or_default();
        if success {
            counts.sent += 1;
        } else {
            counts.failed += 1;
        }
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: &DispatchReport) {
        self.records += other.records;
        self.matches += other.matches;
        for (id, counts) in &other.deliveries {
            let entry = self.deliveries.entry(id.clone()).or_default();
            entry.sent += counts.sent;
            entry.failed += counts.failed;
        }
    }

    /// Counts for one destination
    pub fn delivery(&self, destination: &str) -> DeliveryCounts {
        self.deliveries.get(destination).copied().unwrap_or_default()
    }

    /// Total successful deliveries
    pub fn sent(&self) -> u64 {
        self.deliveries.values().map(|c| c.sent).sum()
    }

    /// Total failed deliveries
    pub fn failed(&self) -> u64 {
        self.deliveries.values().map(|c| c.failed).sum()
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "records={} matches={} sent={} failed={}",
            self.records,
            self.matches,
            self.sent(),
            self.failed()
        )
    }
}
