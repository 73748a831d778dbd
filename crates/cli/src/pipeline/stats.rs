//! Invocation statistics.

use std::time::Duration;

use dispatcher::DispatchReport;
use serde::Serialize;

/// Statistics from one invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvocationStats {
    /// Log objects fetched and dispatched
    pub objects: u64,

    /// Compiled rules in effect
    pub rules: usize,

    /// Aggregated dispatch counters
    pub report: DispatchReport,

    /// Wall-clock duration of the invocation
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

fn serialize_secs<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl InvocationStats {
    /// Records per second
    pub fn records_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.report.records as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Invocation Statistics ===\n");
        println!("  Duration: {:.3}s", self.duration.as_secs_f64());
        println!("  Objects: {}", self.objects);
        println!("  Rules: {}", self.rules);
        println!("  Records: {} ({:.1}/s)", self.report.records, self.records_per_sec());
        println!("  Matches: {}", self.report.matches);
        println!("  Delivered: {}", self.report.sent());
        println!("  Failed: {}", self.report.failed());

        if !self.report.deliveries.is_empty() {
            println!("\n  Destinations:");
            for (id, counts) in &self.report.deliveries {
                println!("    - {id}: sent={} failed={}", counts.sent, counts.failed);
            }
        }

        println!();
    }
}
