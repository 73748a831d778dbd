//! Engine metrics
//!
//! Thin helpers over the `metrics` facade. Without an installed recorder
//! every call is a no-op.

use metrics::{counter, histogram};

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// A log object was fetched (or failed to fetch/decode)
pub fn record_object_fetched(success: bool, records: usize) {
    counter!("tattletail_objects_fetched_total", "status" => outcome(success)).increment(1);
    if success {
        counter!("tattletail_records_decoded_total").increment(records as u64);
    }
}

/// One record went through every rule
pub fn record_record_processed() {
    counter!("tattletail_records_processed_total").increment(1);
}

/// A rule matched a record
pub fn record_rule_match(rule: &str) {
    counter!("tattletail_rule_matches_total", "rule" => rule.to_string()).increment(1);
}

/// A rule's query raised an error on a record
pub fn record_evaluation_error(rule: &str) {
    counter!("tattletail_evaluation_errors_total", "rule" => rule.to_string()).increment(1);
}

/// A destination send completed
pub fn record_delivery(destination_type: &str, destination: &str, success: bool) {
    counter!(
        "tattletail_deliveries_total",
        "destination_type" => destination_type.to_string(),
        "destination" => destination.to_string(),
        "status" => outcome(success)
    )
    .increment(1);
}

/// Time spent in one destination send
pub fn record_delivery_latency_ms(destination_type: &str, latency_ms: f64) {
    histogram!(
        "tattletail_delivery_latency_ms",
        "destination_type" => destination_type.to_string()
    )
    .record(latency_ms);
}
