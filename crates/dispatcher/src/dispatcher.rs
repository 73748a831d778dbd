//! Dispatcher - evaluates every rule against each record and fans matches
//! out to the rule's destinations

use std::time::Instant;

use contracts::{Alert, Record};
use tracing::{debug, error, info, instrument};

use crate::matcher;
use crate::metrics::DispatchReport;
use crate::rule::RuleSet;

/// Sequential rule evaluation and delivery
///
/// A failing destination never stops the remaining destinations of the
/// rule, the remaining rules, or the remaining records.
#[derive(Debug)]
pub struct Dispatcher {
    rules: RuleSet,
}

impl Dispatcher {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Evaluate every rule against one record and deliver each match
    #[instrument(name = "dispatch_record", skip_all, fields(rules = self.rules.len()))]
    pub async fn dispatch_record(&self, record: &Record) -> DispatchReport {
        let mut report = DispatchReport {
            records: 1,
            ..Default::default()
        };

        for (idx, rule) in self.rules.iter().enumerate() {
            let result = matcher::evaluate(rule, record);
            if !result.matched {
                continue;
            }

            report.matches += 1;
            observability::record_rule_match(rule.name());
            debug!(
                rule = %rule.name(),
                rule_idx = idx,
                destinations = rule.destinations().len(),
                "Rule matched"
            );

            let alert = Alert::new(rule.name(), rule.description(), record, &result.value);
            for destination in rule.destinations() {
                let destination_type = destination.kind().tag();
                let started = Instant::now();
                let outcome = destination.send(&alert).await;
                observability::record_delivery_latency_ms(
                    destination_type,
                    started.elapsed().as_secs_f64() * 1000.0,
                );

                match outcome {
                    Ok(()) => {
                        debug!(
                            rule = %rule.name(),
                            destination_type,
                            destination = %destination.id(),
                            "Alert delivered"
                        );
                        observability::record_delivery(destination_type, destination.id(), true);
                        report.record_delivery(destination.id(), true);
                    }
                    Err(e) => {
                        error!(
                            rule = %rule.name(),
                            rule_idx = idx,
                            destination_type,
                            destination = %destination.id(),
                            error = %e,
                            "Destination send failed"
                        );
                        observability::record_delivery(destination_type, destination.id(), false);
                        report.record_delivery(destination.id(), false);
                    }
                }
            }
        }

        observability::record_record_processed();
        report
    }

    /// Dispatch records in order
    #[instrument(name = "dispatch_batch", skip_all, fields(records = records.len()))]
    pub async fn dispatch_batch(&self, records: &[Record]) -> DispatchReport {
        let mut total = DispatchReport::new();
        for record in records {
            let report = self.dispatch_record(record).await;
            total.merge(&report);
        }
        info!(
            records = total.records,
            matches = total.matches,
            sent = total.sent(),
            failed = total.failed(),
            "Batch dispatched"
        );
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Collaborators;
    use crate::transport::RecordingTransport;
    use contracts::{Config, DestinationConfig, RuleConfig, Value};
    use serde_json::json;
    use std::sync::Arc;

    const HOOK: &str = "https://hooks.example.com/services/T/B/token";
    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:alerts";

    fn config(rules: Vec<RuleConfig>) -> Config {
        Config {
            rules,
            destinations: vec![
                DestinationConfig {
                    id: "chat".to_string(),
                    kind: "webhook".to_string(),
                    webhook_url: Some(HOOK.to_string()),
                    ..Default::default()
                },
                DestinationConfig {
                    id: "bus".to_string(),
                    kind: "topic".to_string(),
                    topic: Some(TOPIC.to_string()),
                    ..Default::default()
                },
            ],
        }
    }

    fn rule(name: &str, expr: &str, destinations: &[&str]) -> RuleConfig {
        RuleConfig {
            name: name.to_string(),
            description: String::new(),
            match_expression: expr.to_string(),
            destinations: destinations.iter().map(|d| d.to_string()).collect(),
        }
    }

    fn dispatcher(rules: Vec<RuleConfig>, transport: Arc<RecordingTransport>) -> Dispatcher {
        let rules = RuleSet::build(&config(rules), &Collaborators::uniform(transport)).unwrap();
        Dispatcher::new(rules)
    }

    #[tokio::test]
    async fn test_failed_destination_does_not_stop_others() {
        let transport = Arc::new(RecordingTransport::new());
        transport.fail_target(HOOK);
        let dispatcher = dispatcher(
            vec![
                rule("first", "true", &["chat", "bus"]),
                rule("second", ".eventName", &["bus"]),
            ],
            transport.clone(),
        );

        let record = Value::from(json!({"eventName": "CreateUser"}));
        let report = dispatcher.dispatch_record(&record).await;

        assert_eq!(report.matches, 2);
        assert_eq!(report.delivery("chat").failed, 1);
        assert_eq!(report.delivery("bus").sent, 2);
        assert_eq!(transport.published().len(), 2);
    }

    #[tokio::test]
    async fn test_non_matching_rules_send_nothing() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = dispatcher(
            vec![
                rule("false", "false", &["bus"]),
                rule("null", ".missing", &["bus"]),
                rule("error", ".eventName | .[0]", &["bus"]),
            ],
            transport.clone(),
        );

        let report = dispatcher
            .dispatch_record(&Value::from(json!({"eventName": "CreateUser"})))
            .await;
        assert_eq!(report.matches, 0);
        assert!(transport.published().is_empty());
    }

    #[tokio::test]
    async fn test_batch_continues_after_evaluation_error() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = dispatcher(vec![rule("r", ".user.name | ascii_downcase", &["bus"])], transport.clone());

        let records = vec![
            Value::from(json!({"user": {"name": 7}})),
            Value::from(json!({"user": {"name": "Alice"}})),
        ];
        let report = dispatcher.dispatch_batch(&records).await;

        assert_eq!(report.records, 2);
        assert_eq!(report.matches, 1);
        let published = transport.published();
        assert_eq!(published.len(), 1);
        let payload: serde_json::Value = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(payload["match"], json!("alice"));
    }

    #[tokio::test]
    async fn test_dispatch_order_follows_rules_then_destinations() {
        let transport = Arc::new(RecordingTransport::new());
        let dispatcher = dispatcher(
            vec![rule("a", "1", &["bus", "chat"]), rule("b", "2", &["chat"])],
            transport.clone(),
        );
        dispatcher.dispatch_record(&Value::from(json!({}))).await;

        assert_eq!(
            transport.targets(),
            vec![TOPIC.to_string(), HOOK.to_string(), HOOK.to_string()]
        );
    }
}
