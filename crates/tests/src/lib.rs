//! # Integration Tests
//!
//! End-to-end tests across the workspace.
//!
//! Covers:
//! - configuration -> registry -> rule set -> dispatch with recording transports
//! - per-invocation rebuild and idempotence
//! - failure isolation between destinations

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use config_loader::ConfigSource;
    use contracts::Value;
    use dispatcher::{Collaborators, RecordingTransport};
    use ingestion::{BatchEvent, LocalObjectStore, MemoryObjectStore, ObjectRef};
    use serde_json::json;
    use tattletail_cli::Handler;

    const HOOK: &str = "https://hooks.slack.com/services/T000/B000/XXXX";
    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:security-alerts";

    const RULES: &str = r#"
[[rule]]
name = "Create User"
description = "A new IAM user was created"
match_expression = '''
select(.eventName == "CreateUser") | "username: \(.responseElements.user.userName)"
'''
destinations = ["bus", "chat", "security-team"]

[[destination]]
id = "bus"
type = "topic"
topic = "arn:aws:sns:us-east-1:123456789012:security-alerts"

[[destination]]
id = "chat"
type = "webhook"
webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"

[[destination]]
id = "security-team"
type = "email"
to_emails = ["sec@example.com"]
from_email = "tattletail@example.com"
"#;

    fn create_user() -> Value {
        Value::from(json!({
            "eventName": "CreateUser",
            "eventSource": "iam.amazonaws.com",
            "responseElements": {"user": {"userName": "user1"}}
        }))
    }

    fn delete_user() -> Value {
        Value::from(json!({"eventName": "DeleteUser"}))
    }

    /// Store holding `rules` at config/rules.toml and `records` at logs/batch.json.gz
    fn store(rules: &str, records: &[Value]) -> Arc<MemoryObjectStore> {
        let store = Arc::new(MemoryObjectStore::new());
        store.put("config", "rules.toml", rules.as_bytes().to_vec());
        store.put_log_document("logs", "batch.json.gz", records).unwrap();
        store
    }

    fn handler(store: Arc<MemoryObjectStore>, transport: Arc<RecordingTransport>) -> Handler {
        Handler::new(
            store,
            Collaborators::uniform(transport),
            ConfigSource::resolve(Some("config"), Some("rules.toml"), "unused.toml"),
        )
    }

    fn event() -> BatchEvent {
        BatchEvent::from_objects([ObjectRef::new("logs", "batch.json.gz")])
    }

    #[tokio::test]
    async fn test_create_user_reaches_every_destination_kind() {
        let store = store(RULES, &[create_user(), delete_user()]);
        let transport = Arc::new(RecordingTransport::new());

        let stats = handler(store, transport.clone()).handle(&event()).await.unwrap();

        assert_eq!(stats.report.records, 2);
        assert_eq!(stats.report.matches, 1);
        assert_eq!(stats.report.sent(), 3);
        assert_eq!(
            transport.targets(),
            vec![TOPIC.to_string(), HOOK.to_string(), "sec@example.com".to_string()]
        );

        let published = transport.published();
        let payload: serde_json::Value = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(payload["name"], json!("Create User"));
        assert_eq!(payload["match"], json!("username: user1"));
        assert_eq!(payload["record"]["eventName"], json!("CreateUser"));

        let posted = transport.posted();
        let message: serde_json::Value = serde_json::from_str(&posted[0].1).unwrap();
        let fields = message["attachments"][0]["fields"].as_array().unwrap();
        assert_eq!(fields[2]["value"], json!("\"username: user1\""));

        let sent = transport.sent();
        assert!(sent[0].body.starts_with("Alert: Create User\n\nA new IAM user was created\n"));
        assert!(sent[0].body.ends_with("match: \"username: user1\"\n"));
    }

    #[tokio::test]
    async fn test_invocations_are_idempotent() {
        let store = store(RULES, &[create_user(), delete_user()]);
        let transport = Arc::new(RecordingTransport::new());
        let handler = handler(store, transport.clone());

        let a = handler.handle(&event()).await.unwrap();
        let b = handler.handle(&event()).await.unwrap();
        assert_eq!(a.report, b.report);

        fn halves<T: Clone + PartialEq + std::fmt::Debug>(items: Vec<T>) -> (Vec<T>, Vec<T>) {
            assert_eq!(items.len() % 2, 0);
            let second = items[items.len() / 2..].to_vec();
            let mut first = items;
            first.truncate(second.len());
            (first, second)
        }

        let (first, second) = halves(transport.published());
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);

        let (first, second) = halves(transport.posted());
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);

        let (first, second) = halves(transport.sent());
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);

        let (first, second) = halves(transport.targets());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_config_change_takes_effect_next_invocation() {
        let store = store(RULES, &[create_user()]);
        let transport = Arc::new(RecordingTransport::new());
        let handler = handler(store.clone(), transport.clone());

        handler.handle(&event()).await.unwrap();
        assert_eq!(transport.len(), 3);

        store.put(
            "config",
            "rules.toml",
            RULES.replace(r#"destinations = ["bus", "chat", "security-team"]"#, r#"destinations = ["bus"]"#)
                .into_bytes(),
        );
        let stats = handler.handle(&event()).await.unwrap();
        assert_eq!(stats.report.sent(), 1);
        assert_eq!(transport.len(), 4);
    }

    #[tokio::test]
    async fn test_failing_destination_is_isolated() {
        let store = store(RULES, &[create_user(), create_user()]);
        let transport = Arc::new(RecordingTransport::new());
        transport.fail_target(HOOK);

        let stats = handler(store, transport.clone()).handle(&event()).await.unwrap();

        assert_eq!(stats.report.matches, 2);
        assert_eq!(stats.report.delivery("chat").failed, 2);
        assert_eq!(stats.report.delivery("bus").sent, 2);
        assert_eq!(stats.report.delivery("security-team").sent, 2);
        assert_eq!(transport.published().len(), 2);
        assert_eq!(transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_boolean_and_null_results() {
        let rules = r#"
[[rule]]
name = "always"
match_expression = "true"
destinations = ["bus"]

[[rule]]
name = "never"
match_expression = "false"
destinations = ["bus"]

[[rule]]
name = "missing"
match_expression = ".nothing.here"
destinations = ["bus"]

[[destination]]
id = "bus"
type = "sns"
sns_arn = "arn:aws:sns:us-east-1:123456789012:security-alerts"
"#;
        let store = store(rules, &[create_user()]);
        let transport = Arc::new(RecordingTransport::new());

        let stats = handler(store, transport.clone()).handle(&event()).await.unwrap();
        assert_eq!(stats.report.matches, 1);

        let published = transport.published();
        assert_eq!(published.len(), 1);
        let payload: serde_json::Value = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(payload["name"], json!("always"));
        assert_eq!(payload["match"], json!(true));
    }

    #[tokio::test]
    async fn test_whole_record_match_is_not_repeated() {
        let rules = r#"
[[rule]]
name = "everything"
match_expression = "."
destinations = ["bus", "chat", "security-team"]

[[destination]]
id = "bus"
type = "topic"
topic = "arn:aws:sns:us-east-1:123456789012:security-alerts"

[[destination]]
id = "chat"
type = "webhook"
webhook_url = "https://hooks.slack.com/services/T000/B000/XXXX"

[[destination]]
id = "security-team"
type = "email"
to_emails = ["sec@example.com"]
from_email = "tattletail@example.com"
"#;
        let store = store(rules, &[create_user()]);
        let transport = Arc::new(RecordingTransport::new());
        handler(store, transport.clone()).handle(&event()).await.unwrap();

        let payload: serde_json::Value = serde_json::from_str(&transport.published()[0].1).unwrap();
        assert!(payload.get("match").is_none());

        let message: serde_json::Value = serde_json::from_str(&transport.posted()[0].1).unwrap();
        assert_eq!(message["attachments"][0]["fields"].as_array().unwrap().len(), 2);

        assert!(!transport.sent()[0].body.contains("match:"));
    }

    #[tokio::test]
    async fn test_evaluation_error_skips_rule_for_that_record_only() {
        let rules = r#"
[[rule]]
name = "lowercase"
match_expression = ".userName | ascii_downcase"
destinations = ["bus"]

[[rule]]
name = "all"
match_expression = "true"
destinations = ["bus"]

[[destination]]
id = "bus"
type = "topic"
topic = "arn:aws:sns:us-east-1:123456789012:security-alerts"
"#;
        let records = [
            Value::from(json!({"userName": 42})),
            Value::from(json!({"userName": "Alice"})),
        ];
        let store = store(rules, &records);
        let transport = Arc::new(RecordingTransport::new());

        let stats = handler(store, transport).handle(&event()).await.unwrap();
        assert_eq!(stats.report.records, 2);
        assert_eq!(stats.report.matches, 3);
    }

    #[tokio::test]
    async fn test_undecodable_object_aborts_invocation() {
        let store = store(RULES, &[create_user()]);
        store.put("logs", "broken.json.gz", b"\x1f\x8bnot really gzip".to_vec());
        let transport = Arc::new(RecordingTransport::new());

        let event = BatchEvent::from_objects([ObjectRef::new("logs", "broken.json.gz")]);
        let err = handler(store, transport.clone()).handle(&event).await.unwrap_err();
        assert!(format!("{err:#}").contains("logs/broken.json.gz"), "got: {err:#}");
        assert!(transport.is_empty());
    }

    #[tokio::test]
    async fn test_local_store_with_bundled_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tattletail.toml");
        std::fs::write(&config_path, RULES).unwrap();

        let logs = dir.path().join("logs");
        std::fs::create_dir_all(&logs).unwrap();
        let document = json!({"Records": [serde_json::to_value(create_user()).unwrap()]});
        let compressed = ingestion::gzip(document.to_string().as_bytes()).unwrap();
        std::fs::write(logs.join("batch.json.gz"), compressed).unwrap();

        let transport = Arc::new(RecordingTransport::new());
        let handler = Handler::new(
            Arc::new(LocalObjectStore::new(dir.path())),
            Collaborators::uniform(transport.clone()),
            ConfigSource::resolve(None, None, &config_path),
        );

        let stats = handler.handle(&event()).await.unwrap();
        assert_eq!(stats.report.sent(), 3);
        assert_eq!(transport.len(), 3);
    }
}
