//! Match Engine - evaluates one rule against one record

use contracts::{Record, Value};
use tracing::error;

use crate::rule::CompiledRule;

/// Outcome of evaluating a rule against a record
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matched: bool,
    /// Value handed to destinations as the match section
    pub value: Value,
}

impl MatchResult {
    pub fn no_match() -> Self {
        Self {
            matched: false,
            value: Value::Null,
        }
    }
}

/// Evaluate `rule` against `record`
///
/// Only the first output of the expression is considered:
/// - no output, `null` or an evaluation error: no match
/// - a boolean: matches when `true`, carrying the boolean
/// - anything else: matches, carrying the value
///
/// Evaluation errors are logged with the rule name and the record, and
/// never propagate.
pub fn evaluate(rule: &CompiledRule, record: &Record) -> MatchResult {
    match rule.query().first(record) {
        None | Some(Ok(Value::Null)) => MatchResult::no_match(),
        Some(Ok(Value::Bool(b))) => MatchResult {
            matched: b,
            value: Value::Bool(b),
        },
        Some(Ok(value)) => MatchResult {
            matched: true,
            value,
        },
        Some(Err(e)) => {
            error!(
                rule = %rule.name(),
                error = %e,
                record = %record,
                "Match expression evaluation failed"
            );
            observability::record_evaluation_error(rule.name());
            MatchResult::no_match()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DestinationRegistry;
    use crate::rule::RuleSet;
    use contracts::RuleConfig;
    use serde_json::json;

    fn rule(expr: &str) -> RuleSet {
        let config = RuleConfig {
            name: "test".to_string(),
            description: String::new(),
            match_expression: expr.to_string(),
            destinations: Vec::new(),
        };
        RuleSet::compile(&[config], &DestinationRegistry::default()).unwrap()
    }

    fn eval(expr: &str, record: serde_json::Value) -> MatchResult {
        let rules = rule(expr);
        let compiled = rules.get(0).unwrap();
        evaluate(compiled, &Value::from(record))
    }

    fn create_user() -> serde_json::Value {
        json!({
            "eventName": "CreateUser",
            "responseElements": {"user": {"userName": "user1"}}
        })
    }

    #[test]
    fn test_extracted_string_matches() {
        let expr = r#"select(.eventName == "CreateUser") | "username: \(.responseElements.user.userName)""#;
        let result = eval(expr, create_user());
        assert!(result.matched);
        assert_eq!(result.value, Value::from("username: user1"));

        let result = eval(expr, json!({"eventName": "DeleteUser"}));
        assert!(!result.matched);
    }

    #[test]
    fn test_boolean_results() {
        let result = eval(".eventName == \"CreateUser\"", create_user());
        assert_eq!(result, MatchResult { matched: true, value: Value::Bool(true) });

        let result = eval("false", create_user());
        assert_eq!(result, MatchResult { matched: false, value: Value::Bool(false) });
    }

    #[test]
    fn test_null_and_empty_do_not_match() {
        assert_eq!(eval(".missing", create_user()), MatchResult::no_match());
        assert_eq!(eval("empty", create_user()), MatchResult::no_match());
    }

    #[test]
    fn test_evaluation_error_is_no_match() {
        let result = eval(".eventName | .[0]", create_user());
        assert_eq!(result, MatchResult::no_match());
    }

    #[test]
    fn test_oversized_string_repeat_is_no_match() {
        let result = eval(".name * .count", json!({"name": "x", "count": 1e300}));
        assert_eq!(result, MatchResult::no_match());
    }

    #[test]
    fn test_modulo_by_huge_divisor_does_not_abort() {
        let result = eval(".a % .b", json!({"a": 5, "b": -1e19}));
        if result.matched {
            assert_eq!(result.value, Value::from(5i64));
        } else {
            assert_eq!(result, MatchResult::no_match());
        }
    }

    #[test]
    fn test_only_first_output_counts() {
        let result = eval("false, true", create_user());
        assert!(!result.matched);

        let result = eval(".responseElements.user, error(\"never reached\")", create_user());
        assert!(result.matched);
        assert_eq!(result.value, Value::from(json!({"userName": "user1"})));
    }

    #[test]
    fn test_whole_record_is_carried() {
        let result = eval(".", create_user());
        assert!(result.matched);
        assert_eq!(result.value, Value::from(create_user()));
    }

    #[test]
    fn test_zero_is_a_match() {
        let result = eval("0", create_user());
        assert!(result.matched);
        assert_eq!(result.value, Value::from(0i64));
    }
}
