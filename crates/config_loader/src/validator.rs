//! Configuration lints
//!
//! Structural errors (unknown destination type, duplicate ids, dangling
//! references, uncompilable expressions) are fatal and reported when the
//! registry and rule set are built. The checks here only warn:
//! - rule with no destinations
//! - destination no rule references
//! - duplicate rule names

use std::collections::HashSet;

use contracts::Config;

/// Collect non-fatal warnings, in configuration order
pub fn lint(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    lint_rules_without_destinations(config, &mut warnings);
    lint_duplicate_rule_names(config, &mut warnings);
    lint_unreferenced_destinations(config, &mut warnings);
    warnings
}

fn lint_rules_without_destinations(config: &Config, warnings: &mut Vec<String>) {
    for (idx, rule) in config.rules.iter().enumerate() {
        if rule.destinations.is_empty() {
            warnings.push(format!(
                "rule name={:?} idx={idx} has no destinations; matches will be dropped",
                rule.name
            ));
        }
    }
}

fn lint_duplicate_rule_names(config: &Config, warnings: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for (idx, rule) in config.rules.iter().enumerate() {
        if !seen.insert(rule.name.as_str()) {
            warnings.push(format!("rule name={:?} idx={idx} duplicates an earlier rule name", rule.name));
        }
    }
}

fn lint_unreferenced_destinations(config: &Config, warnings: &mut Vec<String>) {
    let referenced: HashSet<&str> = config
        .rules
        .iter()
        .flat_map(|r| r.destinations.iter().map(String::as_str))
        .collect();

    for destination in &config.destinations {
        if !referenced.contains(destination.id.as_str()) {
            warnings.push(format!(
                "destination id={:?} is not referenced by any rule",
                destination.id
            ));
        }
    }
}
