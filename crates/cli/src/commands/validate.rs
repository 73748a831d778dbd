//! `validate` command implementation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dispatcher::{Collaborators, LogTransport, RuleSet};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    rule_count: usize,
    destination_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(&args.config);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(path: &Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", path.display())),
            warnings: Vec::new(),
            summary: None,
        };
    }

    let config = match config_loader::ConfigLoader::load_from_path(path) {
        Ok(config) => config,
        Err(e) => {
            return ValidationResult {
                valid: false,
                config_path,
                error: Some(e.to_string()),
                warnings: Vec::new(),
                summary: None,
            }
        }
    };

    let warnings = config_loader::lint(&config);
    match RuleSet::build(&config, &Collaborators::uniform(Arc::new(LogTransport::new()))) {
        Ok(rules) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings,
            summary: Some(ConfigSummary {
                rule_count: rules.len(),
                destination_count: config.destinations.len(),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings,
            summary: None,
        },
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Rules: {}", summary.rule_count);
            println!("  Destinations: {}", summary.destination_count);
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }

    if !result.warnings.is_empty() {
        println!("\n⚠ Warnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_valid_config_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "rules.toml",
            r#"
[[rule]]
name = "root login"
match_expression = '.userIdentity.type == "Root"'
destinations = []

[[destination]]
id = "chat"
type = "webhook"
webhook_url = "https://hooks.example.com/services/a/b/c"
"#,
        );

        let result = validate_config(&path);
        assert!(result.valid, "error: {:?}", result.error);
        assert_eq!(result.warnings.len(), 2);
        assert_eq!(result.summary.map(|s| s.rule_count), Some(1));
    }

    #[test]
    fn test_compile_error_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "rules.toml",
            "[[rule]]\nname = \"bad\"\nmatch_expression = \"select(\"\n",
        );
        let result = validate_config(&path);
        assert!(!result.valid);
        assert!(result.error.unwrap_or_default().contains("name=\"bad\" idx=0"));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = validate_config(Path::new("/nonexistent/tattletail.toml"));
        assert!(!result.valid);
    }
}
