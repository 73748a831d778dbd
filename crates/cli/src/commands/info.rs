//! `info` command implementation.

use std::sync::Arc;

use anyhow::{Context, Result};
use contracts::Config;
use dispatcher::{Collaborators, DestinationRegistry, LogTransport};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    rules: Vec<RuleInfo>,
    destinations: Vec<DestinationInfo>,
}

#[derive(Serialize)]
struct RuleInfo {
    name: String,
    description: String,
    match_expression: String,
    destinations: Vec<String>,
}

#[derive(Serialize)]
struct DestinationInfo {
    id: String,
    destination_type: String,
    /// Redacted rendering of the destination settings
    target: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let info = collect_info(&config)?;

    if args.json {
        let json = serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{json}");
    } else {
        print_info(&info);
    }

    Ok(())
}

fn collect_info(config: &Config) -> Result<ConfigInfo> {
    let collaborators = Collaborators::uniform(Arc::new(LogTransport::new()));
    let registry = DestinationRegistry::build(&config.destinations, &collaborators)
        .context("Invalid destination configuration")?;

    let rules = config
        .rules
        .iter()
        .map(|rule| RuleInfo {
            name: rule.name.clone(),
            description: rule.description.clone(),
            match_expression: rule.match_expression.clone(),
            destinations: rule.destinations.clone(),
        })
        .collect();

    let destinations = registry
        .iter()
        .map(|d| DestinationInfo {
            id: d.id().to_string(),
            destination_type: d.kind().to_string(),
            target: d.to_string(),
        })
        .collect();

    Ok(ConfigInfo { rules, destinations })
}

fn print_info(info: &ConfigInfo) {
    println!("\n=== Rules ({}) ===\n", info.rules.len());
    for (idx, rule) in info.rules.iter().enumerate() {
        println!("  [{idx}] {}", rule.name);
        if !rule.description.is_empty() {
            println!("      {}", rule.description);
        }
        println!("      match: {}", rule.match_expression);
        println!("      destinations: {}", rule.destinations.join(", "));
    }

    println!("\n=== Destinations ({}) ===\n", info.destinations.len());
    for destination in &info.destinations {
        println!("  - {} ({}) {}", destination.id, destination.destination_type, destination.target);
    }
    println!();
}
