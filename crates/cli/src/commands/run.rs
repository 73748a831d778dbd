//! `run` command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config_loader::ConfigSource;
use dispatcher::{Collaborators, HttpWebhookPoster, LogTransport, SmtpEmailSender, SmtpSettings};
use ingestion::{BatchEvent, LocalObjectStore, ObjectRef};
use tattletail_cli::Handler;
use tracing::{info, warn};

use crate::cli::{ConfigArgs, RunArgs};

/// Execute the `run` command
pub async fn run_batch(args: &RunArgs) -> Result<()> {
    let objects = collect_objects(args)?;
    if objects.is_empty() {
        anyhow::bail!("No log objects given (pass bucket/key arguments or --event)");
    }

    let source = config_source(&args.config);
    info!(
        source = %source,
        objects = objects.len(),
        store_root = %args.store_root.display(),
        dry_run = args.dry_run,
        "Starting invocation"
    );

    let store = Arc::new(LocalObjectStore::new(&args.store_root));
    let collaborators = build_collaborators(args)?;
    let handler = Handler::new(store, collaborators, source);

    let stats = handler
        .handle_objects(&objects)
        .await
        .context("Invocation failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialize statistics")?;
        println!("{json}");
    } else {
        stats.print_summary();
    }

    Ok(())
}

/// Resolve the configuration source from arguments (which already carry
/// the environment fallbacks)
pub fn config_source(args: &ConfigArgs) -> ConfigSource {
    ConfigSource::resolve(
        args.config_bucket.as_deref(),
        args.config_path.as_deref(),
        &args.config,
    )
}

fn collect_objects(args: &RunArgs) -> Result<Vec<ObjectRef>> {
    let mut objects = Vec::new();

    if let Some(path) = &args.event {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?;
        let event = BatchEvent::from_json(&text)
            .with_context(|| format!("Failed to parse event file {}", path.display()))?;
        objects.extend(event.objects());
    }

    for location in &args.objects {
        objects.push(ObjectRef::parse(location).with_context(|| format!("Invalid object {location:?}"))?);
    }

    Ok(objects)
}

fn build_collaborators(args: &RunArgs) -> Result<Collaborators> {
    let log = Arc::new(LogTransport::new());
    if args.dry_run {
        info!("Dry run - deliveries are logged only");
        return Ok(Collaborators::uniform(log));
    }

    let webhooks = Arc::new(
        HttpWebhookPoster::new(Duration::from_secs(args.webhook_timeout))
            .context("Failed to create webhook client")?,
    );

    let email: Arc<dyn contracts::EmailSender> = match &args.smtp.smtp_host {
        Some(host) => {
            let settings = SmtpSettings {
                host: host.clone(),
                port: args.smtp.smtp_port,
                username: args.smtp.smtp_username.clone(),
                password: args.smtp.smtp_password.clone(),
                tls: !args.smtp.smtp_insecure,
                ..Default::default()
            };
            Arc::new(SmtpEmailSender::new(&settings).context("Failed to create SMTP transport")?)
        }
        None => {
            warn!("No SMTP host configured - email destinations are logged only");
            log.clone()
        }
    };

    Ok(Collaborators::new(log, webhooks, email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["run"];
        argv.extend_from_slice(extra);
        RunArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_config_source_prefers_object_store() {
        let args = ConfigArgs {
            config: PathBuf::from("tattletail.toml"),
            config_bucket: Some("cfg".to_string()),
            config_path: Some("rules.toml".to_string()),
        };
        assert_eq!(
            config_source(&args),
            ConfigSource::ObjectStore {
                bucket: "cfg".to_string(),
                path: "rules.toml".to_string()
            }
        );

        let args = ConfigArgs {
            config_path: None,
            ..args
        };
        assert_eq!(config_source(&args), ConfigSource::LocalFile(PathBuf::from("tattletail.toml")));
    }

    #[test]
    fn test_collect_objects_from_event_and_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let event_path = dir.path().join("event.json");
        std::fs::write(
            &event_path,
            r#"{"Records":[{"s3":{"bucket":{"name":"logs"},"object":{"key":"a.json.gz"}}}]}"#,
        )
        .unwrap();

        let event_arg = event_path.display().to_string();
        let args = run_args(&["logs/b.json.gz", "--event", &event_arg]);
        let objects = collect_objects(&args).unwrap();
        assert_eq!(
            objects,
            vec![ObjectRef::new("logs", "a.json.gz"), ObjectRef::new("logs", "b.json.gz")]
        );
    }

    #[test]
    fn test_collect_objects_rejects_bad_location() {
        let args = run_args(&["no-key"]);
        assert!(collect_objects(&args).is_err());
    }
}
