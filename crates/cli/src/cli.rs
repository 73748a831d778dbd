//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Tattletail - audit-log rule engine
#[derive(Parser, Debug)]
#[command(
    name = "tattletail",
    author,
    version,
    about = "Match audit-log records against rules and notify destinations",
    long_about = "Evaluates every record of the given audit-log objects against the \n\
                  configured rules and delivers each match to the rule's topic, \n\
                  webhook and email destinations."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TATTLETAIL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "TATTLETAIL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (disabled when unset)
    #[arg(long, global = true, env = "TATTLETAIL_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process a batch of log objects
    Run(RunArgs),

    /// Validate the rules file without processing anything
    Validate(ValidateArgs),

    /// Display rules and destinations
    Info(InfoArgs),
}

/// Where the rules file comes from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Local rules file (TOML or JSON), used unless both object-store
    /// settings are given
    #[arg(short, long, default_value = config_loader::BUNDLED_CONFIG, env = "TATTLETAIL_CONFIG")]
    pub config: PathBuf,

    /// Bucket holding the rules file
    #[arg(long, env = config_loader::CONFIG_BUCKET_ENV)]
    pub config_bucket: Option<String>,

    /// Object key of the rules file
    #[arg(long, env = config_loader::CONFIG_PATH_ENV)]
    pub config_path: Option<String>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Log objects to process, as `bucket/key`
    pub objects: Vec<String>,

    /// Batch event file (`{"Records": [{"s3": ...}]}`) naming the objects
    #[arg(short, long, env = "TATTLETAIL_EVENT")]
    pub event: Option<PathBuf>,

    /// Directory backing the object store (`<root>/<bucket>/<key>`)
    #[arg(long, default_value = ".", env = "TATTLETAIL_STORE_ROOT")]
    pub store_root: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Log deliveries instead of performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Webhook request timeout in seconds
    #[arg(long, default_value = "10", env = "TATTLETAIL_WEBHOOK_TIMEOUT")]
    pub webhook_timeout: u64,

    #[command(flatten)]
    pub smtp: SmtpArgs,

    /// Print invocation statistics as JSON
    #[arg(long)]
    pub json: bool,
}

/// SMTP relay for email destinations
#[derive(Args, Debug, Clone)]
pub struct SmtpArgs {
    /// SMTP relay host (emails are only logged when unset)
    #[arg(long, env = "TATTLETAIL_SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long, default_value = "587", env = "TATTLETAIL_SMTP_PORT")]
    pub smtp_port: u16,

    /// SMTP username
    #[arg(long, env = "TATTLETAIL_SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long, env = "TATTLETAIL_SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Connect without TLS (local relays only)
    #[arg(long)]
    pub smtp_insecure: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the rules file to validate
    #[arg(short, long, default_value = config_loader::BUNDLED_CONFIG)]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to the rules file
    #[arg(short, long, default_value = config_loader::BUNDLED_CONFIG)]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format options
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// Human-readable format with colors
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
    /// JSON structured logging
    Json,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
            LogFormat::Json => Self::Json,
        }
    }
}
