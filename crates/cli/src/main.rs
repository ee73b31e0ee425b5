//! FinOps Sentinel CLI
//!
//! A command-line tool for running one-shot waste scans and checking
//! sentinel configuration.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sentinel_lib::SentinelConfig;
use tracing_subscriber::EnvFilter;

/// FinOps Sentinel CLI
#[derive(Parser)]
#[command(name = "finops")]
#[command(author, version, about = "CLI for FinOps Sentinel", long_about = None)]
pub struct Cli {
    /// Subscription to scan
    #[arg(long, env = "SENTINEL_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,

    /// Storage account receiving rendered reports
    #[arg(long, env = "SENTINEL_STORAGE_ACCOUNT")]
    pub storage_account: Option<String>,

    /// Logic App trigger URL for notifications
    #[arg(long, env = "SENTINEL_NOTIFICATION_ENDPOINT")]
    pub notification_endpoint: Option<String>,

    /// Notification recipient address
    #[arg(long, env = "SENTINEL_RECIPIENT_EMAIL")]
    pub recipient_email: Option<String>,

    /// Request timeout in seconds for outbound calls (unbounded if unset)
    #[arg(long, env = "SENTINEL_HTTP_TIMEOUT_SECS")]
    pub http_timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one waste-detection scan now
    Scan {
        /// Persist the report but skip the notification dispatch
        #[arg(long)]
        no_dispatch: bool,
    },

    /// Validate the sentinel configuration
    Check,
}

impl Cli {
    /// Assemble the sentinel configuration from arguments and environment
    pub fn to_config(&self) -> SentinelConfig {
        SentinelConfig {
            subscription_id: self.subscription_id.clone().unwrap_or_default(),
            storage_account: self.storage_account.clone().unwrap_or_default(),
            notification_endpoint: self.notification_endpoint.clone(),
            recipient_email: self.recipient_email.clone(),
            scan_interval_secs: 6 * 60 * 60,
            run_on_startup: true,
            api_port: 8080,
            http_timeout_secs: self.http_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Scan { no_dispatch } => commands::scan::run(&cli, *no_dispatch).await,
        Commands::Check => commands::check::run(&cli),
    }
}
