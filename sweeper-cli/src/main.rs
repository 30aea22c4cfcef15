//! Sweeper CLI
//!
//! Deletes GitLab CI pipelines whose last update is older than a number of days.

mod config;
mod report;
mod sweep;

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use sweeper_client::{DEFAULT_PAGE_SIZE, GitLabClient, HttpTransport};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::{Config, DEFAULT_CONCURRENCY, DEFAULT_DAYS, DEFAULT_TIMEOUT_SECS};
use report::TerminalReport;
use sweep::{EXIT_FAILURE, EXIT_INTERRUPTED, run_sweep};

#[derive(Parser)]
#[command(name = "sweeper")]
#[command(about = "Deletes old GitLab CI pipelines", long_about = None)]
struct Cli {
    /// GitLab server URL (e.g. https://gitlab.com)
    server_url: String,

    /// Numeric project ID or full project path (group/project)
    project_id: String,

    /// Access token with the `api` scope
    #[arg(env = "SWEEPER_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Delete pipelines last updated more than this many days ago
    #[arg(short, long, default_value_t = DEFAULT_DAYS)]
    days: u32,

    /// Maximum number of parallel delete requests
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Pipelines requested per page when listing (max 100)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Show which pipelines would be deleted without deleting them
    #[arg(long)]
    dry_run: bool,

    /// Exit with status 1 if any deletion fails
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(self.server_url, self.project_id, self.access_token);
        config.days = self.days;
        config.concurrency = self.concurrency;
        config.page_size = self.page_size;
        config.timeout = std::time::Duration::from_secs(self.timeout);
        config.dry_run = self.dry_run;
        config.strict = self.strict;
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli.into_config()).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            report::print_fatal(&e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

/// Logs go to stderr; stdout is reserved for the report
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sweeper_cli={level},sweeper_client={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(config: Config) -> Result<u8> {
    config.validate().context("Invalid configuration")?;
    info!("Loaded configuration: {:?}", config);

    let transport =
        HttpTransport::with_timeout(config.timeout).context("Failed to build HTTP client")?;
    let client = GitLabClient::with_transport(Arc::new(transport), config.endpoint()?)
        .with_page_size(config.page_size);

    let interrupted = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(Arc::clone(&interrupted));

    let reference = Utc::now();
    let mut terminal = TerminalReport::new(config.days, config.dry_run);

    let report = run_sweep(
        &client,
        &config.sweep_options(),
        reference,
        &interrupted,
        &mut terminal,
    )
    .await?;

    terminal.print_summary(&report);

    Ok(report.exit_code(config.strict))
}

/// First Ctrl-C stops new deletions, a second one exits immediately
fn spawn_interrupt_handler(interrupted: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }

        warn!("Received Ctrl-C");
        report::print_interrupt_notice();
        interrupted.store(true, Ordering::SeqCst);

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    });
}
