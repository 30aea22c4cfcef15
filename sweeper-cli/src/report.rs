//! Terminal output
//!
//! Colored progress lines while a sweep runs, and the final summary.

use chrono::{DateTime, Utc};
use colored::*;
use sweeper_client::{ClientError, DeleteOutcome, ProjectEndpoint};
use sweeper_core::domain::pipeline::Pipeline;

use crate::sweep::{Progress, SweepReport};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prints sweep progress to stdout
pub struct TerminalReport {
    threshold_days: u32,
    dry_run: bool,
    expected: usize,
    settled: usize,
}

impl TerminalReport {
    pub fn new(threshold_days: u32, dry_run: bool) -> Self {
        Self {
            threshold_days,
            dry_run,
            expected: 0,
            settled: 0,
        }
    }

    /// Print the closing summary of a run
    pub fn print_summary(&self, report: &SweepReport) {
        println!();

        if report.dry_run {
            println!(
                "{}",
                format!(
                    "Dry run: {} pipeline(s) would be deleted, nothing was changed.",
                    report.expired.len()
                )
                .yellow()
                .bold()
            );
            return;
        }

        if report.expired.is_empty() {
            println!("{}", "✓ Nothing to delete.".green().bold());
            return;
        }

        let summary = &report.summary;
        if summary.is_clean() {
            println!(
                "{}",
                format!("✓ Deleted {} pipeline(s)", summary.deleted.len())
                    .green()
                    .bold()
            );
            return;
        }

        println!("{}", "Summary:".bold());
        println!("  Deleted: {}", summary.deleted.len().to_string().green());
        println!("  Failed:  {}", summary.failed.len().to_string().red());
        if !summary.skipped.is_empty() {
            println!("  Skipped: {}", summary.skipped.len().to_string().yellow());
        }

        if !summary.failed.is_empty() {
            println!();
            println!("{}", "Failed pipelines:".red().bold());
            for failure in &summary.failed {
                println!("  {} #{}: {}", "✗".red(), failure.id, failure.reason.dimmed());
            }
        }
    }
}

impl Progress for TerminalReport {
    fn listing(&mut self, endpoint: &ProjectEndpoint) {
        println!(
            "{} {}",
            "Listing pipelines of project".bold(),
            endpoint.project().to_string().cyan()
        );
        println!("  Server: {}", endpoint.base_url().dimmed());
    }

    fn listed(&mut self, total: usize, expired: &[Pipeline], cutoff: DateTime<Utc>) {
        self.expected = expired.len();

        println!(
            "  Found {} pipeline(s), {} older than {} day(s) (updated before {})",
            total.to_string().bold(),
            expired.len().to_string().bold(),
            self.threshold_days,
            cutoff.format("%Y-%m-%d %H:%M:%S UTC")
        );

        if expired.is_empty() {
            return;
        }

        println!();
        if self.dry_run {
            println!("{}", "Would delete:".bold());
            for pipeline in expired {
                print_pipeline_line(pipeline);
            }
        } else {
            println!("{}", "Deleting:".bold());
        }
    }

    fn deleted(&mut self, outcome: &DeleteOutcome) {
        self.settled += 1;
        let counter = format!("[{}/{}]", self.settled, self.expected).dimmed();

        match &outcome.result {
            Ok(()) => println!(
                "  {} {} {}",
                counter,
                "✓".green(),
                outcome.pipeline.label()
            ),
            Err(e) => {
                println!(
                    "  {} {} {} {}",
                    counter,
                    "✗".red(),
                    outcome.pipeline.label(),
                    e.to_string().red()
                );
                if let Some(hint) = failure_hint(e) {
                    println!("        {}", hint.yellow());
                }
                if let Some(web_url) = &outcome.pipeline.web_url {
                    println!("        {}", web_url.dimmed());
                }
            }
        }
    }
}

fn print_pipeline_line(pipeline: &Pipeline) {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        pipeline.label().bold(),
        pipeline_details(pipeline).dimmed()
    );
}

/// Commit, timestamps and link of a pipeline, skipping what the API left out
fn pipeline_details(pipeline: &Pipeline) -> String {
    let mut details = Vec::new();

    if let Some(sha) = pipeline.short_sha() {
        details.push(sha.to_string());
    }
    if let Some(created_at) = pipeline.created_at {
        details.push(format!("created {}", created_at.format(TIMESTAMP_FORMAT)));
    }
    details.push(format!("updated {}", pipeline.updated_at.format(TIMESTAMP_FORMAT)));
    if let Some(web_url) = &pipeline.web_url {
        details.push(web_url.clone());
    }

    details.join("  ")
}

/// What the operator can do about a failed deletion
fn failure_hint(error: &ClientError) -> Option<&'static str> {
    if error.is_not_found() {
        Some("already deleted, or not visible to this token")
    } else if error.is_client_error() {
        Some("check that the token has the api scope and the Owner role")
    } else if error.is_server_error() {
        Some("server error, a later run may succeed")
    } else {
        None
    }
}

/// Print an unrecoverable error
pub fn print_fatal(error: &anyhow::Error) {
    eprintln!("{} {:#}", "✗ Error:".red().bold(), error);
}

/// Tell the operator what happens after Ctrl-C
pub fn print_interrupt_notice() {
    eprintln!(
        "{}",
        "Interrupted: waiting for in-flight deletions, press Ctrl-C again to abort immediately"
            .yellow()
    );
}
