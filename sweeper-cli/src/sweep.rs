//! Sweep orchestration
//!
//! One run: list every pipeline once, pick the expired ones against a fixed
//! reference instant, then delete them. A listing failure aborts the run
//! before any deletion; deletion failures are collected and reported.

use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sweeper_client::{DeleteOutcome, GitLabClient, ProjectEndpoint};
use sweeper_core::domain::pipeline::Pipeline;
use sweeper_core::domain::summary::DeletionSummary;
use sweeper_core::retention;
use tracing::info;

/// Exit code for unrecoverable errors, and for failed deletions in strict mode
pub const EXIT_FAILURE: u8 = 1;

/// Exit code when the run was interrupted before all deletions started
pub const EXIT_INTERRUPTED: u8 = 130;

/// Knobs for one sweep
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub threshold_days: u32,
    pub concurrency: usize,
    pub dry_run: bool,
}

/// Receives progress as a sweep advances
pub trait Progress {
    /// Listing is about to start
    fn listing(&mut self, endpoint: &ProjectEndpoint);

    /// Listing finished and the expired set is known
    fn listed(&mut self, total: usize, expired: &[Pipeline], cutoff: DateTime<Utc>);

    /// A single deletion settled
    fn deleted(&mut self, outcome: &DeleteOutcome);
}

/// What a sweep did
#[derive(Debug, Clone)]
pub struct SweepReport {
    /// Pipelines the project had
    pub listed: usize,
    /// Pipelines older than the threshold, in listing order
    pub expired: Vec<Pipeline>,
    /// Retention boundary used for this run
    pub cutoff: DateTime<Utc>,
    pub summary: DeletionSummary,
    pub dry_run: bool,
}

impl SweepReport {
    /// Process exit code for this run
    ///
    /// Failed deletions only count when `strict` is set; an interrupted run
    /// always reports [`EXIT_INTERRUPTED`].
    pub fn exit_code(&self, strict: bool) -> u8 {
        if !self.summary.skipped.is_empty() {
            EXIT_INTERRUPTED
        } else if strict && !self.summary.failed.is_empty() {
            EXIT_FAILURE
        } else {
            0
        }
    }
}

/// Run one sweep against a project
///
/// # Arguments
/// * `client` - The GitLab client for the target project
/// * `options` - Threshold, concurrency and dry-run switch
/// * `reference` - The instant ages are measured from, fixed for the run
/// * `interrupted` - Stop flag raised on Ctrl-C
/// * `progress` - Receives listing and per-deletion events
///
/// # Errors
/// Fails only when the listing fails; deletion failures end up in the report.
pub async fn run_sweep<P: Progress>(
    client: &GitLabClient,
    options: &SweepOptions,
    reference: DateTime<Utc>,
    interrupted: &AtomicBool,
    progress: &mut P,
) -> Result<SweepReport> {
    progress.listing(client.endpoint());

    let pipelines = client
        .lister()
        .fetch_all()
        .await
        .context("Failed to list pipelines")?;

    let cutoff = retention::cutoff(reference, options.threshold_days);
    let expired = retention::select_expired(&pipelines, reference, options.threshold_days);

    info!(
        "{} of {} pipeline(s) last updated before {}",
        expired.len(),
        pipelines.len(),
        cutoff
    );
    progress.listed(pipelines.len(), &expired, cutoff);

    let summary = if options.dry_run || expired.is_empty() {
        DeletionSummary::default()
    } else {
        client
            .deleter()
            .delete_all(
                expired.clone(),
                options.concurrency,
                interrupted,
                |outcome| progress.deleted(outcome),
            )
            .await
    };

    Ok(SweepReport {
        listed: pipelines.len(),
        expired,
        cutoff,
        summary,
        dry_run: options.dry_run,
    })
}
