//! Pipeline deletion
//!
//! One DELETE request per pipeline, never retried. [`PipelineDeleter::delete_all`]
//! runs many of them with a cap on in-flight requests; every pipeline gets its
//! own task and its own outcome, so one failure never stops the others.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sweeper_core::domain::pipeline::Pipeline;
use sweeper_core::domain::summary::DeletionSummary;
use tokio::task::{Id as TaskId, JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::endpoint::ProjectEndpoint;
use crate::error::{ClientError, Result};
use crate::transport::Transport;

/// Result of deleting one pipeline
#[derive(Debug)]
pub struct DeleteOutcome {
    pub pipeline: Pipeline,
    pub result: Result<()>,
}

impl DeleteOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Deletes pipelines of one project
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct PipelineDeleter {
    transport: Arc<dyn Transport>,
    endpoint: ProjectEndpoint,
}

impl PipelineDeleter {
    pub fn new(transport: Arc<dyn Transport>, endpoint: ProjectEndpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// Delete a single pipeline
    ///
    /// # Arguments
    /// * `pipeline` - The pipeline to delete
    ///
    /// # Errors
    /// [`ClientError::Delete`] carrying the pipeline id and the transport failure
    pub async fn delete(&self, pipeline: &Pipeline) -> Result<()> {
        let url = self.endpoint.pipeline_url(pipeline.id);
        debug!("Deleting pipeline {}", pipeline.id);

        self.transport
            .delete(&url, self.endpoint.access_token())
            .await
            .map_err(|source| ClientError::Delete {
                pipeline_id: pipeline.id,
                source,
            })
    }

    /// Delete many pipelines with at most `concurrency` requests in flight
    ///
    /// `on_outcome` sees each outcome as soon as its request settles. Once
    /// `interrupted` is raised no further requests start; requests already in
    /// flight are awaited and the remaining pipelines are reported as skipped.
    ///
    /// # Arguments
    /// * `pipelines` - The pipelines to delete
    /// * `concurrency` - Maximum number of parallel requests (at least 1 is used)
    /// * `interrupted` - Stop flag, typically raised by a Ctrl-C handler
    /// * `on_outcome` - Progress callback
    pub async fn delete_all<F>(
        &self,
        pipelines: Vec<Pipeline>,
        concurrency: usize,
        interrupted: &AtomicBool,
        mut on_outcome: F,
    ) -> DeletionSummary
    where
        F: FnMut(&DeleteOutcome),
    {
        let limit = concurrency.max(1);
        let mut summary = DeletionSummary::default();
        let mut tasks: JoinSet<DeleteOutcome> = JoinSet::new();
        let mut running: HashMap<TaskId, Pipeline> = HashMap::new();
        let mut pending = pipelines.into_iter();

        info!("Deleting {} pipeline(s) with concurrency {}", pending.len(), limit);

        while let Some(pipeline) = pending.next() {
            while tasks.len() >= limit {
                match tasks.join_next_with_id().await {
                    Some(joined) => {
                        let outcome = unwrap_joined(joined, &mut running);
                        settle(outcome, &mut summary, &mut on_outcome);
                    }
                    None => break,
                }
            }

            if interrupted.load(Ordering::SeqCst) {
                warn!("Interrupted, not starting remaining deletions");
                summary.record_skipped(pipeline.id);
                for rest in pending.by_ref() {
                    summary.record_skipped(rest.id);
                }
                break;
            }

            let deleter = self.clone();
            let tracked = pipeline.clone();
            let handle = tasks.spawn(async move {
                let result = deleter.delete(&pipeline).await;
                DeleteOutcome { pipeline, result }
            });
            running.insert(handle.id(), tracked);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let outcome = unwrap_joined(joined, &mut running);
            settle(outcome, &mut summary, &mut on_outcome);
        }

        info!(
            "Deletion finished: {} deleted, {} failed, {} skipped",
            summary.deleted.len(),
            summary.failed.len(),
            summary.skipped.len()
        );

        summary
    }
}

/// Turn a joined task into an outcome; a panicked task fails its own pipeline
fn unwrap_joined(
    joined: std::result::Result<(TaskId, DeleteOutcome), JoinError>,
    running: &mut HashMap<TaskId, Pipeline>,
) -> Option<DeleteOutcome> {
    match joined {
        Ok((id, outcome)) => {
            running.remove(&id);
            Some(outcome)
        }
        Err(e) => {
            error!("Deletion task panicked: {}", e);
            let pipeline = running.remove(&e.id())?;
            Some(DeleteOutcome {
                result: Err(ClientError::TaskPanicked {
                    pipeline_id: pipeline.id,
                    message: e.to_string(),
                }),
                pipeline,
            })
        }
    }
}

/// Fold one finished task into the summary and report it
fn settle<F>(outcome: Option<DeleteOutcome>, summary: &mut DeletionSummary, on_outcome: &mut F)
where
    F: FnMut(&DeleteOutcome),
{
    let Some(outcome) = outcome else {
        return;
    };

    match &outcome.result {
        Ok(()) => summary.record_deleted(outcome.pipeline.id),
        Err(e) => {
            warn!("{}", e);
            summary.record_failed(outcome.pipeline.id, e.to_string());
        }
    }

    on_outcome(&outcome);
}
