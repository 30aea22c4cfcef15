//! Deletion summary types

use serde::{Deserialize, Serialize};

use super::pipeline::PipelineId;

/// A pipeline whose deletion request failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDeletion {
    pub id: PipelineId,
    pub reason: String,
}

/// Per-record results of one deletion pass
///
/// Ids land in exactly one bucket. `deleted` and `failed` are in completion
/// order, which under concurrency is not the order the pipelines were listed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionSummary {
    pub deleted: Vec<PipelineId>,
    pub failed: Vec<FailedDeletion>,
    /// Never attempted because the run was interrupted
    pub skipped: Vec<PipelineId>,
}

impl DeletionSummary {
    pub fn record_deleted(&mut self, id: PipelineId) {
        self.deleted.push(id);
    }

    pub fn record_failed(&mut self, id: PipelineId, reason: impl Into<String>) {
        self.failed.push(FailedDeletion {
            id,
            reason: reason.into(),
        });
    }

    pub fn record_skipped(&mut self, id: PipelineId) {
        self.skipped.push(id);
    }

    /// Number of pipelines accounted for
    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed.len() + self.skipped.len()
    }

    /// True when every selected pipeline was deleted
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<PipelineId> {
        self.failed.iter().map(|failure| failure.id).collect()
    }
}
