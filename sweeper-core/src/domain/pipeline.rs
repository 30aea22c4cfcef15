//! Pipeline domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier GitLab assigns to a pipeline, unique within a project
pub type PipelineId = u64;

const SHORT_SHA_LEN: usize = 8;

/// Pipeline record as returned by the GitLab pipelines API
///
/// Only `id` and `updated_at` drive retention. The remaining fields are
/// carried for reporting and are absent in some API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineId,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl Pipeline {
    /// Short human-readable label, e.g. `#24 (main, success)`
    pub fn label(&self) -> String {
        match (&self.git_ref, &self.status) {
            (Some(git_ref), Some(status)) => format!("#{} ({}, {})", self.id, git_ref, status),
            (Some(git_ref), None) => format!("#{} ({})", self.id, git_ref),
            (None, Some(status)) => format!("#{} ({})", self.id, status),
            (None, None) => format!("#{}", self.id),
        }
    }

    /// Abbreviated commit sha, as GitLab shows it
    pub fn short_sha(&self) -> Option<&str> {
        self.sha
            .as_deref()
            .map(|sha| sha.get(..SHORT_SHA_LEN).unwrap_or(sha))
    }
}
