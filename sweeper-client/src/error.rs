//! Error types for the Sweeper client

use sweeper_core::domain::pipeline::PipelineId;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures reported by a [`Transport`](crate::transport::Transport)
///
/// Every variant carries the URL of the request that failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (connection, TLS, timeout)
    #[error("HTTP request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status code
    #[error("API error from {url} (status {status}): {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    /// The response body could not be decoded
    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl TransportError {
    /// Create a status error from URL, status code and response text
    pub fn status(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// HTTP status code, when the API answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors that can occur when listing or deleting pipelines
#[derive(Debug, Error)]
pub enum ClientError {
    /// A page of the pipeline listing failed, so the listing is unusable
    #[error("Pipeline listing incomplete, page {page} failed: {source}")]
    IncompleteListing {
        page: u32,
        #[source]
        source: TransportError,
    },

    /// Deleting a single pipeline failed
    #[error("Failed to delete pipeline {pipeline_id}: {source}")]
    Delete {
        pipeline_id: PipelineId,
        #[source]
        source: TransportError,
    },

    /// The task deleting a pipeline panicked before it produced a result
    #[error("Deletion task for pipeline {pipeline_id} panicked: {message}")]
    TaskPanicked {
        pipeline_id: PipelineId,
        message: String,
    },

    /// The project identifier cannot address a project
    #[error("Invalid project identifier: {0}")]
    InvalidProject(String),
}

impl ClientError {
    /// The pipeline this error belongs to, for per-record failures
    pub fn pipeline_id(&self) -> Option<PipelineId> {
        match self {
            Self::Delete { pipeline_id, .. } | Self::TaskPanicked { pipeline_id, .. } => {
                Some(*pipeline_id)
            }
            _ => None,
        }
    }

    fn status_code(&self) -> Option<u16> {
        match self {
            Self::IncompleteListing { source, .. } | Self::Delete { source, .. } => {
                source.status_code()
            }
            Self::TaskPanicked { .. } | Self::InvalidProject(_) => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), Some(status) if status >= 500)
    }
}
