//! Sweeper GitLab Client
//!
//! Lists and deletes the CI pipelines of one GitLab project.
//!
//! HTTP goes through the [`Transport`] trait; [`HttpTransport`] is the
//! reqwest implementation used in production. [`GitLabClient`] bundles a
//! transport with a [`ProjectEndpoint`] and hands out the two workers:
//! - [`PipelineLister`]: fetches every pipeline, following pagination
//! - [`PipelineDeleter`]: deletes pipelines one request at a time, or many
//!   concurrently with a cap
//!
//! # Example
//!
//! ```no_run
//! use sweeper_client::{GitLabClient, ProjectEndpoint, ProjectRef};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let endpoint = ProjectEndpoint::new("https://gitlab.com", ProjectRef::Id(42), "glpat-...");
//!     let client = GitLabClient::new(endpoint);
//!
//!     let pipelines = client.lister().fetch_all().await?;
//!     println!("Project has {} pipeline(s)", pipelines.len());
//!     Ok(())
//! }
//! ```

pub mod deleter;
pub mod endpoint;
pub mod error;
pub mod lister;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use deleter::{DeleteOutcome, PipelineDeleter};
pub use endpoint::{ProjectEndpoint, ProjectRef};
pub use error::{ClientError, Result, TransportError};
pub use lister::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PipelineLister};
pub use transport::{HttpTransport, JsonPage, NextPage, Transport};

use std::sync::Arc;

use reqwest::Client;

/// GitLab pipelines client for one project
#[derive(Clone)]
pub struct GitLabClient {
    transport: Arc<dyn Transport>,
    endpoint: ProjectEndpoint,
    page_size: u32,
}

impl GitLabClient {
    /// Create a new client backed by a default reqwest client
    ///
    /// # Example
    /// ```
    /// use sweeper_client::{GitLabClient, ProjectEndpoint, ProjectRef};
    ///
    /// let endpoint = ProjectEndpoint::new("https://gitlab.com/", ProjectRef::Id(42), "token");
    /// let client = GitLabClient::new(endpoint);
    /// assert_eq!(client.endpoint().base_url(), "https://gitlab.com");
    /// ```
    pub fn new(endpoint: ProjectEndpoint) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()), endpoint)
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(endpoint: ProjectEndpoint, client: Client) -> Self {
        Self::with_transport(Arc::new(HttpTransport::with_client(client)), endpoint)
    }

    /// Create a new client over any transport
    pub fn with_transport(transport: Arc<dyn Transport>, endpoint: ProjectEndpoint) -> Self {
        Self {
            transport,
            endpoint,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size used when listing
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn endpoint(&self) -> &ProjectEndpoint {
        &self.endpoint
    }

    pub fn lister(&self) -> PipelineLister {
        PipelineLister::new(Arc::clone(&self.transport), self.endpoint.clone())
            .with_page_size(self.page_size)
    }

    pub fn deleter(&self) -> PipelineDeleter {
        PipelineDeleter::new(Arc::clone(&self.transport), self.endpoint.clone())
    }
}
