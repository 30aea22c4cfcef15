//! Project endpoint
//!
//! Builds the GitLab API URLs for one project. The base URL is normalized once
//! on construction, so `https://gitlab.example.com` and
//! `https://gitlab.example.com/` produce identical request URLs.

use std::fmt;
use std::str::FromStr;

use sweeper_core::domain::pipeline::PipelineId;

use crate::error::{ClientError, Result};

/// Path prefix of the GitLab REST API
pub const API_PREFIX: &str = "/api/v4";

/// A GitLab project, by numeric id or by `namespace/project` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Id(u64),
    Path(String),
}

impl ProjectRef {
    /// Parse a project identifier
    ///
    /// Purely numeric input is a project id; anything else is treated as a
    /// full project path.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ClientError::InvalidProject(input.to_string()));
        }

        Ok(match trimmed.parse::<u64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Path(trimmed.to_string()),
        })
    }

    /// The URL path segment addressing this project
    ///
    /// Paths are percent-encoded, so `group/project` becomes `group%2Fproject`.
    pub fn path_segment(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Path(path) => urlencoding::encode(path).into_owned(),
        }
    }
}

impl FromStr for ProjectRef {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u64> for ProjectRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Path(path) => write!(f, "{}", path),
        }
    }
}

/// Server, project and credential for all pipeline requests
#[derive(Clone)]
pub struct ProjectEndpoint {
    base_url: String,
    project: ProjectRef,
    access_token: String,
}

impl ProjectEndpoint {
    /// Create a new endpoint
    ///
    /// # Arguments
    /// * `base_url` - GitLab server URL, with or without a trailing slash
    /// * `project` - The project whose pipelines are addressed
    /// * `access_token` - Token sent with every request
    pub fn new(
        base_url: impl Into<String>,
        project: impl Into<ProjectRef>,
        access_token: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project: project.into(),
            access_token: access_token.into(),
        }
    }

    /// Get the normalized base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn project(&self) -> &ProjectRef {
        &self.project
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// `{base}/api/v4/projects/{project}/pipelines`
    pub fn pipelines_url(&self) -> String {
        format!(
            "{}{}/projects/{}/pipelines",
            self.base_url,
            API_PREFIX,
            self.project.path_segment()
        )
    }

    /// URL of one page of the pipeline listing
    ///
    /// The first page carries only `per_page`; later pages add `page`.
    pub fn list_url(&self, page_size: u32, page: u32) -> String {
        if page <= 1 {
            format!("{}?per_page={}", self.pipelines_url(), page_size)
        } else {
            format!(
                "{}?per_page={}&page={}",
                self.pipelines_url(),
                page_size,
                page
            )
        }
    }

    /// `{base}/api/v4/projects/{project}/pipelines/{id}`
    pub fn pipeline_url(&self, id: PipelineId) -> String {
        format!("{}/{}", self.pipelines_url(), id)
    }
}

impl fmt::Debug for ProjectEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectEndpoint")
            .field("base_url", &self.base_url)
            .field("project", &self.project)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
