//! Configuration module
//!
//! Holds everything one sweep needs: where the project lives, how to
//! authenticate, which pipelines count as old, and how hard to hit the API.

use std::fmt;
use std::time::Duration;

use anyhow::Result;
use sweeper_client::{MAX_PAGE_SIZE, ProjectEndpoint, ProjectRef};

use crate::sweep::SweepOptions;

/// Pipelines older than this many days are deleted by default
pub const DEFAULT_DAYS: u32 = 30;

/// Parallel DELETE requests by default
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Per-request timeout in seconds by default
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// CLI configuration
#[derive(Clone)]
pub struct Config {
    /// GitLab server URL (e.g., "https://gitlab.com")
    pub server_url: String,

    /// Numeric project id or full project path
    pub project: String,

    /// Token sent in the PRIVATE-TOKEN header
    pub access_token: String,

    /// Retention threshold in days
    pub days: u32,

    /// Maximum parallel deletions
    pub concurrency: usize,

    /// Pipelines requested per listing page
    pub page_size: u32,

    /// Per-request timeout
    pub timeout: Duration,

    /// List what would be deleted without deleting
    pub dry_run: bool,

    /// Exit non-zero when any deletion fails
    pub strict: bool,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(server_url: String, project: String, access_token: String) -> Self {
        Self {
            server_url,
            project,
            access_token,
            days: DEFAULT_DAYS,
            concurrency: DEFAULT_CONCURRENCY,
            page_size: sweeper_client::DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dry_run: false,
            strict: false,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            anyhow::bail!("server URL cannot be empty");
        }

        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!("server URL must start with http:// or https://");
        }

        if self.access_token.trim().is_empty() {
            anyhow::bail!("access token cannot be empty");
        }

        self.project_ref()?;

        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be greater than 0");
        }

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            anyhow::bail!("page size must be between 1 and {}", MAX_PAGE_SIZE);
        }

        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than 0");
        }

        Ok(())
    }

    pub fn project_ref(&self) -> Result<ProjectRef> {
        Ok(ProjectRef::parse(&self.project)?)
    }

    pub fn endpoint(&self) -> Result<ProjectEndpoint> {
        Ok(ProjectEndpoint::new(
            self.server_url.clone(),
            self.project_ref()?,
            self.access_token.clone(),
        ))
    }

    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            threshold_days: self.days,
            concurrency: self.concurrency,
            dry_run: self.dry_run,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("project", &self.project)
            .field("access_token", &"<redacted>")
            .field("days", &self.days)
            .field("concurrency", &self.concurrency)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("dry_run", &self.dry_run)
            .field("strict", &self.strict)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            "https://gitlab.my-domain.io".to_string(),
            "42".to_string(),
            "yBv8".to_string(),
        )
    }

    #[test]
    fn test_default_config() {
        let config = config();
        assert_eq!(config.days, 30);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.dry_run);
        assert!(!config.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();

        // Invalid URL should fail
        config.server_url = "gitlab.my-domain.io".to_string();
        assert!(config.validate().is_err());
        config.server_url = "https://gitlab.my-domain.io".to_string();

        // Empty token should fail
        config.access_token = " ".to_string();
        assert!(config.validate().is_err());
        config.access_token = "yBv8".to_string();

        // Empty project should fail
        config.project = String::new();
        assert!(config.validate().is_err());
        config.project = "group/app".to_string();
        assert!(config.validate().is_ok());

        config.concurrency = 0;
        assert!(config.validate().is_err());
        config.concurrency = 1;

        config.page_size = 101;
        assert!(config.validate().is_err());
        config.page_size = 0;
        assert!(config.validate().is_err());
        config.page_size = 20;

        config.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
        config.timeout = Duration::from_secs(1);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_days_is_valid() {
        let mut config = config();
        config.days = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_from_config() {
        let mut config = config();
        config.server_url = "https://gitlab.my-domain.io/".to_string();

        let endpoint = config.endpoint().unwrap();
        assert_eq!(
            endpoint.pipeline_url(24),
            "https://gitlab.my-domain.io/api/v4/projects/42/pipelines/24"
        );
        assert_eq!(endpoint.access_token(), "yBv8");
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("yBv8"));
    }

    #[test]
    fn test_sweep_options() {
        let mut config = config();
        config.days = 7;
        config.dry_run = true;

        let options = config.sweep_options();
        assert_eq!(options.threshold_days, 7);
        assert_eq!(options.concurrency, 4);
        assert!(options.dry_run);
    }
}
