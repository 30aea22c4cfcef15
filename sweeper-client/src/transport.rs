//! HTTP transport
//!
//! The lister and deleter never talk to reqwest directly. They go through the
//! [`Transport`] trait so tests can swap in a recording fake, and so the
//! credential is always sent the same way: in the `PRIVATE-TOKEN` header,
//! never in the URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::TransportError;

/// Header GitLab reads personal/project access tokens from
pub const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Header GitLab uses to announce the next page of an offset-paginated listing
pub const NEXT_PAGE_HEADER: &str = "x-next-page";

/// Pagination hint attached to a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NextPage {
    /// The server said nothing; infer completion from the page length
    #[default]
    Unknown,
    /// The server named the next page
    Page(u32),
    /// The server said this is the last page
    Last,
}

impl NextPage {
    /// Interpret the raw `X-Next-Page` header value
    ///
    /// GitLab sends the header empty on the last page.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => Self::Unknown,
            Some("") => Self::Last,
            Some(raw) => raw.parse().map(Self::Page).unwrap_or(Self::Unknown),
        }
    }
}

/// Decoded JSON body of a GET plus its pagination hint
#[derive(Debug, Clone)]
pub struct JsonPage {
    pub body: JsonValue,
    pub next_page: NextPage,
}

impl JsonPage {
    pub fn new(body: JsonValue) -> Self {
        Self {
            body,
            next_page: NextPage::Unknown,
        }
    }

    pub fn with_next_page(mut self, next_page: NextPage) -> Self {
        self.next_page = next_page;
        self
    }
}

/// Authenticated HTTP calls used by the lister and deleter
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue an authenticated GET and decode the JSON body
    ///
    /// Fails on network errors and on any non-success status.
    async fn get_json(&self, url: &str, token: &str) -> Result<JsonPage, TransportError>;

    /// Issue an authenticated DELETE
    ///
    /// Any 2xx status is success; an empty body (204 No Content) is expected.
    async fn delete(&self, url: &str, token: &str) -> Result<(), TransportError>;
}

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured reqwest client (proxies, TLS settings, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Build a transport whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, token: &str) -> Result<JsonPage, TransportError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let response = check_status(url, response).await?;

        let next_page = NextPage::from_header(
            response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|value| value.to_str().ok()),
        );

        let body = response
            .json::<JsonValue>()
            .await
            .map_err(|e| TransportError::decode(url, e.to_string()))?;

        Ok(JsonPage { body, next_page })
    }

    async fn delete(&self, url: &str, token: &str) -> Result<(), TransportError> {
        debug!("DELETE {}", url);
        let response = self
            .client
            .delete(url)
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        check_status(url, response).await?;
        Ok(())
    }
}

/// Turn a non-success response into a [`TransportError::Status`]
async fn check_status(url: &str, response: Response) -> Result<Response, TransportError> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(TransportError::status(url, status.as_u16(), error_text.trim()));
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_page_header() {
        assert_eq!(NextPage::from_header(None), NextPage::Unknown);
        assert_eq!(NextPage::from_header(Some("")), NextPage::Last);
        assert_eq!(NextPage::from_header(Some("  ")), NextPage::Last);
        assert_eq!(NextPage::from_header(Some("3")), NextPage::Page(3));
        assert_eq!(NextPage::from_header(Some("abc")), NextPage::Unknown);
    }

    #[test]
    fn test_transport_with_timeout() {
        assert!(HttpTransport::with_timeout(Duration::from_secs(5)).is_ok());
    }
}
