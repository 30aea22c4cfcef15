//! Recording fake transport for unit tests

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};

use crate::error::TransportError;
use crate::transport::{JsonPage, NextPage, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub url: String,
    pub token: String,
}

/// Scripted GET pages and per-URL DELETE failures, recording every call
///
/// Once the scripted pages run out, GETs answer with an empty array.
#[derive(Default)]
pub struct FakeTransport {
    pages: Mutex<VecDeque<Result<JsonPage, u16>>>,
    failing_deletes: HashSet<String>,
    panicking_deletes: HashSet<String>,
    delete_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, body: JsonValue) -> Self {
        self.with_hinted_page(body, NextPage::Unknown)
    }

    pub fn with_hinted_page(self, body: JsonValue, next_page: NextPage) -> Self {
        self.pages
            .lock()
            .unwrap()
            .push_back(Ok(JsonPage::new(body).with_next_page(next_page)));
        self
    }

    pub fn with_failing_page(self, status: u16) -> Self {
        self.pages.lock().unwrap().push_back(Err(status));
        self
    }

    pub fn with_failing_delete(mut self, url: impl Into<String>) -> Self {
        self.failing_deletes.insert(url.into());
        self
    }

    pub fn with_panicking_delete(mut self, url: impl Into<String>) -> Self {
        self.panicking_deletes.insert(url.into());
        self
    }

    pub fn with_delete_delay(mut self, delay: Duration) -> Self {
        self.delete_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self, method: Method) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .map(|call| call.url)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, method: Method, url: &str, token: &str) {
        self.calls.lock().unwrap().push(Call {
            method,
            url: url.to_string(),
            token: token.to_string(),
        });
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str, token: &str) -> Result<JsonPage, TransportError> {
        self.record(Method::Get, url, token);

        let next = self.pages.lock().unwrap().pop_front();
        match next {
            Some(Ok(page)) => Ok(page),
            Some(Err(status)) => Err(TransportError::status(url, status, "scripted failure")),
            None => Ok(JsonPage::new(json!([]))),
        }
    }

    async fn delete(&self, url: &str, token: &str) -> Result<(), TransportError> {
        self.record(Method::Delete, url, token);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delete_delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking_deletes.contains(url) {
            panic!("transport blew up on {url}");
        }

        if self.failing_deletes.contains(url) {
            return Err(TransportError::status(url, 403, "403 Forbidden"));
        }

        Ok(())
    }
}

/// A JSON pipeline object as GitLab returns it
pub fn pipeline_json(id: u64, updated_at: &str) -> JsonValue {
    json!({
        "id": id,
        "status": "success",
        "ref": "main",
        "updated_at": updated_at,
    })
}

/// A JSON page of `count` pipelines with ids starting at `first_id`
pub fn pipeline_page(first_id: u64, count: u64) -> JsonValue {
    JsonValue::Array(
        (first_id..first_id + count)
            .map(|id| pipeline_json(id, "2020-10-01T15:12:52.710Z"))
            .collect(),
    )
}
