//! Integration test modules for apirunner
//!
//! These tests drive whole suites through the public API using an in-memory
//! transport, so no network access is needed.

pub mod suite_execution;

use apirunner::errors::{Result, RunnerError};
use apirunner::traits::Transport;
use apirunner::transport::{HttpRequest, HttpResponse};
use apirunner::TestSuiteSpec;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;

/// Mock transport replying with scripted responses keyed by `METHOD url`
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
    pub should_fail: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self, should_fail: bool) -> Self {
        self.should_fail = should_fail;
        self
    }

    /// Queues a response for `method url`; repeated calls queue in order.
    pub fn on(self, method: &str, url: &str, response: HttpResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(format!("{} {}", method, url))
            .or_default()
            .push_back(response);
        self
    }

    pub fn on_json(self, method: &str, url: &str, status: u16, body: Value) -> Self {
        let response = HttpResponse::new(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string());
        self.on(method, url, response)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send {
        let key = format!("{} {}", request.method, request.url);
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());
        self.requests.lock().unwrap().push(request);
        let should_fail = self.should_fail;

        async move {
            if should_fail {
                return Err(RunnerError::Transport("dial tcp: connection refused".to_string()));
            }
            next.ok_or_else(|| RunnerError::Transport(format!("no mock response for {}", key)))
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Parses a suite document written inline in a test.
pub fn suite(json: Value) -> TestSuiteSpec {
    serde_json::from_value(json).expect("valid suite document")
}
