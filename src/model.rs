//! Suite file documents and execution results.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The tests of one suite file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSuiteSpec {
    #[serde(default)]
    pub skip: bool,
    /// Field names excluded from body comparison at any depth.
    #[serde(default)]
    pub ignored_fields: Vec<String>,
    /// Overrides the run-level base URL for every test in the suite.
    #[serde(default)]
    pub base_url: String,
    pub tests: Vec<TestSpec>,
}

/// A single test case.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSpec {
    pub name: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub request: Request,
    #[serde(default)]
    pub expected_response: ExpectedResponse,
}

/// Request information for a single test case.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Expected test case response.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedResponse {
    #[serde(default)]
    pub status_code: u16,
    /// `None` (or JSON `null`) means the response body must be empty.
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Outcome of one test case.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result for an executed test case.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub errors: Vec<String>,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl TestResult {
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Passed,
            errors: Vec::new(),
            duration,
        }
    }

    pub fn failed(name: impl Into<String>, errors: Vec<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Failed,
            errors,
            duration,
        }
    }

    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TestStatus::Skipped,
            errors: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == TestStatus::Passed
    }

    pub fn is_skipped(&self) -> bool {
        self.status == TestStatus::Skipped
    }

    pub fn is_failed(&self) -> bool {
        self.status == TestStatus::Failed
    }
}

/// Results for an executed suite file.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TestSuiteResult {
    pub test_filename: String,
    pub total_tests: usize,
    pub passed: Vec<TestResult>,
    pub failed: Vec<TestResult>,
    pub skipped: Vec<TestResult>,
    /// Every result in declaration order, used for console output.
    #[serde(skip)]
    pub ordered: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn new(test_filename: impl Into<String>) -> Self {
        Self {
            test_filename: test_filename.into(),
            ..Default::default()
        }
    }

    /// Records a result in the bucket matching its status.
    pub fn record(&mut self, result: TestResult) {
        self.total_tests += 1;
        self.ordered.push(result.clone());
        match result.status {
            TestStatus::Passed => self.passed.push(result),
            TestStatus::Failed => self.failed.push(result),
            TestStatus::Skipped => self.skipped.push(result),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

pub(crate) mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
