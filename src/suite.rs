//! Loading, validating and running one suite file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::configuration::RunConfig;
use crate::diff::Differ;
use crate::errors::{Result, RunnerError};
use crate::executor::TestCaseExecutor;
use crate::fields::ExtractedFields;
use crate::model::{TestResult, TestSuiteResult, TestSuiteSpec};
use crate::traits::Transport;

/// Reads and parses a suite file. Test names are not validated here.
pub fn load_suite(path: &Path) -> Result<TestSuiteSpec> {
    let contents = fs::read_to_string(path).map_err(|e| RunnerError::suite_read(path, e))?;
    serde_json::from_str(&contents).map_err(|e| RunnerError::suite_parse(path, e))
}

/// Checks that every test name is non-empty, alphanumeric and unique.
pub fn validate_suite(spec: &TestSuiteSpec) -> Result<()> {
    let mut seen = HashSet::new();
    for test in &spec.tests {
        if !is_valid_test_name(&test.name) {
            return Err(RunnerError::InvalidTestName(test.name.clone()));
        }
        if !seen.insert(test.name.as_str()) {
            return Err(RunnerError::DuplicateTestName(test.name.clone()));
        }
    }
    Ok(())
}

pub fn is_valid_test_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Runs every test of a validated suite in declaration order.
///
/// The tests share one [`ExtractedFields`] store, so a test can only reference
/// values of tests declared before it.
pub async fn execute_suite<T: Transport>(
    spec: &TestSuiteSpec,
    test_filename: &str,
    config: &RunConfig,
    transport: &T,
) -> TestSuiteResult {
    let base_url = if spec.base_url.is_empty() {
        config.base_url.as_str()
    } else {
        spec.base_url.as_str()
    };
    let custom_headers = config.custom_headers();
    let differ = Differ::new(spec.ignored_fields.iter().cloned());
    let executor = TestCaseExecutor::new(transport, base_url, &custom_headers, &differ);

    let mut fields = ExtractedFields::new();
    let mut result = TestSuiteResult::new(test_filename);
    for test in &spec.tests {
        let outcome = if spec.skip || test.skip {
            debug!("skipping test '{}'", test.name);
            TestResult::skipped(&test.name)
        } else {
            executor.execute(test, &mut fields).await
        };
        result.record(outcome);
    }

    info!(
        "'{}': {} passed, {} failed, {} skipped",
        test_filename,
        result.passed.len(),
        result.failed.len(),
        result.skipped.len()
    );
    result
}

/// Loads, validates and runs the suite at `path`.
///
/// Load and validation errors abort the suite before any request is sent.
pub async fn run_suite_file<T: Transport>(
    path: &Path,
    config: &RunConfig,
    transport: &T,
) -> Result<TestSuiteResult> {
    let spec = load_suite(path)?;
    validate_suite(&spec)?;
    info!("running {} tests from '{}'", spec.tests.len(), path.display());
    Ok(execute_suite(&spec, &path.to_string_lossy(), config, transport).await)
}
