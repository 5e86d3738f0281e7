//! Execution of a single test case against a [`Transport`].

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, trace};

use crate::diff::{type_name, Differ};
use crate::errors::{Result, RunnerError};
use crate::fields::ExtractedFields;
use crate::model::{TestResult, TestSpec};
use crate::template;
use crate::traits::Transport;
use crate::transport::{canonical_header_name, HttpRequest, HttpRequestBuilder, HttpResponse};

pub const ARRAY_LENGTH_MISMATCH: &str =
    "The number of array elements in response and expectedResponse don't match";

pub const UNEXPECTED_PAYLOAD: &str = "Expected empty response payload but got non-empty response";

/// Runs test cases of one suite.
///
/// Holds the settings shared by every case of the suite: the effective base URL
/// (suite override or run default), the run-level custom headers and the differ
/// configured with the suite's ignored fields.
pub struct TestCaseExecutor<'a, T> {
    transport: &'a T,
    base_url: &'a str,
    custom_headers: &'a [(String, String)],
    differ: &'a Differ,
}

impl<'a, T: Transport> TestCaseExecutor<'a, T> {
    pub fn new(
        transport: &'a T,
        base_url: &'a str,
        custom_headers: &'a [(String, String)],
        differ: &'a Differ,
    ) -> Self {
        Self {
            transport,
            base_url,
            custom_headers,
            differ,
        }
    }

    /// Executes `test`, reading placeholders from and writing extracted values to `fields`.
    ///
    /// Problems before a response arrives (unresolved placeholders, invalid requests,
    /// transport failures) fail the case with that single error. Once a response is
    /// in, every check runs and all mismatches are reported together, followed by
    /// the raw response payload.
    pub async fn execute(&self, test: &TestSpec, fields: &mut ExtractedFields) -> TestResult {
        let start = Instant::now();
        debug!("executing test '{}'", test.name);

        let response = match self.exchange(test, fields).await {
            Ok(response) => response,
            Err(err) => {
                debug!("test '{}' aborted: {}", test.name, err);
                return TestResult::failed(&test.name, vec![err.to_string()], start.elapsed());
            }
        };

        let mut errors = self.check(test, &response, fields);
        if errors.is_empty() {
            TestResult::passed(&test.name, start.elapsed())
        } else {
            errors.push(format!(
                "Full response payload from server: {}",
                response.body_text()
            ));
            TestResult::failed(&test.name, errors, start.elapsed())
        }
    }

    async fn exchange(
        &self,
        test: &TestSpec,
        fields: &mut ExtractedFields,
    ) -> Result<HttpResponse> {
        let request = self.build_request(test, fields)?;
        self.transport.send(request).await
    }

    /// Builds the outgoing request, recording the request body in `fields`.
    pub fn build_request(
        &self,
        test: &TestSpec,
        fields: &mut ExtractedFields,
    ) -> Result<HttpRequest> {
        let body = request_body(test, fields)?;

        let base_url = if test.request.base_url.is_empty() {
            self.base_url
        } else {
            test.request.base_url.as_str()
        };
        let url = join_url(base_url, &template::resolve(&test.request.url, fields)?);

        let mut headers = self.custom_headers.to_vec();
        for (name, value) in &test.request.headers {
            headers.push((name.clone(), template::resolve(value, fields)?));
        }

        let mut builder = HttpRequestBuilder::default();
        if !test.request.method.is_empty() {
            builder.method(test.request.method.as_str());
        }
        let request = builder
            .url(url)
            .headers(headers)
            .body(body)
            .build()
            .map_err(|e| RunnerError::InvalidRequest(e.to_string()))?;

        debug!("{} {}", request.method, request.url);
        Ok(request)
    }

    /// Compares a response with the expectation and returns every mismatch.
    fn check(
        &self,
        test: &TestSpec,
        response: &HttpResponse,
        fields: &mut ExtractedFields,
    ) -> Vec<String> {
        let expected = &test.expected_response;
        let mut errors = Vec::new();

        if response.status != expected.status_code {
            errors.push(format!(
                "Expected http {} but got http {}",
                expected.status_code, response.status
            ));
        }

        self.check_headers(test, response, fields, &mut errors);

        match &expected.body {
            None => {
                if !response.body.is_empty() {
                    errors.push(UNEXPECTED_PAYLOAD.to_string());
                }
            }
            Some(expected_body) => match serde_json::from_slice::<Value>(&response.body) {
                Ok(actual) => {
                    self.check_body(&test.name, &actual, expected_body, fields, &mut errors)
                }
                Err(err) => {
                    errors.push(format!("Error parsing json response from server: {}", err))
                }
            },
        }

        errors
    }

    fn check_headers(
        &self,
        test: &TestSpec,
        response: &HttpResponse,
        fields: &mut ExtractedFields,
        errors: &mut Vec<String>,
    ) {
        let actual_headers = response.joined_headers();
        for (name, value) in &actual_headers {
            fields.insert(
                format!("{}.header.{}", test.name, name),
                Value::String(value.clone()),
            );
        }

        for (name, template_value) in &test.expected_response.headers {
            let expected = match template::resolve(template_value, fields) {
                Ok(expected) => expected,
                Err(err) => {
                    errors.push(format!(
                        "Invalid expected response header template {}: {}",
                        template_value, err
                    ));
                    continue;
                }
            };
            match actual_headers.get(&canonical_header_name(name)) {
                Some(actual) if actual == &expected => {}
                Some(actual) => errors.push(format!(
                    "Expected response header '{}: {}' but got '{}: {}'",
                    name, expected, name, actual
                )),
                None => errors.push(format!(
                    "Expected response header '{}: {}' not present",
                    name, expected
                )),
            }
        }
    }

    fn check_body(
        &self,
        name: &str,
        actual: &Value,
        expected: &Value,
        fields: &mut ExtractedFields,
        errors: &mut Vec<String>,
    ) {
        // The expected body may reference values of its own response.
        fields.extend_flattened(name, actual);

        match (actual, expected) {
            (Value::Array(actual_items), Value::Array(expected_items)) => {
                if actual_items.len() != expected_items.len() {
                    errors.push(ARRAY_LENGTH_MISMATCH.to_string());
                    return;
                }
                for (index, (item, expected_item)) in
                    actual_items.iter().zip(expected_items).enumerate()
                {
                    let label = format!("{}[{}]", name, index);
                    self.compare_document(&label, item, expected_item, fields, errors);
                }
            }
            (Value::Object(_), Value::Object(_)) => {
                self.compare_document(name, actual, expected, fields, errors)
            }
            (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => {
                errors.push(format!(
                    "Response and expectedResponse have different shapes: got {} but expected {}",
                    type_name(actual),
                    type_name(expected)
                ));
            }
            _ => self.compare_document(name, actual, expected, fields, errors),
        }
    }

    fn compare_document(
        &self,
        label: &str,
        actual: &Value,
        expected: &Value,
        fields: &ExtractedFields,
        errors: &mut Vec<String>,
    ) {
        match template::resolve_value(expected, fields) {
            Ok(resolved) => {
                let diffs = self.differ.describe(actual, &resolved, label);
                trace!("{} differences for '{}'", diffs.len(), label);
                errors.extend(diffs);
            }
            Err(err) => errors.push(
                RunnerError::Comparison(format!(
                    "error resolving template vars in expected body: {}",
                    err
                ))
                .to_string(),
            ),
        }
    }
}

/// Encodes the request body, resolving placeholders in the encoded text.
///
/// An absent body is sent as `{}`. The unresolved body is flattened into
/// `fields` under `<name>.request.body` once resolution succeeded.
fn request_body(test: &TestSpec, fields: &mut ExtractedFields) -> Result<String> {
    let Some(body) = &test.request.body else {
        return Ok("{}".to_string());
    };
    let encoded = serde_json::to_string(body)?;
    let resolved = template::resolve(&encoded, fields)?;
    fields.extend_flattened(&format!("{}.request.body", test.name), body);
    Ok(resolved)
}

/// Appends `path` to `base`, collapsing a doubled `/` at the seam.
pub fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        _ => format!("{}{}", base, path),
    }
}
