//! HTTP request/response values and the reqwest-backed transport.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use derive_builder::Builder;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tracing::debug;

use crate::errors::{Result, RunnerError};
use crate::traits::Transport;

/// A fully resolved request, ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct HttpRequest {
    /// HTTP method token, e.g. `GET` or `PATCH`.
    #[builder(default = "String::from(\"GET\")")]
    pub method: String,
    /// Absolute URL.
    pub url: String,
    /// Headers in the order they are applied. Names may repeat.
    #[builder(default)]
    pub headers: Vec<(String, String)>,
    #[builder(default)]
    pub body: String,
}

impl HttpRequestBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if let Some(method) = &self.method {
            Method::from_bytes(method.as_bytes())
                .map_err(|_| format!("invalid method {:?}", method))?;
        }
        if let Some(url) = &self.url {
            reqwest::Url::parse(url).map_err(|e| format!("invalid url {:?}: {}", url, e))?;
        }
        for (name, value) in self.headers.iter().flatten() {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| format!("invalid header name {:?}", name))?;
            HeaderValue::from_str(value)
                .map_err(|_| format!("invalid value for header {:?}", name))?;
        }
        Ok(())
    }
}

impl HttpRequest {
    pub fn http_method(&self) -> Result<Method> {
        Method::from_bytes(self.method.as_bytes())
            .map_err(|_| RunnerError::InvalidRequest(format!("invalid method {:?}", self.method)))
    }

    /// Returns the last value set for `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response with its body fully read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header lines as received. Names may repeat.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Headers keyed by canonical name with repeated values joined by `,` and trimmed.
    pub fn joined_headers(&self) -> BTreeMap<String, String> {
        let mut grouped: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for (name, value) in &self.headers {
            grouped
                .entry(canonical_header_name(name))
                .or_default()
                .push(value.as_str());
        }
        grouped
            .into_iter()
            .map(|(name, values)| (name, values.join(",").trim().to_string()))
            .collect()
    }

    /// Joined value of header `name`, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<String> {
        self.joined_headers().remove(&canonical_header_name(name))
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Canonical MIME header form: first letter and every letter after `-` upper case,
/// the rest lower case (`x-request-id` becomes `X-Request-Id`).
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a client; `timeout` bounds every request end to end.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RunnerError::Config(format!("unable to build http client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send {
        let client = self.client.clone();

        async move {
            let method = request.http_method()?;
            debug!("{} {}", method, request.url);

            let mut builder = client.request(method, &request.url);
            if request.header(CONTENT_TYPE.as_str()).is_none() {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder.body(request.body).send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        canonical_header_name(name.as_str()),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response
                .bytes()
                .await
                .map_err(|e| RunnerError::ResponseRead(e.to_string()))?
                .to_vec();

            debug!("received http {} with {} byte body", status, body.len());
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
