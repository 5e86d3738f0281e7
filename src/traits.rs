use std::future::Future;

use crate::errors::Result;
use crate::transport::{HttpRequest, HttpResponse};

/// Capability to deliver one HTTP request and return the complete response.
///
/// The executor never talks to the network directly; it hands every request to a
/// `Transport`. The production implementation is
/// [`ReqwestTransport`](crate::transport::ReqwestTransport), tests plug in
/// in-memory doubles that return canned responses.
///
/// # Examples
///
/// ```rust,no_run
/// use apirunner::traits::Transport;
/// use apirunner::transport::{HttpRequestBuilder, ReqwestTransport};
///
/// # async fn example() -> apirunner::Result<()> {
/// let transport = ReqwestTransport::new(None)?;
/// let request = HttpRequestBuilder::default()
///     .method("GET")
///     .url("http://localhost:8080/users/1")
///     .build()
///     .map_err(|e| apirunner::RunnerError::InvalidRequest(e.to_string()))?;
///
/// let response = transport.send(request).await?;
/// println!("status: {}", response.status);
/// # Ok(())
/// # }
/// ```
///
/// # Error Conditions
///
/// Implementations should return:
/// - [`RunnerError::Transport`](crate::RunnerError::Transport) when the request
///   could not be delivered (connection refused, DNS failure, timeout)
/// - [`RunnerError::ResponseRead`](crate::RunnerError::ResponseRead) when the
///   status line arrived but the body could not be read
///
/// A non-2xx status is a normal response, not an error.
pub trait Transport {
    /// Sends `request` and reads the whole response body.
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;

    /// Short name used in log output.
    fn name(&self) -> &str {
        "transport"
    }
}
