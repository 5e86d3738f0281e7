//! apirunner - declarative HTTP API test runner
//!
//! Test cases are JSON documents describing a request and the response it should
//! produce. Suites run their tests in order; every response is flattened into a
//! store of extracted fields so later tests can reference earlier values with
//! `{{ testName.path }}` placeholders.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use apirunner::{run_suite_file, ReqwestTransport, RunConfig};
//!
//! # async fn example() -> apirunner::Result<()> {
//! let config = RunConfig::load(Path::new("tests/api/apirunner.conf"))?;
//! let transport = ReqwestTransport::new(config.timeout())?;
//!
//! let result = run_suite_file(Path::new("tests/api/users.json"), &config, &transport).await?;
//! println!("{} passed, {} failed", result.passed.len(), result.failed.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`template`]: `{{ var }}` resolution against [`ExtractedFields`]
//! - [`flatten`]: JSON to path/value pairs
//! - [`diff`]: structural comparison with ignored fields
//! - [`executor`]: one test case through a [`Transport`]
//! - [`suite`]: loading, validating and running a suite file
//! - [`commands`]: discovery, reporting and the whole run

pub mod commands;
pub mod configuration;
pub mod diff;
pub mod discovery;
pub mod errors;
pub mod executor;
pub mod fields;
pub mod flatten;
pub mod model;
pub mod output;
pub mod report;
pub mod suite;
pub mod template;
pub mod traits;
pub mod transport;

pub use commands::{run_command, run_with_transport, RunOptions, RunOptionsBuilder};
pub use configuration::RunConfig;
pub use diff::Differ;
pub use errors::{Result, RunnerError};
pub use executor::TestCaseExecutor;
pub use fields::ExtractedFields;
pub use model::{
    ExpectedResponse, Request, TestResult, TestStatus, TestSpec, TestSuiteResult, TestSuiteSpec,
};
pub use suite::{execute_suite, load_suite, run_suite_file, validate_suite};
pub use traits::Transport;
pub use transport::{HttpRequest, HttpRequestBuilder, HttpResponse, ReqwestTransport};
