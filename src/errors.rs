//! Error types for apirunner.
//!
//! Suite-fatal problems (unreadable files, malformed JSON, bad test names) and
//! per-test problems (unresolved templates, transport failures) share one enum so
//! that every layer can propagate with `?`. Per-test errors are eventually turned
//! into strings on a failed [`TestResult`](crate::model::TestResult).

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for apirunner operations.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Run configuration could not be loaded or is invalid
    #[error("invalid run config: {0}")]
    Config(String),

    /// A suite file could not be opened or read
    #[error("error reading test file {path}: {source}")]
    SuiteRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A suite file is not a valid suite document
    #[error("error parsing test data in {path}: {source}")]
    SuiteParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A test name is empty or not alphanumeric
    #[error("invalid test case name: '{0}', must be alphanumeric without spaces")]
    InvalidTestName(String),

    /// Two tests in one suite share a name
    #[error("test case '{0}' defined twice")]
    DuplicateTestName(String),

    /// A `{{ var }}` placeholder references a value that was never extracted
    #[error("missing template value for var: '{0}'")]
    MissingTemplateValue(String),

    /// The outgoing request could not be assembled
    #[error("Unable to create request: {0}")]
    InvalidRequest(String),

    /// The transport failed to deliver the request
    #[error("Error making request: {0}")]
    Transport(String),

    /// The response body could not be read
    #[error("Error reading response from server: {0}")]
    ResponseRead(String),

    /// Expected and actual payloads could not be compared
    #[error("Error comparing actual and expected responses: {0}")]
    Comparison(String),

    /// Test directory traversal failed
    #[error("error reading dir {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    /// File I/O operation failures
    #[error("I/O operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failures outside of suite loading
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A type alias for Results that use RunnerError.
pub type Result<T> = std::result::Result<T, RunnerError>;

impl RunnerError {
    /// Creates a new SuiteRead error for the given file.
    pub fn suite_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RunnerError::SuiteRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new SuiteParse error for the given file.
    pub fn suite_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        RunnerError::SuiteParse {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error aborts a whole suite rather than a single test.
    pub fn is_suite_fatal(&self) -> bool {
        matches!(
            self,
            RunnerError::SuiteRead { .. }
                | RunnerError::SuiteParse { .. }
                | RunnerError::InvalidTestName(_)
                | RunnerError::DuplicateTestName(_)
        )
    }

    /// Returns the error category as a string for logging.
    pub fn category(&self) -> &'static str {
        match self {
            RunnerError::Config(_) => "config",
            RunnerError::SuiteRead { .. } => "suite_read",
            RunnerError::SuiteParse { .. } => "suite_parse",
            RunnerError::InvalidTestName(_) | RunnerError::DuplicateTestName(_) => "validation",
            RunnerError::MissingTemplateValue(_) => "template",
            RunnerError::InvalidRequest(_) => "request",
            RunnerError::Transport(_) => "transport",
            RunnerError::ResponseRead(_) => "response",
            RunnerError::Comparison(_) => "comparison",
            RunnerError::Discovery { .. } => "discovery",
            RunnerError::Io(_) => "io",
            RunnerError::Json(_) => "json",
        }
    }
}

impl From<config::ConfigError> for RunnerError {
    fn from(err: config::ConfigError) -> Self {
        RunnerError::Config(err.to_string())
    }
}

impl From<regex::Error> for RunnerError {
    fn from(err: regex::Error) -> Self {
        RunnerError::Config(format!("invalid test file match regex: {}", err))
    }
}

impl From<walkdir::Error> for RunnerError {
    fn from(err: walkdir::Error) -> Self {
        RunnerError::Discovery {
            path: err.path().map(PathBuf::from).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for RunnerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            RunnerError::InvalidRequest(err.to_string())
        } else if err.is_body() || err.is_decode() {
            RunnerError::ResponseRead(err.to_string())
        } else {
            RunnerError::Transport(err.to_string())
        }
    }
}
