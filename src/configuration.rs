//! Run configuration: base URL, custom headers and transport timeout.
//!
//! The JSON run config file is read as written, so header names keep their case.
//! `APIRUNNER_*` environment variables (`APIRUNNER_BASE_URL`,
//! `APIRUNNER_TIMEOUT_SECS`, `APIRUNNER_API_KEY`) are collected with the `config`
//! crate and override the matching file values.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{Result, RunnerError};

/// File name of the run config looked up in the test directory by default.
pub const DEFAULT_CONFIG_FILE: &str = "apirunner.conf";

/// Prefix of environment variables overriding the config file.
pub const ENV_PREFIX: &str = "APIRUNNER";

/// Settings shared by every suite of a run.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RunConfig {
    /// Base URL prepended to every request URL unless a suite or test overrides it.
    #[serde(default, alias = "baseUrl")]
    pub base_url: String,

    /// Headers added to every request before the test's own headers.
    #[serde(default, alias = "customHeaders")]
    pub headers: BTreeMap<String, String>,

    /// Per-request timeout; no timeout when unset.
    #[serde(default, alias = "timeoutSecs")]
    pub timeout_secs: Option<u64>,

    /// Sent as `Authorization: ApiKey <key>` when set.
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,
}

/// Values taken from the environment. Keys arrive lower-cased and without the prefix.
#[derive(Deserialize, Debug, Default)]
struct EnvOverrides {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    api_key: Option<String>,
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .try_parsing(true)
}

impl RunConfig {
    /// Loads the run config from `path`, then applies environment overrides.
    ///
    /// A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: &Path, env: Environment) -> Result<Self> {
        info!("Loading run config from {}", path.display());
        let contents = fs::read_to_string(path)
            .map_err(|e| RunnerError::Config(format!("{}: {}", path.display(), e)))?;

        let mut config: RunConfig = serde_json::from_str(&contents)
            .map_err(|e| RunnerError::Config(format!("{}: {}", path.display(), e)))?;
        config.apply(env)?;
        config.validate()?;
        debug!(
            "Run config: base_url={:?}, {} custom headers",
            config.base_url,
            config.headers.len()
        );
        Ok(config)
    }

    /// Parses a run config document without environment overrides.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunConfig =
            serde_json::from_str(json).map_err(|e| RunnerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides file values with whatever `env` provides.
    fn apply(&mut self, env: Environment) -> Result<()> {
        let overrides: EnvOverrides = Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?;

        if let Some(base_url) = overrides.base_url {
            debug!("base_url overridden from environment");
            self.base_url = base_url;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.timeout_secs = Some(timeout_secs);
        }
        if let Some(api_key) = overrides.api_key {
            self.api_key = Some(api_key);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_url.is_empty() && !self.base_url.contains("://") {
            return Err(RunnerError::Config(format!(
                "baseUrl '{}' must be an absolute url",
                self.base_url
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(RunnerError::Config(
                "timeoutSecs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Headers sent with every request, in a stable order.
    pub fn custom_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        if let Some(key) = self.api_key.as_deref().filter(|key| !key.is_empty()) {
            headers.push(("Authorization".to_string(), format!("ApiKey {}", key)));
        }
        headers
    }
}

pub fn default_config_path(test_dir: &Path) -> PathBuf {
    test_dir.join(DEFAULT_CONFIG_FILE)
}
