use std::path::PathBuf;
use std::time::Instant;

use derive_builder::Builder;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::configuration::{default_config_path, RunConfig};
use crate::discovery::{discover_suites, SuiteFilter};
use crate::errors::Result;
use crate::output;
use crate::report::{RunReport, RunSummary, SuiteError};
use crate::suite::run_suite_file;
use crate::traits::Transport;
use crate::transport::ReqwestTransport;


/// Options of the `run` command.
#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct RunOptions {
    /// Directory searched recursively for suite files.
    pub test_dir: PathBuf,
    /// Run config file; `<test_dir>/apirunner.conf` when unset.
    #[builder(default, setter(into, strip_option))]
    pub config_path: Option<PathBuf>,
    /// Regex a suite's file name must match.
    #[builder(default = "String::from(\".*\")")]
    pub match_pattern: String,
    /// Number of suites executed concurrently.
    #[builder(default = "1")]
    pub jobs: usize,
    /// Print error details under every failed test as it runs.
    #[builder(default)]
    pub details: bool,
    /// Where to write the JSON run report.
    #[builder(default, setter(into, strip_option))]
    pub report: Option<PathBuf>,
}

impl RunOptions {
    pub fn config_file(&self) -> PathBuf {
        self.config_path
            .clone()
            .unwrap_or_else(|| default_config_path(&self.test_dir))
    }
}

/// Loads the run config and runs every suite over HTTP.
///
/// Returns `Ok(true)` when no test failed.
pub async fn run_command(options: &RunOptions) -> Result<bool> {
    let config = RunConfig::load(&options.config_file())?;
    let transport = ReqwestTransport::new(config.timeout())?;
    run_with_transport(options, &config, &transport).await
}

/// Discovers and runs every suite through `transport`.
///
/// Suites run up to `options.jobs` at a time; their results are printed in
/// discovery order. Suites that fail to load are reported and left out of the
/// counts.
pub async fn run_with_transport<T: Transport>(
    options: &RunOptions,
    config: &RunConfig,
    transport: &T,
) -> Result<bool> {
    let filter = SuiteFilter::new(&options.match_pattern)?.excluding(options.config_file());
    let files = discover_suites(&options.test_dir, &filter)?;
    for file in &files {
        println!("Found '{}'", file.display());
    }
    info!(
        "Running {} suites with {} via {}",
        files.len(),
        pluralize_jobs(options.jobs),
        transport.name()
    );

    let start = Instant::now();
    let mut results = Vec::new();
    let mut errors = Vec::new();
    let mut outcomes = stream::iter(files)
        .map(move |path| async move {
            let outcome = run_suite_file(&path, config, transport).await;
            (path, outcome)
        })
        .buffered(options.jobs.max(1));

    while let Some((path, outcome)) = outcomes.next().await {
        let test_filename = path.display().to_string();
        match outcome {
            Ok(result) => {
                output::print_suite(&result, options.details);
                results.push(result);
            }
            Err(err) => {
                warn!("suite '{}' not run ({}): {}", test_filename, err.category(), err);
                output::print_load_error(&test_filename, &err);
                errors.push(SuiteError {
                    test_filename,
                    error: err.to_string(),
                });
            }
        }
    }

    let summary = RunSummary::from_results(&results, start.elapsed());
    output::print_summary(&results, &summary);
    debug!("{:?}", summary);

    if let Some(path) = &options.report {
        RunReport::new(summary, results, errors).write_to(path)?;
    }

    Ok(summary.all_passed())
}

fn pluralize_jobs(jobs: usize) -> String {
    match jobs.max(1) {
        1 => "1 job".to_string(),
        n => format!("{} jobs", n),
    }
}
