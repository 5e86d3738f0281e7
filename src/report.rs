//! Aggregate counts and the machine-readable run report.

use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::Result;
use crate::model::TestSuiteResult;

/// Totals over every suite that loaded.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    #[serde(with = "crate::model::duration_millis")]
    pub duration: Duration,
}

impl RunSummary {
    pub fn from_results(results: &[TestSuiteResult], duration: Duration) -> Self {
        results.iter().fold(
            RunSummary {
                duration,
                ..Default::default()
            },
            |mut summary, result| {
                summary.total += result.total_tests;
                summary.passed += result.passed.len();
                summary.failed += result.failed.len();
                summary.skipped += result.skipped.len();
                summary
            },
        )
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// A suite that could not be run at all.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SuiteError {
    pub test_filename: String,
    pub error: String,
}

/// Everything a run produced, written with `--report`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub summary: RunSummary,
    pub suites: Vec<TestSuiteResult>,
    pub errors: Vec<SuiteError>,
}

impl RunReport {
    pub fn new(summary: RunSummary, suites: Vec<TestSuiteResult>, errors: Vec<SuiteError>) -> Self {
        Self {
            generated_at: Utc::now(),
            summary,
            suites,
            errors,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Wrote run report to {}", path.display());
        Ok(())
    }
}
