//! Locating suite files under a test directory.

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::errors::Result;

/// Which files under the test directory are suites.
#[derive(Clone, Debug)]
pub struct SuiteFilter {
    file_name: Regex,
    exclude: Option<PathBuf>,
}

impl SuiteFilter {
    /// Matches `.json` files whose file name matches `pattern` (unanchored).
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            file_name: Regex::new(pattern)?,
            exclude: None,
        })
    }

    /// Never treat `path` as a suite, e.g. the run config file.
    pub fn excluding(mut self, path: impl Into<PathBuf>) -> Self {
        self.exclude = Some(path.into());
        self
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !name.ends_with(".json") || !self.file_name.is_match(name) {
            return false;
        }
        match &self.exclude {
            Some(excluded) => !same_file(excluded, path),
            None => true,
        }
    }
}

impl Default for SuiteFilter {
    fn default() -> Self {
        Self {
            file_name: Regex::new(".*").expect("match-all pattern is valid"),
            exclude: None,
        }
    }
}

/// Recursively collects suite files under `dir`, sorted by path.
pub fn discover_suites(dir: &Path, filter: &SuiteFilter) -> Result<Vec<PathBuf>> {
    let mut suites = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if filter.matches(entry.path()) {
            debug!("Found '{}'", entry.path().display());
            suites.push(entry.into_path());
        } else {
            trace!("skipping {}", entry.path().display());
        }
    }
    suites.sort();
    Ok(suites)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
