//! Console output for test runs.
//!
//! Line builders return strings so they can be tested; the `print_*` helpers
//! write them to stdout.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use apirunner::model::TestResult;
//! use apirunner::output::test_line;
//!
//! let result = TestResult::passed("getUser", Duration::from_millis(12));
//! print!("{}", test_line(&result, true));
//! ```

use std::time::Duration;

use colored::Colorize;
use tabular::{Row, Table};

use crate::model::{TestResult, TestStatus, TestSuiteResult};
use crate::report::RunSummary;

/// Header printed before the results of a suite.
pub fn suite_header(test_filename: &str) -> String {
    format!("\n* '{}':", test_filename)
}

/// One result line, followed by indented error lines when `details` is set.
pub fn test_line(result: &TestResult, details: bool) -> String {
    let duration = format_duration(result.duration);
    let status = match result.status {
        TestStatus::Passed => format!("PASSED ({})", duration).green().bold(),
        TestStatus::Failed => format!("FAILED ({})", duration).red().bold(),
        TestStatus::Skipped => "SKIPPED".yellow().bold(),
    };

    let mut out = format!("\t{} {}\n", result.name, status);
    if details {
        for err in &result.errors {
            out.push_str(&format!("\t\t{}\n", err.red()));
        }
    }
    out
}

/// All results of a suite, in declaration order.
pub fn suite_lines(result: &TestSuiteResult, details: bool) -> String {
    let mut out = suite_header(&result.test_filename);
    out.push('\n');
    for test in &result.ordered {
        out.push_str(&test_line(test, details));
    }
    out
}

/// Failed tests of a suite with their errors; empty when nothing failed.
pub fn failures_block(result: &TestSuiteResult) -> String {
    if result.failed.is_empty() {
        return String::new();
    }
    let mut out = format!("* Failures for '{}':\n", result.test_filename);
    for failed in &result.failed {
        out.push_str(&test_line(failed, true));
    }
    out
}

pub fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new("{:<} {:>}");
    table.add_row(Row::new().with_cell("Total:").with_cell(summary.total));
    table.add_row(
        Row::new()
            .with_cell("Passed:")
            .with_cell(summary.passed.to_string().green()),
    );
    table.add_row(
        Row::new()
            .with_cell("Failed:")
            .with_cell(colored_count(summary.failed, |s| s.red())),
    );
    table.add_row(
        Row::new()
            .with_cell("Skipped:")
            .with_cell(colored_count(summary.skipped, |s| s.yellow())),
    );
    table.add_row(
        Row::new()
            .with_cell("Duration:")
            .with_cell(format_duration(summary.duration)),
    );
    table
}

fn colored_count(n: usize, paint: fn(&str) -> colored::ColoredString) -> String {
    if n == 0 {
        n.to_string()
    } else {
        paint(&n.to_string()).to_string()
    }
}

pub fn format_duration(duration: Duration) -> String {
    format!("{:.2?}", duration)
}

pub fn print_suite(result: &TestSuiteResult, details: bool) {
    print!("{}", suite_lines(result, details));
}

pub fn print_load_error(test_filename: &str, err: &dyn std::fmt::Display) {
    println!(
        "{}",
        format!("Error running tests for '{}': {}", test_filename, err).red()
    );
}

pub fn print_summary(results: &[TestSuiteResult], summary: &RunSummary) {
    println!();
    for result in results {
        print!("{}", failures_block(result));
    }
    println!();
    print!("{}", summary_table(summary));
}
