//! Outcome comparison.
//!
//! Three channels are checked independently (exit code, stdout, stderr) and
//! all must match for a test to pass. Failure messages are kept in that order.

use crate::diff::line_diff;
use crate::executor::{ExecutionResult, RunStatus};
use crate::fixture::FixtureSet;
use serde::Deserialize;
use std::fmt::Write as _;

/// How captured output is checked against the expected fixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Byte-for-byte string equality
    #[default]
    Exact,
    /// Line diff must report no changes; line endings are normalized
    Diff,
}

/// Outcome of comparing one execution against its fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub failures: Vec<String>,
}

impl Verdict {
    pub fn from_failures(failures: Vec<String>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }
}

pub fn compare(result: &ExecutionResult, fixtures: &FixtureSet, mode: CompareMode) -> Verdict {
    let mut failures = Vec::new();

    if let Err(e) = check_exit_code(&result.status, fixtures.expected_exit_code()) {
        failures.push(e);
    }
    if let Err(e) = check_output("stdout", &result.stdout, fixtures.expected_stdout(), mode) {
        failures.push(e);
    }
    if let Err(e) = check_output("stderr", &result.stderr, fixtures.expected_stderr(), mode) {
        failures.push(e);
    }

    Verdict::from_failures(failures)
}

fn check_exit_code(status: &RunStatus, expected: i32) -> Result<(), String> {
    match status {
        RunStatus::Exited(actual) if *actual == expected => Ok(()),
        RunStatus::Exited(actual) => Err(format!(
            "Exit code: expected {expected}, got {actual}"
        )),
        // An error whose own code equals the expected one still counts.
        RunStatus::Failed(err) if err.code() == Some(expected) => Ok(()),
        RunStatus::Failed(err) => Err(format!("Exit code: expected {expected}, but {err}")),
    }
}

fn check_output(
    name: &str,
    actual: &str,
    expected: &str,
    mode: CompareMode,
) -> Result<(), String> {
    match mode {
        CompareMode::Exact => {
            if actual == expected {
                Ok(())
            } else {
                Err(format!(
                    "{name}: expected exact match\n  expected: {expected:?}\n  got: {actual:?}"
                ))
            }
        }
        CompareMode::Diff => {
            let diff = line_diff(expected, actual);
            if diff.is_empty() {
                return Ok(());
            }
            let mut message = format!(
                "{name}: output differs\n  expected: {expected:?}\n  got: {actual:?}\n  diff:"
            );
            for line in diff.render().lines() {
                let _ = write!(message, "\n    {line}");
            }
            Err(message)
        }
    }
}
