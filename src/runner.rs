//! Test orchestration.
//!
//! Runs every selected test case on its own thread, one child process each,
//! and folds the verdicts into a [`RunSummary`] in discovery order.

use crate::command::TestCommand;
use crate::compare::{CompareMode, compare};
use crate::error::RunError;
use crate::executor::{DEFAULT_TIMEOUT, execute};
use crate::fixture::FixtureSet;
use crate::loader::TestCase;
use crate::settings::DEFAULT_EXECUTABLE;
use std::any::Any;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Resolved options for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub executable: String,
    pub timeout: Duration,
    pub compare: CompareMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            compare: CompareMode::default(),
        }
    }
}

/// Result of running a single test.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TestResult {
    pub name: String,
    /// The command line as it would be typed, with any stdin redirect.
    pub command: String,
    pub passed: bool,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    pub failures: Vec<String>,
}

/// Aggregate of a complete run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub failed: usize,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    fn from_results(results: Vec<TestResult>) -> Self {
        Self {
            total: results.len(),
            failed: results.iter().filter(|r| !r.passed).count(),
            results,
        }
    }
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Run a single test case. Every per-test error ends up as a failing result.
pub fn run_case(case: &TestCase, config: &RunConfig) -> TestResult {
    let start = Instant::now();

    let fixtures = match FixtureSet::load(case) {
        Ok(fixtures) => fixtures,
        Err(e) => {
            return TestResult {
                name: case.name.clone(),
                command: config.executable.clone(),
                passed: false,
                duration: start.elapsed(),
                failures: vec![format!("Fixture error: {e}")],
            };
        }
    };

    let command = TestCommand::build(&config.executable, &fixtures);
    let display = command.display();
    let output = execute(command, config.timeout);
    let verdict = compare(&output, &fixtures, config.compare);
    debug!(test = %case.name, passed = verdict.passed, "verdict");

    TestResult {
        name: case.name.clone(),
        command: display,
        passed: verdict.passed,
        duration: start.elapsed(),
        failures: verdict.failures,
    }
}

/// Run all cases concurrently and wait for every one of them.
///
/// Results keep the order of `cases`. A panicking worker aborts the run with
/// [`RunError::WorkerPanicked`].
pub fn run_tests(cases: &[TestCase], config: &RunConfig) -> Result<RunSummary, RunError> {
    let joined: Vec<Result<TestResult, RunError>> = thread::scope(|s| {
        let handles: Vec<_> = cases
            .iter()
            .map(|case| (case, s.spawn(move || run_case(case, config))))
            .collect();

        handles
            .into_iter()
            .map(|(case, handle)| {
                handle.join().map_err(|payload| RunError::WorkerPanicked {
                    test: case.name.clone(),
                    message: panic_message(payload.as_ref()),
                })
            })
            .collect()
    });

    let results = joined.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(RunSummary::from_results(results))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
