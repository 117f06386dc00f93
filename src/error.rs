//! Error types for the test runner.
//!
//! Per-test errors ([`FixtureError`], [`ExecError`]) never escape a test: the
//! runner folds them into a failing verdict. Only [`RunError`] aborts a run.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A fixture file could not be turned into usable test input.
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid return code {value:?} in {}", path.display())]
    InvalidReturnCode { path: PathBuf, value: String },
}

/// The process under test did not run to a normal exit.
///
/// This is the error marker that stands in for an exit code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("process timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("process could not be started: {0}")]
    Launch(String),

    #[error("process was terminated by signal {0}")]
    Signaled(i32),
}

impl ExecError {
    /// Code reported alongside the error, if any.
    ///
    /// Signals use the shell convention `128 + signal`. Timeouts and launch
    /// failures carry no code.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExecError::Signaled(signal) => Some(128 + signal),
            ExecError::TimedOut(_) | ExecError::Launch(_) => None,
        }
    }
}

/// Test discovery failed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("tests directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("failed to list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The settings file was present but unusable.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The runner itself broke, as opposed to a test failing.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("worker for test '{test}' panicked: {message}")]
    WorkerPanicked { test: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_code_follows_shell_convention() {
        assert_eq!(ExecError::Signaled(9).code(), Some(137));
        assert_eq!(ExecError::TimedOut(Duration::from_secs(1)).code(), None);
        assert_eq!(ExecError::Launch("nope".into()).code(), None);
    }

    #[test]
    fn timeout_message_names_duration() {
        let err = ExecError::TimedOut(Duration::from_secs(30));
        assert_eq!(err.to_string(), "process timed out after 30s");
    }
}
