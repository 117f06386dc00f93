//! Test discovery.
//!
//! Every sub-directory of the tests root is one test case, named after the
//! directory. Cases are returned sorted by name, which is the order results are
//! reported in.

use crate::error::LoadError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The default directory holding one sub-directory per test case.
pub const DEFAULT_TESTS_DIR: &str = "tests";

/// One discovered test directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Directory name, unique within a run.
    pub name: String,
    pub dir: PathBuf,
    /// Names of the regular files in `dir`.
    pub files: BTreeSet<String>,
}

impl TestCase {
    /// Snapshot the file listing of a test directory.
    pub fn from_dir(dir: &Path) -> Result<Self, LoadError> {
        let io_err = |source: std::io::Error| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = BTreeSet::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let file_name = entry.file_name();
            if entry.path().is_file()
                && let Some(name) = file_name.to_str()
            {
                files.insert(name.to_string());
            }
        }

        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());

        Ok(Self {
            name,
            dir: dir.to_path_buf(),
            files,
        })
    }
}

/// Find all test cases under `root`, sorted by name.
pub fn discover(root: &Path) -> Result<Vec<TestCase>, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }

    let mut dirs = Vec::new();
    let entries = std::fs::read_dir(root).map_err(|source| LoadError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();

    dirs.iter().map(|dir| TestCase::from_dir(dir)).collect()
}

/// Which discovered tests to execute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    /// Run only the named tests.
    Only(Vec<String>),
    /// Run everything except the named tests.
    Skip(Vec<String>),
}

impl Selection {
    /// Build from the `--run` / `--skip` lists; `--run` wins if both are given.
    pub fn from_lists(run: Vec<String>, skip: Vec<String>) -> Self {
        if !run.is_empty() {
            Selection::Only(run)
        } else if !skip.is_empty() {
            Selection::Skip(skip)
        } else {
            Selection::All
        }
    }

    /// Keep the selected cases, preserving their order.
    pub fn apply(&self, cases: Vec<TestCase>) -> Vec<TestCase> {
        match self {
            Selection::All => cases,
            Selection::Only(names) => cases
                .into_iter()
                .filter(|c| names.contains(&c.name))
                .collect(),
            Selection::Skip(names) => cases
                .into_iter()
                .filter(|c| !names.contains(&c.name))
                .collect(),
        }
    }

    /// Names given on the command line that match no discovered test.
    pub fn unknown_names<'a>(&'a self, cases: &[TestCase]) -> Vec<&'a str> {
        let names = match self {
            Selection::All => return Vec::new(),
            Selection::Only(names) | Selection::Skip(names) => names,
        };
        names
            .iter()
            .filter(|name| !cases.iter().any(|c| &c.name == *name))
            .map(String::as_str)
            .collect()
    }
}
