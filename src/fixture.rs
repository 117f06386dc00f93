//! Fixture resolution.
//!
//! A test directory holds optional fixture files, each under a bare name
//! (`stdout`) or a `.txt` name (`stdout.txt`). Candidates are probed in a fixed
//! order and a later hit replaces an earlier one, so the `.txt` file wins when
//! both exist.

use crate::error::FixtureError;
use crate::loader::TestCase;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A named fixture slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Argv,
    Stdin,
    Stdout,
    Stderr,
    ReturnCode,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Argv => "argv",
            Slot::Stdin => "stdin",
            Slot::Stdout => "stdout",
            Slot::Stderr => "stderr",
            Slot::ReturnCode => "return_code",
        }
    }

    /// Candidate filenames in probe order.
    pub fn candidates(self) -> [String; 2] {
        let name = self.name();
        [name.to_string(), format!("{name}.txt")]
    }
}

/// Resolved fixtures of one test case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureSet {
    /// Trimmed argument blob, `None` when absent or blank.
    pub argv: Option<String>,
    /// Path of the stdin fixture; its content is never read by the runner.
    pub stdin: Option<PathBuf>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub return_code: Option<i32>,
}

impl FixtureSet {
    /// Resolve every slot of a test case.
    pub fn load(case: &TestCase) -> Result<Self, FixtureError> {
        let files = &case.files;
        let dir = case.dir.as_path();

        let argv = resolve(files, dir, Slot::Argv)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let return_code = match resolve_path(files, dir, Slot::ReturnCode) {
            Some(path) => Some(parse_return_code(&path, &read(&path)?)?),
            None => None,
        };

        Ok(Self {
            argv,
            stdin: resolve_path(files, dir, Slot::Stdin),
            stdout: resolve(files, dir, Slot::Stdout)?,
            stderr: resolve(files, dir, Slot::Stderr)?,
            return_code,
        })
    }

    pub fn expected_stdout(&self) -> &str {
        self.stdout.as_deref().unwrap_or("")
    }

    pub fn expected_stderr(&self) -> &str {
        self.stderr.as_deref().unwrap_or("")
    }

    pub fn expected_exit_code(&self) -> i32 {
        self.return_code.unwrap_or(0)
    }
}

/// Read the winning candidate of `slot`, or `None` if no candidate exists.
pub fn resolve(
    files: &BTreeSet<String>,
    dir: &Path,
    slot: Slot,
) -> Result<Option<String>, FixtureError> {
    let mut content = None;
    for candidate in slot.candidates() {
        if files.contains(&candidate) {
            content = Some(read(&dir.join(&candidate))?);
        }
    }
    Ok(content)
}

/// Path of the winning candidate of `slot`, without reading it.
pub fn resolve_path(files: &BTreeSet<String>, dir: &Path, slot: Slot) -> Option<PathBuf> {
    slot.candidates()
        .into_iter()
        .filter(|candidate| files.contains(candidate))
        .last()
        .map(|candidate| dir.join(candidate))
}

fn read(path: &Path) -> Result<String, FixtureError> {
    std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_return_code(path: &Path, content: &str) -> Result<i32, FixtureError> {
    let value = content.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| FixtureError::InvalidReturnCode {
            path: path.to_path_buf(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn case_with(files: &[(&str, &str)]) -> (tempfile::TempDir, TestCase) {
        let dir = tempdir().unwrap();
        for (name, contents) in files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        let case = TestCase::from_dir(dir.path()).unwrap();
        (dir, case)
    }

    #[test]
    fn empty_directory_resolves_to_defaults() {
        let (_dir, case) = case_with(&[]);
        let fixtures = FixtureSet::load(&case).unwrap();

        assert_eq!(fixtures, FixtureSet::default());
        assert_eq!(fixtures.expected_stdout(), "");
        assert_eq!(fixtures.expected_stderr(), "");
        assert_eq!(fixtures.expected_exit_code(), 0);
    }

    #[test]
    fn txt_variant_takes_precedence() {
        let (_dir, case) = case_with(&[("stdout", "bare\n"), ("stdout.txt", "suffixed\n")]);
        let fixtures = FixtureSet::load(&case).unwrap();

        assert_eq!(fixtures.expected_stdout(), "suffixed\n");
    }

    #[test]
    fn bare_name_used_when_alone() {
        let (_dir, case) = case_with(&[("stderr", "only bare")]);
        let fixtures = FixtureSet::load(&case).unwrap();

        assert_eq!(fixtures.expected_stderr(), "only bare");
    }

    #[test]
    fn output_content_is_not_trimmed() {
        let (_dir, case) = case_with(&[("stdout.txt", "  padded \n\n")]);
        let fixtures = FixtureSet::load(&case).unwrap();

        assert_eq!(fixtures.expected_stdout(), "  padded \n\n");
    }

    #[test]
    fn argv_is_trimmed_and_blank_is_absent() {
        let (_dir, case) = case_with(&[("argv.txt", "  --flag value\n")]);
        assert_eq!(
            FixtureSet::load(&case).unwrap().argv.as_deref(),
            Some("--flag value")
        );

        let (_dir, case) = case_with(&[("argv", " \n ")]);
        assert_eq!(FixtureSet::load(&case).unwrap().argv, None);
    }

    #[test]
    fn stdin_resolves_to_path_with_same_precedence() {
        let (dir, case) = case_with(&[("stdin", "a"), ("stdin.txt", "b")]);
        let fixtures = FixtureSet::load(&case).unwrap();

        assert_eq!(fixtures.stdin, Some(dir.path().join("stdin.txt")));
    }

    #[test]
    fn return_code_is_parsed() {
        let (_dir, case) = case_with(&[("return_code.txt", " 3\n")]);
        assert_eq!(FixtureSet::load(&case).unwrap().expected_exit_code(), 3);

        let (_dir, case) = case_with(&[("return_code", "")]);
        assert_eq!(FixtureSet::load(&case).unwrap().expected_exit_code(), 0);
    }

    #[test]
    fn invalid_return_code_is_an_error() {
        let (_dir, case) = case_with(&[("return_code", "one")]);
        let result = FixtureSet::load(&case);

        assert!(matches!(
            result,
            Err(FixtureError::InvalidReturnCode { ref value, .. }) if value == "one"
        ));
    }

    #[test]
    fn listed_but_missing_file_is_a_read_error() {
        let (dir, mut case) = case_with(&[]);
        case.files.insert("stdout.txt".to_string());

        let result = FixtureSet::load(&case);
        assert!(matches!(result, Err(FixtureError::Read { ref path, .. }) if *path == dir.path().join("stdout.txt")));
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let (_dir, case) = case_with(&[("README.md", "notes"), ("stdout.log", "x")]);
        assert_eq!(FixtureSet::load(&case).unwrap(), FixtureSet::default());
    }
}
