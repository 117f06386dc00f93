//! Command construction.
//!
//! The argv fixture is appended to the executable as one verbatim blob and the
//! host shell does the word splitting, so quoting inside `argv.txt` behaves the
//! way it would on a command line.

use crate::fixture::FixtureSet;
use std::path::PathBuf;
use std::process::Command;

/// The invocation for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    pub executable: String,
    pub args: Option<String>,
    pub stdin: Option<PathBuf>,
}

impl TestCommand {
    pub fn build(executable: &str, fixtures: &FixtureSet) -> Self {
        Self {
            executable: executable.to_string(),
            args: fixtures.argv.clone(),
            stdin: fixtures.stdin.clone(),
        }
    }

    /// The line handed to the shell.
    pub fn shell_line(&self) -> String {
        match &self.args {
            Some(args) => format!("{} {args}", self.executable),
            None => self.executable.clone(),
        }
    }

    /// Human-readable form, including the stdin redirect.
    pub fn display(&self) -> String {
        match &self.stdin {
            Some(path) => format!("{} < {}", self.shell_line(), path.display()),
            None => self.shell_line(),
        }
    }

    /// The process to spawn. Stdio is left to the executor.
    pub fn to_command(&self) -> Command {
        #[cfg(unix)]
        let mut cmd = {
            let mut c = Command::new("sh");
            c.arg("-c");
            c
        };
        #[cfg(not(unix))]
        let mut cmd = {
            let mut c = Command::new("cmd");
            c.arg("/C");
            c
        };
        cmd.arg(self.shell_line());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_alone_without_fixtures() {
        let cmd = TestCommand::build("./prog", &FixtureSet::default());

        assert_eq!(cmd.args, None);
        assert_eq!(cmd.stdin, None);
        assert_eq!(cmd.shell_line(), "./prog");
        assert_eq!(cmd.display(), "./prog");
    }

    #[test]
    fn argv_is_appended_verbatim() {
        let fixtures = FixtureSet {
            argv: Some("--flag 'two words'".to_string()),
            ..FixtureSet::default()
        };
        let cmd = TestCommand::build("./prog", &fixtures);

        assert_eq!(cmd.shell_line(), "./prog --flag 'two words'");
    }

    #[test]
    fn stdin_shown_as_redirect() {
        let fixtures = FixtureSet {
            stdin: Some(PathBuf::from("tests/a/stdin.txt")),
            ..FixtureSet::default()
        };
        let cmd = TestCommand::build("./prog", &fixtures);

        assert_eq!(cmd.shell_line(), "./prog");
        assert_eq!(cmd.display(), "./prog < tests/a/stdin.txt");
    }

    #[cfg(unix)]
    #[test]
    fn runs_through_the_shell() {
        let fixtures = FixtureSet {
            argv: Some("a b".to_string()),
            ..FixtureSet::default()
        };
        let cmd = TestCommand::build("echo", &fixtures).to_command();

        assert_eq!(cmd.get_program(), "sh");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["-c", "echo a b"]);
    }
}
