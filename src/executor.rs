//! Process execution with a wall-clock timeout.

use crate::command::TestCommand;
use crate::error::ExecError;
use std::fs::File;
use std::io::Read;
use std::process::{Child, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default timeout per test.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How the process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Exited(i32),
    /// No valid exit code is available.
    Failed(ExecError),
}

/// Everything captured from one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub status: RunStatus,
}

impl ExecutionResult {
    fn failed(err: ExecError) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            status: RunStatus::Failed(err),
        }
    }
}

/// Run `command` to completion or until `timeout` elapses.
///
/// Both output streams are buffered in full. The timeout also covers
/// background processes that keep the pipes open after the shell exits. On
/// timeout the process (and anything it spawned, on Unix) is killed and
/// whatever it had written so far is returned alongside [`ExecError::TimedOut`].
pub fn execute(command: TestCommand, timeout: Duration) -> ExecutionResult {
    let mut cmd = command.to_command();

    let stdin = match &command.stdin {
        Some(path) => match File::open(path) {
            Ok(file) => Stdio::from(file),
            Err(e) => {
                return ExecutionResult::failed(ExecError::Launch(format!(
                    "failed to open stdin {}: {e}",
                    path.display()
                )));
            }
        },
        None => Stdio::null(),
    };
    cmd.stdin(stdin);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ExecutionResult::failed(ExecError::Launch(format!(
                "failed to spawn `{}`: {e}",
                command.shell_line()
            )));
        }
    };
    debug!(pid = child.id(), command = %command.display(), "spawned");

    // Drain both pipes while waiting so a chatty child never blocks on a full pipe.
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let start = Instant::now();
    let mut status = wait_with_timeout(&mut child, start, timeout);

    // Anything the program left running in the background still holds the pipes.
    if !wait_for_readers([&stdout_reader, &stderr_reader], start + timeout) {
        debug!(pid = child.id(), "output still open after timeout, killing");
        kill(&mut child);
        status = RunStatus::Failed(ExecError::TimedOut(timeout));
    }

    ExecutionResult {
        stdout: collect(stdout_reader),
        stderr: collect(stderr_reader),
        status,
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

/// True once every reader has hit end of file, false if `deadline` passes first.
fn wait_for_readers(readers: [&Option<JoinHandle<Vec<u8>>>; 2], deadline: Instant) -> bool {
    loop {
        if readers
            .iter()
            .all(|reader| reader.as_ref().is_none_or(|handle| handle.is_finished()))
        {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn wait_with_timeout(child: &mut Child, start: Instant, timeout: Duration) -> RunStatus {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return run_status(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    debug!(pid = child.id(), "timed out, killing");
                    kill(child);
                    let _ = child.wait();
                    return RunStatus::Failed(ExecError::TimedOut(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                kill(child);
                let _ = child.wait();
                return RunStatus::Failed(ExecError::Launch(format!("failed to wait: {e}")));
            }
        }
    }
}

fn run_status(status: ExitStatus) -> RunStatus {
    if let Some(code) = status.code() {
        return RunStatus::Exited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return RunStatus::Failed(ExecError::Signaled(signal));
        }
    }

    RunStatus::Failed(ExecError::Launch(format!(
        "process ended without an exit code: {status}"
    )))
}

#[cfg(unix)]
fn kill(child: &mut Child) {
    // The shell leads its own process group; signal the whole group.
    let Ok(pgid) = libc::pid_t::try_from(child.id()) else {
        let _ = child.kill();
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill(child: &mut Child) {
    let _ = child.kill();
}
