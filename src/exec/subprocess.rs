//! Subprocess execution with timeout support
//!
//! Child processes inherit stdin/stdout/stderr, so compiler diagnostics and
//! program output reach the terminal exactly as the child wrote them.

use std::fmt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::BuildError;
use crate::invocation::CommandLine;

/// How often a child is polled while a deadline is active
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How an external process finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Exit code 0
    Success,
    /// The process exited with a non-zero code
    NonZeroExit(i32),
    /// The process was terminated by a signal
    Signaled(Option<i32>),
    /// The process outlived its deadline and was killed
    TimedOut(Duration),
}

impl ExecutionStatus {
    fn from_exit_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => ExecutionStatus::Success,
            Some(code) => ExecutionStatus::NonZeroExit(code),
            None => ExecutionStatus::Signaled(signal_of(&status)),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success => write!(f, "success"),
            ExecutionStatus::NonZeroExit(code) => write!(f, "exit code {}", code),
            ExecutionStatus::Signaled(Some(signal)) => write!(f, "terminated by signal {}", signal),
            ExecutionStatus::Signaled(None) => write!(f, "terminated by signal"),
            ExecutionStatus::TimedOut(limit) => {
                write!(f, "timed out after {:.1}s", limit.as_secs_f64())
            }
        }
    }
}

/// Result of a subprocess execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// How the process finished
    pub status: ExecutionStatus,

    /// Execution duration
    pub duration: Duration,
}

impl ExecutionResult {
    /// Create an ExecutionResult from an exit status
    pub fn from_status(status: ExitStatus, duration: Duration) -> Self {
        Self {
            status: ExecutionStatus::from_exit_status(status),
            duration,
        }
    }

    /// Whether the command succeeded (exit code 0)
    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Launches external commands on behalf of the orchestrator
pub trait ProcessRunner {
    /// Run `command` in `working_dir` and block until it finishes.
    ///
    /// Returns `BuildError::Launch` when the program cannot be started; any
    /// process that did start yields an `ExecutionResult`, successful or not.
    fn execute(&self, command: &CommandLine, working_dir: &Path)
        -> Result<ExecutionResult, BuildError>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn execute(
        &self,
        command: &CommandLine,
        working_dir: &Path,
    ) -> Result<ExecutionResult, BuildError> {
        (**self).execute(command, working_dir)
    }
}

/// Runs commands as real child processes with inherited standard streams
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Create a runner that waits for children indefinitely
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill children that run longer than `timeout`
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ProcessRunner for SystemRunner {
    fn execute(
        &self,
        command: &CommandLine,
        working_dir: &Path,
    ) -> Result<ExecutionResult, BuildError> {
        let start = Instant::now();

        let mut cmd = Command::new(command.program());
        cmd.args(command.args());
        cmd.current_dir(working_dir);
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let program = command.program().to_string_lossy().into_owned();

        match self.timeout {
            None => {
                let status = cmd
                    .status()
                    .map_err(|e| BuildError::launch(&program, Some(e)))?;
                Ok(ExecutionResult::from_status(status, start.elapsed()))
            }
            Some(limit) => {
                let mut child = cmd
                    .spawn()
                    .map_err(|e| BuildError::launch(&program, Some(e)))?;
                wait_with_deadline(&mut child, &program, limit, start)
            }
        }
    }
}

fn wait_with_deadline(
    child: &mut Child,
    program: &str,
    limit: Duration,
    start: Instant,
) -> Result<ExecutionResult, BuildError> {
    loop {
        let polled = child
            .try_wait()
            .map_err(|e| BuildError::launch(program, Some(e)))?;
        if let Some(status) = polled {
            return Ok(ExecutionResult::from_status(status, start.elapsed()));
        }

        if start.elapsed() >= limit {
            // The child may have exited between the poll and the kill.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(ExecutionResult {
                status: ExecutionStatus::TimedOut(limit),
                duration: start.elapsed(),
            });
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}
