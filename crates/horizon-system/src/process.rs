//! Handles for long-running child processes.

use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CommandError, Result};

/// Readable end of a process stream.
pub type ProcessReader = Box<dyn AsyncRead + Send + Unpin>;

/// Writable end of a process stream.
pub type ProcessWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A process started through [`CommandRunner::start`](crate::CommandRunner::start).
///
/// Each stream can be taken exactly once; a second call returns
/// [`CommandError::StreamUnavailable`].
#[allow(async_fn_in_trait)]
pub trait Process {
    /// Waits for the process to exit. A non-zero exit is an error.
    async fn wait(&self) -> Result<()>;

    /// Kills the process.
    async fn kill(&self) -> Result<()>;

    /// Takes the write end of the process's stdin.
    fn take_stdin(&self) -> Result<ProcessWriter>;

    /// Takes the read end of the process's stdout.
    fn take_stdout(&self) -> Result<ProcessReader>;

    /// Takes the read end of the process's stderr.
    fn take_stderr(&self) -> Result<ProcessReader>;
}

/// Real child process.
///
/// `wait`, `kill` and the stream accessors may be called from different tasks.
/// A `kill` issued while another task is inside `wait` is delivered through
/// that waiter, which terminates and reaps the child.
pub struct RealProcess {
    command: String,
    child: tokio::sync::Mutex<Child>,
    kill_requested: CancellationToken,
    cancel: CancellationToken,
    stdin: Mutex<Option<ChildStdin>>,
    stdout: Mutex<Option<ChildStdout>>,
    stderr: Mutex<Option<ChildStderr>>,
}

enum WaitOutcome {
    Exited(std::io::Result<ExitStatus>),
    KillRequested,
    Cancelled,
}

impl RealProcess {
    pub(crate) fn new(command: String, mut child: Child, cancel: CancellationToken) -> Self {
        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        Self {
            command,
            child: tokio::sync::Mutex::new(child),
            kill_requested: CancellationToken::new(),
            cancel,
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(stdout),
            stderr: Mutex::new(stderr),
        }
    }

    /// Returns the command line this process was started with.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    fn terminate(&self, child: &mut Child) {
        if let Err(e) = child.start_kill() {
            debug!(command = %self.command, error = %e, "kill after exit ignored");
        }
    }

    fn check_status(&self, status: ExitStatus) -> Result<()> {
        if status.success() {
            Ok(())
        } else {
            Err(CommandError::non_zero_exit(
                self.command.clone(),
                status.code().unwrap_or(-1),
                "",
            ))
        }
    }
}

impl std::fmt::Debug for RealProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealProcess").field("command", &self.command).finish_non_exhaustive()
    }
}

impl Process for RealProcess {
    async fn wait(&self) -> Result<()> {
        let mut child = self.child.lock().await;

        let outcome = tokio::select! {
            biased;
            status = child.wait() => WaitOutcome::Exited(status),
            () = self.kill_requested.cancelled() => WaitOutcome::KillRequested,
            () = self.cancel.cancelled() => WaitOutcome::Cancelled,
        };

        match outcome {
            WaitOutcome::Exited(status) => self.check_status(status?),
            WaitOutcome::KillRequested => {
                self.terminate(&mut child);
                let status = child.wait().await?;
                self.check_status(status)
            }
            WaitOutcome::Cancelled => {
                self.terminate(&mut child);
                child.wait().await?;
                Err(CommandError::cancelled(self.command.clone()))
            }
        }
    }

    async fn kill(&self) -> Result<()> {
        debug!(command = %self.command, "killing process");
        self.kill_requested.cancel();
        // A waiter holding the lock observes the token and kills for us.
        if let Ok(mut child) = self.child.try_lock() {
            match child.start_kill() {
                Ok(()) => {}
                // Already exited and reaped.
                Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn take_stdin(&self) -> Result<ProcessWriter> {
        self.stdin
            .lock()
            .take()
            .map(|s| Box::new(s) as ProcessWriter)
            .ok_or(CommandError::StreamUnavailable { stream: "stdin" })
    }

    fn take_stdout(&self) -> Result<ProcessReader> {
        self.stdout
            .lock()
            .take()
            .map(|s| Box::new(s) as ProcessReader)
            .ok_or(CommandError::StreamUnavailable { stream: "stdout" })
    }

    fn take_stderr(&self) -> Result<ProcessReader> {
        self.stderr
            .lock()
            .take()
            .map(|s| Box::new(s) as ProcessReader)
            .ok_or(CommandError::StreamUnavailable { stream: "stderr" })
    }
}

/// Process handle returned by the dry-run runner.
///
/// `wait` and `kill` succeed immediately. Streams are empty (reads hit EOF,
/// writes are discarded) but still obey the take-once rule.
#[derive(Debug, Default)]
pub struct DryRunProcess {
    stdin_taken: AtomicBool,
    stdout_taken: AtomicBool,
    stderr_taken: AtomicBool,
}

impl DryRunProcess {
    /// Creates a new no-op process handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn take(flag: &AtomicBool, stream: &'static str) -> Result<()> {
        if flag.swap(true, Ordering::SeqCst) {
            Err(CommandError::StreamUnavailable { stream })
        } else {
            Ok(())
        }
    }
}

impl Process for DryRunProcess {
    async fn wait(&self) -> Result<()> {
        Ok(())
    }

    async fn kill(&self) -> Result<()> {
        Ok(())
    }

    fn take_stdin(&self) -> Result<ProcessWriter> {
        Self::take(&self.stdin_taken, "stdin")?;
        Ok(Box::new(tokio::io::sink()))
    }

    fn take_stdout(&self) -> Result<ProcessReader> {
        Self::take(&self.stdout_taken, "stdout")?;
        Ok(Box::new(tokio::io::empty()))
    }

    fn take_stderr(&self) -> Result<ProcessReader> {
        Self::take(&self.stderr_taken, "stderr")?;
        Ok(Box::new(tokio::io::empty()))
    }
}
