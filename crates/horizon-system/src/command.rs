//! External program execution.

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::sync::Arc;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CommandError, Result};
use crate::process::{Process, RealProcess};

/// Joins a program name and its arguments with single spaces.
///
/// This is the key used by the dry-run runner's invocation log and canned
/// responses.
#[must_use]
pub fn command_line(name: &str, args: &[&str]) -> String {
    let mut line = String::from(name);
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Runs external programs.
///
/// Every invocation takes a cancellation token. When it fires the call
/// returns [`CommandError::Cancelled`] promptly.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Handle type returned by [`CommandRunner::start`].
    type Process: Process;

    /// Runs the program to completion, discarding its output.
    async fn run(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<()>;

    /// Runs the program and returns its stdout.
    async fn output(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Vec<u8>>;

    /// Runs the program and returns stdout followed by stderr.
    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>>;

    /// Starts the program without waiting for it.
    async fn start(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Self::Process>;

    /// Resolves a program name to an executable path.
    fn look_path(&self, name: &str) -> Result<PathBuf>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    type Process = T::Process;

    async fn run(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<()> {
        (**self).run(cancel, name, args).await
    }

    async fn output(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Vec<u8>> {
        (**self).output(cancel, name, args).await
    }

    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>> {
        (**self).combined_output(cancel, name, args).await
    }

    async fn start(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Self::Process> {
        (**self).start(cancel, name, args).await
    }

    fn look_path(&self, name: &str) -> Result<PathBuf> {
        (**self).look_path(name)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    type Process = T::Process;

    async fn run(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<()> {
        (**self).run(cancel, name, args).await
    }

    async fn output(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Vec<u8>> {
        (**self).output(cancel, name, args).await
    }

    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>> {
        (**self).combined_output(cancel, name, args).await
    }

    async fn start(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Self::Process> {
        (**self).start(cancel, name, args).await
    }

    fn look_path(&self, name: &str) -> Result<PathBuf> {
        (**self).look_path(name)
    }
}

/// [`CommandRunner`] that executes programs on the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealCommandRunner;

impl RealCommandRunner {
    /// Creates a new real command runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn command(name: &str, args: &[&str]) -> Command {
        let mut cmd = Command::new(name);
        cmd.args(args).kill_on_drop(true);
        cmd
    }

    /// Spawns with piped stdout/stderr and waits, honoring `cancel`.
    async fn collect(cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Output> {
        let line = command_line(name, args);
        if cancel.is_cancelled() {
            return Err(CommandError::cancelled(line));
        }

        debug!(command = %line, "running command");
        let child = Self::command(name, args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CommandError::spawn(line.clone(), e))?;

        // Dropping the wait future drops the child, which kills it.
        let output = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(CommandError::cancelled(line)),
            output = child.wait_with_output() => output?,
        };

        if output.status.success() {
            Ok(output)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(command = %line, code = ?output.status.code(), "command failed");
            Err(CommandError::non_zero_exit(
                line,
                output.status.code().unwrap_or(-1),
                stderr,
            ))
        }
    }
}

impl CommandRunner for RealCommandRunner {
    type Process = RealProcess;

    async fn run(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<()> {
        Self::collect(cancel, name, args).await.map(|_| ())
    }

    async fn output(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<Vec<u8>> {
        Self::collect(cancel, name, args).await.map(|o| o.stdout)
    }

    async fn combined_output(
        &self,
        cancel: &CancellationToken,
        name: &str,
        args: &[&str],
    ) -> Result<Vec<u8>> {
        let mut output = Self::collect(cancel, name, args).await?;
        output.stdout.extend_from_slice(&output.stderr);
        Ok(output.stdout)
    }

    async fn start(&self, cancel: &CancellationToken, name: &str, args: &[&str]) -> Result<RealProcess> {
        let line = command_line(name, args);
        if cancel.is_cancelled() {
            return Err(CommandError::cancelled(line));
        }

        debug!(command = %line, "starting process");
        let child = Self::command(name, args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CommandError::spawn(line.clone(), e))?;

        Ok(RealProcess::new(line, child, cancel.clone()))
    }

    fn look_path(&self, name: &str) -> Result<PathBuf> {
        which::which(name).map_err(|_| CommandError::not_found(name))
    }
}
