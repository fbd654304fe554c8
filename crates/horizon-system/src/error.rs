//! Error types for command execution.
//!
//! Filesystem operations return [`std::io::Error`] unchanged so that callers can
//! inspect [`std::io::ErrorKind`] directly. Command and process operations
//! return [`CommandError`].

use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Result type alias for command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Errors that can occur while running external programs.
///
/// The type is `Clone` so a dry-run runner can hand out the same canned
/// failure on every matching invocation.
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The program could not be spawned.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying OS error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The program ran and exited unsuccessfully.
    #[error("command '{command}' exited with code {exit_code}: {stderr}")]
    NonZeroExit {
        /// The command line that was executed.
        command: String,
        /// Exit code, or -1 when the program was terminated by a signal.
        exit_code: i32,
        /// Captured error output (empty when not captured).
        stderr: String,
    },

    /// The cancellation token fired before the program finished.
    #[error("command '{command}' was cancelled")]
    Cancelled {
        /// The command line that was cancelled.
        command: String,
    },

    /// The program could not be located on `PATH`.
    #[error("executable not found: {program}")]
    NotFound {
        /// The program name that was looked up.
        program: String,
    },

    /// A failure that did not come from the OS, such as a canned dry-run error.
    #[error("command '{command}' failed: {message}")]
    Failed {
        /// The command line that failed.
        command: String,
        /// Description of the failure.
        message: String,
    },

    /// A process stream was already taken or was never piped.
    #[error("{stream} is not available")]
    StreamUnavailable {
        /// Which stream was requested.
        stream: &'static str,
    },

    /// IO error while interacting with a running process.
    #[error("io error: {0}")]
    Io(Arc<io::Error>),
}

impl CommandError {
    /// Creates a `Spawn` error.
    #[must_use]
    pub fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a `NonZeroExit` error.
    #[must_use]
    pub fn non_zero_exit(command: impl Into<String>, exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::NonZeroExit {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a `Cancelled` error.
    #[must_use]
    pub fn cancelled(command: impl Into<String>) -> Self {
        Self::Cancelled {
            command: command.into(),
        }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(program: impl Into<String>) -> Self {
        Self::NotFound {
            program: program.into(),
        }
    }

    /// Creates a `Failed` error.
    #[must_use]
    pub fn failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the operation was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns `true` if the program itself could not be found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Spawn { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns the command line associated with this error, if any.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Spawn { command, .. }
            | Self::NonZeroExit { command, .. }
            | Self::Cancelled { command }
            | Self::Failed { command, .. } => Some(command),
            Self::NotFound { .. } | Self::StreamUnavailable { .. } | Self::Io(_) => None,
        }
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
