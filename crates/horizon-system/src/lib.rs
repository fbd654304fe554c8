//! Capability layer for every host mutation performed by the gateway.
//!
//! All file writes and external program invocations go through the
//! [`FileSystem`] and [`CommandRunner`] traits. Each trait has two
//! implementations:
//!
//! - `Real*` types apply the operation to the host.
//! - `DryRun*` types record the intended mutation in memory and leave the host
//!   untouched, which powers `--dry-run` previews and deterministic tests.
//!
//! The variant is chosen once, when the caller is constructed. Business logic
//! is generic over the traits and never inspects which variant it holds.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use horizon_system::{DryRunFileSystem, FileSystem};
//!
//! let fs = DryRunFileSystem::new();
//! fs.write_file(Path::new("/etc/wireguard/wg0.conf"), b"[Interface]\n", 0o600)
//!     .expect("dry-run writes always succeed");
//! assert!(fs.written_files().contains_key(Path::new("/etc/wireguard/wg0.conf")));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod dry_run;
pub mod error;
pub mod fs;
pub mod process;

pub use command::{command_line, CommandRunner, RealCommandRunner};
pub use dry_run::{DryRunCommandRunner, DryRunFileSystem};
pub use error::{CommandError, Result};
pub use fs::{FileInfo, FileSystem, RealFileSystem};
pub use process::{DryRunProcess, Process, ProcessReader, ProcessWriter, RealProcess};

/// Cancellation handle passed to every command invocation.
pub use tokio_util::sync::CancellationToken;
