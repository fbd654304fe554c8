//! # horizon-cli
//!
//! Homelab Horizon command-line interface.
//!
//! Provides commands for:
//! - Listing, looking up, adding and removing WireGuard peers
//! - Allocating peer addresses from the VPN range
//! - Gateway health checks
//! - Key validation and generation
//!
//! # Dry runs
//!
//! With `--dry-run` every command runs against
//! [`horizon_system::DryRunFileSystem`] and
//! [`horizon_system::DryRunCommandRunner`]. Reads still see the host, while
//! writes and commands are only recorded and printed as a
//! [`output::DryRunReport`] at the end.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{AddPeerArgs, Cli, Commands, Format};
pub use commands::{execute, Context};
pub use error::CliError;
pub use output::OutputFormat;
