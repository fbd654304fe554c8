//! CLI command implementations.
//!
//! Each submodule implements one group of commands:
//! - [`peers`] - Peer listing, lookup, address allocation and add/remove
//! - [`status`] - Gateway health overview
//! - [`keys`] - Key validation and generation
//!
//! Commands are generic over [`FileSystem`] and [`CommandRunner`]. Whether
//! they touch the host or only record their effects is decided once, by the
//! caller that builds the [`Context`].

pub mod keys;
pub mod peers;
pub mod status;

use std::io::Write;

use horizon_config::GatewayConfig;
use horizon_system::{CancellationToken, CommandRunner, FileSystem};
use horizon_wireguard::WireGuardConfig;

pub use keys::KeyCommand;
pub use peers::PeerCommand;
pub use status::StatusCommand;

use crate::cli::Commands;
use crate::error::CliError;
use crate::output::OutputFormat;

/// Everything a command needs to act on the gateway.
#[derive(Debug)]
pub struct Context<F, R> {
    /// Loaded gateway settings.
    pub settings: GatewayConfig,
    /// Filesystem used for every read and write.
    pub fs: F,
    /// Runner used for every external program.
    pub runner: R,
    /// Cancelled when the user interrupts the CLI.
    pub cancel: CancellationToken,
}

impl<F: FileSystem, R: CommandRunner> Context<F, R> {
    /// Create a new command context.
    #[must_use]
    pub fn new(settings: GatewayConfig, fs: F, runner: R, cancel: CancellationToken) -> Self {
        Self {
            settings,
            fs,
            runner,
            cancel,
        }
    }

    /// Load the WireGuard config named by the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn load_wireguard(&self) -> Result<WireGuardConfig<&F>, CliError> {
        let mut wg = WireGuardConfig::with_fs(
            self.settings.wg_config_path.clone(),
            self.settings.wg_interface.clone(),
            &self.fs,
        );
        wg.load()?;
        Ok(wg)
    }
}

/// Run one subcommand against `ctx`, writing its result to `writer`.
///
/// # Errors
///
/// Returns an error if the command fails or output cannot be written.
pub async fn execute<F, R, W>(
    ctx: &Context<F, R>,
    command: &Commands,
    writer: &mut W,
    format: &OutputFormat,
) -> Result<(), CliError>
where
    F: FileSystem,
    R: CommandRunner,
    W: Write,
{
    match command {
        Commands::Peers => PeerCommand::new(ctx).list(writer, format),
        Commands::Peer { ip } => PeerCommand::new(ctx).show(writer, format, ip),
        Commands::NextIp { cidr } => PeerCommand::new(ctx).next_ip(writer, format, cidr.as_deref()),
        Commands::AddPeer(args) => PeerCommand::new(ctx).add(writer, format, args).await,
        Commands::RemovePeer { public_key } => PeerCommand::new(ctx).remove(writer, format, public_key).await,
        Commands::Status => StatusCommand::new(ctx).execute(writer, format).await,
        Commands::ValidateKey { key } => KeyCommand::new().validate(writer, format, key),
        Commands::Genkey => KeyCommand::new().generate(writer, format),
    }
}
