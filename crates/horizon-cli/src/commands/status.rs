//! Gateway status command implementation.
//!
//! Shows an overview of the gateway including:
//! - Interface, VPN range and gateway address
//! - Peer count
//! - Live interface, forwarding and NAT checks

use std::io::Write;

use horizon_acme::provider_name;
use horizon_system::{CommandRunner, FileSystem};
use horizon_wireguard::StatusChecker;

use super::Context;
use crate::error::CliError;
use crate::output::{OutputFormat, StatusReport};

/// Status command executor.
pub struct StatusCommand<'a, F, R> {
    ctx: &'a Context<F, R>,
}

impl<'a, F: FileSystem, R: CommandRunner> StatusCommand<'a, F, R> {
    /// Create a new status command.
    #[must_use]
    pub fn new(ctx: &'a Context<F, R>) -> Self {
        Self { ctx }
    }

    /// Execute the status command.
    ///
    /// # Errors
    ///
    /// Returns an error if output fails.
    pub async fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let status = self.fetch_status().await;
        format.write(writer, &status)
    }

    /// Collect the gateway status.
    ///
    /// An unreadable WireGuard config counts as zero peers; probe failures
    /// show up as failed checks.
    pub async fn fetch_status(&self) -> StatusReport {
        let settings = &self.ctx.settings;
        let peer_count = match self.ctx.load_wireguard() {
            Ok(wg) => wg.peers().len(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read WireGuard config");
                0
            }
        };

        let checker = StatusChecker::new(&self.ctx.runner);
        let system = checker
            .check_system(&self.ctx.cancel, &settings.wg_interface, &settings.vpn_range)
            .await;

        StatusReport {
            interface: settings.wg_interface.clone(),
            vpn_range: settings.vpn_range.clone(),
            gateway_ip: settings.gateway_ip(),
            peer_count,
            interface_up: system.interface_up,
            ip_forwarding: system.ip_forwarding,
            masquerading: system.masquerading,
            dns_provider: provider_name(settings.dns_provider.as_ref()).to_string(),
        }
    }
}
