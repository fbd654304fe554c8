//! Peer management commands.
//!
//! Additions and removals are saved to the config file first and then
//! applied to the running interface with `wg set`, so the change survives a
//! restart even if the live update fails.

use std::io::Write;
use std::net::Ipv4Addr;

use horizon_system::{CommandRunner, FileSystem};
use horizon_wireguard::{generate_keypair, validate_public_key, Peer};
use tracing::info;

use super::Context;
use crate::cli::AddPeerArgs;
use crate::error::CliError;
use crate::output::{AddedPeer, NextIp, OutputFormat, PeerList, PeerView, RemovedPeer};

/// Peer command executor.
pub struct PeerCommand<'a, F, R> {
    ctx: &'a Context<F, R>,
}

impl<'a, F: FileSystem, R: CommandRunner> PeerCommand<'a, F, R> {
    /// Create a new peer command.
    #[must_use]
    pub fn new(ctx: &'a Context<F, R>) -> Self {
        Self { ctx }
    }

    /// List every configured peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be read or output fails.
    pub fn list<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let wg = self.ctx.load_wireguard()?;
        let list = PeerList {
            interface: wg.iface().to_string(),
            peers: wg.peers().iter().map(PeerView::from).collect(),
        };
        format.write(writer, &list)
    }

    /// Show the peer that routes `ip`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NotFound`] if no peer routes the address.
    pub fn show<W: Write>(&self, writer: &mut W, format: &OutputFormat, ip: &str) -> Result<(), CliError> {
        let wg = self.ctx.load_wireguard()?;
        let peer = wg
            .peer_by_ip(ip)
            .ok_or_else(|| CliError::NotFound(format!("peer with address {ip}")))?;
        format.write(writer, &PeerView::from(peer))
    }

    /// Show the next free address in `cidr`, or in the configured VPN range.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid or exhausted.
    pub fn next_ip<W: Write>(&self, writer: &mut W, format: &OutputFormat, cidr: Option<&str>) -> Result<(), CliError> {
        let wg = self.ctx.load_wireguard()?;
        let cidr = cidr.unwrap_or(&self.ctx.settings.vpn_range);
        let ip = wg.next_ip(cidr)?;
        format.write(
            writer,
            &NextIp {
                cidr: cidr.to_string(),
                ip,
            },
        )
    }

    /// Add a peer, save the config and apply it to the interface.
    ///
    /// A key pair is generated when no public key is given, and the next free
    /// address is assigned when no address is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or address is rejected, the config cannot
    /// be saved, or `wg set` fails.
    pub async fn add<W: Write>(&self, writer: &mut W, format: &OutputFormat, args: &AddPeerArgs) -> Result<(), CliError> {
        let mut wg = self.ctx.load_wireguard()?;

        let (public_key, private_key) = match &args.public_key {
            Some(key) if !validate_public_key(key) => {
                return Err(CliError::InvalidArgument(format!(
                    "'{key}' is not a valid WireGuard public key"
                )));
            }
            Some(key) => (key.clone(), None),
            None => {
                let pair = generate_keypair();
                (pair.public_key, Some(pair.private_key))
            }
        };

        let allowed_ips = match &args.ip {
            Some(ip) => host_route(ip)?,
            None => host_route(&wg.next_ip(&self.ctx.settings.vpn_range)?)?,
        };

        let peer = Peer::new(args.name.as_str(), public_key.as_str(), allowed_ips.as_str());
        let view = PeerView::from(&peer);
        wg.add_peer(peer)?;
        wg.save()?;

        self.ctx
            .runner
            .run(
                &self.ctx.cancel,
                "wg",
                &["set", wg.iface(), "peer", &public_key, "allowed-ips", &allowed_ips],
            )
            .await?;
        info!(iface = %wg.iface(), name = %args.name, %allowed_ips, "peer added");

        format.write(writer, &AddedPeer { peer: view, private_key })
    }

    /// Remove the peer with `public_key`, save the config and drop it from
    /// the interface.
    ///
    /// # Errors
    ///
    /// Returns an error if no such peer exists, the config cannot be saved,
    /// or `wg set` fails.
    pub async fn remove<W: Write>(&self, writer: &mut W, format: &OutputFormat, public_key: &str) -> Result<(), CliError> {
        let mut wg = self.ctx.load_wireguard()?;
        let peer = wg.remove_peer(public_key)?;
        wg.save()?;

        self.ctx
            .runner
            .run(&self.ctx.cancel, "wg", &["set", wg.iface(), "peer", public_key, "remove"])
            .await?;
        info!(iface = %wg.iface(), name = %peer.name, "peer removed");

        format.write(
            writer,
            &RemovedPeer {
                peer: PeerView::from(&peer),
            },
        )
    }
}

/// Turns `ip` into a single-host route, keeping an explicit prefix.
fn host_route(ip: &str) -> Result<String, CliError> {
    let ip = ip.trim();
    let (host, prefix) = ip.split_once('/').map_or((ip, None), |(h, p)| (h, Some(p)));
    host.parse::<Ipv4Addr>()
        .map_err(|e| CliError::InvalidArgument(format!("'{host}' is not an IPv4 address: {e}")))?;
    match prefix {
        Some(prefix) if prefix.parse::<u8>().is_ok_and(|p| p <= 32) => Ok(ip.to_string()),
        Some(prefix) => Err(CliError::InvalidArgument(format!("invalid prefix length '/{prefix}'"))),
        None => Ok(format!("{host}/32")),
    }
}
