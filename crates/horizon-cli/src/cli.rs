//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Homelab Horizon - WireGuard VPN gateway management.
#[derive(Parser, Debug, Clone)]
#[command(name = "horizon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Gateway settings file. Searched for in the default locations when omitted.
    #[arg(short, long, env = "HORIZON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Record file writes and commands instead of applying them, then print the plan.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List configured peers.
    Peers,

    /// Show the peer that owns an address.
    Peer {
        /// VPN address, e.g. 10.100.0.2.
        ip: String,
    },

    /// Show the next free peer address.
    NextIp {
        /// Range to allocate from. Defaults to the configured VPN range.
        #[arg(long)]
        cidr: Option<String>,
    },

    /// Check interface, IP forwarding and NAT state.
    Status,

    /// Add a peer, save the config and apply it to the running interface.
    AddPeer(AddPeerArgs),

    /// Remove a peer by public key.
    RemovePeer {
        /// The peer's public key.
        public_key: String,
    },

    /// Check the format of a public key.
    ValidateKey {
        /// Base64 public key.
        key: String,
    },

    /// Generate a new key pair.
    Genkey,
}

/// Arguments for `add-peer`.
#[derive(clap::Args, Debug, Clone)]
pub struct AddPeerArgs {
    /// Peer name, stored as a comment above the peer.
    #[arg(long)]
    pub name: String,

    /// The peer's public key. A key pair is generated when omitted.
    #[arg(long)]
    pub public_key: Option<String>,

    /// Address to assign. The next free address is used when omitted.
    #[arg(long)]
    pub ip: Option<String>,
}
