//! WireGuard gateway configuration management.
//!
//! This crate owns the textual WireGuard configuration used by `wg-quick`:
//!
//! - [`WireGuardConfig`]: the interface/peer model bound to a config file,
//!   read and written through a [`horizon_system::FileSystem`]
//! - [`next_free_ip`] and [`WireGuardConfig::next_ip`]: peer address allocation
//! - [`validate_public_key`] and key generation
//! - [`StatusChecker`]: read-only probes of the live interface, IP forwarding
//!   and NAT state
//!
//! The cryptographic protocol itself is handled by the kernel or `wireguard-go`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod config;
pub mod error;
pub mod keys;
pub mod status;

pub use address::{next_free_ip, parse_ipv4_range};
pub use config::{
    extract_key, extract_value, ConfigContents, DuplicateAllowedIp, Interface, Peer, WireGuardConfig,
    CONFIG_FILE_MODE,
};
pub use error::{Result, WireGuardError};
pub use keys::{generate_keypair, public_key_from_private, validate_public_key, KeyPair, KEY_SIZE};
pub use status::{StatusChecker, StatusProbes, SystemStatus};
