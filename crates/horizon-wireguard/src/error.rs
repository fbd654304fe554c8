//! Error types for WireGuard configuration management.

use std::io;

use horizon_system::CommandError;
use thiserror::Error;

/// Result type alias for WireGuard operations.
pub type Result<T> = std::result::Result<T, WireGuardError>;

/// Errors that can occur while managing a WireGuard configuration.
#[derive(Debug, Error)]
pub enum WireGuardError {
    /// Reading or writing the configuration file failed.
    #[error("config file error: {0}")]
    Io(#[from] io::Error),

    /// A CIDR string could not be parsed or is not IPv4.
    #[error("invalid CIDR '{cidr}': {reason}")]
    InvalidCidr {
        /// The rejected input.
        cidr: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Every host in the range is reserved or assigned.
    #[error("no free addresses left in {cidr}")]
    AddressExhausted {
        /// The exhausted range.
        cidr: String,
    },

    /// A public or private key is malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A peer with this public key is already configured.
    #[error("peer with public key {public_key} already exists")]
    PeerExists {
        /// The duplicate key.
        public_key: String,
    },

    /// No peer with this public key is configured.
    #[error("no peer with public key {public_key}")]
    PeerNotFound {
        /// The key that was looked up.
        public_key: String,
    },

    /// Another peer already routes this address.
    #[error("allowed IP {address} is already assigned to peer '{peer}'")]
    DuplicateAllowedIp {
        /// The conflicting address.
        address: String,
        /// Name of the peer that holds it.
        peer: String,
    },

    /// An external command failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl WireGuardError {
    /// Creates an `InvalidCidr` error.
    #[must_use]
    pub fn invalid_cidr(cidr: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCidr {
            cidr: cidr.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the configuration file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }

    /// Returns `true` if the error was caused by a conflicting peer.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::PeerExists { .. } | Self::DuplicateAllowedIp { .. })
    }
}
