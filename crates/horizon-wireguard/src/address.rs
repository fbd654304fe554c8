//! Peer address allocation.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use horizon_system::FileSystem;
use ipnet::{IpNet, Ipv4Net};

use crate::config::{host_parts, WireGuardConfig};
use crate::error::{Result, WireGuardError};

/// Parses an IPv4 range such as `10.100.0.0/24`.
pub fn parse_ipv4_range(cidr: &str) -> Result<Ipv4Net> {
    match cidr.trim().parse::<IpNet>() {
        Ok(IpNet::V4(net)) => Ok(net),
        Ok(IpNet::V6(_)) => Err(WireGuardError::invalid_cidr(cidr, "only IPv4 ranges are supported")),
        Err(e) => Err(WireGuardError::invalid_cidr(cidr, e.to_string())),
    }
}

/// Returns the first free host in `cidr` as `a.b.c.d/32`.
///
/// Hosts are tried in ascending order. The network and broadcast addresses
/// (for prefixes shorter than /31), the first usable host (the gateway) and
/// every address in `taken` are skipped. Entries of `taken` may be bare
/// addresses or CIDRs; anything that is not IPv4 is ignored.
pub fn next_free_ip<'a>(cidr: &str, taken: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let net = parse_ipv4_range(cidr)?;
    let taken: HashSet<Ipv4Addr> = taken
        .into_iter()
        .flat_map(host_parts)
        .filter_map(|host| host.parse().ok())
        .collect();

    net.hosts()
        .skip(1)
        .find(|host| !taken.contains(host))
        .map(|host| format!("{host}/32"))
        .ok_or_else(|| WireGuardError::AddressExhausted {
            cidr: cidr.to_string(),
        })
}

impl<F: FileSystem> WireGuardConfig<F> {
    /// Returns the next address to hand out to a new peer from `cidr`.
    ///
    /// The interface's own address and every peer's AllowedIPs are treated
    /// as taken. The result depends only on the current state.
    pub fn next_ip(&self, cidr: &str) -> Result<String> {
        let taken = std::iter::once(self.address()).chain(self.peers().iter().map(|p| p.allowed_ips.as_str()));
        next_free_ip(cidr, taken)
    }
}
