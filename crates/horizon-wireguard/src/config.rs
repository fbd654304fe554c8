//! WireGuard configuration file model.
//!
//! Parses and renders the INI-style format consumed by `wg-quick`. The parser
//! is lenient: it never fails, unknown keys are carried through untouched, and
//! a peer without a `PublicKey` is kept with an empty key.

use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};

use horizon_system::{FileSystem, RealFileSystem};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, WireGuardError};
use crate::keys::validate_public_key;

/// Permission bits for the written configuration. It contains the private key.
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// A `key = value` line that the model does not interpret.
pub type ExtraField = (String, String);

/// The `[Interface]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Interface {
    /// Base64 private key of the gateway.
    pub private_key: String,
    /// Gateway address in CIDR notation, e.g. `10.100.0.1/24`.
    pub address: String,
    /// UDP listen port, kept as written.
    pub listen_port: String,
    /// Shell command run by `wg-quick` after bringing the interface up.
    pub post_up: String,
    /// Shell command run by `wg-quick` after taking the interface down.
    pub post_down: String,
    /// Unrecognized keys, in file order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<ExtraField>,
}

/// A `[Peer]` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Peer {
    /// Name taken from the `# name` comment, empty if there is none.
    pub name: String,
    /// Base64 public key, empty if the section has none.
    pub public_key: String,
    /// Comma-separated CIDRs routed to this peer, as written.
    pub allowed_ips: String,
    /// Unrecognized keys such as `Endpoint` or `PersistentKeepalive`, in file order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<ExtraField>,
}

impl Peer {
    /// Creates a peer with the given name, key and allowed IPs.
    #[must_use]
    pub fn new(name: impl Into<String>, public_key: impl Into<String>, allowed_ips: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_key: public_key.into(),
            allowed_ips: allowed_ips.into(),
            extra: Vec::new(),
        }
    }

    /// Adds an extra `key = value` line.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Returns the host part of every AllowedIPs entry.
    pub fn allowed_hosts(&self) -> impl Iterator<Item = &str> {
        host_parts(&self.allowed_ips)
    }

    /// Returns `true` if any AllowedIPs entry has `ip` as its host part.
    #[must_use]
    pub fn routes(&self, ip: &str) -> bool {
        self.allowed_hosts().any(|host| host == ip)
    }
}

/// An address that appears in the AllowedIPs of more than one peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DuplicateAllowedIp {
    /// The shared host address.
    pub address: String,
    /// Names of the peers that list it, in file order.
    pub peers: Vec<String>,
}

/// Splits a comma-separated CIDR list into host parts.
pub(crate) fn host_parts(list: &str) -> impl Iterator<Item = &str> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.split_once('/').map_or(entry, |(host, _)| host))
}

/// Returns the trimmed value after the first `=`, or an empty string.
#[must_use]
pub fn extract_value(line: &str) -> &str {
    line.split_once('=').map_or("", |(_, value)| value.trim())
}

/// Returns the trimmed key before the first `=`, or the whole trimmed line.
#[must_use]
pub fn extract_key(line: &str) -> &str {
    line.split_once('=').map_or(line, |(key, _)| key).trim()
}

/// Parser state for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Unset,
    Interface,
    Peer,
}

/// Parsed contents of a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigContents {
    /// The `[Interface]` section.
    pub interface: Interface,
    /// Peers in file order.
    pub peers: Vec<Peer>,
}

impl ConfigContents {
    /// Parses configuration text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut contents = Self::default();
        let mut section = Section::Unset;
        // Name comment waiting for the current peer's first key line.
        let mut pending_name: Option<String> = None;
        let mut peer_has_key_line = false;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(comment) = line.strip_prefix('#') {
                if section == Section::Peer && !peer_has_key_line {
                    pending_name = Some(comment.trim().to_string());
                }
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                pending_name = None;
                section = match &line[1..line.len() - 1] {
                    "Interface" => Section::Interface,
                    "Peer" => {
                        contents.peers.push(Peer::default());
                        peer_has_key_line = false;
                        Section::Peer
                    }
                    other => {
                        debug!(section = other, "ignoring unknown section");
                        Section::Unset
                    }
                };
                continue;
            }

            let key = extract_key(line);
            let value = extract_value(line).to_string();

            match section {
                Section::Unset => {}
                Section::Interface => {
                    let iface = &mut contents.interface;
                    match key {
                        "PrivateKey" => iface.private_key = value,
                        "Address" => iface.address = value,
                        "ListenPort" => iface.listen_port = value,
                        "PostUp" => iface.post_up = value,
                        "PostDown" => iface.post_down = value,
                        _ => iface.extra.push((key.to_string(), value)),
                    }
                }
                Section::Peer => {
                    let Some(peer) = contents.peers.last_mut() else {
                        continue;
                    };
                    if !peer_has_key_line {
                        peer_has_key_line = true;
                        if let Some(name) = pending_name.take() {
                            peer.name = name;
                        }
                    }
                    match key {
                        "PublicKey" => peer.public_key = value,
                        "AllowedIPs" => peer.allowed_ips = value,
                        _ => peer.extra.push((key.to_string(), value)),
                    }
                }
            }
        }

        contents
    }

    /// Renders the configuration text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();
        let iface = &self.interface;

        output.push_str("[Interface]\n");
        for (key, value) in [
            ("PrivateKey", &iface.private_key),
            ("Address", &iface.address),
            ("ListenPort", &iface.listen_port),
            ("PostUp", &iface.post_up),
            ("PostDown", &iface.post_down),
        ] {
            if !value.is_empty() {
                let _ = writeln!(output, "{key} = {value}");
            }
        }
        for (key, value) in &iface.extra {
            let _ = writeln!(output, "{key} = {value}");
        }

        for peer in &self.peers {
            output.push_str("\n[Peer]\n");
            if !peer.name.is_empty() {
                let _ = writeln!(output, "# {}", peer.name);
            }
            if !peer.public_key.is_empty() {
                let _ = writeln!(output, "PublicKey = {}", peer.public_key);
            }
            if !peer.allowed_ips.is_empty() {
                let _ = writeln!(output, "AllowedIPs = {}", peer.allowed_ips);
            }
            for (key, value) in &peer.extra {
                let _ = writeln!(output, "{key} = {value}");
            }
        }

        output
    }

    /// Returns every host address listed by more than one peer.
    #[must_use]
    pub fn duplicate_allowed_ips(&self) -> Vec<DuplicateAllowedIp> {
        let mut seen: Vec<DuplicateAllowedIp> = Vec::new();
        for peer in &self.peers {
            for host in peer.allowed_hosts() {
                match seen.iter_mut().find(|d| d.address == host) {
                    Some(entry) => entry.peers.push(peer.name.clone()),
                    None => seen.push(DuplicateAllowedIp {
                        address: host.to_string(),
                        peers: vec![peer.name.clone()],
                    }),
                }
            }
        }
        seen.retain(|d| d.peers.len() > 1);
        seen
    }
}

/// A WireGuard interface configuration bound to a file.
///
/// The file is accessed only through the [`FileSystem`] the value was built
/// with, so a [`DryRunFileSystem`](horizon_system::DryRunFileSystem) turns
/// every save into a recorded preview.
#[derive(Debug)]
pub struct WireGuardConfig<F = RealFileSystem> {
    path: PathBuf,
    iface: String,
    fs: F,
    contents: ConfigContents,
}

impl WireGuardConfig<RealFileSystem> {
    /// Creates an empty configuration for `path` backed by the host filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, iface: impl Into<String>) -> Self {
        Self::with_fs(path, iface, RealFileSystem::new())
    }
}

impl<F: FileSystem> WireGuardConfig<F> {
    /// Creates an empty configuration for `path` backed by `fs`.
    #[must_use]
    pub fn with_fs(path: impl Into<PathBuf>, iface: impl Into<String>, fs: F) -> Self {
        Self {
            path: path.into(),
            iface: iface.into(),
            fs,
            contents: ConfigContents::default(),
        }
    }

    /// Reads and parses the file, replacing the current state.
    ///
    /// On error the previous state is left untouched.
    pub fn load(&mut self) -> Result<()> {
        let raw = self.fs.read_file(&self.path)?;
        let contents = ConfigContents::parse(&String::from_utf8_lossy(&raw));

        for dup in contents.duplicate_allowed_ips() {
            warn!(
                iface = %self.iface,
                address = %dup.address,
                peers = ?dup.peers,
                "allowed IP is listed by more than one peer"
            );
        }
        info!(path = %self.path.display(), peers = contents.peers.len(), "loaded WireGuard config");

        self.contents = contents;
        Ok(())
    }

    /// Writes the rendered configuration back to the file.
    pub fn save(&self) -> Result<()> {
        self.fs
            .write_file(&self.path, self.render().as_bytes(), CONFIG_FILE_MODE)?;
        info!(path = %self.path.display(), peers = self.contents.peers.len(), "saved WireGuard config");
        Ok(())
    }

    /// Renders the current state as configuration text.
    #[must_use]
    pub fn render(&self) -> String {
        self.contents.render()
    }

    /// Appends a peer.
    ///
    /// The public key must be well-formed and unused, and none of the peer's
    /// AllowedIPs may already be routed to another peer.
    pub fn add_peer(&mut self, peer: Peer) -> Result<()> {
        if !validate_public_key(&peer.public_key) {
            return Err(WireGuardError::InvalidKey(format!(
                "'{}' is not a 44 character base64 public key",
                peer.public_key
            )));
        }
        if self.peers().iter().any(|p| p.public_key == peer.public_key) {
            return Err(WireGuardError::PeerExists {
                public_key: peer.public_key,
            });
        }
        for host in peer.allowed_hosts() {
            if let Some(owner) = self.peer_by_ip(host) {
                return Err(WireGuardError::DuplicateAllowedIp {
                    address: host.to_string(),
                    peer: owner.name.clone(),
                });
            }
        }

        debug!(iface = %self.iface, name = %peer.name, allowed_ips = %peer.allowed_ips, "adding peer");
        self.contents.peers.push(peer);
        Ok(())
    }

    /// Removes the peer with `public_key` and returns it.
    pub fn remove_peer(&mut self, public_key: &str) -> Result<Peer> {
        let index = self
            .contents
            .peers
            .iter()
            .position(|p| p.public_key == public_key)
            .ok_or_else(|| WireGuardError::PeerNotFound {
                public_key: public_key.to_string(),
            })?;
        let peer = self.contents.peers.remove(index);
        debug!(iface = %self.iface, name = %peer.name, "removed peer");
        Ok(peer)
    }

    /// Returns the peers in file order.
    #[must_use]
    pub fn peers(&self) -> &[Peer] {
        &self.contents.peers
    }

    /// Returns the first peer, in file order, that routes `ip`.
    #[must_use]
    pub fn peer_by_ip(&self, ip: &str) -> Option<&Peer> {
        let ip = ip.trim();
        self.contents.peers.iter().find(|p| p.routes(ip))
    }

    /// Returns every address listed by more than one peer.
    #[must_use]
    pub fn duplicate_allowed_ips(&self) -> Vec<DuplicateAllowedIp> {
        self.contents.duplicate_allowed_ips()
    }

    /// Returns the `[Interface]` section.
    #[must_use]
    pub fn interface(&self) -> &Interface {
        &self.contents.interface
    }

    /// Returns the gateway address in CIDR notation.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.contents.interface.address
    }

    /// Returns the gateway private key.
    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.contents.interface.private_key
    }

    /// Returns the listen port as written.
    #[must_use]
    pub fn listen_port(&self) -> &str {
        &self.contents.interface.listen_port
    }

    /// Returns the `PostUp` command.
    #[must_use]
    pub fn post_up(&self) -> &str {
        &self.contents.interface.post_up
    }

    /// Returns the `PostDown` command.
    #[must_use]
    pub fn post_down(&self) -> &str {
        &self.contents.interface.post_down
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the interface name.
    #[must_use]
    pub fn iface(&self) -> &str {
        &self.iface
    }

    /// Returns the filesystem this configuration reads and writes through.
    #[must_use]
    pub fn fs(&self) -> &F {
        &self.fs
    }
}

#[cfg(test)]
mod tests {
    use horizon_system::DryRunFileSystem;
    use test_case::test_case;

    use super::*;

    const SAMPLE: &str = "[Interface]
PrivateKey = cGFzc3dvcmQ=
Address = 10.100.0.1/24
ListenPort = 51820
PostUp = iptables -A FORWARD -i %i -j ACCEPT
PostDown = iptables -D FORWARD -i %i -j ACCEPT

[Peer]
# alice
PublicKey = YWxpY2VrZXk=
AllowedIPs = 10.100.0.2/32

[Peer]
# bob
PublicKey = Ym9ia2V5
AllowedIPs = 10.100.0.3/32
";

    const VALID_KEY: &str = "YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=";

    fn loaded(text: &str) -> WireGuardConfig<DryRunFileSystem> {
        let fs = DryRunFileSystem::new();
        fs.add_file("/etc/wireguard/wg0.conf", text);
        let mut cfg = WireGuardConfig::with_fs("/etc/wireguard/wg0.conf", "wg0", fs);
        cfg.load().expect("load");
        cfg
    }

    #[test]
    fn new_keeps_identity() {
        let cfg = WireGuardConfig::new("/etc/wireguard/wg0.conf", "wg0");
        assert_eq!(cfg.path(), Path::new("/etc/wireguard/wg0.conf"));
        assert_eq!(cfg.iface(), "wg0");
        assert!(cfg.peers().is_empty());
    }

    #[test]
    fn load_from_real_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wg0.conf");
        std::fs::write(&path, SAMPLE).expect("write");

        let mut cfg = WireGuardConfig::new(&path, "wg0");
        cfg.load().expect("load");

        assert_eq!(cfg.private_key(), "cGFzc3dvcmQ=");
        assert_eq!(cfg.address(), "10.100.0.1/24");
        assert_eq!(cfg.listen_port(), "51820");
        assert_eq!(cfg.post_up(), "iptables -A FORWARD -i %i -j ACCEPT");
        assert_eq!(cfg.post_down(), "iptables -D FORWARD -i %i -j ACCEPT");

        let peers = cfg.peers();
        assert_eq!(peers.len(), 2);
        assert_eq!(peers[0].name, "alice");
        assert_eq!(peers[0].public_key, "YWxpY2VrZXk=");
        assert_eq!(peers[0].allowed_ips, "10.100.0.2/32");
        assert_eq!(peers[1].name, "bob");
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let mut cfg = WireGuardConfig::new("/nonexistent/wg0.conf", "wg0");
        let err = cfg.load().expect_err("missing");
        assert!(err.is_not_found());
        assert!(cfg.peers().is_empty());
        assert_eq!(cfg.address(), "");
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wg0.conf");
        std::fs::write(&path, SAMPLE).expect("write");

        let mut cfg = WireGuardConfig::new(&path, "wg0");
        cfg.load().expect("load");
        std::fs::remove_file(&path).expect("remove");

        assert!(cfg.load().is_err());
        assert_eq!(cfg.peers().len(), 2);
        assert_eq!(cfg.address(), "10.100.0.1/24");
    }

    #[test]
    fn reload_replaces_peers() {
        let mut cfg = loaded(SAMPLE);
        cfg.fs().add_file("/etc/wireguard/wg0.conf", "[Interface]\nAddress = 10.0.0.1/24\n");
        cfg.load().expect("reload");
        assert!(cfg.peers().is_empty());
        assert_eq!(cfg.private_key(), "");
    }

    #[test]
    fn peer_by_ip_matches_host_part() {
        let cfg = loaded(SAMPLE);
        assert_eq!(cfg.peer_by_ip("10.100.0.2").map(|p| p.name.as_str()), Some("alice"));
        assert_eq!(cfg.peer_by_ip("10.100.0.3").map(|p| p.name.as_str()), Some("bob"));
        assert!(cfg.peer_by_ip("10.100.0.99").is_none());
    }

    #[test]
    fn peer_by_ip_searches_every_entry() {
        let cfg = loaded(
            "[Peer]\n# carol\nPublicKey = a\nAllowedIPs = 10.100.0.7/32, 192.168.5.0/24\n",
        );
        assert_eq!(cfg.peer_by_ip("192.168.5.0").map(|p| p.name.as_str()), Some("carol"));
    }

    #[test_case("PrivateKey = abc123", "abc123")]
    #[test_case("Address = 10.0.0.1/24", "10.0.0.1/24")]
    #[test_case("ListenPort = 51820", "51820")]
    #[test_case("NoEquals", "")]
    #[test_case("Key=ValueNoSpaces", "ValueNoSpaces")]
    #[test_case("Key = Value With Spaces", "Value With Spaces")]
    #[test_case("PresharedKey = abc=", "abc=" ; "splits at first equals")]
    fn extract_value_cases(line: &str, expected: &str) {
        assert_eq!(extract_value(line), expected);
    }

    #[test_case("PrivateKey = abc", "PrivateKey")]
    #[test_case("  Key=Value", "Key")]
    #[test_case("NoEquals", "NoEquals")]
    fn extract_key_cases(line: &str, expected: &str) {
        assert_eq!(extract_key(line), expected);
    }

    #[test]
    fn last_comment_before_first_key_wins() {
        let contents = ConfigContents::parse("[Peer]\n# old name\n\n# laptop\nPublicKey = k\n# trailing\n");
        assert_eq!(contents.peers[0].name, "laptop");
    }

    #[test]
    fn comment_before_section_does_not_name_peer() {
        let contents = ConfigContents::parse("# header\n[Peer]\nPublicKey = k\n");
        assert_eq!(contents.peers[0].name, "");
    }

    #[test]
    fn peer_without_key_is_kept() {
        let contents = ConfigContents::parse("[Peer]\n# ghost\nAllowedIPs = 10.100.0.9/32\n");
        assert_eq!(contents.peers.len(), 1);
        assert_eq!(contents.peers[0].public_key, "");
        assert_eq!(contents.peers[0].name, "ghost");
    }

    #[test]
    fn keys_before_any_section_are_ignored() {
        let contents = ConfigContents::parse("Address = 1.2.3.4/32\n[Interface]\nListenPort = 1\n");
        assert_eq!(contents.interface.address, "");
        assert!(contents.interface.extra.is_empty());
        assert_eq!(contents.interface.listen_port, "1");
    }

    #[test]
    fn unknown_keys_are_preserved_in_order() {
        let contents = ConfigContents::parse(
            "[Interface]\nMTU = 1420\nDNS = 10.100.0.1\n[Peer]\nPublicKey = k\nEndpoint = 1.2.3.4:51820\nPersistentKeepalive = 25\n",
        );
        assert_eq!(
            contents.interface.extra,
            vec![("MTU".to_string(), "1420".to_string()), ("DNS".to_string(), "10.100.0.1".to_string())]
        );
        assert_eq!(contents.peers[0].extra.len(), 2);
        assert_eq!(contents.peers[0].extra[0].0, "Endpoint");
    }

    #[test]
    fn render_then_parse_preserves_model() {
        let original = ConfigContents::parse(
            "[Interface]\nPrivateKey = cGFzc3dvcmQ=\nAddress = 10.100.0.1/24\nMTU = 1420\n\n[Peer]\n# alice\nPublicKey = YWxpY2VrZXk=\nAllowedIPs = 10.100.0.2/32\nPersistentKeepalive = 25\n\n[Peer]\nPublicKey = Ym9ia2V5\n",
        );
        let reparsed = ConfigContents::parse(&original.render());
        assert_eq!(reparsed, original);
    }

    #[test]
    fn render_layout() {
        let contents = ConfigContents::parse(SAMPLE);
        let rendered = contents.render();
        assert!(rendered.starts_with("[Interface]\nPrivateKey = cGFzc3dvcmQ=\n"));
        assert!(rendered.contains("\n[Peer]\n# alice\nPublicKey = YWxpY2VrZXk=\nAllowedIPs = 10.100.0.2/32\n"));
    }

    #[test]
    fn save_writes_through_filesystem_with_private_mode() {
        let mut cfg = loaded(SAMPLE);
        cfg.add_peer(Peer::new("carol", VALID_KEY, "10.100.0.4/32")).expect("add");
        cfg.save().expect("save");

        let written = cfg.fs().written_files();
        let data = written
            .get(Path::new("/etc/wireguard/wg0.conf"))
            .expect("config written");
        let text = String::from_utf8_lossy(data);
        assert!(text.contains("# carol\nPublicKey = YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=\n"));
    }

    #[cfg(unix)]
    #[test]
    fn save_to_real_file_is_owner_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wg0.conf");
        let cfg = WireGuardConfig::new(&path, "wg0");
        cfg.save().expect("save");
        let info = RealFileSystem::new().stat(&path).expect("stat");
        assert_eq!(info.mode, CONFIG_FILE_MODE);
    }

    #[test]
    fn add_peer_rejects_invalid_key() {
        let mut cfg = loaded(SAMPLE);
        let err = cfg.add_peer(Peer::new("dave", "short", "10.100.0.9/32")).expect_err("invalid");
        assert!(matches!(err, WireGuardError::InvalidKey(_)));
        assert_eq!(cfg.peers().len(), 2);
    }

    #[test]
    fn add_peer_rejects_duplicate_key() {
        let mut cfg = loaded(SAMPLE);
        cfg.add_peer(Peer::new("carol", VALID_KEY, "10.100.0.4/32")).expect("add");
        let err = cfg.add_peer(Peer::new("carol2", VALID_KEY, "10.100.0.5/32")).expect_err("dup");
        assert!(matches!(err, WireGuardError::PeerExists { .. }));
    }

    #[test]
    fn add_peer_rejects_assigned_address() {
        let mut cfg = loaded(SAMPLE);
        let err = cfg.add_peer(Peer::new("eve", VALID_KEY, "10.100.0.2/32")).expect_err("dup ip");
        assert!(matches!(
            err,
            WireGuardError::DuplicateAllowedIp { ref address, ref peer } if address == "10.100.0.2" && peer == "alice"
        ));
    }

    #[test]
    fn remove_peer_by_key() {
        let mut cfg = loaded(SAMPLE);
        let removed = cfg.remove_peer("YWxpY2VrZXk=").expect("remove");
        assert_eq!(removed.name, "alice");
        assert_eq!(cfg.peers().len(), 1);
        assert!(matches!(cfg.remove_peer("YWxpY2VrZXk="), Err(WireGuardError::PeerNotFound { .. })));
    }

    #[test]
    fn duplicates_are_reported_and_first_match_wins() {
        let cfg = loaded(
            "[Peer]\n# one\nPublicKey = a\nAllowedIPs = 10.100.0.2/32\n[Peer]\n# two\nPublicKey = b\nAllowedIPs = 10.100.0.2/32\n",
        );
        let dups = cfg.duplicate_allowed_ips();
        assert_eq!(dups.len(), 1);
        assert_eq!(dups[0].address, "10.100.0.2");
        assert_eq!(dups[0].peers, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(cfg.peer_by_ip("10.100.0.2").map(|p| p.name.as_str()), Some("one"));
    }

    #[test]
    fn peer_serializes_without_empty_extra() {
        let json = serde_json::to_value(Peer::new("alice", "k", "10.100.0.2/32")).expect("json");
        assert_eq!(json["name"], "alice");
        assert!(json.get("extra").is_none());
    }
}
