//! Gateway settings file.

use std::net::{Ipv4Addr, UdpSocket};
use std::path::{Path, PathBuf};

use horizon_acme::DnsProviderConfig;
use horizon_system::FileSystem;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::jsonc::strip_comments;

/// Permission bits for the written settings file.
pub const SETTINGS_FILE_MODE: u32 = 0o644;

/// Permission bits for a settings directory created on save.
pub const SETTINGS_DIR_MODE: u32 = 0o755;

/// Gateway address used when the VPN range is empty or invalid.
pub const FALLBACK_GATEWAY_IP: &str = "10.100.0.1";

/// Locations tried, in order, when no settings path is given.
pub const DEFAULT_SEARCH_PATHS: &[&str] = &[
    "config.json",
    "homelab-horizon.json",
    "/etc/homelab-horizon/config.json",
];

/// Settings for the VPN gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address the management API listens on.
    pub listen_addr: String,
    /// WireGuard interface name.
    pub wg_interface: String,
    /// Path of the WireGuard configuration file.
    pub wg_config_path: PathBuf,
    /// VPN address range handed out to peers.
    pub vpn_range: String,
    /// LAN address of the gateway host. Detected when empty.
    pub local_interface: String,
    /// Routes pushed to clients. Defaults to the VPN range when empty.
    pub allowed_ips: String,
    /// Whether dnsmasq serves DNS to VPN clients.
    pub dnsmasq_enabled: bool,
    /// Public `host:port` clients connect to.
    pub public_endpoint: String,
    /// DNS provider for certificate issuance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_provider: Option<DnsProviderConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: ":8080".to_string(),
            wg_interface: "wg0".to_string(),
            wg_config_path: PathBuf::from("/etc/wireguard/wg0.conf"),
            vpn_range: "10.100.0.0/24".to_string(),
            local_interface: String::new(),
            allowed_ips: String::new(),
            dnsmasq_enabled: true,
            public_endpoint: String::new(),
            dns_provider: None,
        }
    }
}

impl GatewayConfig {
    /// Loads settings from `path`. A missing file yields the defaults.
    ///
    /// `//` and `/* */` comments are allowed. Keys absent from the file keep
    /// their default values.
    pub fn load(fs: &impl FileSystem, path: &Path) -> Result<Self> {
        let raw = match fs.read_file(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "settings file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::io(path, e)),
        };

        let text = strip_comments(&String::from_utf8_lossy(&raw));
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded gateway settings");
        Ok(config)
    }

    /// Writes the settings to `path` as indented JSON, creating the parent
    /// directory if needed.
    pub fn save(&self, fs: &impl FileSystem, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !fs.exists(parent) {
                fs.mkdir_all(parent, SETTINGS_DIR_MODE)
                    .map_err(|e| ConfigError::io(parent, e))?;
            }
        }

        let mut json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        json.push('\n');
        fs.write_file(path, json.as_bytes(), SETTINGS_FILE_MODE)
            .map_err(|e| ConfigError::io(path, e))?;
        info!(path = %path.display(), "saved gateway settings");
        Ok(())
    }

    /// Returns the first of `search_paths` that exists.
    pub fn find<P: AsRef<Path>>(fs: &impl FileSystem, search_paths: &[P]) -> Result<PathBuf> {
        search_paths
            .iter()
            .map(|p| p.as_ref())
            .find(|p| fs.exists(p))
            .map(Path::to_path_buf)
            .ok_or_else(|| ConfigError::NotFound {
                searched: search_paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            })
    }

    /// Loads `explicit` if given, otherwise the first settings file found in
    /// [`DEFAULT_SEARCH_PATHS`], otherwise the defaults.
    pub fn discover(fs: &impl FileSystem, explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::find(fs, DEFAULT_SEARCH_PATHS) {
                Ok(path) => path,
                Err(e) if e.is_not_found() => {
                    debug!(error = %e, "using default gateway settings");
                    return Ok((Self::default(), None));
                }
                Err(e) => return Err(e),
            },
        };
        Ok((Self::load(fs, &path)?, Some(path)))
    }

    /// Returns the gateway's VPN address: the first host of the VPN range.
    #[must_use]
    pub fn gateway_ip(&self) -> String {
        self.vpn_range
            .trim()
            .parse::<Ipv4Net>()
            .ok()
            .and_then(|net| net.hosts().next())
            .map_or_else(|| FALLBACK_GATEWAY_IP.to_string(), |ip| ip.to_string())
    }

    /// Returns the routes clients need to reach the VPN.
    #[must_use]
    pub fn derive_allowed_ips(&self) -> String {
        self.vpn_range.clone()
    }

    /// Returns the configured routes, or the derived ones when none are set.
    #[must_use]
    pub fn effective_allowed_ips(&self) -> String {
        if self.allowed_ips.is_empty() {
            self.derive_allowed_ips()
        } else {
            self.allowed_ips.clone()
        }
    }

    /// Detects the host's outbound LAN address.
    ///
    /// Connecting a UDP socket selects a route without sending anything.
    /// Falls back to `127.0.0.1`.
    #[must_use]
    pub fn detect_local_interface(&self) -> String {
        let detected = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
            .and_then(|socket| {
                socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
                socket.local_addr()
            })
            .map(|addr| addr.ip());

        match detected {
            Ok(ip) if !ip.is_unspecified() => ip.to_string(),
            Ok(_) => Ipv4Addr::LOCALHOST.to_string(),
            Err(e) => {
                debug!(error = %e, "could not detect local interface");
                Ipv4Addr::LOCALHOST.to_string()
            }
        }
    }

    /// Fills [`local_interface`](Self::local_interface) if it is empty.
    pub fn ensure_local_interface(&mut self) {
        if self.local_interface.is_empty() {
            self.local_interface = self.detect_local_interface();
            debug!(local_interface = %self.local_interface, "detected local interface");
        }
    }
}

#[cfg(test)]
mod tests {
    use horizon_acme::DnsProviderKind;
    use horizon_system::{DryRunFileSystem, RealFileSystem};
    use test_case::test_case;

    use super::*;

    #[test]
    fn defaults() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.listen_addr, ":8080");
        assert_eq!(cfg.wg_interface, "wg0");
        assert_eq!(cfg.vpn_range, "10.100.0.0/24");
        assert!(cfg.dnsmasq_enabled);
        assert!(cfg.dns_provider.is_none());
    }

    #[test]
    fn load_overrides_present_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.json");
        std::fs::write(
            &path,
            r#"{"listen_addr": ":9090", "wg_interface": "testwg", "vpn_range": "192.168.100.0/24"}"#,
        )
        .expect("write");

        let cfg = GatewayConfig::load(&RealFileSystem, &path).expect("load");
        assert_eq!(cfg.listen_addr, ":9090");
        assert_eq!(cfg.wg_interface, "testwg");
        assert_eq!(cfg.vpn_range, "192.168.100.0/24");
        assert!(cfg.dnsmasq_enabled);
    }

    #[test]
    fn load_with_comments() {
        let fs = DryRunFileSystem::new();
        fs.add_file(
            "/etc/homelab-horizon/config.json",
            "{\n  // This is a comment\n  \"listen_addr\": \":9090\",\n  /* Another comment */\n  \"wg_interface\": \"testwg\"\n}\n",
        );

        let cfg = GatewayConfig::load(&fs, Path::new("/etc/homelab-horizon/config.json")).expect("load");
        assert_eq!(cfg.listen_addr, ":9090");
        assert_eq!(cfg.wg_interface, "testwg");
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let cfg = GatewayConfig::load(&RealFileSystem, Path::new("/non/existent/config.json")).expect("defaults");
        assert_eq!(cfg, GatewayConfig::default());
    }

    #[test]
    fn load_invalid_json_is_error() {
        let fs = DryRunFileSystem::new();
        fs.add_file("/cfg.json", "{ not json");
        let err = GatewayConfig::load(&fs, Path::new("/cfg.json")).expect_err("invalid");
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("test.json");

        let mut cfg = GatewayConfig::default();
        cfg.listen_addr = ":9999".to_string();
        cfg.wg_interface = "savetest".to_string();
        let mut provider = DnsProviderConfig::new(DnsProviderKind::Cloudflare);
        provider.cloudflare_api_token = "token".to_string();
        cfg.dns_provider = Some(provider);

        cfg.save(&RealFileSystem, &path).expect("save");
        let loaded = GatewayConfig::load(&RealFileSystem, &path).expect("reload");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn dry_run_save_records_dir_and_file() {
        let fs = DryRunFileSystem::new();
        let path = Path::new("/nonexistent-horizon/settings/config.json");
        GatewayConfig::default().save(&fs, path).expect("save");

        assert!(fs.created_dirs().contains(Path::new("/nonexistent-horizon/settings")));
        let written = fs.written_files();
        let text = String::from_utf8_lossy(written.get(path).expect("written"));
        assert!(text.contains("\"wg_interface\": \"wg0\""));
    }

    #[test]
    fn find_returns_first_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("config.json");
        let second = dir.path().join("homelab-horizon.json");
        std::fs::write(&first, "{}").expect("write");
        std::fs::write(&second, "{}").expect("write");

        let search = [dir.path().join("missing.json"), first.clone(), second, PathBuf::from("/non/existent/path")];
        let found = GatewayConfig::find(&RealFileSystem, &search).expect("found");
        assert_eq!(found, first);
    }

    #[test]
    fn find_nothing_is_not_found() {
        let err = GatewayConfig::find(&RealFileSystem, &["/non/existent/a.json", "/non/existent/b.json"])
            .expect_err("none");
        assert!(err.is_not_found());
    }

    #[test]
    fn discover_explicit_path() {
        let fs = DryRunFileSystem::new();
        fs.add_file("/srv/horizon.json", r#"{"wg_interface": "wg7"}"#);
        let (cfg, path) = GatewayConfig::discover(&fs, Some(Path::new("/srv/horizon.json"))).expect("discover");
        assert_eq!(cfg.wg_interface, "wg7");
        assert_eq!(path.as_deref(), Some(Path::new("/srv/horizon.json")));
    }

    #[test_case("10.100.0.0/24", "10.100.0.1")]
    #[test_case("192.168.100.0/24", "192.168.100.1")]
    #[test_case("10.0.0.0/8", "10.0.0.1")]
    #[test_case("", "10.100.0.1" ; "empty range")]
    #[test_case("garbage", "10.100.0.1" ; "invalid range")]
    fn gateway_ip(range: &str, expected: &str) {
        let cfg = GatewayConfig {
            vpn_range: range.to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(cfg.gateway_ip(), expected);
    }

    #[test_case("10.100.0.0/24")]
    #[test_case("192.168.100.0/24")]
    fn derive_allowed_ips(range: &str) {
        let cfg = GatewayConfig {
            vpn_range: range.to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(cfg.derive_allowed_ips(), range);
    }

    #[test]
    fn effective_allowed_ips_prefers_explicit() {
        let mut cfg = GatewayConfig {
            allowed_ips: "10.100.0.0/24, 192.168.1.0/24".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(cfg.effective_allowed_ips(), "10.100.0.0/24, 192.168.1.0/24");

        cfg.allowed_ips.clear();
        assert_eq!(cfg.effective_allowed_ips(), "10.100.0.0/24");
    }

    #[test]
    fn detect_local_interface_is_never_empty() {
        assert!(!GatewayConfig::default().detect_local_interface().is_empty());
    }

    #[test]
    fn ensure_local_interface_fills_only_when_empty() {
        let mut cfg = GatewayConfig::default();
        cfg.ensure_local_interface();
        assert!(!cfg.local_interface.is_empty());

        let mut cfg = GatewayConfig {
            local_interface: "192.168.1.100".to_string(),
            ..GatewayConfig::default()
        };
        cfg.ensure_local_interface();
        assert_eq!(cfg.local_interface, "192.168.1.100");
    }
}
