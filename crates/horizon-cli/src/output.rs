//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;
use std::path::PathBuf;

use horizon_system::{DryRunCommandRunner, DryRunFileSystem};
use horizon_wireguard::Peer;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// One configured peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerView {
    /// Peer name, empty when the config has no comment for it.
    pub name: String,
    /// Base64 public key.
    pub public_key: String,
    /// Addresses routed to the peer.
    pub allowed_ips: String,
}

impl From<&Peer> for PeerView {
    fn from(peer: &Peer) -> Self {
        Self {
            name: peer.name.clone(),
            public_key: peer.public_key.clone(),
            allowed_ips: peer.allowed_ips.clone(),
        }
    }
}

impl TableDisplay for PeerView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Peer: {}", display_name(&self.name))?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Public Key:   {}", self.public_key)?;
        writeln!(writer, "Allowed IPs:  {}", self.allowed_ips)?;
        Ok(())
    }
}

/// Every configured peer.
#[derive(Debug, Clone, Serialize)]
pub struct PeerList {
    /// WireGuard interface name.
    pub interface: String,
    /// Peers in file order.
    pub peers: Vec<PeerView>,
}

impl TableDisplay for PeerList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.peers.is_empty() {
            writeln!(writer, "No peers configured on {}.", self.interface)?;
            return Ok(());
        }

        writeln!(writer, "{:<20} {:<46} ALLOWED IPS", "NAME", "PUBLIC KEY")?;
        writeln!(writer, "{}", "─".repeat(84))?;
        for peer in &self.peers {
            writeln!(
                writer,
                "{:<20} {:<46} {}",
                truncate(display_name(&peer.name), 20),
                peer.public_key,
                peer.allowed_ips
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} peer(s) on {}", self.peers.len(), self.interface)?;
        Ok(())
    }
}

/// The next address available for a new peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextIp {
    /// Range the address was allocated from.
    pub cidr: String,
    /// The free address, as a `/32` host route.
    pub ip: String,
}

impl TableDisplay for NextIp {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Next free address in {}: {}", self.cidr, self.ip)?;
        Ok(())
    }
}

/// Gateway health as reported by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// WireGuard interface name.
    pub interface: String,
    /// VPN address range.
    pub vpn_range: String,
    /// The gateway's own VPN address.
    pub gateway_ip: String,
    /// Number of configured peers.
    pub peer_count: usize,
    /// The WireGuard interface is up.
    pub interface_up: bool,
    /// IPv4 forwarding is enabled.
    pub ip_forwarding: bool,
    /// NAT masquerading covers the VPN range.
    pub masquerading: bool,
    /// Configured DNS provider name.
    pub dns_provider: String,
}

impl StatusReport {
    /// Returns `true` when every live check passed.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        self.interface_up && self.ip_forwarding && self.masquerading
    }
}

impl TableDisplay for StatusReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Gateway Status")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Interface:      {}", self.interface)?;
        writeln!(writer, "VPN Range:      {}", self.vpn_range)?;
        writeln!(writer, "Gateway IP:     {}", self.gateway_ip)?;
        writeln!(writer, "Peers:          {}", self.peer_count)?;
        writeln!(writer, "DNS Provider:   {}", self.dns_provider)?;
        writeln!(writer)?;
        writeln!(writer, "Checks")?;
        writeln!(writer, "  Interface up:   {}", check_mark(self.interface_up))?;
        writeln!(writer, "  IP forwarding:  {}", check_mark(self.ip_forwarding))?;
        writeln!(writer, "  Masquerading:   {}", check_mark(self.masquerading))?;
        Ok(())
    }
}

/// Result of `add-peer`.
#[derive(Debug, Clone, Serialize)]
pub struct AddedPeer {
    /// The new peer.
    pub peer: PeerView,
    /// Generated private key, present only when no public key was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl TableDisplay for AddedPeer {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Added peer '{}'", display_name(&self.peer.name))?;
        writeln!(writer, "  Public Key:   {}", self.peer.public_key)?;
        writeln!(writer, "  Allowed IPs:  {}", self.peer.allowed_ips)?;
        if let Some(private_key) = &self.private_key {
            writeln!(writer)?;
            writeln!(writer, "Generated private key (store it on the client, it is not saved):")?;
            writeln!(writer, "  {private_key}")?;
        }
        Ok(())
    }
}

/// Result of `remove-peer`.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedPeer {
    /// The removed peer.
    pub peer: PeerView,
}

impl TableDisplay for RemovedPeer {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(
            writer,
            "Removed peer '{}' ({})",
            display_name(&self.peer.name),
            self.peer.allowed_ips
        )?;
        Ok(())
    }
}

/// Result of `validate-key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyValidation {
    /// The checked key.
    pub key: String,
    /// Whether it is a well-formed public key.
    pub valid: bool,
}

impl TableDisplay for KeyValidation {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        let verdict = if self.valid { "valid" } else { "invalid" };
        writeln!(writer, "{}: {verdict}", self.key)?;
        Ok(())
    }
}

/// Result of `genkey`.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedKeys {
    /// Base64 private key.
    pub private_key: String,
    /// Base64 public key.
    pub public_key: String,
}

impl TableDisplay for GeneratedKeys {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Private Key:  {}", self.private_key)?;
        writeln!(writer, "Public Key:   {}", self.public_key)?;
        Ok(())
    }
}

/// A file write recorded during a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedWrite {
    /// Target path.
    pub path: PathBuf,
    /// Number of bytes that would be written.
    pub bytes: usize,
}

/// Everything a dry run would have changed on the host.
///
/// File contents are omitted because the WireGuard config holds the
/// interface private key.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DryRunReport {
    /// Files that would be written.
    pub writes: Vec<PlannedWrite>,
    /// Directories that would be created.
    pub directories: Vec<PathBuf>,
    /// Paths that would be removed.
    pub removals: Vec<PathBuf>,
    /// Command lines that would be run, in order.
    pub commands: Vec<String>,
}

impl DryRunReport {
    /// Collect what the dry-run filesystem and runner recorded.
    #[must_use]
    pub fn collect(fs: &DryRunFileSystem, runner: &DryRunCommandRunner) -> Self {
        Self {
            writes: fs
                .written_files()
                .into_iter()
                .map(|(path, data)| PlannedWrite { path, bytes: data.len() })
                .collect(),
            directories: fs.created_dirs().into_iter().collect(),
            removals: fs.removed_files().into_iter().collect(),
            commands: runner.run_commands(),
        }
    }

    /// Returns `true` if nothing would have changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.directories.is_empty() && self.removals.is_empty() && self.commands.is_empty()
    }
}

impl TableDisplay for DryRunReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer)?;
        writeln!(writer, "Dry run: no changes were made")?;
        writeln!(writer, "══════════════════════════════════")?;
        if self.is_empty() {
            writeln!(writer, "Nothing would change.")?;
            return Ok(());
        }
        for dir in &self.directories {
            writeln!(writer, "  mkdir   {}", dir.display())?;
        }
        for write in &self.writes {
            writeln!(writer, "  write   {} ({} bytes)", write.path.display(), write.bytes)?;
        }
        for path in &self.removals {
            writeln!(writer, "  remove  {}", path.display())?;
        }
        for command in &self.commands {
            writeln!(writer, "  run     {command}")?;
        }
        Ok(())
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "(unnamed)" } else { name }
}

fn check_mark(ok: bool) -> &'static str {
    if ok { "✓" } else { "✗" }
}

/// Truncate a string to a maximum character count, adding an ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
