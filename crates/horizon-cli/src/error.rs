//! CLI error types.

use std::fmt;

use horizon_config::ConfigError;
use horizon_system::CommandError;
use horizon_wireguard::WireGuardError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Gateway settings could not be loaded or saved.
    Config(ConfigError),
    /// WireGuard configuration error.
    WireGuard(WireGuardError),
    /// An external command failed.
    Command(CommandError),
    /// The requested item does not exist.
    NotFound(String),
    /// Invalid argument.
    InvalidArgument(String),
    /// Output formatting error.
    Format(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::WireGuard(e) => write!(f, "wireguard error: {e}"),
            Self::Command(e) => write!(f, "command error: {e}"),
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::WireGuard(e) => Some(e),
            Self::Command(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::NotFound(_) | Self::InvalidArgument(_) | Self::Format(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<WireGuardError> for CliError {
    fn from(err: WireGuardError) -> Self {
        Self::WireGuard(err)
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
