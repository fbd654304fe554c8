//! Error types for DNS challenge providers.

use thiserror::Error;

use crate::config::DnsProviderKind;

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while configuring or driving a DNS provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider name is not one of the supported providers.
    #[error("unknown dns provider type for ACME: {0}")]
    UnknownProvider(String),

    /// A credential the provider cannot work without is empty.
    #[error("{provider} provider requires {field}")]
    MissingCredential {
        /// The provider being configured.
        provider: DnsProviderKind,
        /// The missing setting.
        field: &'static str,
    },

    /// The provider failed to create or remove a record.
    #[error("dns provider failed for {domain}: {message}")]
    Dns {
        /// The domain being validated.
        domain: String,
        /// Description of the failure.
        message: String,
    },
}

impl ProviderError {
    /// Creates a `Dns` error.
    #[must_use]
    pub fn dns(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Dns {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the error is a configuration problem rather than a
    /// failure talking to the DNS provider.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::UnknownProvider(_) | Self::MissingCredential { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ProviderError::UnknownProvider("godaddy".into()).to_string(),
            "unknown dns provider type for ACME: godaddy"
        );
        assert_eq!(
            ProviderError::MissingCredential {
                provider: DnsProviderKind::Namecom,
                field: "namecom_api_token",
            }
            .to_string(),
            "namecom provider requires namecom_api_token"
        );
    }

    #[test]
    fn classification() {
        assert!(ProviderError::UnknownProvider("x".into()).is_config_error());
        assert!(!ProviderError::dns("example.com", "timeout").is_config_error());
    }
}
