//! DNS provider selection and credentials.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};

/// Supported DNS providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsProviderKind {
    /// AWS Route 53.
    Route53,
    /// Name.com.
    Namecom,
    /// Cloudflare.
    Cloudflare,
}

impl DnsProviderKind {
    /// Returns the configuration name of the provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Route53 => "route53",
            Self::Namecom => "namecom",
            Self::Cloudflare => "cloudflare",
        }
    }
}

impl fmt::Display for DnsProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DnsProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "route53" => Ok(Self::Route53),
            "namecom" => Ok(Self::Namecom),
            "cloudflare" => Ok(Self::Cloudflare),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }
}

/// Provider choice plus the credentials it needs.
///
/// Only the fields of the selected provider are used.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsProviderConfig {
    /// Which provider to use.
    #[serde(rename = "type")]
    pub kind: DnsProviderKind,

    /// Route 53 access key id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aws_access_key_id: String,
    /// Route 53 secret access key.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aws_secret_access_key: String,
    /// Route 53 region.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aws_region: String,
    /// Route 53 hosted zone id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aws_hosted_zone_id: String,
    /// Named AWS profile to use instead of keys.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub aws_profile: String,

    /// Name.com account user name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namecom_username: String,
    /// Name.com API token.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namecom_api_token: String,

    /// Cloudflare API token with DNS edit permission.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cloudflare_api_token: String,
    /// Cloudflare zone id.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cloudflare_zone_id: String,
}

impl DnsProviderConfig {
    /// Creates a configuration for `kind` with no credentials.
    #[must_use]
    pub fn new(kind: DnsProviderKind) -> Self {
        Self {
            kind,
            aws_access_key_id: String::new(),
            aws_secret_access_key: String::new(),
            aws_region: String::new(),
            aws_hosted_zone_id: String::new(),
            aws_profile: String::new(),
            namecom_username: String::new(),
            namecom_api_token: String::new(),
            cloudflare_api_token: String::new(),
            cloudflare_zone_id: String::new(),
        }
    }

    /// Returns the environment variables the ACME client's provider reads.
    ///
    /// Empty settings are left out so that values already present in the
    /// client's environment are not overridden. The current process
    /// environment is not modified.
    #[must_use]
    pub fn environment(&self) -> Vec<(&'static str, String)> {
        let candidates: Vec<(&'static str, &str)> = match self.kind {
            DnsProviderKind::Route53 => vec![
                ("AWS_ACCESS_KEY_ID", self.aws_access_key_id.as_str()),
                ("AWS_SECRET_ACCESS_KEY", self.aws_secret_access_key.as_str()),
                ("AWS_REGION", self.aws_region.as_str()),
                ("AWS_HOSTED_ZONE_ID", self.aws_hosted_zone_id.as_str()),
                ("AWS_PROFILE", self.aws_profile.as_str()),
            ],
            DnsProviderKind::Namecom => vec![
                ("NAMECOM_USERNAME", self.namecom_username.as_str()),
                ("NAMECOM_API_TOKEN", self.namecom_api_token.as_str()),
            ],
            DnsProviderKind::Cloudflare => {
                let mut vars = vec![("CF_DNS_API_TOKEN", self.cloudflare_api_token.as_str())];
                // The zone API is accessed with the same token.
                if !self.cloudflare_zone_id.is_empty() {
                    vars.push(("CF_ZONE_API_TOKEN", self.cloudflare_api_token.as_str()));
                }
                vars
            }
        };

        candidates
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name, value.to_string()))
            .collect()
    }

    /// Checks that the credentials the provider cannot work without are set.
    ///
    /// Route 53 falls back to the default AWS credential chain, so nothing is
    /// required for it.
    pub fn validate(&self) -> Result<()> {
        let required: Vec<(&'static str, &str)> = match self.kind {
            DnsProviderKind::Route53 => Vec::new(),
            DnsProviderKind::Namecom => vec![
                ("namecom_username", self.namecom_username.as_str()),
                ("namecom_api_token", self.namecom_api_token.as_str()),
            ],
            DnsProviderKind::Cloudflare => vec![("cloudflare_api_token", self.cloudflare_api_token.as_str())],
        };
        match required.into_iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(ProviderError::MissingCredential {
                provider: self.kind,
                field,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for DnsProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &str) -> &'static str {
            if value.is_empty() { "" } else { "[REDACTED]" }
        }

        f.debug_struct("DnsProviderConfig")
            .field("kind", &self.kind)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &redact(&self.aws_secret_access_key))
            .field("aws_region", &self.aws_region)
            .field("aws_hosted_zone_id", &self.aws_hosted_zone_id)
            .field("aws_profile", &self.aws_profile)
            .field("namecom_username", &self.namecom_username)
            .field("namecom_api_token", &redact(&self.namecom_api_token))
            .field("cloudflare_api_token", &redact(&self.cloudflare_api_token))
            .field("cloudflare_zone_id", &self.cloudflare_zone_id)
            .finish()
    }
}

/// Returns the provider name for display, `"unknown"` when none is configured.
#[must_use]
pub fn provider_name(config: Option<&DnsProviderConfig>) -> &'static str {
    config.map_or("unknown", |c| c.kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("route53", DnsProviderKind::Route53)]
    #[test_case("namecom", DnsProviderKind::Namecom)]
    #[test_case("cloudflare", DnsProviderKind::Cloudflare)]
    fn kind_from_str(input: &str, expected: DnsProviderKind) {
        assert_eq!(input.parse::<DnsProviderKind>().expect("known"), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn unknown_kind() {
        let err = "godaddy".parse::<DnsProviderKind>().expect_err("unknown");
        assert_eq!(err, ProviderError::UnknownProvider("godaddy".to_string()));
    }

    #[test]
    fn route53_environment_skips_empty() {
        let mut cfg = DnsProviderConfig::new(DnsProviderKind::Route53);
        cfg.aws_access_key_id = "AKIA123".into();
        cfg.aws_secret_access_key = "secret".into();
        cfg.aws_region = "us-east-1".into();

        assert_eq!(
            cfg.environment(),
            vec![
                ("AWS_ACCESS_KEY_ID", "AKIA123".to_string()),
                ("AWS_SECRET_ACCESS_KEY", "secret".to_string()),
                ("AWS_REGION", "us-east-1".to_string()),
            ]
        );
    }

    #[test]
    fn namecom_environment() {
        let mut cfg = DnsProviderConfig::new(DnsProviderKind::Namecom);
        cfg.namecom_username = "me".into();
        cfg.namecom_api_token = "tok".into();
        cfg.aws_region = "ignored".into();

        assert_eq!(
            cfg.environment(),
            vec![("NAMECOM_USERNAME", "me".to_string()), ("NAMECOM_API_TOKEN", "tok".to_string())]
        );
    }

    #[test]
    fn cloudflare_zone_reuses_token() {
        let mut cfg = DnsProviderConfig::new(DnsProviderKind::Cloudflare);
        cfg.cloudflare_api_token = "cf-token".into();
        assert_eq!(cfg.environment(), vec![("CF_DNS_API_TOKEN", "cf-token".to_string())]);

        cfg.cloudflare_zone_id = "zone-1".into();
        assert_eq!(
            cfg.environment(),
            vec![
                ("CF_DNS_API_TOKEN", "cf-token".to_string()),
                ("CF_ZONE_API_TOKEN", "cf-token".to_string()),
            ]
        );
    }

    #[test]
    fn validate_required_credentials() {
        assert!(DnsProviderConfig::new(DnsProviderKind::Route53).validate().is_ok());

        let mut cfg = DnsProviderConfig::new(DnsProviderKind::Namecom);
        cfg.namecom_username = "me".into();
        assert_eq!(
            cfg.validate(),
            Err(ProviderError::MissingCredential {
                provider: DnsProviderKind::Namecom,
                field: "namecom_api_token",
            })
        );

        let mut cfg = DnsProviderConfig::new(DnsProviderKind::Cloudflare);
        assert!(cfg.validate().is_err());
        cfg.cloudflare_api_token = "t".into();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn provider_names() {
        assert_eq!(provider_name(None), "unknown");
        let cfg = DnsProviderConfig::new(DnsProviderKind::Cloudflare);
        assert_eq!(provider_name(Some(&cfg)), "cloudflare");
    }

    #[test]
    fn serde_uses_lowercase_type() {
        let cfg: DnsProviderConfig =
            serde_json::from_str(r#"{"type": "route53", "aws_region": "eu-west-1"}"#).expect("parse");
        assert_eq!(cfg.kind, DnsProviderKind::Route53);
        assert_eq!(cfg.aws_region, "eu-west-1");

        let json = serde_json::to_value(&cfg).expect("json");
        assert_eq!(json["type"], "route53");
        assert!(json.get("aws_access_key_id").is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut cfg = DnsProviderConfig::new(DnsProviderKind::Cloudflare);
        cfg.cloudflare_api_token = "super-secret".into();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
