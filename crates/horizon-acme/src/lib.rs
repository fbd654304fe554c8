//! DNS-01 challenge provider boundary.
//!
//! Certificates are issued by an external ACME client. This crate defines what
//! that client needs from us: a [`DnsProvider`] that publishes and removes the
//! `_acme-challenge` TXT record, a logging wrapper around it, and the
//! per-provider credential settings with the environment variables the
//! client's providers read.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod provider;

pub use config::{provider_name, DnsProviderConfig, DnsProviderKind};
pub use error::{ProviderError, Result};
pub use provider::{
    challenge_record, wrap_with_logging, DnsProvider, InstrumentedProvider, MaybeInstrumented,
    PropagationTimeout,
};
