//! The DNS provider contract and its logging wrapper.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::Result;

/// How long the ACME client waits for a TXT record to propagate, and how
/// often it checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropagationTimeout {
    /// Total time to wait.
    pub timeout: Duration,
    /// Interval between checks.
    pub interval: Duration,
}

impl Default for PropagationTimeout {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            interval: Duration::from_secs(5),
        }
    }
}

/// Publishes and removes DNS-01 challenge records.
#[allow(async_fn_in_trait)]
pub trait DnsProvider {
    /// Creates the TXT record proving control of `domain`.
    async fn present(&self, domain: &str, token: &str, key_auth: &str) -> Result<()>;

    /// Removes the TXT record created by [`DnsProvider::present`].
    async fn clean_up(&self, domain: &str, token: &str, key_auth: &str) -> Result<()>;

    /// Returns a provider-specific propagation timeout, if any.
    fn timeout(&self) -> Option<PropagationTimeout> {
        None
    }
}

/// Returns the name of the TXT record used for `domain`.
#[must_use]
pub fn challenge_record(domain: &str) -> String {
    format!("_acme-challenge.{domain}")
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Logs the record name and duration of every provider call.
///
/// Results are passed through unchanged.
#[derive(Debug)]
pub struct InstrumentedProvider<P> {
    inner: P,
}

impl<P: DnsProvider> InstrumentedProvider<P> {
    /// Wraps `inner`.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// Returns the wrapped provider.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: DnsProvider> DnsProvider for InstrumentedProvider<P> {
    async fn present(&self, domain: &str, token: &str, key_auth: &str) -> Result<()> {
        let record = challenge_record(domain);
        info!(%record, "creating DNS TXT record");

        let start = Instant::now();
        let result = self.inner.present(domain, token, key_auth).await;
        let elapsed_ms = elapsed_ms(start);

        match &result {
            Ok(()) => info!(%record, elapsed_ms, "DNS record created, waiting for propagation"),
            Err(e) => warn!(%record, elapsed_ms, error = %e, "failed to create DNS record"),
        }
        result
    }

    async fn clean_up(&self, domain: &str, token: &str, key_auth: &str) -> Result<()> {
        let record = challenge_record(domain);
        info!(%record, "cleaning up DNS TXT record");

        let start = Instant::now();
        let result = self.inner.clean_up(domain, token, key_auth).await;
        let elapsed_ms = elapsed_ms(start);

        match &result {
            Ok(()) => info!(%record, elapsed_ms, "DNS record cleaned up"),
            Err(e) => warn!(%record, elapsed_ms, error = %e, "failed to clean up DNS record"),
        }
        result
    }

    fn timeout(&self) -> Option<PropagationTimeout> {
        Some(self.inner.timeout().unwrap_or_default())
    }
}

/// A provider that may or may not be instrumented.
#[derive(Debug)]
pub enum MaybeInstrumented<P> {
    /// Calls go straight to the provider.
    Plain(P),
    /// Calls are logged.
    Instrumented(InstrumentedProvider<P>),
}

impl<P: DnsProvider> DnsProvider for MaybeInstrumented<P> {
    async fn present(&self, domain: &str, token: &str, key_auth: &str) -> Result<()> {
        match self {
            Self::Plain(p) => p.present(domain, token, key_auth).await,
            Self::Instrumented(p) => p.present(domain, token, key_auth).await,
        }
    }

    async fn clean_up(&self, domain: &str, token: &str, key_auth: &str) -> Result<()> {
        match self {
            Self::Plain(p) => p.clean_up(domain, token, key_auth).await,
            Self::Instrumented(p) => p.clean_up(domain, token, key_auth).await,
        }
    }

    fn timeout(&self) -> Option<PropagationTimeout> {
        match self {
            Self::Plain(p) => p.timeout(),
            Self::Instrumented(p) => p.timeout(),
        }
    }
}

/// Wraps `provider` with logging when `enabled` is set.
pub fn wrap_with_logging<P: DnsProvider>(provider: P, enabled: bool) -> MaybeInstrumented<P> {
    if enabled {
        MaybeInstrumented::Instrumented(InstrumentedProvider::new(provider))
    } else {
        MaybeInstrumented::Plain(provider)
    }
}
