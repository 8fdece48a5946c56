// # Update Provider Trait
//
// Defines the interface for pushing a new address to a dynamic-DNS provider.
//
// ## Implementations
//
// - Hurricane Electric `/nic/update`: `ddns-provider-he` crate

use crate::config::Secret;
use crate::family::IpFamily;
use async_trait::async_trait;
use std::net::IpAddr;

/// Outcome of one (possible) update for one domain and family
///
/// Outcomes are only logged and counted. They are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The domain the outcome is about
    pub domain: String,
    /// The family the outcome is about
    pub family: IpFamily,
    /// Whether a request was sent to the provider
    pub attempted: bool,
    /// Whether the provider accepted it
    pub succeeded: bool,
    /// Human-readable detail (status code, skip reason, error)
    pub detail: String,
}

impl UpdateOutcome {
    /// The provider accepted the update
    pub fn succeeded(domain: impl Into<String>, family: IpFamily, detail: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            family,
            attempted: true,
            succeeded: true,
            detail: detail.into(),
        }
    }

    /// The update was sent but not accepted
    pub fn failed(domain: impl Into<String>, family: IpFamily, detail: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            family,
            attempted: true,
            succeeded: false,
            detail: detail.into(),
        }
    }

    /// No update was sent
    pub fn skipped(domain: impl Into<String>, family: IpFamily, detail: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            family,
            attempted: false,
            succeeded: false,
            detail: detail.into(),
        }
    }
}

/// Trait for dynamic-DNS update endpoints
///
/// # Contract
///
/// - **Single-shot**: one request per call. No retry, no backoff.
/// - **Idempotent**: sending the same address twice is harmless.
/// - A response the provider rejects (non-2xx) is `Ok` with
///   `succeeded == false`. `Err` is reserved for transport failures.
/// - The credential MUST NOT appear in logs or error messages.
/// - Providers never decide whether an update is needed (owned by the engine).
#[async_trait]
pub trait UpdateProvider: Send + Sync {
    /// Point `domain`'s record of `family` at `address`
    async fn update(
        &self,
        domain: &str,
        family: IpFamily,
        credential: &Secret,
        address: IpAddr,
    ) -> Result<UpdateOutcome, crate::Error>;

    /// Provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
