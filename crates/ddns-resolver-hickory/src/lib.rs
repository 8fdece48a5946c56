// # hickory-dns Record Resolver
//
// Reads the A/AAAA record a domain currently publishes, straight from a
// chosen nameserver (by default the provider's authoritative `ns1.he.net`)
// instead of the system resolver, so caches between us and the provider
// cannot hide a stale record.
//
// ## Scoping
//
// The nameserver is plain data ([`ResolverSettings`]) owned by the resolver
// value. Every lookup builds its own hickory resolver from those settings
// and drops it when the lookup returns, on success and on error alike.
// Nothing process-wide is ever changed.

use ddns_core::traits::{Published, RecordResolver};
use ddns_core::{Error, IpFamily, Result};

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};

use std::net::IpAddr;
use std::time::Duration;

/// Hurricane Electric's first authoritative nameserver
pub const DEFAULT_NAMESERVER: &str = "ns1.he.net";

/// DNS port
pub const DEFAULT_DNS_PORT: u16 = 53;

/// Default per-query timeout
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_secs(10);

/// Which nameserver to ask, and how patiently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// IP literal or host name of the nameserver
    pub nameserver: String,

    /// Nameserver port
    pub port: u16,

    /// Per-query timeout
    pub timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            nameserver: DEFAULT_NAMESERVER.to_string(),
            port: DEFAULT_DNS_PORT,
            timeout: DEFAULT_DNS_TIMEOUT,
        }
    }
}

impl ResolverSettings {
    /// Settings for `nameserver` with the default port and timeout
    pub fn new(nameserver: impl Into<String>) -> Self {
        Self {
            nameserver: nameserver.into(),
            ..Self::default()
        }
    }

    /// Set the nameserver port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the per-query timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Record resolver backed by hickory-dns
#[derive(Debug, Clone)]
pub struct HickoryRecordResolver {
    settings: ResolverSettings,
}

impl HickoryRecordResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Addresses of the configured nameserver
    ///
    /// IP literals are used as-is; host names go through the system resolver.
    async fn nameserver_ips(&self) -> Result<Vec<IpAddr>> {
        let host = self.settings.nameserver.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let ips: Vec<IpAddr> = tokio::time::timeout(
            self.settings.timeout,
            tokio::net::lookup_host((host, self.settings.port)),
        )
        .await
        .map_err(|_| Error::resolver(format!("Timed out resolving nameserver {host}")))?
        .map_err(|e| Error::resolver(format!("Failed to resolve nameserver {host}: {e}")))?
        .map(|addr| addr.ip())
        .collect();

        if ips.is_empty() {
            return Err(Error::resolver(format!("Nameserver {host} has no address")));
        }
        Ok(ips)
    }

    /// Build a resolver that only talks to the configured nameserver
    fn build_resolver(&self, ips: &[IpAddr]) -> TokioAsyncResolver {
        let group = NameServerConfigGroup::from_ips_clear(ips, self.settings.port, true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.timeout = self.settings.timeout;
        opts.attempts = 1;
        // no search-domain expansion
        opts.ndots = 0;

        TokioAsyncResolver::tokio(config, opts)
    }
}

fn record_type(family: IpFamily) -> RecordType {
    match family {
        IpFamily::V4 => RecordType::A,
        IpFamily::V6 => RecordType::AAAA,
    }
}

/// First address of the requested family in an answer
fn first_address(records: impl IntoIterator<Item = RData>, family: IpFamily) -> Option<IpAddr> {
    records.into_iter().find_map(|rdata| match (family, rdata) {
        (IpFamily::V4, RData::A(a)) => Some(IpAddr::V4(a.0)),
        (IpFamily::V6, RData::AAAA(aaaa)) => Some(IpAddr::V6(aaaa.0)),
        _ => None,
    })
}

/// Whether a response code means the name has no such record
fn is_negative_answer(code: ResponseCode) -> bool {
    matches!(code, ResponseCode::NoError | ResponseCode::NXDomain)
}

fn fully_qualified(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{domain}.")
    }
}

#[async_trait::async_trait]
impl RecordResolver for HickoryRecordResolver {
    async fn resolve(&self, domain: &str, family: IpFamily) -> Result<Published> {
        let ips = self.nameserver_ips().await?;
        let resolver = self.build_resolver(&ips);

        match resolver.lookup(fully_qualified(domain), record_type(family)).await {
            Ok(lookup) => {
                let published = first_address(lookup.iter().cloned(), family)
                    .map(Published::Record)
                    .unwrap_or(Published::Missing);
                Ok(published)
            }
            Err(e) => match e.kind() {
                // SERVFAIL, REFUSED and friends are reported as NoRecordsFound too
                ResolveErrorKind::NoRecordsFound { response_code, .. }
                    if is_negative_answer(*response_code) =>
                {
                    Ok(Published::Missing)
                }
                _ => Err(Error::resolver(format!(
                    "{} lookup of {} on {} failed: {}",
                    family.record_type(),
                    domain,
                    self.settings.nameserver,
                    e
                ))),
            },
        }
    }

    fn resolver_name(&self) -> &str {
        &self.settings.nameserver
    }
}
