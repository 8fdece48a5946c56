// # Record Resolver Trait
//
// Defines the interface for reading the address a domain currently publishes.
//
// ## Implementations
//
// - hickory-dns against a chosen nameserver: `ddns-resolver-hickory` crate

use crate::family::IpFamily;
use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// What a nameserver publishes for one domain and one family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Published {
    /// The first A/AAAA answer
    Record(IpAddr),
    /// The nameserver answered, but holds no record of this type
    Missing,
}

impl Published {
    /// The published address, if any
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            Published::Record(ip) => Some(*ip),
            Published::Missing => None,
        }
    }
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::Record(ip) => write!(f, "{ip}"),
            Published::Missing => f.write_str("<no record>"),
        }
    }
}

/// Trait for DNS record lookups
///
/// # Contract
///
/// - "No answer" for the record type is `Ok(Published::Missing)`, never an
///   error. Domains that never published AAAA are common.
/// - Failure to reach the nameserver is `Err(Error::Resolver)`.
/// - Resolver configuration belongs to the implementing value. Lookups MUST
///   NOT touch process-wide resolver state.
#[async_trait]
pub trait RecordResolver: Send + Sync {
    /// Look up the A (v4) or AAAA (v6) record of `domain`
    async fn resolve(&self, domain: &str, family: IpFamily) -> Result<Published, crate::Error>;

    /// Name used in logs
    fn resolver_name(&self) -> &str;
}
