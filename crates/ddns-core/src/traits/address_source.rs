// # Address Source Trait
//
// Defines the interface for discovering the caller's current public address.
//
// ## Implementations
//
// - IP-echo over HTTP: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{AddressSource, IpFamily};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* AddressSource implementation */;
//
//     let v4 = source.discover(IpFamily::V4).await?;
//     let v6 = source.discover(IpFamily::V6).await?;
//     println!("public addresses: {v4} / {v6}");
//
//     Ok(())
// }
// ```

use crate::family::IpFamily;
use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for public address discovery
///
/// # Contract
///
/// - The request for a family MUST travel over that family. An IPv4 query
///   that silently goes out over IPv6 (or the reverse) would report the
///   wrong address.
/// - The returned address MUST belong to the requested family.
/// - No caching: the engine calls `discover` at most once per family per run.
///
/// ## Forbidden Capabilities
/// - ❌ Perform DNS updates (use `UpdateProvider`)
/// - ❌ Implement retry logic
/// - ❌ Decide whether an update is needed (owned by the engine)
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Discover the current public address for `family`
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The address, guaranteed to be of `family`
    /// - `Err(Error::Network)`: Connection, timeout or HTTP status failure
    /// - `Err(Error::Parse)`: Unusable response body
    async fn discover(&self, family: IpFamily) -> Result<IpAddr, crate::Error>;

    /// Name used in logs
    fn source_name(&self) -> &'static str;
}
