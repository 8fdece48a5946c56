// # HTTP Address Source
//
// This crate discovers the caller's public address by asking an IP-echo
// service (ifconfig.co style: `GET /json` → `{"ip": "..."}`).
//
// ## Family Pinning
//
// Each family gets its own HTTP client whose local address is bound to the
// unspecified address of that family (`0.0.0.0` or `::`). The connector
// then only dials remote addresses of the same family, so an IPv4 query can
// never be answered over IPv6 and vice versa. On a host without IPv6
// connectivity the IPv6 query fails instead of reporting the IPv4 address.

use ddns_core::traits::AddressSource;
use ddns_core::{DualStack, Error, IpFamily, Result};

use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// Default IP-echo endpoint
pub const DEFAULT_IP_ECHO_URL: &str = "https://ifconfig.co/json";

/// Default HTTP timeout for discovery requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// The part of the IP-echo body we care about
#[derive(Debug, Deserialize)]
struct EchoResponse {
    ip: String,
}

/// HTTP-based address source
pub struct HttpAddressSource {
    /// URL to fetch the address from
    url: String,

    /// One client per family, each pinned to that family
    clients: DualStack<reqwest::Client>,
}

impl HttpAddressSource {
    /// Create a new HTTP address source
    ///
    /// # Parameters
    ///
    /// - `url`: IP-echo endpoint returning `{"ip": "..."}`
    /// - `timeout`: Per-request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let clients = DualStack::new(
            pinned_client(IpFamily::V4, timeout)?,
            pinned_client(IpFamily::V6, timeout)?,
        );

        Ok(Self {
            url: url.into(),
            clients,
        })
    }

    /// Create a source for the default endpoint
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_IP_ECHO_URL, DEFAULT_HTTP_TIMEOUT)
    }

    /// The configured endpoint
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Build a client whose connections can only use `family`
fn pinned_client(family: IpFamily, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .local_address(family.unspecified())
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build {family} HTTP client: {e}")))
}

/// Extract and validate the address from an IP-echo body
fn parse_echo_body(body: &str, family: IpFamily) -> Result<IpAddr> {
    let echo: EchoResponse = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("Invalid IP-echo response: {e}")))?;

    let ip_text = echo.ip.trim();
    let ip: IpAddr = ip_text
        .parse()
        .map_err(|_| Error::parse(format!("Invalid IP address: {ip_text}")))?;

    if !family.matches(&ip) {
        return Err(Error::parse(format!("Expected {family}, got: {ip}")));
    }

    Ok(ip)
}

#[async_trait::async_trait]
impl AddressSource for HttpAddressSource {
    async fn discover(&self, family: IpFamily) -> Result<IpAddr> {
        tracing::debug!("Discovering {} address via {}", family, self.url);

        let response = self
            .clients
            .get(family)
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("{family} request to {} failed: {e}", self.url)))?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "{family} request to {} returned {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {e}")))?;

        parse_echo_body(&body, family)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
