// # Hurricane Electric Dynamic DNS Provider
//
// This crate pushes address changes to Hurricane Electric's dynamic DNS
// endpoint (dyndns2 style):
//
// ```http
// GET /nic/update?hostname=home.example.com&password=<key>&myip=203.0.113.5
// Host: dyn.dns.he.net
// ```
//
// ## Behavior
//
// - ✅ Exactly one HTTP request per call, no retry, no backoff
// - ✅ HTTP timeout configured (10 seconds by default)
// - ✅ Any 2xx status is success; other statuses are reported, not raised
// - ✅ Dry-run mode for safe testing
// - ❌ NO response-body interpretation: the body is only echoed in the detail
//
// ## Security Requirements
//
// - The per-record key NEVER appears in logs or error messages
// - Transport errors are stripped of their URL (the URL carries the key)

use async_trait::async_trait;
use ddns_core::traits::{UpdateOutcome, UpdateProvider};
use ddns_core::{Error, IpFamily, Result, Secret};
use std::net::IpAddr;
use std::time::Duration;

/// Hurricane Electric update endpoint
pub const HE_UPDATE_URL: &str = "https://dyn.dns.he.net/nic/update";

/// Default HTTP timeout for update requests
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body kept in an outcome's detail
const MAX_DETAIL_BODY: usize = 200;

/// Hurricane Electric provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider logs the request it would send
/// (with the key redacted) and reports success without any network I/O.
#[derive(Debug)]
pub struct HeProvider {
    /// Update endpoint (overridable for compatible services and tests)
    update_url: String,

    /// HTTP client for update requests
    client: reqwest::Client,

    /// Dry-run mode: if true, skip the request entirely
    dry_run: bool,
}

impl HeProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `update_url`: dyndns2-compatible endpoint
    /// - `timeout`: Per-request timeout
    /// - `dry_run`: If true, log intended updates instead of sending them
    pub fn new(update_url: impl Into<String>, timeout: Duration, dry_run: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            update_url: update_url.into(),
            client,
            dry_run,
        })
    }

    /// Create a provider against the Hurricane Electric endpoint (live mode)
    pub fn new_live() -> Result<Self> {
        Self::new(HE_UPDATE_URL, DEFAULT_HTTP_TIMEOUT, false)
    }

    /// Create a provider against the Hurricane Electric endpoint (dry-run mode)
    pub fn new_dry_run() -> Result<Self> {
        Self::new(HE_UPDATE_URL, DEFAULT_HTTP_TIMEOUT, true)
    }

    /// Whether requests are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Short human-readable explanation of a non-success status
fn describe_status(status: reqwest::StatusCode) -> &'static str {
    match status.as_u16() {
        401 | 403 => "authentication failed, check the record key",
        404 => "update endpoint not found",
        429 => "rate limit exceeded",
        500..=599 => "provider server error",
        _ => "update rejected",
    }
}

fn truncate_body(body: &str) -> &str {
    let body = body.trim();
    match body.char_indices().nth(MAX_DETAIL_BODY) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}

#[async_trait]
impl UpdateProvider for HeProvider {
    async fn update(
        &self,
        domain: &str,
        family: IpFamily,
        credential: &Secret,
        address: IpAddr,
    ) -> Result<UpdateOutcome> {
        tracing::debug!(
            "Sending {} update for {} -> {} [mode: {}]",
            family.record_type(),
            domain,
            address,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send GET {}?hostname={}&password={}&myip={}",
                self.update_url,
                domain,
                credential,
                address
            );
            return Ok(UpdateOutcome::succeeded(domain, family, "dry-run"));
        }

        let myip = address.to_string();
        let response = self
            .client
            .get(&self.update_url)
            .query(&[
                ("hostname", domain),
                ("password", credential.expose()),
                ("myip", myip.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::network(format!("Update request failed: {}", e.without_url())))?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Could not read update response body: {}", e.without_url());
                String::new()
            }
        };
        let body = truncate_body(&body);

        tracing::debug!("IP update performed. Server answer {}", status);

        if status.is_success() {
            Ok(UpdateOutcome::succeeded(domain, family, format!("{status} {body}").trim_end()))
        } else {
            Ok(UpdateOutcome::failed(
                domain,
                family,
                format!("{status} ({}) {body}", describe_status(status)).trim_end(),
            ))
        }
    }

    fn provider_name(&self) -> &'static str {
        "he"
    }
}
