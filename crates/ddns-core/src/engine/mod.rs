//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Discovering the public address once per needed family
//! - Looking up what each domain currently publishes
//! - Reconciling the two per family
//! - Dispatching updates only where they differ
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ AddressSource │─── discovered (once per family) ───┐
//! └───────────────┘                                     │
//!                                                       ▼
//! ┌────────────────┐                           ┌──────────────┐
//! │ RecordResolver │─── published (per record) ─▶│  DdnsEngine  │
//! └────────────────┘                           └──────────────┘
//!                                                       │
//!                                          reconcile::reconcile()
//!                                                       │
//!                                                       ▼
//!                                             ┌────────────────┐
//!                                             │ UpdateProvider │
//!                                             └────────────────┘
//! ```
//!
//! ## Failure Isolation
//!
//! Only configuration errors abort a run. A failed discovery, lookup or
//! update is logged and recorded in the [`RunReport`]; processing moves on
//! to the next family, then the next record.

use crate::config::{DomainRecord, EngineConfig, MissingRecordPolicy, Secret, load_records};
use crate::error::Result;
use crate::family::{DualStack, IpFamily};
use crate::reconcile::{Decision, reconcile};
use crate::traits::{AddressSource, Published, RecordResolver, UpdateOutcome, UpdateProvider};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything that happened during one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per enabled family of every record, in processing order
    pub outcomes: Vec<UpdateOutcome>,
}

impl RunReport {
    /// Number of update requests sent
    pub fn attempted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.attempted).count()
    }

    /// Number of update requests the provider accepted
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    /// Number of update requests that were sent but not accepted
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.attempted && !o.succeeded)
            .count()
    }

    /// Outcomes for one domain and family
    pub fn outcomes_for<'a>(
        &'a self,
        domain: &'a str,
        family: IpFamily,
    ) -> impl Iterator<Item = &'a UpdateOutcome> + 'a {
        self.outcomes
            .iter()
            .filter(move |o| o.domain == domain && o.family == family)
    }
}

/// Core DDNS engine
///
/// One-shot: [`DdnsEngine::run`] walks the records once, sequentially, and
/// returns. Nothing is kept between runs; the provider's DNS zone is the only
/// state of record.
pub struct DdnsEngine {
    /// Public address discovery
    source: Box<dyn AddressSource>,

    /// Published record lookup
    resolver: Box<dyn RecordResolver>,

    /// Dynamic-DNS update endpoint
    provider: Box<dyn UpdateProvider>,

    /// Handling of domains without an A/AAAA record
    missing_record: MissingRecordPolicy,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    pub fn new(
        source: Box<dyn AddressSource>,
        resolver: Box<dyn RecordResolver>,
        provider: Box<dyn UpdateProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            resolver,
            provider,
            missing_record: config.missing_record,
        }
    }

    /// Load the config file, then run
    ///
    /// The file is read before any network call. If it is missing or
    /// malformed, the error is returned and nothing else happens.
    pub async fn run_with_config_file(&self, path: impl AsRef<Path>) -> Result<RunReport> {
        let records = load_records(path).await?;
        Ok(self.run(&records).await)
    }

    /// Synchronize every record once
    pub async fn run(&self, records: &[DomainRecord]) -> RunReport {
        info!("Synchronizing {} record(s)", records.len());

        let discovered = self.discover(records).await;
        let mut report = RunReport::default();

        for record in records {
            self.sync_record(record, &discovered, &mut report).await;
        }

        info!(
            "Run complete: {} update(s) sent, {} succeeded, {} failed",
            report.attempted(),
            report.succeeded(),
            report.failed()
        );
        report
    }

    /// Discover the public address of every family some record enables
    async fn discover(&self, records: &[DomainRecord]) -> DualStack<Option<IpAddr>> {
        let mut discovered = DualStack::new(None, None);

        for family in IpFamily::ALL {
            if !records.iter().any(|r| r.credential(family).is_some()) {
                debug!("No record enables {}, skipping discovery", family);
                continue;
            }

            match self.source.discover(family).await {
                Ok(ip) => {
                    debug!("Discovered {} address: {}", family, ip);
                    *discovered.get_mut(family) = Some(ip);
                }
                Err(e) => {
                    warn!(
                        "{} address discovery via {} failed, skipping {} for all records: {}",
                        family,
                        self.source.source_name(),
                        family,
                        e
                    );
                }
            }
        }

        discovered
    }

    /// Look up, reconcile and update both families of one record
    async fn sync_record(
        &self,
        record: &DomainRecord,
        discovered: &DualStack<Option<IpAddr>>,
        report: &mut RunReport,
    ) {
        let domain = record.domain.as_str();
        let mut published: DualStack<Option<Published>> = DualStack::new(None, None);

        for family in record.families() {
            if discovered.get(family).is_none() {
                report.outcomes.push(UpdateOutcome::skipped(
                    domain,
                    family,
                    format!("{family} address unavailable"),
                ));
                continue;
            }

            match self.resolver.resolve(domain, family).await {
                Ok(current) => {
                    debug!(
                        "{} {} record on {}: {}",
                        domain,
                        family.record_type(),
                        self.resolver.resolver_name(),
                        current
                    );
                    *published.get_mut(family) = Some(current);
                }
                Err(e) => {
                    warn!(
                        "Failed to look up {} record of {}: {}",
                        family.record_type(),
                        domain,
                        e
                    );
                    report
                        .outcomes
                        .push(UpdateOutcome::skipped(domain, family, e.to_string()));
                }
            }
        }

        let decisions = reconcile(discovered, &published, self.missing_record);

        for family in record.families() {
            let Some(decision) = *decisions.get(family) else {
                continue;
            };

            let outcome = match decision {
                Decision::UpToDate => {
                    debug!("{} {} is up to date, no update needed", domain, family);
                    UpdateOutcome::skipped(domain, family, "up to date")
                }
                Decision::MissingRecord => {
                    warn!(
                        "{} publishes no {} record, not creating one",
                        domain,
                        family.record_type()
                    );
                    UpdateOutcome::skipped(
                        domain,
                        family,
                        format!("no {} record published", family.record_type()),
                    )
                }
                Decision::Update { from, to } => {
                    let Some(credential) = record.credential(family) else {
                        continue;
                    };
                    self.dispatch(domain, family, credential, from, to).await
                }
            };

            report.outcomes.push(outcome);
        }
    }

    /// Send one update and fold any error into a failed outcome
    async fn dispatch(
        &self,
        domain: &str,
        family: IpFamily,
        credential: &Secret,
        from: Option<IpAddr>,
        to: IpAddr,
    ) -> UpdateOutcome {
        debug!(
            "Updating {} {} via {}: {} -> {}",
            domain,
            family.record_type(),
            self.provider.provider_name(),
            from.map(|ip| ip.to_string()).unwrap_or_else(|| "None".to_string()),
            to
        );

        match self.provider.update(domain, family, credential, to).await {
            Ok(outcome) if outcome.succeeded => {
                info!("Updated {} {} -> {} ({})", domain, family.record_type(), to, outcome.detail);
                outcome
            }
            Ok(outcome) => {
                warn!(
                    "{} rejected update of {} {}: {}",
                    self.provider.provider_name(),
                    domain,
                    family.record_type(),
                    outcome.detail
                );
                outcome
            }
            Err(e) => {
                warn!("Failed to update {} {}: {}", domain, family.record_type(), e);
                UpdateOutcome::failed(domain, family, e.to_string())
            }
        }
    }
}
