//! Reconciliation of discovered and published addresses
//!
//! Pure decision logic, no I/O. Each family is decided on its own; the
//! outcome for one family never depends on the other.

use crate::config::MissingRecordPolicy;
use crate::family::{DualStack, IpFamily};
use crate::traits::Published;
use std::net::IpAddr;

/// What to do about one family of one domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Published address equals the discovered one
    UpToDate,
    /// Published address must be replaced
    Update {
        /// Currently published address (None when no record exists)
        from: Option<IpAddr>,
        /// Address to publish
        to: IpAddr,
    },
    /// No record is published and the policy says to leave it alone
    MissingRecord,
}

impl Decision {
    /// Address to publish, if an update is needed
    pub fn target(&self) -> Option<IpAddr> {
        match self {
            Decision::Update { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// Decide a single family
pub fn decide(discovered: IpAddr, published: Published, policy: MissingRecordPolicy) -> Decision {
    match published {
        Published::Missing => match policy {
            MissingRecordPolicy::Skip => Decision::MissingRecord,
            MissingRecordPolicy::Publish => Decision::Update {
                from: None,
                to: discovered,
            },
        },
        Published::Record(current) if current == discovered => Decision::UpToDate,
        Published::Record(current) => Decision::Update {
            from: Some(current),
            to: discovered,
        },
    }
}

/// Decide both families of one domain
///
/// A family is only decided when both its discovered and its published
/// address are known; otherwise its slot stays `None`.
pub fn reconcile(
    discovered: &DualStack<Option<IpAddr>>,
    published: &DualStack<Option<Published>>,
    policy: MissingRecordPolicy,
) -> DualStack<Option<Decision>> {
    DualStack::new((), ()).map(|family, ()| {
        match (discovered.get(family), published.get(family)) {
            (Some(ip), Some(record)) => Some(decide(*ip, *record, policy)),
            _ => None,
        }
    })
}

impl DualStack<Option<Decision>> {
    /// Families whose record must be updated, in processing order
    pub fn families_needing_update(&self) -> Vec<IpFamily> {
        self.iter()
            .filter(|(_, decision)| matches!(decision, Some(Decision::Update { .. })))
            .map(|(family, _)| family)
            .collect()
    }
}
