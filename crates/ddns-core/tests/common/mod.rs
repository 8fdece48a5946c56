//! Test doubles and common utilities for engine contract tests
//!
//! Every double is cheap to clone and shares its call log between clones,
//! so a test keeps one handle and gives the engine another.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressSource, Published, RecordResolver, UpdateOutcome, UpdateProvider};
use ddns_core::{DdnsEngine, DomainRecord, EngineConfig, IpFamily, MissingRecordPolicy, Secret};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid IP literal")
}

/// An AddressSource returning fixed addresses, or failing, per family
#[derive(Clone)]
pub struct FixedAddressSource {
    v4: Option<IpAddr>,
    v6: Option<IpAddr>,
    calls: Arc<Mutex<Vec<IpFamily>>>,
}

impl FixedAddressSource {
    /// `None` makes discovery of that family fail with a network error
    pub fn new(v4: Option<&str>, v6: Option<&str>) -> Self {
        Self {
            v4: v4.map(ip),
            v6: v6.map(ip),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<IpFamily> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AddressSource for FixedAddressSource {
    async fn discover(&self, family: IpFamily) -> Result<IpAddr> {
        self.calls.lock().unwrap().push(family);
        let ip = match family {
            IpFamily::V4 => self.v4,
            IpFamily::V6 => self.v6,
        };
        ip.ok_or_else(|| Error::network(format!("{family} unreachable")))
    }

    fn source_name(&self) -> &'static str {
        "fixed"
    }
}

/// What the scripted resolver answers for one (domain, family)
#[derive(Clone, Copy, Debug)]
pub enum Answer {
    Record(&'static str),
    Missing,
    Unreachable,
}

/// A RecordResolver answering from a script
#[derive(Clone, Default)]
pub struct ScriptedResolver {
    answers: Arc<Mutex<HashMap<(String, IpFamily), Answer>>>,
    calls: Arc<Mutex<Vec<(String, IpFamily)>>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, domain: &str, family: IpFamily, answer: Answer) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert((domain.to_string(), family), answer);
        self
    }

    pub fn calls(&self) -> Vec<(String, IpFamily)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordResolver for ScriptedResolver {
    async fn resolve(&self, domain: &str, family: IpFamily) -> Result<Published> {
        self.calls.lock().unwrap().push((domain.to_string(), family));

        let answer = self
            .answers
            .lock()
            .unwrap()
            .get(&(domain.to_string(), family))
            .copied()
            .unwrap_or(Answer::Missing);

        match answer {
            Answer::Record(s) => Ok(Published::Record(ip(s))),
            Answer::Missing => Ok(Published::Missing),
            Answer::Unreachable => Err(Error::resolver("connection refused")),
        }
    }

    fn resolver_name(&self) -> &str {
        "scripted"
    }
}

/// One call seen by the recording provider
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateCall {
    pub domain: String,
    pub family: IpFamily,
    pub credential: String,
    pub myip: IpAddr,
}

/// How the recording provider responds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    Accept,
    Reject,
    TransportError,
}

/// An UpdateProvider that records every call
#[derive(Clone)]
pub struct RecordingProvider {
    calls: Arc<Mutex<Vec<UpdateCall>>>,
    replies: Arc<Mutex<HashMap<String, Reply>>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reply for every update of `domain` (default: accept)
    pub fn reply_for(self, domain: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(domain.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, family: IpFamily) -> Vec<UpdateCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.family == family)
            .collect()
    }
}

#[async_trait::async_trait]
impl UpdateProvider for RecordingProvider {
    async fn update(
        &self,
        domain: &str,
        family: IpFamily,
        credential: &Secret,
        address: IpAddr,
    ) -> Result<UpdateOutcome> {
        self.calls.lock().unwrap().push(UpdateCall {
            domain: domain.to_string(),
            family,
            credential: credential.expose().to_string(),
            myip: address,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(domain)
            .copied()
            .unwrap_or(Reply::Accept);

        match reply {
            Reply::Accept => Ok(UpdateOutcome::succeeded(domain, family, "200 OK")),
            Reply::Reject => Ok(UpdateOutcome::failed(domain, family, "401 Unauthorized")),
            Reply::TransportError => Err(Error::network("connection reset")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// A zone that serves lookups and applies updates, shared between clones
#[derive(Clone, Default)]
pub struct FakeZone {
    records: Arc<Mutex<HashMap<(String, IpFamily), IpAddr>>>,
    updates: Arc<Mutex<usize>>,
}

impl FakeZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, domain: &str, address: &str) -> Self {
        let address = ip(address);
        self.records
            .lock()
            .unwrap()
            .insert((domain.to_string(), IpFamily::of(&address)), address);
        self
    }

    pub fn get(&self, domain: &str, family: IpFamily) -> Option<IpAddr> {
        self.records
            .lock()
            .unwrap()
            .get(&(domain.to_string(), family))
            .copied()
    }

    pub fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl RecordResolver for FakeZone {
    async fn resolve(&self, domain: &str, family: IpFamily) -> Result<Published> {
        Ok(self
            .get(domain, family)
            .map(Published::Record)
            .unwrap_or(Published::Missing))
    }

    fn resolver_name(&self) -> &str {
        "fake-zone"
    }
}

#[async_trait::async_trait]
impl UpdateProvider for FakeZone {
    async fn update(
        &self,
        domain: &str,
        family: IpFamily,
        _credential: &Secret,
        address: IpAddr,
    ) -> Result<UpdateOutcome> {
        *self.updates.lock().unwrap() += 1;
        self.records
            .lock()
            .unwrap()
            .insert((domain.to_string(), family), address);
        Ok(UpdateOutcome::succeeded(domain, family, "good"))
    }

    fn provider_name(&self) -> &'static str {
        "fake-zone"
    }
}

/// A dual-stack record with distinct per-family credentials
pub fn dual_stack(domain: &str) -> DomainRecord {
    DomainRecord::new(
        domain,
        Some(Secret::new(format!("{domain}-v4"))),
        Some(Secret::new(format!("{domain}-v6"))),
    )
}

/// Build an engine from test doubles
pub fn engine(
    source: &FixedAddressSource,
    resolver: impl RecordResolver + 'static,
    provider: impl UpdateProvider + 'static,
    policy: MissingRecordPolicy,
) -> DdnsEngine {
    DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(resolver),
        Box::new(provider),
        EngineConfig {
            missing_record: policy,
        },
    )
}

/// Log lines captured from the engine at warn level and above
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Capture on the current thread until the guard is dropped
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let logs = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || logs.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines_containing(&self, needle: &str) -> usize {
        let text = String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned();
        text.lines().filter(|line| line.contains(needle)).count()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
