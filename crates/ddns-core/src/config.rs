//! Configuration types for the DDNS synchronizer
//!
//! The config file is a YAML sequence of records. Each record names a domain
//! and carries one credential per address family:
//!
//! ```yaml
//! # dual-stack
//! - domain: home.example.com
//!   key_v4: V4KEY
//!   key_v6: V6KEY
//!
//! # legacy single-family (IPv4 only)
//! - domain: nas.example.com
//!   key: V4KEY
//! ```
//!
//! JSON is accepted as well since it is a subset of YAML.

use crate::error::{Error, Result};
use crate::family::{DualStack, IpFamily};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A credential for the update endpoint
///
/// The value is only reachable through [`Secret::expose`]; `Debug` and
/// `Display` print a placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw credential, for building the update request only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<REDACTED>)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<REDACTED>")
    }
}

/// A domain to keep in sync
///
/// A family without a credential is disabled for this domain: it is never
/// looked up and never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Fully qualified host name (e.g. "home.example.com")
    pub domain: String,

    /// Update credential per family
    pub credentials: DualStack<Option<Secret>>,
}

impl DomainRecord {
    /// A dual-stack record
    pub fn new(domain: impl Into<String>, key_v4: Option<Secret>, key_v6: Option<Secret>) -> Self {
        Self {
            domain: domain.into(),
            credentials: DualStack::new(key_v4, key_v6),
        }
    }

    /// A legacy single-family record (IPv4 only)
    pub fn legacy(domain: impl Into<String>, key: Secret) -> Self {
        Self::new(domain, Some(key), None)
    }

    /// Credential for `family`, if that family is enabled
    pub fn credential(&self, family: IpFamily) -> Option<&Secret> {
        self.credentials.get(family).as_ref()
    }

    /// Families enabled for this record, in processing order
    pub fn families(&self) -> impl Iterator<Item = IpFamily> + '_ {
        IpFamily::ALL
            .into_iter()
            .filter(|family| self.credential(*family).is_some())
    }
}

/// Record as written in the config file
#[derive(Debug, Deserialize)]
struct RawRecord {
    domain: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    key: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    key_v4: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    key_v6: Option<String>,
}

/// Key value, quoted or not
///
/// An unquoted all-digit key parses as a number and is kept in its decimal
/// form, so leading zeros must be quoted.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
    }))
}

impl RawRecord {
    fn into_record(self, index: usize) -> Result<DomainRecord> {
        let domain = non_empty(self.domain, index, "domain")?
            .ok_or_else(|| Error::config(format!("record {index}: missing `domain`")))?;

        let key = non_empty(self.key, index, "key")?;
        let key_v4 = non_empty(self.key_v4, index, "key_v4")?;
        let key_v6 = non_empty(self.key_v6, index, "key_v6")?;

        let v4 = match (key, key_v4) {
            (Some(_), Some(_)) => {
                return Err(Error::config(format!(
                    "record {index} ({domain}): `key` and `key_v4` are mutually exclusive"
                )));
            }
            (legacy, dual) => legacy.or(dual),
        };

        if v4.is_none() && key_v6.is_none() {
            return Err(Error::config(format!(
                "record {index} ({domain}): missing `key`, `key_v4` or `key_v6`"
            )));
        }

        Ok(DomainRecord::new(domain, v4.map(Secret::new), key_v6.map(Secret::new)))
    }
}

fn non_empty(value: Option<String>, index: usize, field: &str) -> Result<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Err(Error::config(format!(
            "record {index}: `{field}` cannot be empty"
        ))),
        other => Ok(other.map(|v| v.trim().to_string())),
    }
}

/// Parse domain records from config file contents
///
/// Any malformed record fails the whole document.
pub fn parse_records(text: &str) -> Result<Vec<DomainRecord>> {
    if text.trim().is_empty() {
        return Err(Error::config("config file is empty"));
    }

    let raw: Vec<RawRecord> = serde_yaml::from_str(text)?;
    if raw.is_empty() {
        return Err(Error::config("config file contains no records"));
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, record)| record.into_record(index))
        .collect()
}

/// Load domain records from a config file
///
/// A missing file yields [`Error::ConfigNotFound`], anything else that is
/// wrong with the file yields [`Error::Config`] or [`Error::Yaml`].
pub async fn load_records(path: impl AsRef<Path>) -> Result<Vec<DomainRecord>> {
    let path = path.as_ref();
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let records = parse_records(&text)?;
    tracing::debug!("Loaded {} record(s) from {}", records.len(), path.display());
    Ok(records)
}

/// What to do when a domain publishes no record of a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingRecordPolicy {
    /// Leave the family alone and warn
    #[default]
    Skip,
    /// Publish the discovered address
    Publish,
}

impl FromStr for MissingRecordPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "publish" => Ok(Self::Publish),
            other => Err(Error::config(format!(
                "unknown missing-record policy '{other}' (expected skip or publish)"
            ))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Handling of domains without an A/AAAA record
    #[serde(default)]
    pub missing_record: MissingRecordPolicy,
}
