//! Core traits for the DDNS synchronizer
//!
//! This module defines the abstract interfaces the engine drives.
//!
//! - [`AddressSource`]: Discover the caller's public address per family
//! - [`RecordResolver`]: Read the address a domain currently publishes
//! - [`UpdateProvider`]: Push a new address to the dynamic-DNS provider

pub mod address_source;
pub mod record_resolver;
pub mod update_provider;

pub use address_source::AddressSource;
pub use record_resolver::{Published, RecordResolver};
pub use update_provider::{UpdateOutcome, UpdateProvider};
