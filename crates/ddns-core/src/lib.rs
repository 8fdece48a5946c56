// # ddns-core
//
// Core library for the dual-stack DDNS synchronizer.
//
// ## Architecture Overview
//
// This library provides the core functionality for one-shot dynamic DNS
// synchronization:
// - **AddressSource**: Trait for discovering the public address per family
// - **RecordResolver**: Trait for reading the currently published A/AAAA record
// - **UpdateProvider**: Trait for pushing a new address to the provider
// - **reconcile**: Pure per-family decision logic
// - **DdnsEngine**: Orchestrates discovery → lookup → reconcile → update
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Family Independence**: IPv4 and IPv6 are decided and updated separately
// 3. **Failure Isolation**: Only configuration errors abort a run
// 4. **Stateless**: Nothing persists between runs; the DNS zone is the state
// 5. **Idempotency**: Updates are only sent on mismatch, and are safe to repeat

pub mod config;
pub mod engine;
pub mod error;
pub mod family;
pub mod reconcile;
pub mod traits;

// Re-export core types for convenience
pub use config::{DomainRecord, EngineConfig, MissingRecordPolicy, Secret};
pub use engine::{DdnsEngine, RunReport};
pub use error::{Error, Result};
pub use family::{DualStack, IpFamily};
pub use reconcile::Decision;
pub use traits::{AddressSource, Published, RecordResolver, UpdateOutcome, UpdateProvider};
