// # tsigddns-core
//
// Core library for TSIG-signed dynamic DNS updates.
//
// ## Architecture Overview
//
// This library decides WHAT to send to an authoritative nameserver and
// WHETHER to send it:
// - **names**: Hostname canonicalization and TSIG key validation
// - **Zone**: One configured zone; splits and builds full names
// - **ZoneRegistry**: Configured zones; longest-suffix FQDN resolution
// - **FqdnResolution**: The (full, zone, record) identity of a request
// - **UpdateEngine**: Query current values, decide, apply delete+add pairs
// - **DnsTransport**: Trait for the wire exchange (see `tsigddns-nsupdate`)
//
// ## Design Principles
//
// 1. **Fail Fast**: Every validation error happens before any network call
// 2. **Canonical Names**: Lowercase, single trailing dot, everywhere
// 3. **No Redundant Writes**: Unchanged records are never rewritten
// 4. **Single Attempt**: Signed updates are never retried by the core
// 5. **Immutable Configuration**: Registries are replaced, not mutated

pub mod config;
pub mod engine;
pub mod error;
pub mod fqdn;
pub mod names;
pub mod registry;
pub mod request;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use config::{AppConfig, EngineConfig, ZoneConfig};
pub use engine::{EngineEvent, OutcomeStatus, UpdateEngine, UpdateOutcome};
pub use error::{Error, Result};
pub use fqdn::FqdnResolution;
pub use names::{validate_hostname, validate_tsig_key};
pub use registry::{SharedRegistry, ZoneRegistry};
pub use request::{DesiredAddresses, UpdateArgs, UpdateRequest};
pub use traits::{DnsTransport, OperationPair, RecordType, UpdateOperation};
pub use zone::{TsigAlgorithm, TsigKey, Zone};
