// # DNS Transport Trait
//
// Defines the interface the update engine uses to talk to the
// authoritative nameserver.
//
// ## Implementations
//
// - RFC 2136 over TCP with TSIG: `tsigddns-nsupdate` crate
// - Tests: recording fakes injected as `Arc<dyn DnsTransport>`
//
// ## Usage
//
// ```rust,ignore
// use tsigddns_core::traits::{DnsTransport, RecordType, UpdateOperation};
//
// let current = transport.query("www.example.com.", RecordType::A).await?;
// transport
//     .apply(&zone, &[
//         UpdateOperation::delete("www.", RecordType::A),
//         UpdateOperation::add("www.", RecordType::A, 300, "1.2.3.5"),
//     ])
//     .await?;
// ```

use crate::zone::Zone;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Address record types handled by tsigddns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    /// The record type that carries `ip`
    pub fn for_addr(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// IANA RR type code
    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Aaaa => 28,
        }
    }

    /// Address family name used in messages (`ipv4` / `ipv6`)
    pub fn family(&self) -> &'static str {
        match self {
            RecordType::A => "ipv4",
            RecordType::Aaaa => "ipv6",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::Aaaa => f.write_str("AAAA"),
        }
    }
}

/// A single RFC 2136 update-section entry
///
/// `name` is relative to the zone the operation is applied to (e.g. `www.`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UpdateOperation {
    /// Delete the whole RRset of `record_type` at `name`
    Delete {
        name: String,
        record_type: RecordType,
    },
    /// Add one record
    Add {
        name: String,
        record_type: RecordType,
        ttl: u32,
        value: String,
    },
}

impl UpdateOperation {
    /// Delete the RRset of `record_type` at `name`
    pub fn delete(name: impl Into<String>, record_type: RecordType) -> Self {
        Self::Delete {
            name: name.into(),
            record_type,
        }
    }

    /// Add a record of `record_type` at `name`
    pub fn add(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: u32,
        value: impl Into<String>,
    ) -> Self {
        Self::Add {
            name: name.into(),
            record_type,
            ttl,
            value: value.into(),
        }
    }

    /// Owner name relative to the zone
    pub fn name(&self) -> &str {
        match self {
            Self::Delete { name, .. } | Self::Add { name, .. } => name,
        }
    }

    /// Record type the operation touches
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::Delete { record_type, .. } | Self::Add { record_type, .. } => *record_type,
        }
    }
}

/// The delete + add pair issued for one changed address family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPair {
    /// Removes the existing RRset
    pub delete: UpdateOperation,
    /// Adds the desired record
    pub add: UpdateOperation,
}

impl OperationPair {
    /// Replace the RRset of `record_type` at `name` with a single `value`
    pub fn replace(name: &str, record_type: RecordType, ttl: u32, value: impl Into<String>) -> Self {
        Self {
            delete: UpdateOperation::delete(name, record_type),
            add: UpdateOperation::add(name, record_type, ttl, value),
        }
    }
}

/// Trait for DNS transport implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe; one transport is shared by all
/// in-flight requests.
///
/// # Responsibilities
///
/// - ✅ Encode, sign and exchange messages with the nameserver
/// - ✅ Map wire/protocol failures to `QueryFailed` / `UpdateFailed`
/// - ❌ Decide whether an update is needed (owned by `UpdateEngine`)
/// - ❌ Retry or resend a submitted update: a TSIG-signed update that may
///   already have been applied must never be sent twice
/// - ❌ Enforce the request timeout (the engine wraps every call)
#[async_trait]
pub trait DnsTransport: Send + Sync {
    /// Query the current values of `record_type` at `name`
    ///
    /// # Parameters
    ///
    /// - `name`: Canonical absolute owner name (e.g. `www.example.com.`)
    /// - `record_type`: A or AAAA
    ///
    /// # Returns
    ///
    /// - `Ok(values)`: Address strings, empty if the name or type is absent
    /// - `Err(Error::QueryFailed)`: On transport or protocol error
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>, crate::Error>;

    /// Apply `operations` to `zone` as one signed update message
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The nameserver accepted the update
    /// - `Err(Error::UpdateFailed)`: On transport, signing or protocol error
    async fn apply(&self, zone: &Zone, operations: &[UpdateOperation]) -> Result<(), crate::Error>;

    /// Get the transport name (for logging/debugging)
    fn transport_name(&self) -> &'static str;
}
