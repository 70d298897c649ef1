//! Error types for tsigddns
//!
//! The variants form a closed taxonomy. Configuration-time failures
//! (`InvalidName`, `InvalidKey`, `Config`) are fatal at zone load; identity
//! and request failures abort a request before any network call; transport
//! failures carry the underlying cause and are never retried.

use thiserror::Error;

/// Result type alias for tsigddns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tsigddns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A hostname, zone name or record name is malformed
    #[error("Invalid name \"{name}\": {reason}")]
    InvalidName {
        /// The offending name, as supplied
        name: String,
        /// Which rule it broke
        reason: String,
    },

    /// TSIG key material could not be decoded
    ///
    /// The key material itself is deliberately not part of the error.
    #[error("Invalid tsig key for zone \"{zone}\": {reason}")]
    InvalidKey {
        /// Zone the key belongs to
        zone: String,
        /// Decoder failure
        reason: String,
    },

    /// No configured zone has this name
    #[error("Unknown zone \"{zone}\"")]
    UnknownZone {
        /// Canonical zone name that was looked up
        zone: String,
    },

    /// No configured zone is a suffix of this FQDN
    #[error("No configured zone matches \"{fqdn}\"")]
    UnresolvedZone {
        /// Canonical FQDN that was resolved
        fqdn: String,
    },

    /// The caller supplied an unusable combination of name arguments
    #[error("Ambiguous identity: {0}")]
    AmbiguousIdentity(String),

    /// Neither an IPv4 nor an IPv6 address was requested
    #[error("The argument \"ip_1\" or the argument \"ip_2\" is required")]
    MissingAddress,

    /// Two addresses of the same family were requested
    #[error("The attribute \"{family}\" is already set and has the value \"{existing}\" (rejected \"{rejected}\")")]
    DuplicateFamily {
        /// `ipv4` or `ipv6`
        family: String,
        /// Value that was set first
        existing: String,
        /// Value that was rejected
        rejected: String,
    },

    /// An address argument did not parse as IPv4 or IPv6
    #[error("\"{field}\" is not a valid IP address: \"{value}\"")]
    InvalidAddress {
        /// Argument name (`ip_1` or `ip_2`)
        field: String,
        /// The raw value
        value: String,
    },

    /// Reading the current record value failed
    #[error("Query for {record_type} {name} failed: {reason}")]
    QueryFailed {
        /// Queried owner name
        name: String,
        /// Queried record type
        record_type: String,
        /// Transport or protocol cause
        reason: String,
    },

    /// Submitting the signed update failed
    #[error("Update of zone {zone} failed: {reason}")]
    UpdateFailed {
        /// Zone the update was addressed to
        zone: String,
        /// Transport or protocol cause
        reason: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The caller's secret did not match
    #[error("You specified a wrong secret key")]
    Unauthorized,
}

impl Error {
    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid key error
    pub fn invalid_key(zone: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            zone: zone.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an ambiguous identity error
    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::AmbiguousIdentity(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidAddress {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a query failure
    pub fn query_failed(
        name: impl Into<String>,
        record_type: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::QueryFailed {
            name: name.into(),
            record_type: record_type.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an update failure
    pub fn update_failed(zone: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpdateFailed {
            zone: zone.into(),
            reason: reason.into(),
        }
    }

    /// True for failures detected before any network I/O
    pub fn is_validation(&self) -> bool {
        !self.is_transport()
    }

    /// True for failures of the query or update exchange
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::QueryFailed { .. } | Self::UpdateFailed { .. })
    }
}
