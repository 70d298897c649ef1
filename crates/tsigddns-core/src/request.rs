//! Caller-facing request validation
//!
//! An [`UpdateArgs`] is what the outer layer (CLI, HTTP handler) extracts
//! from the caller. [`UpdateArgs::into_request`] checks the shared secret,
//! resolves the identity and parses the addresses, in that order, and
//! produces an [`UpdateRequest`] for the engine. Nothing here touches the
//! network.

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fqdn::FqdnResolution;
use crate::registry::ZoneRegistry;
use crate::traits::RecordType;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Default TTL for added records (in seconds)
pub const DEFAULT_TTL: u32 = 300;

/// Raw request arguments as supplied by a caller
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateArgs {
    pub secret: Option<String>,
    pub fqdn: Option<String>,
    pub zone_name: Option<String>,
    pub record_name: Option<String>,
    pub ip_1: Option<String>,
    pub ip_2: Option<String>,
}

impl UpdateArgs {
    /// Authenticate and validate the arguments
    ///
    /// # Errors
    ///
    /// `Unauthorized`, then any identity error from [`FqdnResolution::new`],
    /// then any address error from [`DesiredAddresses::from_args`].
    pub fn into_request(&self, config: &AppConfig, registry: &ZoneRegistry) -> Result<UpdateRequest> {
        authenticate(config, non_empty(&self.secret))?;

        let resolution = FqdnResolution::new(
            registry,
            non_empty(&self.fqdn),
            non_empty(&self.zone_name),
            non_empty(&self.record_name),
        )?;

        let desired = DesiredAddresses::from_args(non_empty(&self.ip_1), non_empty(&self.ip_2))?;

        Ok(UpdateRequest::new(resolution, desired).with_ttl(config.ttl))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Check the caller's secret against the configured one
pub fn authenticate(config: &AppConfig, supplied: Option<&str>) -> Result<()> {
    let expected = config.secret();
    match supplied {
        Some(secret) if !expected.is_empty() && secret == expected => Ok(()),
        _ => Err(Error::Unauthorized),
    }
}

/// The addresses a request asks for, at most one per family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredAddresses {
    ipv4: Option<Ipv4Addr>,
    ipv6: Option<Ipv6Addr>,
}

impl DesiredAddresses {
    /// Create from typed addresses
    ///
    /// # Errors
    ///
    /// `MissingAddress` if both are `None`.
    pub fn new(ipv4: Option<Ipv4Addr>, ipv6: Option<Ipv6Addr>) -> Result<Self> {
        if ipv4.is_none() && ipv6.is_none() {
            return Err(Error::MissingAddress);
        }
        Ok(Self { ipv4, ipv6 })
    }

    /// Parse the `ip_1` / `ip_2` arguments
    ///
    /// Each argument may be either family, but the two must differ.
    ///
    /// # Errors
    ///
    /// - `InvalidAddress` if an argument is not an IPv4 or IPv6 address
    /// - `DuplicateFamily` if both arguments are the same family
    /// - `MissingAddress` if neither argument is given
    pub fn from_args(ip_1: Option<&str>, ip_2: Option<&str>) -> Result<Self> {
        let mut ipv4: Option<Ipv4Addr> = None;
        let mut ipv6: Option<Ipv6Addr> = None;

        for (field, value) in [("ip_1", ip_1), ("ip_2", ip_2)] {
            let Some(value) = value else { continue };
            let ip: IpAddr = value
                .parse()
                .map_err(|_| Error::invalid_address(field, value))?;

            match ip {
                IpAddr::V4(addr) => {
                    if let Some(existing) = ipv4 {
                        return Err(duplicate(RecordType::A, existing, addr));
                    }
                    ipv4 = Some(addr);
                }
                IpAddr::V6(addr) => {
                    if let Some(existing) = ipv6 {
                        return Err(duplicate(RecordType::Aaaa, existing, addr));
                    }
                    ipv6 = Some(addr);
                }
            }
        }

        Self::new(ipv4, ipv6)
    }

    /// Requested IPv4 address
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4
    }

    /// Requested IPv6 address
    pub fn ipv6(&self) -> Option<Ipv6Addr> {
        self.ipv6
    }

    /// Requested addresses in family order (A before AAAA)
    pub fn iter(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.ipv4
            .map(IpAddr::V4)
            .into_iter()
            .chain(self.ipv6.map(IpAddr::V6))
    }
}

fn duplicate(record_type: RecordType, existing: impl ToString, rejected: impl ToString) -> Error {
    Error::DuplicateFamily {
        family: record_type.family().to_string(),
        existing: existing.to_string(),
        rejected: rejected.to_string(),
    }
}

/// A validated update request, ready for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Which record to update
    pub resolution: FqdnResolution,
    /// Which addresses it should hold
    pub desired: DesiredAddresses,
    /// TTL for added records
    pub ttl: u32,
}

impl UpdateRequest {
    /// Create a request with the default TTL
    pub fn new(resolution: FqdnResolution, desired: DesiredAddresses) -> Self {
        Self {
            resolution,
            desired,
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }
}
