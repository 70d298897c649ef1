//! Resolved record identity
//!
//! `record_name` + `zone_name` = `full_name`, e.g. `www.` + `example.com.`
//! = `www.example.com.`.

use crate::error::{Error, Result};
use crate::names::validate_hostname;
use crate::registry::ZoneRegistry;
use crate::zone::Zone;

/// The canonical (full name, zone name, record name) triple of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FqdnResolution {
    full_name: String,
    record_name: String,
    zone: Zone,
}

impl FqdnResolution {
    /// Resolve an identity from either a full name or a zone/record pair
    ///
    /// Exactly one form must be supplied:
    /// - `fqdn` alone: the zone is found with [`ZoneRegistry::resolve`]
    /// - `zone_name` and `record_name` together: the zone is looked up by
    ///   name and the full name is built from the record
    ///
    /// # Errors
    ///
    /// - `AmbiguousIdentity` for any other combination of arguments
    /// - `UnresolvedZone` if no configured zone contains `fqdn`
    /// - `UnknownZone` if `zone_name` is not configured
    /// - `InvalidName` if any supplied name is malformed
    pub fn new(
        registry: &ZoneRegistry,
        fqdn: Option<&str>,
        zone_name: Option<&str>,
        record_name: Option<&str>,
    ) -> Result<Self> {
        match (fqdn, zone_name, record_name) {
            (Some(fqdn), None, None) => Self::from_fqdn(registry, fqdn),
            (None, Some(zone_name), Some(record_name)) => {
                Self::from_parts(registry, zone_name, record_name)
            }
            (Some(_), Some(_), Some(_)) => Err(Error::ambiguous(
                "Specify \"fqdn\" or \"zone_name\" and \"record_name\", not all three",
            )),
            (Some(_), _, _) => Err(Error::ambiguous(
                "\"fqdn\" cannot be combined with \"zone_name\" or \"record_name\"",
            )),
            (None, Some(_), None) => Err(Error::ambiguous(
                "Value \"record_name\" is required together with \"zone_name\"",
            )),
            (None, None, Some(_)) => Err(Error::ambiguous(
                "Value \"zone_name\" is required together with \"record_name\"",
            )),
            (None, None, None) => Err(Error::ambiguous(
                "Specify \"fqdn\" or \"zone_name\" and \"record_name\"",
            )),
        }
    }

    /// Resolve a full name against the registry
    pub fn from_fqdn(registry: &ZoneRegistry, fqdn: &str) -> Result<Self> {
        let full_name = validate_hostname(fqdn)?;
        let (record_name, zone) = registry
            .resolve(&full_name)?
            .ok_or_else(|| Error::UnresolvedZone {
                fqdn: full_name.clone(),
            })?;

        Ok(Self {
            full_name,
            record_name,
            zone: zone.clone(),
        })
    }

    /// Build an identity from an explicit zone and record
    pub fn from_parts(registry: &ZoneRegistry, zone_name: &str, record_name: &str) -> Result<Self> {
        let record_name = validate_hostname(record_name)?;
        let zone = registry.lookup(zone_name)?;
        let full_name = zone.build(&record_name)?;

        Ok(Self {
            full_name,
            record_name,
            zone: zone.clone(),
        })
    }

    /// Canonical full name, e.g. `www.example.com.`
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Canonical zone name, e.g. `example.com.`
    pub fn zone_name(&self) -> &str {
        self.zone.name()
    }

    /// Canonical record name relative to the zone, e.g. `www.`
    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    /// The resolved zone
    pub fn zone(&self) -> &Zone {
        &self.zone
    }
}
