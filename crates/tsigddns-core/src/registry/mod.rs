//! Configured zones and FQDN → zone resolution
//!
//! The registry is built once from configuration and never mutated.
//! Reconfiguration goes through [`SharedRegistry`], which swaps the whole
//! registry atomically so in-flight requests keep the snapshot they started
//! with.
//!
//! ## Usage
//!
//! ```rust
//! use tsigddns_core::config::ZoneConfig;
//! use tsigddns_core::registry::ZoneRegistry;
//!
//! let registry = ZoneRegistry::from_config(&[
//!     ZoneConfig::new("example.com", "tPyvZA=="),
//!     ZoneConfig::new("a.example.com", "tPyvZA=="),
//! ])?;
//!
//! let (record, zone) = registry.resolve("x.a.example.com")?.unwrap();
//! assert_eq!(record, "x.");
//! assert_eq!(zone.name(), "a.example.com.");
//! # Ok::<(), tsigddns_core::Error>(())
//! ```

use crate::config::ZoneConfig;
use crate::error::{Error, Result};
use crate::names::validate_hostname;
use crate::zone::Zone;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// The configured set of zones
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    /// Canonical zone name → zone
    zones: BTreeMap<String, Zone>,
}

impl ZoneRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from zone configuration entries
    ///
    /// # Errors
    ///
    /// - `Config` if an entry lacks a name or key, or a zone is listed twice
    /// - `InvalidName` / `InvalidKey` if a zone fails validation
    pub fn from_config(zones: &[ZoneConfig]) -> Result<Self> {
        let mut registry = Self::new();
        for zone_config in zones {
            zone_config.validate()?;
            let zone = Zone::new(
                zone_config.name.as_deref().unwrap_or_default(),
                zone_config.tsig_key.as_deref().unwrap_or_default(),
                zone_config.tsig_algorithm,
            )?;
            registry.insert(zone)?;
        }
        Ok(registry)
    }

    /// Add a zone
    ///
    /// # Errors
    ///
    /// `Config` if a zone with the same canonical name is already present.
    pub fn insert(&mut self, zone: Zone) -> Result<()> {
        if self.zones.contains_key(zone.name()) {
            return Err(Error::config(format!(
                "Zone \"{}\" is configured more than once",
                zone.name()
            )));
        }
        self.zones.insert(zone.name().to_string(), zone);
        Ok(())
    }

    /// Find the zone a full name belongs to
    ///
    /// When several configured zones are suffixes of `full_name`, the longest
    /// (most specific) one wins. Returns `Ok(None)` when no zone matches with
    /// a non-empty record part.
    ///
    /// # Errors
    ///
    /// `InvalidName` if `full_name` is not a valid hostname.
    pub fn resolve(&self, full_name: &str) -> Result<Option<(String, &Zone)>> {
        let full_name = validate_hostname(full_name)?;

        let best = self
            .zones
            .values()
            .filter_map(|zone| zone.record_part(&full_name).map(|record| (record, zone)))
            .max_by_key(|(_, zone)| zone.name().len());

        match best {
            Some((record, zone)) => {
                debug!("Resolved {} to record {} in zone {}", full_name, record, zone.name());
                Ok(Some((record.to_string(), zone)))
            }
            None => {
                debug!("No configured zone matches {}", full_name);
                Ok(None)
            }
        }
    }

    /// Look up a zone by name
    ///
    /// # Errors
    ///
    /// - `InvalidName` if `zone_name` is not a valid hostname
    /// - `UnknownZone` if no configured zone has that name
    pub fn lookup(&self, zone_name: &str) -> Result<&Zone> {
        let zone_name = validate_hostname(zone_name)?;
        self.zones
            .get(&zone_name)
            .ok_or(Error::UnknownZone { zone: zone_name })
    }

    /// Canonical names of all configured zones, in sorted order
    pub fn zone_names(&self) -> Vec<String> {
        self.zones.keys().cloned().collect()
    }

    /// Number of configured zones
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// True if no zones are configured
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// A registry handle that supports atomic replacement
///
/// Readers take an `Arc` snapshot with [`SharedRegistry::load`]; a call to
/// [`SharedRegistry::replace`] never affects snapshots already handed out.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<ZoneRegistry>>,
}

impl SharedRegistry {
    /// Wrap a registry
    pub fn new(registry: ZoneRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    /// Snapshot of the current registry
    pub fn load(&self) -> Arc<ZoneRegistry> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Swap in a new registry, returning the previous one
    pub fn replace(&self, registry: ZoneRegistry) -> Arc<ZoneRegistry> {
        let next = Arc::new(registry);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debug!("Replacing zone registry ({} zones)", next.len());
        std::mem::replace(&mut *guard, next)
    }
}
