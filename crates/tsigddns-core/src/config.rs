//! Configuration types for tsigddns
//!
//! The core never reads files. A loader (the `tsigddns` binary uses YAML)
//! deserializes an [`AppConfig`], calls [`AppConfig::validate`], and passes
//! the immutable value on to [`ZoneRegistry`](crate::registry::ZoneRegistry)
//! and [`UpdateEngine`](crate::engine::UpdateEngine) construction.

use crate::zone::TsigAlgorithm;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Minimum length of the shared secret
pub const MIN_SECRET_LEN: usize = 8;

/// Main tsigddns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared secret callers must present
    #[serde(default, deserialize_with = "string_or_number")]
    pub secret: Option<String>,

    /// Address of the authoritative nameserver
    #[serde(default)]
    pub nameserver: Option<String>,

    /// Nameserver port
    #[serde(default = "default_port")]
    pub port: u16,

    /// TTL for added records (in seconds)
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Bound on each query and update round trip (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Zones this server may update
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

impl AppConfig {
    /// Create a configuration with defaults and no zones
    pub fn new(secret: impl Into<String>, nameserver: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            nameserver: Some(nameserver.into()),
            port: default_port(),
            ttl: default_ttl(),
            timeout_secs: default_timeout_secs(),
            zones: Vec::new(),
        }
    }

    /// Add a zone
    pub fn with_zone(mut self, zone: ZoneConfig) -> Self {
        self.zones.push(zone);
        self
    }

    /// Validate the configuration
    ///
    /// Zone names and keys are checked separately when the
    /// [`ZoneRegistry`](crate::registry::ZoneRegistry) is built.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let secret = self.secret.as_deref().unwrap_or_default();
        if secret.is_empty() {
            return Err(crate::Error::config(
                "Your configuration must have a \"secret\" key, for example: \"secret: VDEdxeTKH\"",
            ));
        }
        if secret.len() < MIN_SECRET_LEN || !secret.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(crate::Error::config(format!(
                "The secret must be at least {} characters long and may not contain any \
                 non-alpha-numeric characters",
                MIN_SECRET_LEN
            )));
        }

        if self.nameserver.as_deref().is_none_or(str::is_empty) {
            return Err(crate::Error::config(
                "Your configuration must have a \"nameserver\" key, for example: \"nameserver: 127.0.0.1\"",
            ));
        }

        if self.zones.is_empty() {
            return Err(crate::Error::config(
                "You must have at least one zone configured, for example: \
                 \"- name: example.com\" and \"tsig_key: tPyvZA==\"",
            ));
        }

        for zone in &self.zones {
            zone.validate()?;
        }

        if self.port == 0 {
            return Err(crate::Error::config("The nameserver port must be > 0"));
        }
        if self.ttl == 0 {
            return Err(crate::Error::config("The record ttl must be > 0"));
        }
        if !(1..=300).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "timeout_secs must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }

        Ok(())
    }

    /// The configured secret, or empty if unset
    pub fn secret(&self) -> &str {
        self.secret.as_deref().unwrap_or_default()
    }

    /// The configured nameserver, or empty if unset
    pub fn nameserver(&self) -> &str {
        self.nameserver.as_deref().unwrap_or_default()
    }

    /// Round-trip timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Engine settings derived from this configuration
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            timeout: self.timeout(),
            ..EngineConfig::default()
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on each query and on the update exchange
    pub timeout: Duration,

    /// Capacity of the engine event channel
    ///
    /// When full, events are dropped (with a warning log). Requests never
    /// wait on event consumers.
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(default_timeout_secs()),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// One configured zone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone name, e.g. `example.com`
    #[serde(default)]
    pub name: Option<String>,

    /// Base64 TSIG key material
    #[serde(default)]
    pub tsig_key: Option<String>,

    /// Signing algorithm
    #[serde(default)]
    pub tsig_algorithm: TsigAlgorithm,
}

impl ZoneConfig {
    /// Create a zone entry with the default algorithm
    pub fn new(name: impl Into<String>, tsig_key: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            tsig_key: Some(tsig_key.into()),
            tsig_algorithm: TsigAlgorithm::default(),
        }
    }

    /// Set the signing algorithm
    pub fn with_algorithm(mut self, algorithm: TsigAlgorithm) -> Self {
        self.tsig_algorithm = algorithm;
        self
    }

    /// Check that both required keys are present
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.name.as_deref().is_none_or(str::is_empty) {
            return Err(crate::Error::config(
                "Your zone dictionary must contain a key \"name\"",
            ));
        }
        if self.tsig_key.as_deref().is_none_or(str::is_empty) {
            return Err(crate::Error::config(
                "Your zone dictionary must contain a key \"tsig_key\"",
            ));
        }
        Ok(())
    }
}

/// Accept `secret: 12345678` as well as `secret: "12345678"`
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Str(s) => s,
        Scalar::Int(n) => n.to_string(),
        Scalar::Uint(n) => n.to_string(),
    }))
}

fn default_port() -> u16 {
    53
}

fn default_ttl() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_event_channel_capacity() -> usize {
    100
}
