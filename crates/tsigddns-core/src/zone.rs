//! A single authoritative zone and its TSIG key

use crate::error::Result;
use crate::names::{validate_hostname, validate_tsig_key};
use serde::{Deserialize, Serialize};
use std::fmt;

/// HMAC algorithm used to sign updates for a zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TsigAlgorithm {
    /// HMAC-SHA1 (RFC 8945 mandatory-to-implement)
    #[serde(rename = "hmac-sha1")]
    HmacSha1,
    /// HMAC-SHA256
    #[default]
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
    /// HMAC-SHA512
    #[serde(rename = "hmac-sha512")]
    HmacSha512,
}

impl TsigAlgorithm {
    /// The algorithm's domain name as carried in the TSIG RR
    pub fn name(&self) -> &'static str {
        match self {
            Self::HmacSha1 => "hmac-sha1.",
            Self::HmacSha256 => "hmac-sha256.",
            Self::HmacSha512 => "hmac-sha512.",
        }
    }
}

impl fmt::Display for TsigAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().trim_end_matches('.'))
    }
}

/// Decoded TSIG key material
///
/// The key name is the zone name. The `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct TsigKey {
    name: String,
    algorithm: TsigAlgorithm,
    secret: Vec<u8>,
}

impl TsigKey {
    /// Key name (canonical)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signing algorithm
    pub fn algorithm(&self) -> TsigAlgorithm {
        self.algorithm
    }

    /// Raw shared secret
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for TsigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigKey")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

/// A configured authoritative zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    name: String,
    key: TsigKey,
}

impl Zone {
    /// Create a zone, validating its name and decoding its key
    ///
    /// # Errors
    ///
    /// - `InvalidName` if `name` is not a valid hostname
    /// - `InvalidKey` if `key_material` is not valid base64
    pub fn new(name: &str, key_material: &str, algorithm: TsigAlgorithm) -> Result<Self> {
        let name = validate_hostname(name)?;
        let secret = validate_tsig_key(&name, key_material)?;

        Ok(Self {
            key: TsigKey {
                name: name.clone(),
                algorithm,
                secret,
            },
            name,
        })
    }

    /// Canonical zone name, e.g. `example.com.`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The zone's TSIG key
    pub fn key(&self) -> &TsigKey {
        &self.key
    }

    /// Split a full name into `(record_name, zone_name)`
    ///
    /// Returns `None` unless this zone is a proper, label-aligned suffix of
    /// `full_name`. The zone apex itself does not split.
    ///
    /// ```
    /// # use tsigddns_core::zone::{Zone, TsigAlgorithm};
    /// let zone = Zone::new("example.com", "tPyvZA==", TsigAlgorithm::default()).unwrap();
    /// let split = zone.split("www.example.com").unwrap();
    /// assert_eq!(split, Some(("www.".to_string(), "example.com.".to_string())));
    /// ```
    pub fn split(&self, full_name: &str) -> Result<Option<(String, String)>> {
        let full_name = validate_hostname(full_name)?;
        Ok(self
            .record_part(&full_name)
            .map(|record| (record.to_string(), self.name.clone())))
    }

    /// Build the full name for a record in this zone
    pub fn build(&self, record_name: &str) -> Result<String> {
        let record_name = validate_hostname(record_name)?;
        Ok(format!("{}{}", record_name, self.name))
    }

    /// Record part of an already-canonical full name, if this zone contains it
    pub(crate) fn record_part<'a>(&self, canonical: &'a str) -> Option<&'a str> {
        let record = canonical.strip_suffix(self.name.as_str())?;
        // A non-empty prefix ending in a dot keeps the match on a label boundary
        if record.len() > 1 && record.ends_with('.') {
            Some(record)
        } else {
            None
        }
    }
}
