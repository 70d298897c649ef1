//! Hostname and TSIG key validation
//!
//! Every name that enters the crate passes through [`validate_hostname`],
//! which returns the canonical absolute form: lowercase ASCII with exactly
//! one trailing dot. Suffix matching and equality elsewhere compare these
//! canonical strings directly.

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Maximum length of a hostname without its trailing dot
pub const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum length of a single label
pub const MAX_LABEL_LEN: usize = 63;

/// Validate a hostname and return it in canonical absolute form
///
/// At most one trailing dot is stripped before checking, so `example.com`
/// and `example.com.` are equivalent while `example.com..` is rejected
/// (its last label is empty).
///
/// # Errors
///
/// [`Error::InvalidName`] if the name is empty, longer than 253 characters,
/// has an all-numeric top-level label, or contains a label that is not 1–63
/// letters, digits and hyphens with no leading or trailing hyphen.
pub fn validate_hostname(hostname: &str) -> Result<String> {
    let stripped = hostname.strip_suffix('.').unwrap_or(hostname);

    if stripped.is_empty() {
        return Err(Error::invalid_name(hostname, "the name is empty"));
    }

    if stripped.len() > MAX_HOSTNAME_LEN {
        let head: String = stripped.chars().take(10).collect();
        return Err(Error::invalid_name(
            format!("{}...", head),
            format!("longer than {} characters", MAX_HOSTNAME_LEN),
        ));
    }

    let labels: Vec<&str> = stripped.split('.').collect();

    if let Some(tld) = labels.last()
        && !tld.is_empty()
        && tld.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::invalid_name(
            hostname,
            format!("the TLD \"{}\" must not be all-numeric", tld),
        ));
    }

    for label in &labels {
        if !is_valid_label(label) {
            return Err(Error::invalid_name(
                hostname,
                format!("the label \"{}\" is invalid", label),
            ));
        }
    }

    let mut canonical = stripped.to_ascii_lowercase();
    canonical.push('.');
    Ok(canonical)
}

fn is_valid_label(label: &str) -> bool {
    (1..=MAX_LABEL_LEN).contains(&label.len())
        && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// Decode base64 TSIG key material
///
/// Called when a zone is constructed, so a bad key is rejected at
/// configuration load rather than in the middle of an update.
///
/// # Errors
///
/// [`Error::InvalidKey`] if the material is not standard padded base64 or
/// decodes to an empty key.
pub fn validate_tsig_key(zone_name: &str, material: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(material.trim())
        .map_err(|e| Error::invalid_key(zone_name, e.to_string()))?;

    if bytes.is_empty() {
        return Err(Error::invalid_key(zone_name, "the key is empty"));
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        assert_eq!(validate_hostname("www.example.com").unwrap(), "www.example.com.");
        assert_eq!(validate_hostname("www.example.com.").unwrap(), "www.example.com.");
        assert_eq!(validate_hostname("WWW.Example.COM").unwrap(), "www.example.com.");
        assert_eq!(validate_hostname("www").unwrap(), "www.");
    }

    #[test]
    fn test_idempotent() {
        for name in ["a", "Sub.Example.org.", "x-1.y2.z", "a.b.c.d.e"] {
            let once = validate_hostname(name).unwrap();
            assert_eq!(validate_hostname(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_only_one_trailing_dot_stripped() {
        assert!(matches!(
            validate_hostname("example.com.."),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_empty_and_root() {
        assert!(validate_hostname("").is_err());
        assert!(validate_hostname(".").is_err());
    }

    #[test]
    fn test_label_rules() {
        assert!(validate_hostname("l o l").is_err());
        assert!(validate_hostname("-www.example.com").is_err());
        assert!(validate_hostname("www-.example.com").is_err());
        assert!(validate_hostname("w_w.example.com").is_err());
        assert!(validate_hostname("a..example.com").is_err());
        assert!(validate_hostname("wöw.example.com").is_err());

        let long_label = "a".repeat(MAX_LABEL_LEN);
        assert!(validate_hostname(&format!("{}.com", long_label)).is_ok());
        let too_long_label = "a".repeat(MAX_LABEL_LEN + 1);
        assert!(validate_hostname(&format!("{}.com", too_long_label)).is_err());
    }

    #[test]
    fn test_numeric_tld() {
        let err = validate_hostname("www.example.123").unwrap_err();
        assert!(err.to_string().contains("all-numeric"));
        assert!(validate_hostname("1.2.3.4").is_err());
        // Numeric labels below the TLD are fine
        assert!(validate_hostname("123.example.com").is_ok());
    }

    #[test]
    fn test_total_length() {
        // 4 * 63 + 3 dots = 255 characters
        let label = "a".repeat(63);
        let name = [label.as_str(); 4].join(".");
        assert!(validate_hostname(&name).is_err());

        // 3 * 63 + 61 + 3 dots = 253 characters
        let short = "b".repeat(61);
        let name = format!("{0}.{0}.{0}.{1}", label, short);
        assert_eq!(name.len(), 253);
        assert!(validate_hostname(&name).is_ok());
        assert!(validate_hostname(&format!("{}.", name)).is_ok());
    }

    #[test]
    fn test_tsig_key() {
        assert_eq!(
            validate_tsig_key("example.com.", "tPyvZA==").unwrap(),
            vec![0xb4, 0xfc, 0xaf, 0x64]
        );
        assert!(matches!(
            validate_tsig_key("example.com.", "xxx"),
            Err(Error::InvalidKey { .. })
        ));
        assert!(validate_tsig_key("example.com.", "").is_err());
        assert!(validate_tsig_key("example.com.", "not base64!").is_err());
    }
}
