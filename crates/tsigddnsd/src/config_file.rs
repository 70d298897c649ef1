//! YAML configuration file loading
//!
//! ```yaml
//! secret: VDEdxeTKH
//! nameserver: 127.0.0.1
//! zones:
//!   - name: example.com
//!     tsig_key: tPyvZA==
//!     tsig_algorithm: hmac-sha256
//! ```

use anyhow::{Context, Result, bail};
use std::io::ErrorKind;
use std::path::Path;
use tsigddns_core::AppConfig;

/// Read, parse and validate the configuration file at `path`
pub fn load(path: &Path) -> Result<AppConfig> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            bail!("The configuration file {} could not be found.", path.display())
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("The configuration file {} could not be read.", path.display())
            });
        }
    };

    let config: AppConfig = serde_yaml::from_str(&text)
        .context("The configuration file is in an invalid YAML format.")?;
    config.validate()?;

    tracing::debug!(
        "Loaded {} with {} zone(s), nameserver {}",
        path.display(),
        config.zones.len(),
        config.nameserver()
    );
    Ok(config)
}
