//! Command-line arguments
//!
//! Every flag can also be given through a `TSIGDDNS_*` environment variable.

use clap::Parser;
use std::path::PathBuf;
use tsigddns_core::UpdateArgs;

/// Configuration file read when neither `--config` nor
/// `TSIGDDNS_CONFIG_FILE` is given
pub const DEFAULT_CONFIG_FILE: &str = "/etc/tsigddns.yml";

/// Update the A/AAAA records of a host with a TSIG-signed dynamic DNS update
#[derive(Debug, Parser)]
#[command(author, version)]
pub struct Args {
    /// Configuration file
    #[arg(
        long,
        env = "TSIGDDNS_CONFIG_FILE",
        value_name = "FILE",
        default_value = DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Shared secret configured on the server side
    #[arg(long, env = "TSIGDDNS_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Fully qualified name to update, e.g. www.example.com
    #[arg(long, env = "TSIGDDNS_FQDN", value_name = "NAME")]
    pub fqdn: Option<String>,

    /// Zone of the record (use together with --record-name)
    #[arg(long, env = "TSIGDDNS_ZONE_NAME", value_name = "ZONE")]
    pub zone_name: Option<String>,

    /// Record name relative to the zone (use together with --zone-name)
    #[arg(long, env = "TSIGDDNS_RECORD_NAME", value_name = "NAME")]
    pub record_name: Option<String>,

    /// First address (IPv4 or IPv6)
    #[arg(long = "ip-1", env = "TSIGDDNS_IP_1", value_name = "IP")]
    pub ip_1: Option<String>,

    /// Second address, of the other family
    #[arg(long = "ip-2", env = "TSIGDDNS_IP_2", value_name = "IP")]
    pub ip_2: Option<String>,

    /// Log level
    #[arg(
        long,
        env = "TSIGDDNS_LOG_LEVEL",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"]
    )]
    pub log_level: String,

    /// Print the outcome as JSON
    #[arg(long, env = "TSIGDDNS_JSON")]
    pub json: bool,
}

impl Args {
    /// Parse the process arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The request part of the arguments, as the core expects it
    pub fn update_args(&self) -> UpdateArgs {
        UpdateArgs {
            secret: self.secret.clone(),
            fqdn: self.fqdn.clone(),
            zone_name: self.zone_name.clone(),
            record_name: self.record_name.clone(),
            ip_1: self.ip_1.clone(),
            ip_2: self.ip_2.clone(),
        }
    }
}
