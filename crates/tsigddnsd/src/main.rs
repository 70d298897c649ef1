// # tsigddns - TSIG Dynamic DNS Updater
//
// Thin command-line layer over tsigddns-core:
// 1. Parse arguments and initialize logging
// 2. Load and validate the YAML configuration
// 3. Build the zone registry
// 4. Validate the request (secret, identity, addresses)
// 5. Run one update through the engine with the RFC 2136 transport
// 6. Print the outcome and exit with a status code
//
// No DNS logic lives here.
//
// ## Configuration
//
// - `--config` / `TSIGDDNS_CONFIG_FILE`: YAML file (default `/etc/tsigddns.yml`)
// - `--log-level` / `TSIGDDNS_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// tsigddns --secret 12345678 --fqdn www.example.com --ip-1 1.2.3.4
// UPDATED fqdn: www.example.com. old_ip: none new_ip: 1.2.3.4
// ```

mod args;
mod config_file;

use anyhow::{Context, Result};
use args::Args;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;
use tsigddns_core::{AppConfig, OutcomeStatus, UpdateEngine, UpdateOutcome, ZoneRegistry};
use tsigddns_nsupdate::NsupdateTransport;

/// Exit codes for the possible results of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TsigddnsExitCode {
    /// Records updated or already current
    Success = 0,
    /// Configuration file missing, malformed or invalid
    ConfigError = 1,
    /// Query or update exchange failed, or the runtime could not start
    RuntimeError = 2,
    /// Request rejected (secret, identity or addresses)
    Rejected = 3,
}

impl From<TsigddnsExitCode> for ExitCode {
    fn from(code: TsigddnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let args = Args::parse_args();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&args.log_level))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return TsigddnsExitCode::ConfigError.into();
    }

    let (config, registry) = match load(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{:#}", e);
            let outcome = UpdateOutcome {
                status: OutcomeStatus::Failed,
                applied_operations: Vec::new(),
                message: format!("{:#}", e),
            };
            report(&args, &outcome);
            return TsigddnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return TsigddnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(&args, config, registry)).into()
}

fn log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Load the configuration and build the zone registry from it
fn load(args: &Args) -> Result<(AppConfig, ZoneRegistry)> {
    let config = config_file::load(&args.config)?;
    let registry = ZoneRegistry::from_config(&config.zones)
        .context("The zone configuration is invalid")?;
    info!(
        "Configuration loaded: {} zone(s), nameserver {}:{}",
        registry.len(),
        config.nameserver(),
        config.port
    );
    Ok((config, registry))
}

/// Validate and execute the request described by `args`
async fn run(args: &Args, config: AppConfig, registry: ZoneRegistry) -> TsigddnsExitCode {
    let request = match args.update_args().into_request(&config, &registry) {
        Ok(request) => request,
        Err(e) => {
            info!("Request rejected: {}", e);
            report(args, &UpdateOutcome::failed(&e));
            return TsigddnsExitCode::Rejected;
        }
    };

    let transport = Arc::new(NsupdateTransport::from_config(&config));
    let (engine, mut events) = UpdateEngine::new(transport, config.engine());
    let monitor = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    let result = engine.update(&request).await;
    let code = match &result {
        Ok(_) => TsigddnsExitCode::Success,
        Err(e) if e.is_transport() => TsigddnsExitCode::RuntimeError,
        Err(_) => TsigddnsExitCode::Rejected,
    };
    let outcome = UpdateOutcome::from_result(result);

    drop(engine);
    if let Err(e) = monitor.await {
        debug!("Event monitor stopped: {}", e);
    }

    report(args, &outcome);
    code
}

/// Print the outcome on stdout, as text or JSON
fn report(args: &Args, outcome: &UpdateOutcome) {
    if args.json {
        match serde_json::to_string(outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize outcome: {}", e),
        }
    } else {
        println!("{}", outcome.message);
    }
}
