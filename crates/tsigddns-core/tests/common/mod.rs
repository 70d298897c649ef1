//! Test doubles and common utilities for engine contract tests
//!
//! The engine only sees `Arc<dyn DnsTransport>`, so every test injects a
//! [`FakeTransport`] and inspects what the engine asked of it.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tsigddns_core::error::{Error, Result};
use tsigddns_core::traits::{DnsTransport, RecordType, UpdateOperation};
use tsigddns_core::{
    AppConfig, DesiredAddresses, EngineConfig, FqdnResolution, UpdateEngine, UpdateRequest, Zone,
    ZoneConfig, ZoneRegistry,
};

/// How the fake should answer a call
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Answer normally
    Succeed,
    /// Fail with the given reason
    Fail(String),
    /// Sleep before answering normally
    Stall(Duration),
}

/// A recording DnsTransport with canned query answers
pub struct FakeTransport {
    /// Current values keyed by (absolute name, type)
    records: Mutex<HashMap<(String, RecordType), Vec<String>>>,
    query_behavior: Mutex<Behavior>,
    apply_behavior: Mutex<Behavior>,
    query_call_count: AtomicUsize,
    apply_call_count: AtomicUsize,
    /// Every apply() call: (zone name, operations)
    applied: Mutex<Vec<(String, Vec<UpdateOperation>)>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            records: Mutex::new(HashMap::new()),
            query_behavior: Mutex::new(Behavior::Succeed),
            apply_behavior: Mutex::new(Behavior::Succeed),
            query_call_count: AtomicUsize::new(0),
            apply_call_count: AtomicUsize::new(0),
            applied: Mutex::new(Vec::new()),
        })
    }

    /// Set the current values of a record
    pub fn set_record(&self, name: &str, record_type: RecordType, values: &[&str]) {
        self.records.lock().unwrap().insert(
            (name.to_string(), record_type),
            values.iter().map(|v| v.to_string()).collect(),
        );
    }

    pub fn set_query_behavior(&self, behavior: Behavior) {
        *self.query_behavior.lock().unwrap() = behavior;
    }

    pub fn set_apply_behavior(&self, behavior: Behavior) {
        *self.apply_behavior.lock().unwrap() = behavior;
    }

    /// Get the number of times query() was called
    pub fn query_call_count(&self) -> usize {
        self.query_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times apply() was called
    pub fn apply_call_count(&self) -> usize {
        self.apply_call_count.load(Ordering::SeqCst)
    }

    /// Get every apply() call made so far
    pub fn applied(&self) -> Vec<(String, Vec<UpdateOperation>)> {
        self.applied.lock().unwrap().clone()
    }

    /// Total number of network calls
    pub fn network_calls(&self) -> usize {
        self.query_call_count() + self.apply_call_count()
    }
}

#[async_trait::async_trait]
impl DnsTransport for FakeTransport {
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>> {
        self.query_call_count.fetch_add(1, Ordering::SeqCst);

        let behavior = self.query_behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Fail(reason) => return Err(Error::query_failed(name, record_type, reason)),
            Behavior::Stall(delay) => tokio::time::sleep(delay).await,
            Behavior::Succeed => {}
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(name.to_string(), record_type))
            .cloned()
            .unwrap_or_default())
    }

    async fn apply(&self, zone: &Zone, operations: &[UpdateOperation]) -> Result<()> {
        self.apply_call_count.fetch_add(1, Ordering::SeqCst);
        self.applied
            .lock()
            .unwrap()
            .push((zone.name().to_string(), operations.to_vec()));

        let behavior = self.apply_behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Fail(reason) => Err(Error::update_failed(zone.name(), reason)),
            Behavior::Stall(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Behavior::Succeed => Ok(()),
        }
    }

    fn transport_name(&self) -> &'static str {
        "fake"
    }
}

/// Helper to create a minimal AppConfig for testing
pub fn minimal_config() -> AppConfig {
    AppConfig::new("12345678", "127.0.0.1")
        .with_zone(ZoneConfig::new("example.com", "tPyvZA=="))
        .with_zone(ZoneConfig::new("a.example.com", "dGVzdGtleQ=="))
}

pub fn registry() -> ZoneRegistry {
    ZoneRegistry::from_config(&minimal_config().zones).expect("valid zones")
}

/// Engine with a short timeout wired to `transport`
pub fn engine(transport: &Arc<FakeTransport>) -> UpdateEngine {
    let config = EngineConfig {
        timeout: Duration::from_millis(200),
        event_channel_capacity: 16,
    };
    let (engine, _events) = UpdateEngine::new(transport.clone(), config);
    engine
}

/// Request for `fqdn` with the given addresses
pub fn request(fqdn: &str, ipv4: Option<&str>, ipv6: Option<&str>) -> UpdateRequest {
    let resolution = FqdnResolution::new(&registry(), Some(fqdn), None, None).expect("resolvable");
    let desired = DesiredAddresses::new(
        ipv4.map(|ip| ip.parse().expect("ipv4")),
        ipv6.map(|ip| ip.parse().expect("ipv6")),
    )
    .expect("at least one address");
    UpdateRequest::new(resolution, desired)
}
