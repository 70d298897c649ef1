//! Update decision engine
//!
//! The UpdateEngine is responsible for:
//! - Reading the current A/AAAA values of the requested name
//! - Deciding whether any requested family differs
//! - Sending one signed delete+add transaction for the changed families
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐
//! │ UpdateRequest │─────────────┐
//! └───────────────┘             │
//!                               ▼
//!                      ┌──────────────┐
//!                      │ UpdateEngine │──── EngineEvent ───▶ (monitoring)
//!                      └──────────────┘
//!                          │        │
//!             query (A/AAAA)│        │apply (delete+add)
//!                          ▼        ▼
//!                      ┌──────────────┐
//!                      │ DnsTransport │
//!                      └──────────────┘
//! ```
//!
//! ## Request Flow
//!
//! 1. Validate that at least one address is requested
//! 2. Query the current values for each requested family
//! 3. If every family already holds exactly the desired value, stop
//! 4. Otherwise apply one delete+add pair per changed family in a single
//!    transaction signed with the zone's key
//!
//! Queries and the update are each bounded by the configured timeout.
//! Nothing is retried: a submitted update may already have been applied.
//!
//! Concurrent requests for the same name are not serialized here and may
//! race at the nameserver.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::request::UpdateRequest;
use crate::traits::{DnsTransport, OperationPair, RecordType, UpdateOperation};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the UpdateEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A validated request entered the engine
    RequestReceived {
        fqdn: String,
    },

    /// Every requested family already holds the desired value
    UpdateSkipped {
        fqdn: String,
        current: Vec<IpAddr>,
    },

    /// A signed update is about to be sent
    UpdateStarted {
        fqdn: String,
        changed: Vec<RecordType>,
    },

    /// The nameserver accepted the update
    UpdateSucceeded {
        fqdn: String,
        changed: Vec<RecordType>,
    },

    /// The query or the update failed
    UpdateFailed {
        fqdn: String,
        error: String,
    },
}

/// Final state of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// No write was necessary
    Unchanged,
    /// The update was accepted
    Updated,
    /// Validation or transport failed
    Failed,
}

/// Result of processing one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    /// Final state
    pub status: OutcomeStatus,
    /// Operations actually sent, in order; empty unless `Updated`
    pub applied_operations: Vec<OperationPair>,
    /// Human-readable summary
    pub message: String,
}

impl UpdateOutcome {
    /// Outcome for a request that failed with `error`
    pub fn failed(error: &Error) -> Self {
        Self {
            status: OutcomeStatus::Failed,
            applied_operations: Vec::new(),
            message: error.to_string(),
        }
    }

    /// Fold an engine result into an outcome
    pub fn from_result(result: Result<UpdateOutcome>) -> Self {
        result.unwrap_or_else(|e| Self::failed(&e))
    }
}

/// What was observed for one requested family
#[derive(Debug, Clone, PartialEq, Eq)]
struct Observation {
    record_type: RecordType,
    desired: IpAddr,
    current: Vec<String>,
}

impl Observation {
    /// True if the record holds exactly the desired address
    fn is_current(&self) -> bool {
        match self.current.as_slice() {
            [only] => only
                .trim()
                .parse::<IpAddr>()
                .is_ok_and(|current| current == self.desired),
            _ => false,
        }
    }

    fn previous(&self) -> String {
        if self.current.is_empty() {
            "none".to_string()
        } else {
            self.current.join(",")
        }
    }
}

/// Core update decision engine
///
/// ## Threading
///
/// The engine holds no per-request state and can be shared across tasks
/// behind an `Arc`. All requests share one transport.
pub struct UpdateEngine {
    /// Transport for queries and updates
    transport: Arc<dyn DnsTransport>,

    /// Bound on each network round trip
    timeout: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl UpdateEngine {
    /// Create a new update engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        transport: Arc<dyn DnsTransport>,
        config: EngineConfig,
    ) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(config.event_channel_capacity.max(1));

        let engine = Self {
            transport,
            timeout: config.timeout,
            event_tx: tx,
        };

        (engine, rx)
    }

    /// Process one update request
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)` with status `Unchanged` or `Updated`
    /// - `Err(Error::QueryFailed)` if reading the current state failed; this
    ///   is never reported as `Unchanged`
    /// - `Err(Error::UpdateFailed)` if the signed update failed
    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateOutcome> {
        let fqdn = request.resolution.full_name().to_string();
        self.emit_event(EngineEvent::RequestReceived { fqdn: fqdn.clone() });

        let result = self.process(request).await;
        if let Err(e) = &result {
            error!("Update of {} failed: {}", fqdn, e);
            self.emit_event(EngineEvent::UpdateFailed {
                fqdn,
                error: e.to_string(),
            });
        }
        result
    }

    async fn process(&self, request: &UpdateRequest) -> Result<UpdateOutcome> {
        let resolution = &request.resolution;
        let fqdn = resolution.full_name();

        let mut observations = Vec::new();
        for desired in request.desired.iter() {
            let record_type = RecordType::for_addr(&desired);
            let current = self.query_current(fqdn, record_type).await?;
            debug!("Current {} values of {}: {:?}", record_type, fqdn, current);
            observations.push(Observation {
                record_type,
                desired,
                current,
            });
        }

        let changed: Vec<&Observation> = observations.iter().filter(|o| !o.is_current()).collect();

        if changed.is_empty() {
            let current: Vec<IpAddr> = observations.iter().map(|o| o.desired).collect();
            let message = format!(
                "UNCHANGED fqdn: {} {}",
                fqdn,
                observations
                    .iter()
                    .map(|o| format!("{}: {}", o.record_type.family(), o.desired))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            info!("{}", message);
            self.emit_event(EngineEvent::UpdateSkipped {
                fqdn: fqdn.to_string(),
                current,
            });
            return Ok(UpdateOutcome {
                status: OutcomeStatus::Unchanged,
                applied_operations: Vec::new(),
                message,
            });
        }

        let pairs: Vec<OperationPair> = changed
            .iter()
            .map(|o| {
                OperationPair::replace(
                    resolution.record_name(),
                    o.record_type,
                    request.ttl,
                    o.desired.to_string(),
                )
            })
            .collect();
        let operations: Vec<UpdateOperation> = pairs
            .iter()
            .flat_map(|pair| [pair.delete.clone(), pair.add.clone()])
            .collect();
        let changed_types: Vec<RecordType> = changed.iter().map(|o| o.record_type).collect();

        self.emit_event(EngineEvent::UpdateStarted {
            fqdn: fqdn.to_string(),
            changed: changed_types.clone(),
        });

        self.apply(resolution.zone(), &operations).await?;

        let message = format!(
            "UPDATED fqdn: {} {}",
            fqdn,
            changed
                .iter()
                .map(|o| format!("old_ip: {} new_ip: {}", o.previous(), o.desired))
                .collect::<Vec<_>>()
                .join(" ")
        );
        info!("{}", message);
        self.emit_event(EngineEvent::UpdateSucceeded {
            fqdn: fqdn.to_string(),
            changed: changed_types,
        });

        Ok(UpdateOutcome {
            status: OutcomeStatus::Updated,
            applied_operations: pairs,
            message,
        })
    }

    /// Query the current values of one family, bounded by the timeout
    async fn query_current(&self, fqdn: &str, record_type: RecordType) -> Result<Vec<String>> {
        match tokio::time::timeout(self.timeout, self.transport.query(fqdn, record_type)).await {
            Ok(Ok(values)) => Ok(values),
            Ok(Err(e @ Error::QueryFailed { .. })) => Err(e),
            Ok(Err(e)) => Err(Error::query_failed(fqdn, record_type, e.to_string())),
            Err(_) => Err(Error::query_failed(
                fqdn,
                record_type,
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }

    /// Send the update transaction, bounded by the timeout
    async fn apply(&self, zone: &crate::zone::Zone, operations: &[UpdateOperation]) -> Result<()> {
        debug!(
            "Sending {} operation(s) to zone {} via {}",
            operations.len(),
            zone.name(),
            self.transport.transport_name()
        );

        match tokio::time::timeout(self.timeout, self.transport.apply(zone, operations)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e @ Error::UpdateFailed { .. })) => Err(e),
            Ok(Err(e)) => Err(Error::update_failed(zone.name(), e.to_string())),
            Err(_) => Err(Error::update_failed(
                zone.name(),
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Never block a request on slow event consumers
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(desired: &str, current: &[&str]) -> Observation {
        let desired: IpAddr = desired.parse().unwrap();
        Observation {
            record_type: RecordType::for_addr(&desired),
            desired,
            current: current.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_is_current() {
        assert!(observation("1.2.3.4", &["1.2.3.4"]).is_current());
        assert!(!observation("1.2.3.4", &["1.2.3.5"]).is_current());
        assert!(!observation("1.2.3.4", &[]).is_current());
        assert!(!observation("1.2.3.4", &["1.2.3.4", "1.2.3.5"]).is_current());
        assert!(!observation("1.2.3.4", &["garbage"]).is_current());
    }

    #[test]
    fn test_is_current_normalizes_ipv6() {
        assert!(observation("1::2", &["1:0:0:0:0:0:0:2"]).is_current());
        assert!(observation("2001:db8::1", &["2001:DB8::1"]).is_current());
    }

    #[test]
    fn test_previous() {
        assert_eq!(observation("1.2.3.4", &[]).previous(), "none");
        assert_eq!(observation("1.2.3.4", &["1.1.1.1", "2.2.2.2"]).previous(), "1.1.1.1,2.2.2.2");
    }

    #[test]
    fn test_failed_outcome() {
        let outcome = UpdateOutcome::from_result(Err(Error::MissingAddress));
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome.applied_operations.is_empty());
    }
}
