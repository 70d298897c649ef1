//! Core traits for tsigddns
//!
//! - [`DnsTransport`]: Query current records and apply signed updates

pub mod transport;

pub use transport::{DnsTransport, OperationPair, RecordType, UpdateOperation};
