//! Failures of a single nameserver exchange
//!
//! These never leave the crate: the transport maps them onto
//! `tsigddns_core::Error::QueryFailed` / `UpdateFailed`, keeping the
//! `Display` text as the reason.

use domain::base::iana::Opcode;
use domain::base::message_builder::PushError;
use domain::tsig::ValidationError;
use thiserror::Error;

/// Result alias for exchange-level operations
pub type WireResult<T> = std::result::Result<T, WireError>;

/// Message construction, transport, response or TSIG failure
#[derive(Error, Debug)]
pub enum WireError {
    /// Socket-level failure
    #[error("connection to {server} failed: {source}")]
    Io {
        /// `host:port` of the nameserver
        server: String,
        #[source]
        source: std::io::Error,
    },

    /// Request did not fit into a DNS message
    #[error("request could not be built: {0}")]
    Build(#[from] PushError),

    /// A name could not be turned into a wire-format domain name
    #[error("invalid domain name {name}: {reason}")]
    InvalidName {
        /// Name as given
        name: String,
        /// Parser message
        reason: String,
    },

    /// Record value does not match its type
    #[error("\"{value}\" is not valid {record_type} record data")]
    InvalidValue {
        /// Record type name
        record_type: String,
        /// Offending value
        value: String,
    },

    /// The zone's TSIG key was refused by the signer
    #[error("TSIG key of zone {zone} is unusable: {reason}")]
    Key {
        /// Zone name
        zone: String,
        /// Why the key was refused
        reason: String,
    },

    /// Response bytes are not a parseable DNS message
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Response is not an answer to the request (QR clear, other id or
    /// other question)
    #[error("response does not match request {0}")]
    NotAnAnswer(u16),

    /// Response carries a different opcode than the request
    #[error("response opcode {received} does not match request opcode {expected}")]
    Opcode {
        /// Opcode sent
        expected: Opcode,
        /// Opcode received
        received: Opcode,
    },

    /// Server answered with a non-zero rcode
    #[error("server responded with {}", rcode_name(*.0))]
    Rcode(u8),

    /// Response TSIG missing, rejected by the server or not verifying
    #[error("response failed TSIG validation: {0}")]
    Tsig(#[from] ValidationError),
}

/// Mnemonic for a DNS header rcode
pub fn rcode_name(rcode: u8) -> String {
    let name = match rcode {
        0 => "NOERROR",
        1 => "FORMERR",
        2 => "SERVFAIL",
        3 => "NXDOMAIN",
        4 => "NOTIMP",
        5 => "REFUSED",
        6 => "YXDOMAIN",
        7 => "YXRRSET",
        8 => "NXRRSET",
        9 => "NOTAUTH",
        10 => "NOTZONE",
        other => return format!("RCODE{}", other),
    };
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rcode_names() {
        assert_eq!(rcode_name(5), "REFUSED");
        assert_eq!(rcode_name(10), "NOTZONE");
        assert_eq!(rcode_name(12), "RCODE12");
    }

    #[test]
    fn test_display_uses_mnemonics() {
        assert_eq!(WireError::Rcode(9).to_string(), "server responded with NOTAUTH");
        assert_eq!(
            WireError::Tsig(ValidationError::ServerUnsigned).to_string(),
            "response failed TSIG validation: unsigned answer"
        );
    }

    #[test]
    fn test_opcode_mismatch_names_both() {
        let err = WireError::Opcode {
            expected: Opcode::UPDATE,
            received: Opcode::QUERY,
        };
        assert_eq!(
            err.to_string(),
            "response opcode QUERY does not match request opcode UPDATE"
        );
    }
}
