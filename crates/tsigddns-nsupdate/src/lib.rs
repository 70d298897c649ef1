// # RFC 2136 Transport
//
// `DnsTransport` implementation that talks to the authoritative nameserver
// directly over TCP. Messages are built, parsed and TSIG-signed with the
// `domain` crate.
//
// ## Exchanges
//
// - **query**: plain class-IN question for one name and type; only answer
//   records owned by that name and of that type count. NXDOMAIN yields an
//   empty set.
// - **apply**: one UPDATE message for the zone carrying every operation,
//   signed with the zone's TSIG key. The response must answer the request
//   (QR set, same id, same zone section, same opcode), carry a TSIG RR that
//   verifies against the request MAC, and report NOERROR.
//
// ## Constraints
//
// - One TCP connection per exchange, 2-byte length framing (RFC 1035 4.2.2)
// - No retries; the engine bounds every call with its own timeout
// - Key material never appears in logs or errors
//
// ## Message Layout
//
// ```text
// UPDATE  zone:       example.com.      SOA  IN
//         update:     www.example.com.  ANY  A   ttl 0  rdlen 0
//                     www.example.com.  IN   A   ttl 300  1.2.3.5
//         additional: example.com.      ANY  TSIG ...
// ```

pub mod error;

use crate::error::WireResult;
use async_trait::async_trait;
use domain::base::iana::{Class, Opcode, Rcode};
use domain::base::{
    Message, MessageBuilder, Name, Question, Record, Rtype, StreamTarget, ToName, Ttl,
    UnknownRecordData,
};
use domain::rdata::tsig::Time48;
use domain::rdata::{A, Aaaa};
use domain::tsig::{Algorithm, ClientTransaction, Key, KeyName};
use std::fmt::Display;
use std::net::IpAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tsigddns_core::{
    AppConfig, DnsTransport, Error, RecordType, Result, TsigAlgorithm, UpdateOperation, Zone,
};

pub use error::WireError;

/// Request bytes, already carrying the TCP length prefix
type Request = StreamTarget<Vec<u8>>;

/// Nameserver endpoint for queries and signed updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsupdateTransport {
    nameserver: String,
    port: u16,
}

impl NsupdateTransport {
    /// Create a transport for `nameserver` (host name or IP literal)
    pub fn new(nameserver: impl Into<String>, port: u16) -> Self {
        Self {
            nameserver: nameserver.into(),
            port,
        }
    }

    /// Create a transport from validated configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.nameserver(), config.port)
    }

    /// `host:port` as used in error messages
    pub fn server(&self) -> String {
        if self.nameserver.contains(':') {
            format!("[{}]:{}", self.nameserver, self.port)
        } else {
            format!("{}:{}", self.nameserver, self.port)
        }
    }

    async fn exchange(&self, request: &Request) -> WireResult<Message<Vec<u8>>> {
        let io = |source| WireError::Io {
            server: self.server(),
            source,
        };

        let mut stream = TcpStream::connect((self.nameserver.as_str(), self.port))
            .await
            .map_err(io)?;
        stream
            .write_all(request.as_stream_slice())
            .await
            .map_err(io)?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await.map_err(io)?;
        let mut response = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
        stream.read_exact(&mut response).await.map_err(io)?;

        tracing::trace!(
            "Exchanged {} / {} bytes with {}",
            request.as_dgram_slice().len(),
            response.len(),
            self.server()
        );
        Message::from_octets(response).map_err(malformed)
    }

    async fn query_records(&self, name: &str, record_type: RecordType) -> WireResult<Vec<String>> {
        let qname = domain_name(name)?;
        let rtype = Rtype::from_int(record_type.code());

        let mut builder = MessageBuilder::new_stream_vec();
        builder.header_mut().set_random_id();
        let mut builder = builder.question();
        builder.push(Question::new_in(&qname, rtype))?;
        let request = builder.finish();

        let response = self.exchange(&request).await?;
        check_answer(&request, &response)?;

        let rcode = response.header().rcode();
        if rcode == Rcode::NXDOMAIN {
            tracing::debug!("{} does not exist", name);
            return Ok(Vec::new());
        }
        if rcode != Rcode::NOERROR {
            return Err(WireError::Rcode(rcode.to_int()));
        }

        let mut values = Vec::new();
        for record in response.answer().map_err(malformed)? {
            let record = record.map_err(malformed)?;
            if record.class() != Class::IN
                || record.rtype() != rtype
                || !record.owner().name_eq(&qname)
            {
                continue;
            }
            let value = match record_type {
                RecordType::A => record
                    .to_record::<A>()
                    .map_err(malformed)?
                    .map(|r| r.data().addr().to_string()),
                RecordType::Aaaa => record
                    .to_record::<Aaaa>()
                    .map_err(malformed)?
                    .map(|r| r.data().addr().to_string()),
            };
            values.extend(value);
        }
        tracing::debug!("{} {} = {:?}", name, record_type, values);
        Ok(values)
    }

    async fn send_update(&self, zone: &Zone, operations: &[UpdateOperation]) -> WireResult<()> {
        let key = tsig_key(zone)?;
        let zone_name = domain_name(zone.name())?;

        let mut builder = MessageBuilder::new_stream_vec();
        builder.header_mut().set_random_id();
        builder.header_mut().set_opcode(Opcode::UPDATE);
        let mut zone_section = builder.question();
        zone_section.push(Question::new_in(&zone_name, Rtype::SOA))?;

        let mut update = zone_section.authority();
        for operation in operations {
            let owner = domain_name(&format!("{}{}", operation.name(), zone.name()))?;
            match operation {
                UpdateOperation::Delete { record_type, .. } => {
                    let rtype = Rtype::from_int(record_type.code());
                    let empty = UnknownRecordData::from_octets(rtype, &[][..]).map_err(|e| {
                        WireError::InvalidValue {
                            record_type: record_type.to_string(),
                            value: e.to_string(),
                        }
                    })?;
                    update.push(Record::new(&owner, Class::ANY, Ttl::from_secs(0), empty))?;
                }
                UpdateOperation::Add {
                    record_type,
                    ttl,
                    value,
                    ..
                } => {
                    let ttl = Ttl::from_secs(*ttl);
                    match address(*record_type, value)? {
                        IpAddr::V4(ip) => {
                            update.push(Record::new(&owner, Class::IN, ttl, A::new(ip)))?
                        }
                        IpAddr::V6(ip) => {
                            update.push(Record::new(&owner, Class::IN, ttl, Aaaa::new(ip)))?
                        }
                    }
                }
            }
        }

        let mut signed = update.additional();
        let transaction = ClientTransaction::request(&key, &mut signed, Time48::now())?;
        let request = signed.finish();
        tracing::debug!(
            "Sending UPDATE for zone {} ({} operations, {})",
            zone.name(),
            operations.len(),
            zone.key().algorithm()
        );

        let mut response = self.exchange(&request).await?;
        check_answer(&request, &response)?;
        transaction.answer(&mut response, Time48::now())?;

        let rcode = response.header().rcode();
        if rcode != Rcode::NOERROR {
            return Err(WireError::Rcode(rcode.to_int()));
        }
        Ok(())
    }
}

/// TSIG key named after the zone, with the zone's algorithm and secret
fn tsig_key(zone: &Zone) -> WireResult<Key> {
    let algorithm = match zone.key().algorithm() {
        TsigAlgorithm::HmacSha1 => Algorithm::Sha1,
        TsigAlgorithm::HmacSha256 => Algorithm::Sha256,
        TsigAlgorithm::HmacSha512 => Algorithm::Sha512,
    };
    let name: KeyName = zone.name().parse().map_err(|e| WireError::InvalidName {
        name: zone.name().to_string(),
        reason: format!("{}", e),
    })?;
    Key::new(algorithm, zone.key().secret(), name, None, None).map_err(|e| WireError::Key {
        zone: zone.name().to_string(),
        reason: e.to_string(),
    })
}

fn domain_name(name: &str) -> WireResult<Name<Vec<u8>>> {
    name.parse().map_err(|e| WireError::InvalidName {
        name: name.to_string(),
        reason: format!("{}", e),
    })
}

/// Parse `value` as an address of the family `record_type` holds
fn address(record_type: RecordType, value: &str) -> WireResult<IpAddr> {
    match value.parse::<IpAddr>() {
        Ok(ip) if RecordType::for_addr(&ip) == record_type => Ok(ip),
        _ => Err(WireError::InvalidValue {
            record_type: record_type.to_string(),
            value: value.to_string(),
        }),
    }
}

/// The response must answer `request` and keep its opcode
fn check_answer(request: &Request, response: &Message<Vec<u8>>) -> WireResult<()> {
    let request = Message::from_octets(request.as_dgram_slice()).map_err(malformed)?;
    if !response.is_answer(&request) {
        return Err(WireError::NotAnAnswer(request.header().id()));
    }
    let (expected, received) = (request.header().opcode(), response.header().opcode());
    if expected != received {
        return Err(WireError::Opcode { expected, received });
    }
    Ok(())
}

fn malformed(e: impl Display) -> WireError {
    WireError::Malformed(e.to_string())
}

#[async_trait]
impl DnsTransport for NsupdateTransport {
    async fn query(&self, name: &str, record_type: RecordType) -> Result<Vec<String>> {
        self.query_records(name, record_type)
            .await
            .map_err(|e| Error::query_failed(name, record_type, e.to_string()))
    }

    async fn apply(&self, zone: &Zone, operations: &[UpdateOperation]) -> Result<()> {
        self.send_update(zone, operations).await.map_err(|e| {
            tracing::warn!("UPDATE for zone {} failed: {}", zone.name(), e);
            Error::update_failed(zone.name(), e.to_string())
        })
    }

    fn transport_name(&self) -> &'static str {
        "nsupdate"
    }
}
