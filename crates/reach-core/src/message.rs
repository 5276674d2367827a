//! Wire codec for the handshake payloads.
//!
//! Payloads use the protobuf wire format: each field is a varint tag
//! `(field_number << 3) | wire_type` followed by a varint (wire type 0)
//! or a length-prefixed byte string (wire type 2). Zero and empty
//! fields are omitted on encode and default on decode; unknown fields
//! are skipped, unsupported wire types are rejected.
//!
//! The transport frames payloads; this module never sees length
//! prefixes or message-type tags. Which message a buffer holds is
//! implied by the handshake state, so every message type has its own
//! `parse`/`serialize` pair.
//!
//! Big integers (`N`, `g`, `s`, `A`, `B`) are unsigned big-endian byte
//! arrays. AEAD nonces are 12 bytes.

use crate::{Error, Result};

/// Encryption bitmask bit for AES-256-GCM.
pub const ENCRYPTION_AES256_GCM: u32 = 0x01;
/// Encryption bitmask bit for ChaCha20-Poly1305.
pub const ENCRYPTION_CHACHA20_POLY1305: u32 = 0x02;

/// Identification methods a client may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum IdentifyMethod {
    /// SRP-6a password authentication. Always supported.
    Srp = 0,
    /// Anonymous access; only honored when the server enables it.
    Anonymous = 1,
}

impl IdentifyMethod {
    /// Convert from wire format.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Srp),
            1 => Some(Self::Anonymous),
            _ => None,
        }
    }

    /// Convert to wire format.
    pub fn to_u32(self) -> u32 {
        self as u32
    }
}

/// Operating system reported in the challenge/response exchange.
///
/// Opaque to the handshake: the embedding application decides what to
/// report and what to make of the peer's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum OsType {
    /// Unknown or unreported.
    #[default]
    Unknown = 0,
    /// Microsoft Windows.
    Windows = 1,
    /// Linux.
    Linux = 2,
    /// Apple macOS.
    MacOs = 3,
    /// Android.
    Android = 4,
    /// Apple iOS.
    Ios = 5,
}

impl OsType {
    /// Convert from wire format. Unrecognized values map to `Unknown`
    /// (the field is informational, not negotiated).
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Windows,
            2 => Self::Linux,
            3 => Self::MacOs,
            4 => Self::Android,
            5 => Self::Ios,
            _ => Self::Unknown,
        }
    }

    /// Convert to wire format.
    pub fn to_u32(self) -> u32 {
        self as u32
    }

    /// The OS this build targets.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Unknown
        }
    }
}

/// Software version triple reported by both peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Version {
    /// Major version.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
    /// Patch version.
    pub patch: u32,
}

impl Version {
    /// The version of this crate.
    pub fn current() -> Self {
        Self {
            major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            patch: env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
        }
    }

    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut version = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Varint(v)) => version.major = field_u32(v)?,
                (2, FieldValue::Varint(v)) => version.minor = field_u32(v)?,
                (3, FieldValue::Varint(v)) => version.patch = field_u32(v)?,
                (1..=3, _) => return Err(Error::Malformed("Version")),
                _ => {}
            }
        }
        Ok(version)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_varint_field(&mut buf, 1, u64::from(self.major));
        put_varint_field(&mut buf, 2, u64::from(self.minor));
        put_varint_field(&mut buf, 3, u64::from(self.patch));
        buf
    }
}

impl core::fmt::Display for Version {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// First message of the handshake, client to server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientHello {
    /// Bitmask of offered AEAD algorithms (`ENCRYPTION_*`).
    pub encryption: u32,
    /// Requested identification method (raw; see [`IdentifyMethod`]).
    pub identify: u32,
    /// Client's ephemeral X25519 public key for the envelope, or empty.
    pub public_key: Vec<u8>,
    /// Client-to-server starting nonce for the envelope, or empty.
    pub iv: Vec<u8>,
}

impl ClientHello {
    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Varint(v)) => msg.encryption = field_u32(v)?,
                (2, FieldValue::Varint(v)) => msg.identify = field_u32(v)?,
                (3, FieldValue::Bytes(b)) => msg.public_key = b.to_vec(),
                (4, FieldValue::Bytes(b)) => msg.iv = b.to_vec(),
                (1..=4, _) => return Err(Error::Malformed("ClientHello")),
                _ => {}
            }
        }
        Ok(msg)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_varint_field(&mut buf, 1, u64::from(self.encryption));
        put_varint_field(&mut buf, 2, u64::from(self.identify));
        put_bytes_field(&mut buf, 3, &self.public_key);
        put_bytes_field(&mut buf, 4, &self.iv);
        buf
    }
}

/// Server's reply to [`ClientHello`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerHello {
    /// The chosen AEAD algorithm (a single `ENCRYPTION_*` bit).
    pub encryption: u32,
    /// Server-to-client starting nonce for the envelope, or empty.
    pub iv: Vec<u8>,
}

impl ServerHello {
    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Varint(v)) => msg.encryption = field_u32(v)?,
                (2, FieldValue::Bytes(b)) => msg.iv = b.to_vec(),
                (1..=2, _) => return Err(Error::Malformed("ServerHello")),
                _ => {}
            }
        }
        Ok(msg)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_varint_field(&mut buf, 1, u64::from(self.encryption));
        put_bytes_field(&mut buf, 2, &self.iv);
        buf
    }
}

/// SRP identification: the client names its user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SrpIdentify {
    /// Username, UTF-8.
    pub username: String,
}

impl SrpIdentify {
    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Bytes(b)) => {
                    msg.username = core::str::from_utf8(b)
                        .map_err(|_| Error::InvalidString)?
                        .to_string();
                }
                (1, _) => return Err(Error::Malformed("SrpIdentify")),
                _ => {}
            }
        }
        Ok(msg)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_bytes_field(&mut buf, 1, self.username.as_bytes());
        buf
    }
}

/// Server's SRP parameters for the named (or fabricated) identity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SrpServerKeyExchange {
    /// Group modulus `N`, big-endian.
    pub number: Vec<u8>,
    /// Group generator `g`, big-endian.
    pub generator: Vec<u8>,
    /// Salt `s`, big-endian.
    pub salt: Vec<u8>,
    /// Server public ephemeral `B`, big-endian.
    pub b: Vec<u8>,
    /// Fresh server-to-client starting nonce.
    pub iv: Vec<u8>,
}

impl SrpServerKeyExchange {
    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Bytes(b)) => msg.number = b.to_vec(),
                (2, FieldValue::Bytes(b)) => msg.generator = b.to_vec(),
                (3, FieldValue::Bytes(b)) => msg.salt = b.to_vec(),
                (4, FieldValue::Bytes(b)) => msg.b = b.to_vec(),
                (5, FieldValue::Bytes(b)) => msg.iv = b.to_vec(),
                (1..=5, _) => return Err(Error::Malformed("SrpServerKeyExchange")),
                _ => {}
            }
        }
        Ok(msg)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_bytes_field(&mut buf, 1, &self.number);
        put_bytes_field(&mut buf, 2, &self.generator);
        put_bytes_field(&mut buf, 3, &self.salt);
        put_bytes_field(&mut buf, 4, &self.b);
        put_bytes_field(&mut buf, 5, &self.iv);
        buf
    }
}

/// Client's SRP ephemeral and its fresh nonce.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SrpClientKeyExchange {
    /// Client public ephemeral `A`, big-endian.
    pub a: Vec<u8>,
    /// Fresh client-to-server starting nonce.
    pub iv: Vec<u8>,
}

impl SrpClientKeyExchange {
    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Bytes(b)) => msg.a = b.to_vec(),
                (2, FieldValue::Bytes(b)) => msg.iv = b.to_vec(),
                (1..=2, _) => return Err(Error::Malformed("SrpClientKeyExchange")),
                _ => {}
            }
        }
        Ok(msg)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_bytes_field(&mut buf, 1, &self.a);
        put_bytes_field(&mut buf, 2, &self.iv);
        buf
    }
}

/// Server's post-identification challenge: the permitted session kinds
/// plus build/host details.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionChallenge {
    /// Bitmask of session kinds the identified client may run.
    pub session_types: u32,
    /// Server software version.
    pub version: Version,
    /// Server operating system (raw; see [`OsType`]).
    pub os_type: u32,
    /// Server computer name.
    pub computer_name: String,
    /// Server logical CPU count.
    pub cpu_cores: u32,
}

impl SessionChallenge {
    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Varint(v)) => msg.session_types = field_u32(v)?,
                (2, FieldValue::Bytes(b)) => msg.version = Version::parse(b)?,
                (3, FieldValue::Varint(v)) => msg.os_type = field_u32(v)?,
                (4, FieldValue::Bytes(b)) => {
                    msg.computer_name = core::str::from_utf8(b)
                        .map_err(|_| Error::InvalidString)?
                        .to_string();
                }
                (5, FieldValue::Varint(v)) => msg.cpu_cores = field_u32(v)?,
                (1..=5, _) => return Err(Error::Malformed("SessionChallenge")),
                _ => {}
            }
        }
        Ok(msg)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_varint_field(&mut buf, 1, u64::from(self.session_types));
        put_bytes_field(&mut buf, 2, &self.version.serialize());
        put_varint_field(&mut buf, 3, u64::from(self.os_type));
        put_bytes_field(&mut buf, 4, self.computer_name.as_bytes());
        put_varint_field(&mut buf, 5, u64::from(self.cpu_cores));
        buf
    }
}

/// Client's answer to [`SessionChallenge`]: the single session kind it
/// wants to run, plus its own build/host details.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionResponse {
    /// The chosen session kind. Must have exactly one bit set.
    pub session_type: u32,
    /// Client software version.
    pub version: Version,
    /// Client operating system (raw; see [`OsType`]).
    pub os_type: u32,
    /// Client computer name.
    pub computer_name: String,
    /// Client logical CPU count.
    pub cpu_cores: u32,
}

impl SessionResponse {
    /// Parse from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut msg = Self::default();
        let mut fields = FieldReader::new(data);
        while let Some((number, value)) = fields.next()? {
            match (number, value) {
                (1, FieldValue::Varint(v)) => msg.session_type = field_u32(v)?,
                (2, FieldValue::Bytes(b)) => msg.version = Version::parse(b)?,
                (3, FieldValue::Varint(v)) => msg.os_type = field_u32(v)?,
                (4, FieldValue::Bytes(b)) => {
                    msg.computer_name = core::str::from_utf8(b)
                        .map_err(|_| Error::InvalidString)?
                        .to_string();
                }
                (5, FieldValue::Varint(v)) => msg.cpu_cores = field_u32(v)?,
                (1..=5, _) => return Err(Error::Malformed("SessionResponse")),
                _ => {}
            }
        }
        Ok(msg)
    }

    /// Serialize to wire format.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_varint_field(&mut buf, 1, u64::from(self.session_type));
        put_bytes_field(&mut buf, 2, &self.version.serialize());
        put_varint_field(&mut buf, 3, u64::from(self.os_type));
        put_bytes_field(&mut buf, 4, self.computer_name.as_bytes());
        put_varint_field(&mut buf, 5, u64::from(self.cpu_cores));
        buf
    }
}

// === Wire format helpers ===

const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_BYTES: u8 = 2;
const WIRE_FIXED32: u8 = 5;

/// One decoded field value.
enum FieldValue<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
    /// Wire types this protocol never emits but must skip over.
    Skipped,
}

/// Iterates tag/value pairs over a payload.
struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn next(&mut self) -> Result<Option<(u32, FieldValue<'a>)>> {
        if self.offset >= self.data.len() {
            return Ok(None);
        }

        let tag = self.read_varint()?;
        let wire_type = (tag & 0x07) as u8;
        let number = field_u32(tag >> 3)?;
        if number == 0 {
            return Err(Error::Protocol("field number zero"));
        }

        let value = match wire_type {
            WIRE_VARINT => FieldValue::Varint(self.read_varint()?),
            WIRE_BYTES => {
                let len = self.read_varint()? as usize;
                let remaining = self.data.len() - self.offset;
                if len > remaining {
                    return Err(Error::Truncated(len - remaining));
                }
                let bytes = &self.data[self.offset..self.offset + len];
                self.offset += len;
                FieldValue::Bytes(bytes)
            }
            WIRE_FIXED64 => {
                self.skip(8)?;
                FieldValue::Skipped
            }
            WIRE_FIXED32 => {
                self.skip(4)?;
                FieldValue::Skipped
            }
            other => return Err(Error::UnsupportedWireType(other)),
        };

        Ok(Some((number, value)))
    }

    fn read_varint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for shift in (0..64).step_by(7) {
            let byte = *self
                .data
                .get(self.offset)
                .ok_or(Error::InvalidVarint)?;
            self.offset += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                // The tenth byte may only carry the single remaining bit.
                if shift == 63 && byte > 1 {
                    return Err(Error::InvalidVarint);
                }
                return Ok(value);
            }
        }
        Err(Error::InvalidVarint)
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        let remaining = self.data.len() - self.offset;
        if len > remaining {
            return Err(Error::Truncated(len - remaining));
        }
        self.offset += len;
        Ok(())
    }
}

fn field_u32(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::Protocol("integer field out of range"))
}

fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Emit a varint field; zero values are omitted (default presence).
fn put_varint_field(buf: &mut Vec<u8>, number: u32, value: u64) {
    if value == 0 {
        return;
    }
    put_varint(buf, u64::from(number) << 3 | u64::from(WIRE_VARINT));
    put_varint(buf, value);
}

/// Emit a length-delimited field; empty values are omitted.
fn put_bytes_field(buf: &mut Vec<u8>, number: u32, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    put_varint(buf, u64::from(number) << 3 | u64::from(WIRE_BYTES));
    put_varint(buf, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_hello_roundtrip() {
        let msg = ClientHello {
            encryption: ENCRYPTION_AES256_GCM | ENCRYPTION_CHACHA20_POLY1305,
            identify: IdentifyMethod::Anonymous.to_u32(),
            public_key: vec![0x42; 32],
            iv: (1..=12).collect(),
        };
        assert_eq!(ClientHello::parse(&msg.serialize()).unwrap(), msg);
    }

    #[test]
    fn test_client_hello_optional_fields_absent() {
        let msg = ClientHello {
            encryption: ENCRYPTION_CHACHA20_POLY1305,
            identify: IdentifyMethod::Srp.to_u32(),
            public_key: Vec::new(),
            iv: Vec::new(),
        };
        let encoded = msg.serialize();
        // identify = 0 (SRP) and the empty byte fields are not encoded.
        assert_eq!(encoded, vec![0x08, 0x02]);
        assert_eq!(ClientHello::parse(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_server_hello_roundtrip() {
        let msg = ServerHello {
            encryption: ENCRYPTION_AES256_GCM,
            iv: vec![0xA5; 12],
        };
        assert_eq!(ServerHello::parse(&msg.serialize()).unwrap(), msg);
    }

    #[test]
    fn test_srp_identify_roundtrip() {
        let msg = SrpIdentify {
            username: "алиса".to_string(),
        };
        assert_eq!(SrpIdentify::parse(&msg.serialize()).unwrap(), msg);

        // Empty username encodes to an empty payload and parses back.
        let empty = SrpIdentify::default();
        assert!(empty.serialize().is_empty());
        assert_eq!(SrpIdentify::parse(&[]).unwrap(), empty);
    }

    #[test]
    fn test_srp_identify_rejects_invalid_utf8() {
        // field 1, wire type 2, length 2, invalid UTF-8
        let data = [0x0A, 0x02, 0xFF, 0xFE];
        assert!(matches!(
            SrpIdentify::parse(&data),
            Err(Error::InvalidString)
        ));
    }

    #[test]
    fn test_srp_key_exchange_roundtrip() {
        let msg = SrpServerKeyExchange {
            number: vec![0xFF; 1024],
            generator: vec![0x13],
            salt: vec![0x5A; 64],
            b: vec![0xB0; 1024],
            iv: vec![0x01; 12],
        };
        assert_eq!(SrpServerKeyExchange::parse(&msg.serialize()).unwrap(), msg);

        let msg = SrpClientKeyExchange {
            a: vec![0xA0; 1024],
            iv: vec![0x02; 12],
        };
        assert_eq!(SrpClientKeyExchange::parse(&msg.serialize()).unwrap(), msg);
    }

    #[test]
    fn test_session_challenge_roundtrip() {
        let msg = SessionChallenge {
            session_types: 0b101,
            version: Version {
                major: 2,
                minor: 7,
                patch: 1,
            },
            os_type: OsType::Linux.to_u32(),
            computer_name: "build-host".to_string(),
            cpu_cores: 16,
        };
        assert_eq!(SessionChallenge::parse(&msg.serialize()).unwrap(), msg);
    }

    #[test]
    fn test_session_response_roundtrip() {
        let msg = SessionResponse {
            session_type: 0b100,
            version: Version {
                major: 1,
                minor: 0,
                patch: 3,
            },
            os_type: OsType::Windows.to_u32(),
            computer_name: "DESKTOP-7F2K".to_string(),
            cpu_cores: 8,
        };
        assert_eq!(SessionResponse::parse(&msg.serialize()).unwrap(), msg);
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let mut encoded = ServerHello {
            encryption: ENCRYPTION_AES256_GCM,
            iv: vec![0x11; 12],
        }
        .serialize();
        // Append unknown field 15 (varint), field 14 (bytes), and
        // field 13 (fixed32); a conforming decoder ignores all three.
        encoded.extend_from_slice(&[0x78, 0x2A]);
        encoded.extend_from_slice(&[0x72, 0x03, 0x01, 0x02, 0x03]);
        encoded.extend_from_slice(&[0x6D, 0xDE, 0xAD, 0xBE, 0xEF]);

        let parsed = ServerHello::parse(&encoded).unwrap();
        assert_eq!(parsed.encryption, ENCRYPTION_AES256_GCM);
        assert_eq!(parsed.iv, vec![0x11; 12]);
    }

    #[test]
    fn test_truncated_bytes_field_fails() {
        // field 1, wire type 2, claimed length 32, only 2 bytes present
        let data = [0x0A, 0x20, 0x01, 0x02];
        assert!(matches!(
            SrpClientKeyExchange::parse(&data),
            Err(Error::Truncated(_))
        ));
    }

    #[test]
    fn test_unterminated_varint_fails() {
        let data = [0x08, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            ClientHello::parse(&data),
            Err(Error::InvalidVarint)
        ));

        // Eleven continuation bytes overflow 64 bits.
        let data = [0x08, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        assert!(ClientHello::parse(&data).is_err());
    }

    #[test]
    fn test_group_wire_types_rejected() {
        // field 1 with deprecated start-group wire type 3
        let data = [0x0B];
        assert!(matches!(
            ClientHello::parse(&data),
            Err(Error::UnsupportedWireType(3))
        ));
    }

    #[test]
    fn test_wrong_wire_type_for_known_field_fails() {
        // ServerHello field 1 must be a varint; send it length-delimited.
        let data = [0x0A, 0x01, 0x01];
        assert!(matches!(
            ServerHello::parse(&data),
            Err(Error::Malformed("ServerHello"))
        ));
    }

    #[test]
    fn test_version_display_and_current() {
        let version = Version {
            major: 1,
            minor: 2,
            patch: 3,
        };
        assert_eq!(version.to_string(), "1.2.3");
        assert_eq!(Version::current().major.to_string(), env!("CARGO_PKG_VERSION_MAJOR"));
    }

    #[test]
    fn test_identify_method_mapping() {
        assert_eq!(IdentifyMethod::from_u32(0), Some(IdentifyMethod::Srp));
        assert_eq!(IdentifyMethod::from_u32(1), Some(IdentifyMethod::Anonymous));
        assert_eq!(IdentifyMethod::from_u32(2), None);
    }

    #[test]
    fn test_os_type_mapping() {
        for os in [
            OsType::Unknown,
            OsType::Windows,
            OsType::Linux,
            OsType::MacOs,
            OsType::Android,
            OsType::Ios,
        ] {
            assert_eq!(OsType::from_u32(os.to_u32()), os);
        }
        assert_eq!(OsType::from_u32(77), OsType::Unknown);
    }
}
