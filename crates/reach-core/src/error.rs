//! Error types and terminal outcome codes for the handshake.

use thiserror::Error;

/// Result type alias for handshake operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Handshake processing errors.
///
/// Every error is terminal: the authenticator converts it into an
/// [`Outcome`] via [`Error::outcome`], finishes, and performs no
/// further I/O.
#[derive(Debug, Error)]
pub enum Error {
    /// A payload could not be decoded as the expected message.
    #[error("malformed {0} message")]
    Malformed(&'static str),

    /// A payload was shorter than its encoding requires.
    #[error("message truncated: {0} more bytes required")]
    Truncated(usize),

    /// A varint ran past 64 bits or past the end of the buffer.
    #[error("invalid varint encoding")]
    InvalidVarint,

    /// A field used a wire type this protocol never emits.
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u8),

    /// A string field held invalid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidString,

    /// The peer violated the protocol contract.
    #[error("protocol violation: {0}")]
    Protocol(&'static str),

    /// The client requested anonymous access while it is disabled.
    #[error("anonymous access is not allowed")]
    AccessDenied,

    /// The chosen session kind is not in the permitted set.
    #[error("session type {0:#x} is not permitted")]
    SessionDenied(u32),

    /// The authenticator was configured inconsistently.
    #[error("configuration error: {0}")]
    Config(&'static str),

    /// A cryptographic primitive failed.
    #[error("crypto failure: {0}")]
    Crypto(#[from] reach_crypto::Error),
}

impl Error {
    /// The terminal outcome this error maps to.
    pub fn outcome(&self) -> Outcome {
        match self {
            Error::Malformed(_)
            | Error::Truncated(_)
            | Error::InvalidVarint
            | Error::UnsupportedWireType(_)
            | Error::InvalidString
            | Error::Protocol(_) => Outcome::ProtocolError,
            Error::AccessDenied => Outcome::AccessDenied,
            Error::SessionDenied(_) => Outcome::SessionDenied,
            Error::Config(_) | Error::Crypto(_) => Outcome::UnknownError,
        }
    }
}

/// Terminal outcome of a handshake session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Outcome {
    /// The client authenticated and its session kind was accepted.
    Success = 0,
    /// The peer sent malformed or out-of-order data.
    ProtocolError = 1,
    /// Anonymous access was requested but is not allowed.
    AccessDenied = 2,
    /// The chosen session kind is outside the permitted mask.
    SessionDenied = 3,
    /// A local failure (crypto primitive, random source).
    UnknownError = 4,
}

impl Outcome {
    /// Convert to wire format.
    pub fn to_u32(self) -> u32 {
        self as u32
    }

    /// Convert from wire format.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::ProtocolError),
            2 => Some(Self::AccessDenied),
            3 => Some(Self::SessionDenied),
            4 => Some(Self::UnknownError),
            _ => None,
        }
    }
}
