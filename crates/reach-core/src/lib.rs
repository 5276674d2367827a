//! Authentication handshake engine for the reach remote-access protocol.
//!
//! This crate implements the server side of the reach session
//! establishment handshake:
//! - Wire codec for the handshake payloads (protobuf wire format)
//! - User records and the in-memory user list with its seed key
//! - The server authenticator state machine: algorithm negotiation,
//!   envelope key agreement, the SRP-6a exchange with deterministic
//!   fake identities for unknown users, and the session-kind gate
//!
//! The transport that frames and delivers payloads is external; it
//! drives an authenticator through [`ServerAuthenticator::on_received`]
//! and [`ServerAuthenticator::on_written`] and receives outbound
//! payloads and AEAD contexts through the [`Channel`] trait.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod message;
pub mod server;
pub mod user;

pub use error::{Error, Outcome, Result};
pub use server::{AuthStatus, Channel, HostInfo, ServerAuthenticator};
pub use user::{User, UserList};
