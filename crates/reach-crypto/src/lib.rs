//! Cryptographic primitives for the reach remote-access protocol.
//!
//! This crate implements the cryptographic foundations of the reach
//! authentication handshake:
//! - Static X25519 key agreement for the envelope that protects the
//!   inner exchange
//! - AEAD message contexts (AES-256-GCM, ChaCha20-Poly1305)
//! - BLAKE2-based key derivation
//! - SRP-6a group parameters and modular arithmetic (RFC 5054 groups
//!   3072 through 8192)
//!
//! All secrets are wrapped in `Zeroizing` so they are cleared from
//! memory on drop, and no key material is ever logged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod error;
pub mod kdf;
pub mod kex;
pub mod srp;

pub use error::{Error, Result};
