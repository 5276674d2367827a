//! X25519 key agreement (RFC 7748) for the handshake envelope.
//!
//! The server holds a long-term X25519 key pair; a connecting client
//! sends an ephemeral public key in its hello. The static-ephemeral
//! shared secret seeds the envelope key that protects the inner
//! authentication exchange.
//!
//! # Security
//!
//! - The private scalar and every shared secret are wrapped in
//!   `Zeroizing<>` so they are securely cleared from memory when
//!   dropped.
//! - Low-order peer points (all-zero shared secret) are rejected.
//!
//! # Example
//!
//! ```
//! use reach_crypto::kex::X25519KeyPair;
//!
//! # fn example() -> Result<(), reach_crypto::Error> {
//! // Server long-term key pair
//! let server = X25519KeyPair::generate()?;
//!
//! // Client ephemeral key pair
//! let client = X25519KeyPair::generate()?;
//!
//! // Both ends arrive at the same shared secret
//! let server_shared = server.session_key(client.public_key())?;
//! let client_shared = client.session_key(server.public_key())?;
//! assert_eq!(*server_shared, *client_shared);
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// Length of X25519 private and public keys in bytes.
pub const KEY_SIZE: usize = 32;

/// X25519 key pair for the envelope key agreement.
///
/// Holds a private scalar and its corresponding public key. The
/// private scalar is zeroed when the pair is dropped.
pub struct X25519KeyPair {
    /// Private scalar (32 bytes), zeroed on drop.
    private_key: Zeroizing<StaticSecret>,
    /// Public key point (32 bytes).
    public_key: PublicKey,
}

impl X25519KeyPair {
    /// Generate a new random key pair using the system CSPRNG.
    pub fn generate() -> Result<Self> {
        let private_key = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public_key = PublicKey::from(&private_key);

        Ok(Self {
            private_key: Zeroizing::new(private_key),
            public_key,
        })
    }

    /// Load a key pair from a stored 32-byte private key.
    ///
    /// This is how a server restores its long-term identity key.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPrivateKey` if `private_key` is empty or
    /// not exactly 32 bytes.
    pub fn from_private_key(private_key: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = private_key.try_into().map_err(|_| {
            Error::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                KEY_SIZE,
                private_key.len()
            ))
        })?;

        let private_key = StaticSecret::from(bytes);
        let public_key = PublicKey::from(&private_key);

        Ok(Self {
            private_key: Zeroizing::new(private_key),
            public_key,
        })
    }

    /// Get the public key as a 32-byte array.
    pub fn public_key(&self) -> &[u8; KEY_SIZE] {
        self.public_key.as_bytes()
    }

    /// Compute the raw shared secret with a peer's public key.
    ///
    /// The result is the unhashed X25519 output; callers derive the
    /// envelope key from it with [`crate::kdf::envelope_session_key`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPublicKey` if the peer key has the wrong
    /// length or is a low-order point.
    pub fn session_key(&self, peer_public: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
        let peer_bytes: [u8; KEY_SIZE] = peer_public.try_into().map_err(|_| {
            Error::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                KEY_SIZE,
                peer_public.len()
            ))
        })?;

        let peer_key = PublicKey::from(peer_bytes);
        let shared = self.private_key.diffie_hellman(&peer_key);

        // An all-zero shared secret means the peer sent a low-order point.
        if shared.as_bytes() == &[0u8; KEY_SIZE] {
            return Err(Error::InvalidPublicKey(
                "low-order peer public key".into(),
            ));
        }

        Ok(Zeroizing::new(*shared.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 7748 §6.1 canonical test vectors.
    #[test]
    fn test_rfc7748_vectors() {
        let alice_private =
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a")
                .unwrap();
        let alice_public_expected =
            hex::decode("8520f0098930a754748b7ddcb43ef75a0dbf3a0d26381af4eba4a98eaa9b4e6a")
                .unwrap();
        let bob_private =
            hex::decode("5dab087e624a8a4b79e17f8b83800ee66f3bb1292618b6fd1c2f8b27ff88e0eb")
                .unwrap();
        let bob_public_expected =
            hex::decode("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f")
                .unwrap();
        let expected_shared =
            hex::decode("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742")
                .unwrap();

        let alice = X25519KeyPair::from_private_key(&alice_private).unwrap();
        assert_eq!(alice.public_key(), alice_public_expected.as_slice());

        let bob = X25519KeyPair::from_private_key(&bob_private).unwrap();
        assert_eq!(bob.public_key(), bob_public_expected.as_slice());

        let alice_shared = alice.session_key(bob.public_key()).unwrap();
        let bob_shared = bob.session_key(alice.public_key()).unwrap();

        assert_eq!(&*alice_shared, expected_shared.as_slice());
        assert_eq!(&*bob_shared, expected_shared.as_slice());
    }

    #[test]
    fn test_generate_and_exchange() {
        let a = X25519KeyPair::generate().unwrap();
        let b = X25519KeyPair::generate().unwrap();

        let shared_a = a.session_key(b.public_key()).unwrap();
        let shared_b = b.session_key(a.public_key()).unwrap();

        assert_eq!(*shared_a, *shared_b);
        assert_ne!(&*shared_a, &[0u8; 32]);
    }

    #[test]
    fn test_rejects_empty_private_key() {
        assert!(X25519KeyPair::from_private_key(&[]).is_err());
        assert!(X25519KeyPair::from_private_key(&[0x42; 16]).is_err());
    }

    #[test]
    fn test_rejects_low_order_point() {
        let pair = X25519KeyPair::generate().unwrap();
        let result = pair.session_key(&[0u8; 32]);
        assert!(matches!(result, Err(Error::InvalidPublicKey(_))));
    }

    #[test]
    fn test_rejects_wrong_length_public_key() {
        let pair = X25519KeyPair::generate().unwrap();
        assert!(pair.session_key(&[]).is_err());
        assert!(pair.session_key(&[0x42; 31]).is_err());
    }
}
