//! AEAD (Authenticated Encryption with Associated Data) message contexts.
//!
//! Implements the two algorithms a client may offer:
//! - AES-256-GCM (NIST SP 800-38D), preferred when the host has
//!   hardware AES acceleration
//! - ChaCha20-Poly1305 (RFC 8439), the fallback on every other host
//!
//! Once the handshake has derived a session key, each direction of the
//! connection gets its own context with its own 12-byte starting nonce.
//! The nonce is advanced as a 96-bit little-endian counter after every
//! message, so a nonce never protects two payloads.

use crate::{Error, Result};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::ChaCha20Poly1305;
use zeroize::Zeroizing;

/// AEAD key length in bytes.
pub const KEY_SIZE: usize = 32;
/// AEAD nonce length in bytes.
pub const NONCE_SIZE: usize = 12;
/// Authentication tag length in bytes.
pub const TAG_SIZE: usize = 16;

/// AEAD algorithms supported by the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AeadAlgorithm {
    /// AES-256-GCM (NIST SP 800-38D).
    Aes256Gcm,
    /// ChaCha20-Poly1305 (RFC 8439).
    ChaCha20Poly1305,
}

/// Whether the host CPU accelerates AES in hardware.
///
/// Drives algorithm negotiation: AES-256-GCM is only selected when the
/// client offers it and this returns true.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub fn aes_hardware_available() -> bool {
    std::arch::is_x86_feature_detected!("aes")
}

/// Whether the host CPU accelerates AES in hardware.
#[cfg(target_arch = "aarch64")]
pub fn aes_hardware_available() -> bool {
    std::arch::is_aarch64_feature_detected!("aes")
}

/// Whether the host CPU accelerates AES in hardware.
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
pub fn aes_hardware_available() -> bool {
    false
}

enum Cipher {
    Aes(Box<Aes256Gcm>),
    ChaCha(Box<ChaCha20Poly1305>),
}

impl Cipher {
    fn new(algorithm: AeadAlgorithm, key: &[u8; KEY_SIZE]) -> Result<Self> {
        match algorithm {
            AeadAlgorithm::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(key)
                    .map_err(|_| Error::Encryption("invalid AES-256-GCM key length".into()))?;
                Ok(Cipher::Aes(Box::new(cipher)))
            }
            AeadAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key)
                    .map_err(|_| Error::Encryption("invalid ChaCha20-Poly1305 key length".into()))?;
                Ok(Cipher::ChaCha(Box::new(cipher)))
            }
        }
    }

    fn seal(&self, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Cipher::Aes(cipher) => cipher
                .encrypt(aes_gcm::Nonce::from_slice(nonce), plaintext)
                .map_err(|_| Error::Encryption("AES-256-GCM encryption failed".into())),
            Cipher::ChaCha(cipher) => cipher
                .encrypt(chacha20poly1305::Nonce::from_slice(nonce), plaintext)
                .map_err(|_| Error::Encryption("ChaCha20-Poly1305 encryption failed".into())),
        }
    }

    fn open(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Result<Vec<u8>> {
        match self {
            Cipher::Aes(cipher) => cipher
                .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext)
                .map_err(|_| Error::Decryption("AES-256-GCM authentication failed".into())),
            Cipher::ChaCha(cipher) => cipher
                .decrypt(chacha20poly1305::Nonce::from_slice(nonce), ciphertext)
                .map_err(|_| Error::Decryption("ChaCha20-Poly1305 authentication failed".into())),
        }
    }
}

/// Outbound AEAD context for one direction of a session.
///
/// Created from the negotiated algorithm, the 32-byte session key and
/// the 12-byte starting nonce exchanged during the handshake.
pub struct MessageEncryptor {
    cipher: Cipher,
    nonce: [u8; NONCE_SIZE],
}

impl MessageEncryptor {
    /// Create an encryptor for `algorithm` keyed with `key`, starting
    /// at `nonce`.
    pub fn new(algorithm: AeadAlgorithm, key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE]) -> Result<Self> {
        Ok(Self {
            cipher: Cipher::new(algorithm, key)?,
            nonce: *nonce,
        })
    }

    /// Encrypt one message and advance the nonce.
    ///
    /// Returns ciphertext with the 16-byte tag appended.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let ciphertext = self.cipher.seal(&self.nonce, plaintext)?;
        advance_nonce(&mut self.nonce);
        Ok(ciphertext)
    }
}

/// Inbound AEAD context for one direction of a session.
pub struct MessageDecryptor {
    cipher: Cipher,
    nonce: [u8; NONCE_SIZE],
}

impl MessageDecryptor {
    /// Create a decryptor for `algorithm` keyed with `key`, starting
    /// at `nonce`.
    pub fn new(algorithm: AeadAlgorithm, key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE]) -> Result<Self> {
        Ok(Self {
            cipher: Cipher::new(algorithm, key)?,
            nonce: *nonce,
        })
    }

    /// Decrypt and authenticate one message, then advance the nonce.
    ///
    /// The nonce is only advanced on success, so a forged message does
    /// not desynchronize the context.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let plaintext = self.cipher.open(&self.nonce, ciphertext)?;
        advance_nonce(&mut self.nonce);
        Ok(Zeroizing::new(plaintext))
    }
}

/// Advance a 12-byte nonce as a 96-bit little-endian counter.
fn advance_nonce(nonce: &mut [u8; NONCE_SIZE]) {
    for byte in nonce.iter_mut() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// RFC 8439 §2.8.2 test vector, with the empty AAD our contexts use.
    #[test]
    fn test_chacha20poly1305_rfc8439_key() {
        let key: [u8; 32] =
            hex::decode("808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9f")
                .unwrap()
                .try_into()
                .unwrap();
        let nonce: [u8; 12] = hex::decode("070000004041424344454647")
            .unwrap()
            .try_into()
            .unwrap();
        let plaintext = b"Ladies and Gentlemen of the class of '99: If I could offer you \
only one tip for the future, sunscreen would be it.";

        let mut enc = MessageEncryptor::new(AeadAlgorithm::ChaCha20Poly1305, &key, &nonce).unwrap();
        let mut dec = MessageDecryptor::new(AeadAlgorithm::ChaCha20Poly1305, &key, &nonce).unwrap();

        let ciphertext = enc.encrypt(plaintext).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + TAG_SIZE);
        // The keystream prefix is fixed by RFC 8439 regardless of AAD.
        assert_eq!(
            &ciphertext[..4],
            hex::decode("d31a8d34").unwrap().as_slice()
        );

        let decrypted = dec.decrypt(&ciphertext).unwrap();
        assert_eq!(&*decrypted, plaintext.as_slice());
    }

    #[test]
    fn test_roundtrip_both_algorithms() {
        for algorithm in [AeadAlgorithm::Aes256Gcm, AeadAlgorithm::ChaCha20Poly1305] {
            let key = [0x42u8; 32];
            let nonce = [0x01u8; 12];
            let mut enc = MessageEncryptor::new(algorithm, &key, &nonce).unwrap();
            let mut dec = MessageDecryptor::new(algorithm, &key, &nonce).unwrap();

            for msg in [&b"first message"[..], b"second", b""] {
                let ciphertext = enc.encrypt(msg).unwrap();
                let plaintext = dec.decrypt(&ciphertext).unwrap();
                assert_eq!(&*plaintext, msg);
            }
        }
    }

    #[test]
    fn test_nonce_advances_per_message() {
        let key = [0x42u8; 32];
        let nonce = [0u8; 12];
        let mut enc = MessageEncryptor::new(AeadAlgorithm::ChaCha20Poly1305, &key, &nonce).unwrap();

        let c1 = enc.encrypt(b"same plaintext").unwrap();
        let c2 = enc.encrypt(b"same plaintext").unwrap();
        assert_ne!(c1, c2, "nonce reuse would produce identical ciphertexts");
    }

    #[test]
    fn test_out_of_order_fails() {
        let key = [0x42u8; 32];
        let nonce = [0u8; 12];
        let mut enc = MessageEncryptor::new(AeadAlgorithm::Aes256Gcm, &key, &nonce).unwrap();
        let mut dec = MessageDecryptor::new(AeadAlgorithm::Aes256Gcm, &key, &nonce).unwrap();

        let c1 = enc.encrypt(b"one").unwrap();
        let c2 = enc.encrypt(b"two").unwrap();

        // Delivering the second message first must fail authentication.
        assert!(dec.decrypt(&c2).is_err());
        // The failed attempt must not have consumed the nonce.
        assert_eq!(&*dec.decrypt(&c1).unwrap(), b"one");
        assert_eq!(&*dec.decrypt(&c2).unwrap(), b"two");
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = [0x42u8; 32];
        let nonce = [0x07u8; 12];
        let mut enc = MessageEncryptor::new(AeadAlgorithm::Aes256Gcm, &key, &nonce).unwrap();
        let mut dec = MessageDecryptor::new(AeadAlgorithm::Aes256Gcm, &key, &nonce).unwrap();

        let mut ciphertext = enc.encrypt(b"secret message").unwrap();
        ciphertext[3] ^= 0xFF;
        assert!(dec.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn test_wrong_key_fails() {
        let nonce = [0x01u8; 12];
        let mut enc =
            MessageEncryptor::new(AeadAlgorithm::ChaCha20Poly1305, &[0x42u8; 32], &nonce).unwrap();
        let mut dec =
            MessageDecryptor::new(AeadAlgorithm::ChaCha20Poly1305, &[0x43u8; 32], &nonce).unwrap();

        let ciphertext = enc.encrypt(b"secret message").unwrap();
        assert!(dec.decrypt(&ciphertext).is_err());
    }

    #[test]
    fn test_advance_nonce_carries() {
        let mut nonce = [0xFF, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        advance_nonce(&mut nonce);
        assert_eq!(nonce[..2], [0x00, 0x01]);

        let mut nonce = [0xFFu8; 12];
        advance_nonce(&mut nonce);
        assert_eq!(nonce, [0u8; 12]);
    }
}
