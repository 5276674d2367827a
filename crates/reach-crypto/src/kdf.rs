//! BLAKE2-based key derivation for the handshake.
//!
//! Three derivations cover the whole protocol:
//! - the envelope key, hashed from the raw X25519 shared secret
//! - the final session key, chaining the envelope key (when present)
//!   with the SRP shared value so the result is bound to both exchanges
//! - the deterministic fake salt served for unknown usernames, keyed by
//!   the server-wide seed key so the reply never reveals whether a user
//!   exists

use blake2::{Blake2b512, Blake2s256, Digest};
use zeroize::Zeroizing;

/// Session key length in bytes.
pub const SESSION_KEY_SIZE: usize = 32;
/// Fake salt length in bytes (BLAKE2b-512 output).
pub const FAKE_SALT_SIZE: usize = 64;

/// Derive the envelope key from an X25519 shared secret.
///
/// `envelope_key = BLAKE2s-256(shared_secret)`
pub fn envelope_session_key(shared_secret: &[u8]) -> Zeroizing<[u8; SESSION_KEY_SIZE]> {
    let digest = Blake2s256::digest(shared_secret);
    let mut key = [0u8; SESSION_KEY_SIZE];
    key.copy_from_slice(&digest);
    Zeroizing::new(key)
}

/// Derive the final session key from the SRP shared value.
///
/// `session_key = BLAKE2s-256(previous ‖ srp_key)`
///
/// `previous` is the envelope key when the envelope executed, otherwise
/// empty; chaining binds the session key to both exchanges.
pub fn chained_session_key(
    previous: &[u8],
    srp_key: &[u8],
) -> Zeroizing<[u8; SESSION_KEY_SIZE]> {
    let mut hasher = Blake2s256::new();
    hasher.update(previous);
    hasher.update(srp_key);
    let digest = hasher.finalize();
    let mut key = [0u8; SESSION_KEY_SIZE];
    key.copy_from_slice(&digest);
    Zeroizing::new(key)
}

/// Derive the deterministic salt served for an unknown username.
///
/// `salt = BLAKE2b-512(seed_key ‖ username_utf8)`
///
/// The same username always maps to the same salt for a given seed key,
/// so repeated probes cannot distinguish a fabricated identity from a
/// real one.
pub fn fake_salt(seed_key: &[u8], username: &[u8]) -> [u8; FAKE_SALT_SIZE] {
    let mut hasher = Blake2b512::new();
    hasher.update(seed_key);
    hasher.update(username);
    let digest = hasher.finalize();
    let mut salt = [0u8; FAKE_SALT_SIZE];
    salt.copy_from_slice(&digest);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_key_is_deterministic() {
        let shared = [0x42u8; 32];
        assert_eq!(*envelope_session_key(&shared), *envelope_session_key(&shared));
        assert_ne!(
            *envelope_session_key(&shared),
            *envelope_session_key(&[0x43u8; 32])
        );
    }

    #[test]
    fn test_chaining_binds_both_exchanges() {
        let envelope = envelope_session_key(&[0x42u8; 32]);
        let srp_key = b"not a real srp value";

        let chained = chained_session_key(&envelope[..], srp_key);
        let unchained = chained_session_key(&[], srp_key);

        assert_ne!(*chained, *unchained);
        // Chaining is plain concatenation hashing, so it matches a
        // single hash over both inputs.
        let mut both = envelope.to_vec();
        both.extend_from_slice(srp_key);
        assert_eq!(*chained, *chained_session_key(&both[..32], &both[32..]));
    }

    #[test]
    fn test_fake_salt_depends_on_seed_and_username() {
        let salt = fake_salt(b"seed", b"mallory");
        assert_eq!(salt, fake_salt(b"seed", b"mallory"));
        assert_ne!(salt, fake_salt(b"seed", b"mallory2"));
        assert_ne!(salt, fake_salt(b"other-seed", b"mallory"));
        assert_eq!(salt.len(), FAKE_SALT_SIZE);
    }
}
