//! User records and the in-memory user list.
//!
//! A record stores what SRP verification needs: the group id, the
//! salt, the password verifier, the permitted session kinds and an
//! enable flag. Passwords themselves are never stored.
//!
//! The list also owns the server-wide *seed key*, the secret that keys
//! the deterministic fake identities served for unknown usernames. The
//! list is read-only during handshakes; share one instance across
//! sessions behind an `Arc`.

use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;
use reach_crypto::srp;
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Flag bit: the user may log in.
pub const USER_FLAG_ENABLED: u32 = 0x01;

/// Salt length for newly provisioned users, in bytes.
pub const SALT_SIZE: usize = 64;
/// Seed key length, in bytes.
pub const SEED_KEY_SIZE: usize = 64;

/// Group id assigned to newly provisioned users.
const DEFAULT_GROUP: &str = "8192";

/// One user record.
#[derive(Debug, Clone)]
pub struct User {
    /// Username. Lookup is case-insensitive.
    pub name: String,
    /// SRP group id ("3072" … "8192").
    pub group: String,
    /// Salt `s`, big-endian.
    pub salt: Vec<u8>,
    /// Password verifier `v`, big-endian.
    pub verifier: Vec<u8>,
    /// Bitmask of session kinds this user may run.
    pub sessions: u32,
    /// Flag bits (`USER_FLAG_*`).
    pub flags: u32,
}

impl User {
    /// Provision an enabled record from a username and password.
    ///
    /// Draws a random 64-byte salt and computes the verifier in the
    /// default group. The password is only read, never retained.
    pub fn create(name: &str, password: &str, sessions: u32) -> Result<Self> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| Error::Crypto(reach_crypto::Error::Random(e.to_string())))?;

        let group = srp::group_by_name(DEFAULT_GROUP)
            .ok_or(Error::Protocol("default SRP group missing"))?;
        let salt_num = BigUint::from_bytes_be(&salt);
        let verifier = srp::calc_v(
            name,
            password.as_bytes(),
            &salt_num,
            &group.modulus(),
            &group.generator(),
        );

        Ok(Self {
            name: name.to_string(),
            group: DEFAULT_GROUP.to_string(),
            salt: salt.to_vec(),
            verifier: verifier.to_bytes_be(),
            sessions,
            flags: USER_FLAG_ENABLED,
        })
    }

    /// Whether the enable flag is set.
    pub fn is_enabled(&self) -> bool {
        self.flags & USER_FLAG_ENABLED != 0
    }
}

/// The set of known users plus the server-wide seed key.
pub struct UserList {
    users: Vec<User>,
    seed_key: Zeroizing<Vec<u8>>,
}

impl UserList {
    /// Create an empty list with a freshly drawn seed key.
    pub fn new() -> Result<Self> {
        let mut seed_key = Zeroizing::new(vec![0u8; SEED_KEY_SIZE]);
        OsRng
            .try_fill_bytes(&mut seed_key)
            .map_err(|e| Error::Crypto(reach_crypto::Error::Random(e.to_string())))?;

        Ok(Self {
            users: Vec::new(),
            seed_key,
        })
    }

    /// Add a record.
    pub fn add(&mut self, user: User) {
        self.users.push(user);
    }

    /// Look up a user by name, case-insensitively.
    pub fn find(&self, username: &str) -> Option<&User> {
        let wanted = username.to_lowercase();
        self.users
            .iter()
            .find(|user| user.name.to_lowercase() == wanted)
    }

    /// The seed key for fabricated identities.
    pub fn seed_key(&self) -> &[u8] {
        &self.seed_key
    }

    /// Replace the seed key, e.g. when restoring a stored list.
    ///
    /// Changing the seed key changes every fabricated identity.
    pub fn set_seed_key(&mut self, seed_key: Vec<u8>) {
        self.seed_key = Zeroizing::new(seed_key);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the list has no records.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        let mut list = UserList::new().unwrap();
        list.add(User {
            name: "Alice".to_string(),
            group: "8192".to_string(),
            salt: vec![1],
            verifier: vec![2],
            sessions: 0b1,
            flags: USER_FLAG_ENABLED,
        });

        assert!(list.find("alice").is_some());
        assert!(list.find("ALICE").is_some());
        assert!(list.find("Alice").is_some());
        assert!(list.find("bob").is_none());
        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());
    }

    #[test]
    fn test_seed_keys_are_distinct() {
        let a = UserList::new().unwrap();
        let b = UserList::new().unwrap();
        assert_eq!(a.seed_key().len(), SEED_KEY_SIZE);
        assert_ne!(a.seed_key(), b.seed_key());
    }

    #[test]
    fn test_create_provisions_verifiable_record() {
        let user = User::create("alice", "letmein", 0b11).unwrap();
        assert!(user.is_enabled());
        assert_eq!(user.group, "8192");
        assert_eq!(user.salt.len(), SALT_SIZE);
        assert_eq!(user.sessions, 0b11);

        // The stored verifier matches a recomputation from the password.
        let group = srp::group_by_name(&user.group).unwrap();
        let salt = BigUint::from_bytes_be(&user.salt);
        let expected = srp::calc_v(
            "alice",
            b"letmein",
            &salt,
            &group.modulus(),
            &group.generator(),
        );
        assert_eq!(user.verifier, expected.to_bytes_be());
    }
}
