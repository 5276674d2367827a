//! The server-side authentication handshake state machine.
//!
//! One [`ServerAuthenticator`] lives per connected client. The channel
//! (transport) owns framing, timeouts and teardown; it hands every
//! complete inbound payload to [`ServerAuthenticator::on_received`] and
//! reports flushed outbound payloads through
//! [`ServerAuthenticator::on_written`]. Outbound payloads and freshly
//! derived AEAD contexts flow back through the [`Channel`] trait.
//!
//! ```text
//! C → S  ClientHello      (encryption mask, identify, optional envelope)
//! S → C  ServerHello      (chosen encryption, optional iv)
//!   SRP only:
//!     C → S  SrpIdentify
//!     S → C  SrpServerKeyExchange (N, g, s, B, iv)
//!     C → S  SrpClientKeyExchange (A, iv)
//! S → C  SessionChallenge (permitted kinds, build info)
//! C → S  SessionResponse  (chosen kind, build info)
//! ```
//!
//! Unknown, disabled and unknown-group users all take the
//! deterministic-fake path: the SRP exchange runs to completion with
//! fabricated group-8192 parameters and an empty session mask, so the
//! client only ever observes `SessionDenied` and cannot probe which
//! usernames exist. Every failure is terminal; the session finishes
//! with exactly one [`Outcome`] and goes silent.

use std::mem;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use reach_crypto::aead::{
    self, AeadAlgorithm, MessageDecryptor, MessageEncryptor, NONCE_SIZE,
};
use reach_crypto::kdf;
use reach_crypto::kex::X25519KeyPair;
use reach_crypto::srp;

use crate::error::{Error, Outcome, Result};
use crate::message::{
    ClientHello, IdentifyMethod, OsType, ServerHello, SessionChallenge, SessionResponse,
    SrpClientKeyExchange, SrpIdentify, SrpServerKeyExchange, Version, ENCRYPTION_AES256_GCM,
    ENCRYPTION_CHACHA20_POLY1305,
};
use crate::user::UserList;

/// Capabilities the channel provides to the authenticator.
///
/// `send` queues one framed payload; the channel must call
/// [`ServerAuthenticator::on_written`] once it has been flushed.
/// `install_session_crypto` replaces the channel's AEAD contexts; every
/// payload after the call travels encrypted.
pub trait Channel {
    /// Queue an outbound payload.
    fn send(&mut self, payload: Vec<u8>);

    /// Install fresh AEAD contexts for both directions.
    fn install_session_crypto(&mut self, encryptor: MessageEncryptor, decryptor: MessageDecryptor);
}

/// Progress report returned by the authenticator entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// The handshake continues; the channel keeps driving it.
    InProgress,
    /// The handshake ended with the given outcome. The authenticator
    /// ignores all further input.
    Finished(Outcome),
}

/// Build and host details reported in [`SessionChallenge`].
///
/// Host discovery is the embedder's concern; the authenticator sends
/// whatever it is given.
#[derive(Debug, Clone)]
pub struct HostInfo {
    /// Server software version.
    pub version: Version,
    /// Server operating system.
    pub os_type: OsType,
    /// Server computer name.
    pub computer_name: String,
    /// Server logical CPU count.
    pub cpu_cores: u32,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            version: Version::current(),
            os_type: OsType::current(),
            computer_name: String::new(),
            cpu_cores: 0,
        }
    }
}

/// SRP working set, alive only between `SrpIdentify` and
/// `SrpClientKeyExchange`.
struct SrpExchange {
    n: BigUint,
    g: BigUint,
    v: BigUint,
    b: BigUint,
    b_pub: BigUint,
}

/// Handshake position. Data live only in a phase rides its variant.
enum State {
    Stopped,
    ReadClientHello,
    SendServerHello,
    ReadIdentify,
    SendServerKeyExchange(SrpExchange),
    ReadClientKeyExchange(SrpExchange),
    SendSessionChallenge,
    ReadSessionResponse,
    Finished,
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Stopped => "Stopped",
            State::ReadClientHello => "ReadClientHello",
            State::SendServerHello => "SendServerHello",
            State::ReadIdentify => "ReadIdentify",
            State::SendServerKeyExchange(_) => "SendServerKeyExchange",
            State::ReadClientKeyExchange(_) => "ReadClientKeyExchange",
            State::SendSessionChallenge => "SendSessionChallenge",
            State::ReadSessionResponse => "ReadSessionResponse",
            State::Finished => "Finished",
        }
    }
}

/// The server side of the authentication handshake.
///
/// Created `Stopped`, configured through the setters, started with
/// [`start`](Self::start), then driven by the channel until it reports
/// [`AuthStatus::Finished`].
pub struct ServerAuthenticator {
    state: State,
    outcome: Option<Outcome>,
    host_info: HostInfo,

    user_list: Option<Arc<UserList>>,
    key_pair: Option<X25519KeyPair>,
    anonymous_access: bool,

    /// Permitted session kinds: the anonymous mask before
    /// identification, the user's mask after it.
    session_types: u32,
    /// Negotiated `ENCRYPTION_*` bit; 0 until ClientHello.
    encryption: u32,
    identify: IdentifyMethod,

    encrypt_iv: Vec<u8>,
    decrypt_iv: Vec<u8>,
    session_key: Zeroizing<Vec<u8>>,

    user_name: String,
    session_type: u32,
    peer_version: Option<Version>,
}

impl ServerAuthenticator {
    /// Create a stopped, unconfigured authenticator.
    pub fn new(host_info: HostInfo) -> Self {
        Self {
            state: State::Stopped,
            outcome: None,
            host_info,
            user_list: None,
            key_pair: None,
            anonymous_access: false,
            session_types: 0,
            encryption: 0,
            identify: IdentifyMethod::Srp,
            encrypt_iv: Vec::new(),
            decrypt_iv: Vec::new(),
            session_key: Zeroizing::new(Vec::new()),
            user_name: String::new(),
            session_type: 0,
            peer_version: None,
        }
    }

    /// Set the user list. Required before [`start`](Self::start).
    pub fn set_user_list(&mut self, user_list: Arc<UserList>) -> Result<()> {
        self.ensure_stopped()?;
        self.user_list = Some(user_list);
        Ok(())
    }

    /// Load the long-term private key and draw the server's starting
    /// envelope nonce.
    ///
    /// Required whenever anonymous access is enabled and whenever
    /// clients are expected to request the envelope.
    pub fn set_private_key(&mut self, private_key: &[u8]) -> Result<()> {
        self.ensure_stopped()?;
        self.key_pair = Some(X25519KeyPair::from_private_key(private_key)?);
        self.encrypt_iv = random_nonce()?;
        Ok(())
    }

    /// Enable or disable anonymous access.
    ///
    /// Enabling requires a loaded key pair and a non-empty session
    /// mask; disabling forces the pre-identification mask to zero.
    pub fn set_anonymous_access(&mut self, enable: bool, session_types: u32) -> Result<()> {
        self.ensure_stopped()?;
        if enable {
            if self.key_pair.is_none() {
                return Err(Error::Config(
                    "anonymous access requires an installed private key",
                ));
            }
            if session_types == 0 {
                return Err(Error::Config(
                    "anonymous access requires at least one permitted session kind",
                ));
            }
            self.session_types = session_types;
        } else {
            self.session_types = 0;
        }
        self.anonymous_access = enable;
        Ok(())
    }

    /// Validate the configuration and begin waiting for `ClientHello`.
    pub fn start(&mut self) -> AuthStatus {
        match self.on_started() {
            Ok(()) => AuthStatus::InProgress,
            Err(e) => self.finish_error(e),
        }
    }

    fn on_started(&mut self) -> Result<()> {
        if !matches!(self.state, State::Stopped) {
            return Err(Error::Config("already started"));
        }
        if self.user_list.is_none() {
            return Err(Error::Config("user list is not set"));
        }
        if self.anonymous_access {
            if self.key_pair.is_none() {
                return Err(Error::Config(
                    "anonymous access requires an installed private key",
                ));
            }
            if self.session_types == 0 {
                return Err(Error::Config(
                    "anonymous access requires at least one permitted session kind",
                ));
            }
        } else if self.session_types != 0 {
            return Err(Error::Config(
                "session kinds must be empty until a user is identified",
            ));
        }
        self.state = State::ReadClientHello;
        Ok(())
    }

    /// Feed one complete inbound payload to the state machine.
    pub fn on_received(&mut self, channel: &mut dyn Channel, buffer: &[u8]) -> AuthStatus {
        if let Some(outcome) = self.outcome {
            return AuthStatus::Finished(outcome);
        }

        let state = mem::replace(&mut self.state, State::Finished);
        let result = match state {
            State::ReadClientHello => self.on_client_hello(channel, buffer),
            State::ReadIdentify => self.on_identify(channel, buffer),
            State::ReadClientKeyExchange(exchange) => {
                self.on_client_key_exchange(channel, buffer, exchange)
            }
            State::ReadSessionResponse => self.on_session_response(buffer),
            other => {
                error!(state = other.name(), "received a message outside a read state");
                Err(Error::Protocol("message received in unexpected state"))
            }
        };

        match result {
            Ok(()) => self.status(),
            Err(e) => self.finish_error(e),
        }
    }

    /// Notify the state machine that the last outbound payload was
    /// flushed.
    pub fn on_written(&mut self, channel: &mut dyn Channel) -> AuthStatus {
        if let Some(outcome) = self.outcome {
            return AuthStatus::Finished(outcome);
        }

        let state = mem::replace(&mut self.state, State::Finished);
        let result = match state {
            State::SendServerHello => self.after_server_hello(channel),
            State::SendServerKeyExchange(exchange) => {
                debug!("sent: SrpServerKeyExchange");
                self.state = State::ReadClientKeyExchange(exchange);
                Ok(())
            }
            State::SendSessionChallenge => {
                debug!("sent: SessionChallenge");
                self.state = State::ReadSessionResponse;
                Ok(())
            }
            other => {
                error!(state = other.name(), "write completion outside a send state");
                Err(Error::Protocol("write completed in unexpected state"))
            }
        };

        match result {
            Ok(()) => self.status(),
            Err(e) => self.finish_error(e),
        }
    }

    /// The terminal outcome, once finished.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The negotiated `ENCRYPTION_*` bit; 0 before negotiation.
    pub fn encryption(&self) -> u32 {
        self.encryption
    }

    /// The username the client identified as (empty for anonymous).
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// The accepted session kind, set on success.
    pub fn session_type(&self) -> u32 {
        self.session_type
    }

    /// The session kinds permitted after identification.
    pub fn session_types(&self) -> u32 {
        self.session_types
    }

    /// The client's reported software version, once received.
    pub fn peer_version(&self) -> Option<Version> {
        self.peer_version
    }

    // === Inbound message handlers ===

    fn on_client_hello(&mut self, channel: &mut dyn Channel, buffer: &[u8]) -> Result<()> {
        let hello = ClientHello::parse(buffer).map_err(|_| Error::Malformed("ClientHello"))?;
        debug!(
            encryption = hello.encryption,
            identify = hello.identify,
            "received: ClientHello"
        );

        if hello.encryption & (ENCRYPTION_AES256_GCM | ENCRYPTION_CHACHA20_POLY1305) == 0 {
            return Err(Error::Protocol("no supported encryption method offered"));
        }

        let identify = IdentifyMethod::from_u32(hello.identify)
            .ok_or(Error::Protocol("unsupported identify method"))?;
        if identify == IdentifyMethod::Anonymous && !self.anonymous_access {
            return Err(Error::AccessDenied);
        }
        self.identify = identify;

        let mut server_hello = ServerHello::default();

        if let Some(key_pair) = &self.key_pair {
            // Envelope: both the key and the nonce, or neither.
            if hello.public_key.is_empty() != hello.iv.is_empty() {
                return Err(Error::Protocol(
                    "envelope public key and IV must be present together",
                ));
            }

            if !hello.public_key.is_empty() {
                if hello.iv.len() != NONCE_SIZE {
                    return Err(Error::Protocol("envelope IV must be 12 bytes"));
                }
                let shared = key_pair.session_key(&hello.public_key)?;
                let envelope_key = kdf::envelope_session_key(&shared[..]);
                self.session_key = Zeroizing::new(envelope_key.to_vec());
                self.decrypt_iv = hello.iv;
                server_hello.iv = self.encrypt_iv.clone();
            }
        }

        self.encryption =
            negotiate_encryption(hello.encryption, aead::aes_hardware_available());
        server_hello.encryption = self.encryption;

        self.state = State::SendServerHello;
        debug!(encryption = self.encryption, "sending: ServerHello");
        channel.send(server_hello.serialize());
        Ok(())
    }

    fn after_server_hello(&mut self, channel: &mut dyn Channel) -> Result<()> {
        debug!("sent: ServerHello");

        // With an envelope key in place, everything from here on is
        // encrypted.
        if !self.session_key.is_empty() {
            self.install_session_crypto(channel)?;
        }

        match self.identify {
            IdentifyMethod::Srp => {
                self.state = State::ReadIdentify;
            }
            IdentifyMethod::Anonymous => {
                self.state = State::SendSessionChallenge;
                self.send_session_challenge(channel);
            }
        }
        Ok(())
    }

    fn on_identify(&mut self, channel: &mut dyn Channel, buffer: &[u8]) -> Result<()> {
        let identify = SrpIdentify::parse(buffer).map_err(|_| Error::Malformed("SrpIdentify"))?;
        debug!(username = %identify.username, "received: SrpIdentify");

        if identify.username.is_empty() {
            return Err(Error::Protocol("empty username"));
        }
        self.user_name = identify.username;

        let user_list = self
            .user_list
            .clone()
            .ok_or(Error::Config("user list is not set"))?;

        let known = user_list.find(&self.user_name).and_then(|user| {
            if !user.is_enabled() {
                return None;
            }
            match srp::group_by_name(&user.group) {
                Some(group) => Some((
                    group.modulus(),
                    group.generator(),
                    BigUint::from_bytes_be(&user.salt),
                    BigUint::from_bytes_be(&user.verifier),
                    user.sessions,
                )),
                None => {
                    warn!(group = %user.group, "user record names an unknown SRP group");
                    None
                }
            }
        });

        let (n, g, s, v) = match known {
            Some((n, g, s, v, sessions)) => {
                self.session_types = sessions;
                (n, g, s, v)
            }
            None => {
                // Fabricate a deterministic identity so the reply is
                // indistinguishable from a real group-8192 user.
                self.session_types = 0;

                let group = &srp::SRP_GROUP_8192;
                let n = group.modulus();
                let g = group.generator();
                let s = BigUint::from_bytes_be(&kdf::fake_salt(
                    user_list.seed_key(),
                    self.user_name.as_bytes(),
                ));
                let v = srp::calc_v(&self.user_name, user_list.seed_key(), &s, &n, &g);
                (n, g, s, v)
            }
        };

        let b = srp::generate_private_ephemeral()?;
        let b_pub = srp::calc_b_pub(&b, &n, &g, &v);

        if n.is_zero() || g.is_zero() || s.is_zero() || b_pub.is_zero() {
            return Err(Error::Protocol("invalid SRP parameters"));
        }

        // The outgoing nonce is regenerated for the keyed phase,
        // independently of the envelope nonce.
        self.encrypt_iv = random_nonce()?;

        let message = SrpServerKeyExchange {
            number: n.to_bytes_be(),
            generator: g.to_bytes_be(),
            salt: s.to_bytes_be(),
            b: b_pub.to_bytes_be(),
            iv: self.encrypt_iv.clone(),
        };

        self.state = State::SendServerKeyExchange(SrpExchange { n, g, v, b, b_pub });
        debug!("sending: SrpServerKeyExchange");
        channel.send(message.serialize());
        Ok(())
    }

    fn on_client_key_exchange(
        &mut self,
        channel: &mut dyn Channel,
        buffer: &[u8],
        exchange: SrpExchange,
    ) -> Result<()> {
        let message = SrpClientKeyExchange::parse(buffer)
            .map_err(|_| Error::Malformed("SrpClientKeyExchange"))?;
        debug!("received: SrpClientKeyExchange");

        if message.a.is_empty() {
            return Err(Error::Protocol("empty client ephemeral"));
        }
        if message.iv.len() != NONCE_SIZE {
            return Err(Error::Protocol("client IV must be 12 bytes"));
        }

        let a_pub = BigUint::from_bytes_be(&message.a);
        self.decrypt_iv = message.iv;

        if !srp::verify_a_mod_n(&a_pub, &exchange.n) {
            return Err(Error::Protocol("client ephemeral is zero modulo N"));
        }

        let u = srp::calc_u(&a_pub, &exchange.b_pub, &exchange.n);
        if u.is_zero() {
            return Err(Error::Protocol("zero scrambling parameter"));
        }

        let srp_key = srp::server_key(&a_pub, &exchange.v, &u, &exchange.b, &exchange.n);
        if srp_key.is_empty() {
            return Err(Error::Crypto(reach_crypto::Error::SrpParameter(
                "empty shared value".into(),
            )));
        }

        // Chain the envelope key (when present) into the SRP key so the
        // session key is bound to both exchanges.
        let session_key = kdf::chained_session_key(&self.session_key, &srp_key);
        self.session_key = Zeroizing::new(session_key.to_vec());

        self.install_session_crypto(channel)?;

        self.state = State::SendSessionChallenge;
        self.send_session_challenge(channel);
        Ok(())
    }

    fn on_session_response(&mut self, buffer: &[u8]) -> Result<()> {
        let response =
            SessionResponse::parse(buffer).map_err(|_| Error::Malformed("SessionResponse"))?;

        self.peer_version = Some(response.version);
        info!(
            session_type = response.session_type,
            version = %response.version,
            os = ?OsType::from_u32(response.os_type),
            computer_name = %response.computer_name,
            cpu_cores = response.cpu_cores,
            "received: SessionResponse"
        );

        if response.session_type.count_ones() != 1 {
            return Err(Error::Protocol(
                "session type must have exactly one bit set",
            ));
        }
        if self.session_types & response.session_type == 0 {
            return Err(Error::SessionDenied(response.session_type));
        }

        self.session_type = response.session_type;
        self.finish_success();
        Ok(())
    }

    // === Outbound helpers ===

    fn send_session_challenge(&mut self, channel: &mut dyn Channel) {
        let challenge = SessionChallenge {
            session_types: self.session_types,
            version: self.host_info.version,
            os_type: self.host_info.os_type.to_u32(),
            computer_name: self.host_info.computer_name.clone(),
            cpu_cores: self.host_info.cpu_cores,
        };

        debug!(session_types = self.session_types, "sending: SessionChallenge");
        channel.send(challenge.serialize());
    }

    fn install_session_crypto(&mut self, channel: &mut dyn Channel) -> Result<()> {
        let algorithm = self.chosen_algorithm()?;

        let key: [u8; kdf::SESSION_KEY_SIZE] = self.session_key[..]
            .try_into()
            .map_err(|_| Error::Config("session key has the wrong size"))?;
        let encrypt_iv: [u8; NONCE_SIZE] = self.encrypt_iv[..]
            .try_into()
            .map_err(|_| Error::Config("encrypt IV has the wrong size"))?;
        let decrypt_iv: [u8; NONCE_SIZE] = self.decrypt_iv[..]
            .try_into()
            .map_err(|_| Error::Protocol("client IV must be 12 bytes"))?;

        let encryptor = MessageEncryptor::new(algorithm, &key, &encrypt_iv)?;
        let decryptor = MessageDecryptor::new(algorithm, &key, &decrypt_iv)?;
        channel.install_session_crypto(encryptor, decryptor);
        Ok(())
    }

    fn chosen_algorithm(&self) -> Result<AeadAlgorithm> {
        match self.encryption {
            ENCRYPTION_AES256_GCM => Ok(AeadAlgorithm::Aes256Gcm),
            ENCRYPTION_CHACHA20_POLY1305 => Ok(AeadAlgorithm::ChaCha20Poly1305),
            _ => Err(Error::Config("no encryption method negotiated")),
        }
    }

    // === Termination ===

    fn ensure_stopped(&self) -> Result<()> {
        if matches!(self.state, State::Stopped) {
            Ok(())
        } else {
            Err(Error::Config("setters are only valid before start"))
        }
    }

    fn status(&self) -> AuthStatus {
        match self.outcome {
            Some(outcome) => AuthStatus::Finished(outcome),
            None => AuthStatus::InProgress,
        }
    }

    fn finish_success(&mut self) {
        self.state = State::Finished;
        self.outcome = Some(Outcome::Success);
        info!(
            session_type = self.session_type,
            "authentication finished: success"
        );
    }

    fn finish_error(&mut self, error: Error) -> AuthStatus {
        let outcome = error.outcome();
        error!(%error, ?outcome, "authentication finished");
        self.state = State::Finished;
        self.outcome = Some(outcome);
        AuthStatus::Finished(outcome)
    }
}

/// Pick the AEAD algorithm from the client's offer.
///
/// AES-256-GCM wins when it is offered and the host accelerates AES;
/// everything else falls through to ChaCha20-Poly1305, which is faster
/// without hardware support.
fn negotiate_encryption(offered: u32, aes_accelerated: bool) -> u32 {
    if offered & ENCRYPTION_AES256_GCM != 0 && aes_accelerated {
        ENCRYPTION_AES256_GCM
    } else {
        ENCRYPTION_CHACHA20_POLY1305
    }
}

fn random_nonce() -> Result<Vec<u8>> {
    let mut nonce = vec![0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| Error::Crypto(reach_crypto::Error::Random(e.to_string())))?;
    Ok(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{User, UserList, USER_FLAG_ENABLED};

    #[derive(Default)]
    struct TestChannel {
        sent: Vec<Vec<u8>>,
        installs: usize,
    }

    impl Channel for TestChannel {
        fn send(&mut self, payload: Vec<u8>) {
            self.sent.push(payload);
        }

        fn install_session_crypto(
            &mut self,
            _encryptor: MessageEncryptor,
            _decryptor: MessageDecryptor,
        ) {
            self.installs += 1;
        }
    }

    fn user_list() -> Arc<UserList> {
        let mut list = UserList::new().unwrap();
        list.add(User {
            name: "alice".to_string(),
            group: "3072".to_string(),
            salt: vec![0x5A; 64],
            verifier: vec![0x77; 8],
            sessions: 0b1,
            flags: USER_FLAG_ENABLED,
        });
        Arc::new(list)
    }

    fn started_authenticator() -> ServerAuthenticator {
        let mut auth = ServerAuthenticator::new(HostInfo::default());
        auth.set_user_list(user_list()).unwrap();
        assert_eq!(auth.start(), AuthStatus::InProgress);
        auth
    }

    #[test]
    fn test_start_requires_user_list() {
        let mut auth = ServerAuthenticator::new(HostInfo::default());
        assert_eq!(
            auth.start(),
            AuthStatus::Finished(Outcome::UnknownError)
        );
    }

    #[test]
    fn test_anonymous_access_requires_key_and_mask() {
        let mut auth = ServerAuthenticator::new(HostInfo::default());
        assert!(auth.set_anonymous_access(true, 0b1).is_err());

        auth.set_private_key(&[0x42; 32]).unwrap();
        assert!(auth.set_anonymous_access(true, 0).is_err());
        assert!(auth.set_anonymous_access(true, 0b1).is_ok());

        // Disabling forces the mask back to zero.
        auth.set_anonymous_access(false, 0).unwrap();
        assert_eq!(auth.session_types(), 0);
    }

    #[test]
    fn test_setters_rejected_after_start() {
        let mut auth = started_authenticator();
        assert!(auth.set_user_list(user_list()).is_err());
        assert!(auth.set_private_key(&[0x42; 32]).is_err());
        assert!(auth.set_anonymous_access(false, 0).is_err());
    }

    #[test]
    fn test_double_start_fails() {
        let mut auth = started_authenticator();
        assert_eq!(auth.start(), AuthStatus::Finished(Outcome::UnknownError));
    }

    #[test]
    fn test_negotiation_policy() {
        let aes = ENCRYPTION_AES256_GCM;
        let chacha = ENCRYPTION_CHACHA20_POLY1305;

        assert_eq!(negotiate_encryption(aes | chacha, true), aes);
        assert_eq!(negotiate_encryption(aes | chacha, false), chacha);
        assert_eq!(negotiate_encryption(aes, true), aes);
        assert_eq!(negotiate_encryption(chacha, true), chacha);
        assert_eq!(negotiate_encryption(chacha, false), chacha);
    }

    #[test]
    fn test_no_common_cipher_is_protocol_error() {
        let mut auth = started_authenticator();
        let mut channel = TestChannel::default();

        let hello = ClientHello {
            encryption: 0,
            identify: IdentifyMethod::Srp.to_u32(),
            ..Default::default()
        };
        let status = auth.on_received(&mut channel, &hello.serialize());

        assert_eq!(status, AuthStatus::Finished(Outcome::ProtocolError));
        assert!(channel.sent.is_empty(), "no reply may precede the failure");
    }

    #[test]
    fn test_unknown_identify_method_is_protocol_error() {
        let mut auth = started_authenticator();
        let mut channel = TestChannel::default();

        let hello = ClientHello {
            encryption: ENCRYPTION_CHACHA20_POLY1305,
            identify: 7,
            ..Default::default()
        };
        let status = auth.on_received(&mut channel, &hello.serialize());
        assert_eq!(status, AuthStatus::Finished(Outcome::ProtocolError));
    }

    #[test]
    fn test_anonymous_denied_without_configuration() {
        let mut auth = started_authenticator();
        let mut channel = TestChannel::default();

        let hello = ClientHello {
            encryption: ENCRYPTION_CHACHA20_POLY1305,
            identify: IdentifyMethod::Anonymous.to_u32(),
            ..Default::default()
        };
        let status = auth.on_received(&mut channel, &hello.serialize());

        assert_eq!(status, AuthStatus::Finished(Outcome::AccessDenied));
        assert!(channel.sent.is_empty());
    }

    #[test]
    fn test_envelope_key_without_iv_is_protocol_error() {
        let mut auth = ServerAuthenticator::new(HostInfo::default());
        auth.set_user_list(user_list()).unwrap();
        auth.set_private_key(&[0x42; 32]).unwrap();
        assert_eq!(auth.start(), AuthStatus::InProgress);

        let mut channel = TestChannel::default();
        let hello = ClientHello {
            encryption: ENCRYPTION_CHACHA20_POLY1305,
            identify: IdentifyMethod::Srp.to_u32(),
            public_key: vec![0x42; 32],
            iv: Vec::new(),
        };
        let status = auth.on_received(&mut channel, &hello.serialize());
        assert_eq!(status, AuthStatus::Finished(Outcome::ProtocolError));
    }

    #[test]
    fn test_receive_during_send_state_aborts() {
        let mut auth = started_authenticator();
        let mut channel = TestChannel::default();

        let hello = ClientHello {
            encryption: ENCRYPTION_CHACHA20_POLY1305,
            identify: IdentifyMethod::Srp.to_u32(),
            ..Default::default()
        };
        assert_eq!(
            auth.on_received(&mut channel, &hello.serialize()),
            AuthStatus::InProgress
        );

        // ServerHello has not been flushed yet; another inbound payload
        // is out of order.
        let status = auth.on_received(&mut channel, &hello.serialize());
        assert_eq!(status, AuthStatus::Finished(Outcome::ProtocolError));
    }

    #[test]
    fn test_finished_session_ignores_input() {
        let mut auth = started_authenticator();
        let mut channel = TestChannel::default();

        let status = auth.on_received(&mut channel, &[0xFF, 0xFF, 0xFF]);
        assert_eq!(status, AuthStatus::Finished(Outcome::ProtocolError));
        let sent_before = channel.sent.len();

        // The outcome is sticky and nothing further is emitted.
        assert_eq!(
            auth.on_received(&mut channel, &[]),
            AuthStatus::Finished(Outcome::ProtocolError)
        );
        assert_eq!(
            auth.on_written(&mut channel),
            AuthStatus::Finished(Outcome::ProtocolError)
        );
        assert_eq!(channel.sent.len(), sent_before);
    }

    #[test]
    fn test_empty_username_is_protocol_error() {
        let mut auth = started_authenticator();
        let mut channel = TestChannel::default();

        let hello = ClientHello {
            encryption: ENCRYPTION_CHACHA20_POLY1305,
            identify: IdentifyMethod::Srp.to_u32(),
            ..Default::default()
        };
        auth.on_received(&mut channel, &hello.serialize());
        auth.on_written(&mut channel);

        let status = auth.on_received(&mut channel, &SrpIdentify::default().serialize());
        assert_eq!(status, AuthStatus::Finished(Outcome::ProtocolError));
    }
}
