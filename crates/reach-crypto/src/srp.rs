//! SRP-6a group parameters and modular arithmetic.
//!
//! The server side of SRP-6a (RFC 2945 / RFC 5054) over the RFC 5054
//! groups from 3072 to 8192 bits. The hash `H` used for the private
//! key `x`, the multiplier `k` and the scrambling parameter `u` is
//! BLAKE2b-512; inputs to `k` and `u` are left-padded to the modulus
//! length. Big integers travel as unsigned big-endian byte arrays.
//!
//! Client-side counterparts (`calc_a_pub`, `client_key`) live here too
//! so both halves of the exchange can be driven against each other in
//! tests.
//!
//! Groups below 3072 bits are not offered; a user record naming one is
//! treated like an unknown group by the authenticator.

use blake2::{Blake2b512, Digest};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Length of the private ephemeral `b` in bytes (1024 bits).
pub const EPHEMERAL_SIZE: usize = 128;

/// An SRP group: a safe-prime modulus `N` and a generator `g`.
///
/// Constants are hex strings so group tables stay greppable against
/// RFC 5054 appendix A.
pub struct SrpGroup {
    /// Group id as it appears in user records ("3072" … "8192").
    pub name: &'static str,
    modulus_hex: &'static str,
    generator_hex: &'static str,
}

impl SrpGroup {
    /// The modulus `N`.
    pub fn modulus(&self) -> BigUint {
        BigUint::parse_bytes(self.modulus_hex.as_bytes(), 16)
            .expect("group modulus constant is valid hex")
    }

    /// The generator `g`.
    pub fn generator(&self) -> BigUint {
        BigUint::parse_bytes(self.generator_hex.as_bytes(), 16)
            .expect("group generator constant is valid hex")
    }
}

const MODULUS_3072: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
    98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
    9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
    E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
    3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33\
    A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7\
    ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864\
    D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2\
    08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF";

const MODULUS_4096: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
    98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
    9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
    E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
    3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33\
    A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7\
    ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864\
    D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2\
    08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7\
    88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8\
    DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2\
    233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9\
    93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C934063199FFFFFFFFFFFFFFFF";

const MODULUS_6144: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
    98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
    9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
    E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
    3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33\
    A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7\
    ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864\
    D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2\
    08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7\
    88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8\
    DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2\
    233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9\
    93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026\
    C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE\
    B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B\
    DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC\
    F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E\
    59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA\
    CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76\
    F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468\
    043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DCC4024FFFFFFFFFFFFFFFF";

const MODULUS_8192: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74\
    020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437\
    4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05\
    98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB\
    9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
    E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718\
    3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33\
    A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7\
    ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864\
    D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2\
    08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7\
    88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8\
    DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2\
    233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9\
    93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026\
    C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE\
    B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B\
    DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC\
    F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E\
    59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA\
    CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76\
    F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468\
    043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DBE115974A3926F12FEE5E4\
    38777CB6A932DF8CD8BEC4D073B931BA3BC832B68D9DD300741FA7BF8AFC47ED\
    2576F6936BA424663AAB639C5AE4F5683423B4742BF1C978238F16CBE39D652D\
    E3FDB8BEFC848AD922222E04A4037C0713EB57A81A23F0C73473FC646CEA306B\
    4BCBC8862F8385DDFA9D4B7FA2C087E879683303ED5BDD3A062B3CF5B3A278A6\
    6D2A13F83F44F82DDF310EE074AB6A364597E899A0255DC164F31CC50846851D\
    F9AB48195DED7EA1B1D510BD7EE74D73FAF36BC31ECFA268359046F4EB879F92\
    4009438B481C6CD7889A002ED5EE382BC9190DA6FC026E479558E4475677E9AA\
    9E3050E2765694DFC81F56E880B96E7160C980DD98EDD3DFFFFFFFFFFFFFFFFF";

/// RFC 5054 3072-bit group.
pub const SRP_GROUP_3072: SrpGroup = SrpGroup {
    name: "3072",
    modulus_hex: MODULUS_3072,
    generator_hex: "5",
};

/// RFC 5054 4096-bit group.
pub const SRP_GROUP_4096: SrpGroup = SrpGroup {
    name: "4096",
    modulus_hex: MODULUS_4096,
    generator_hex: "5",
};

/// RFC 5054 6144-bit group.
pub const SRP_GROUP_6144: SrpGroup = SrpGroup {
    name: "6144",
    modulus_hex: MODULUS_6144,
    generator_hex: "5",
};

/// RFC 5054 8192-bit group.
///
/// Also the group every fabricated identity uses, so replies for
/// unknown users share the wire shape of the largest real group.
pub const SRP_GROUP_8192: SrpGroup = SrpGroup {
    name: "8192",
    modulus_hex: MODULUS_8192,
    generator_hex: "13",
};

/// Look up a group by the id stored in a user record.
pub fn group_by_name(name: &str) -> Option<&'static SrpGroup> {
    match name {
        "3072" => Some(&SRP_GROUP_3072),
        "4096" => Some(&SRP_GROUP_4096),
        "6144" => Some(&SRP_GROUP_6144),
        "8192" => Some(&SRP_GROUP_8192),
        _ => None,
    }
}

/// Compute the private key `x = H(s ‖ H(I ‖ ":" ‖ p))`.
///
/// The username is hashed as UTF-16LE code units (the protocol's
/// internal username form); the password is raw bytes, which lets the
/// server-wide seed key play the password role for fabricated
/// identities.
pub fn calc_x(username: &str, password: &[u8], salt: &BigUint) -> BigUint {
    let mut inner = Blake2b512::new();
    inner.update(utf16le_bytes(username));
    inner.update(b":");
    inner.update(password);
    let inner = inner.finalize();

    let mut outer = Blake2b512::new();
    outer.update(salt.to_bytes_be());
    outer.update(inner);
    BigUint::from_bytes_be(&outer.finalize())
}

/// Compute the password verifier `v = g^x mod N`.
pub fn calc_v(
    username: &str,
    password: &[u8],
    salt: &BigUint,
    n: &BigUint,
    g: &BigUint,
) -> BigUint {
    let x = calc_x(username, password, salt);
    g.modpow(&x, n)
}

/// Compute the SRP-6a multiplier `k = H(N ‖ PAD(g))`.
pub fn calc_k(n: &BigUint, g: &BigUint) -> BigUint {
    let n_bytes = n.to_bytes_be();
    let mut hasher = Blake2b512::new();
    hasher.update(&n_bytes);
    hasher.update(pad_to(g, n_bytes.len()));
    BigUint::from_bytes_be(&hasher.finalize())
}

/// Compute the scrambling parameter `u = H(PAD(A) ‖ PAD(B))`.
pub fn calc_u(a_pub: &BigUint, b_pub: &BigUint, n: &BigUint) -> BigUint {
    let len = n.to_bytes_be().len();
    let mut hasher = Blake2b512::new();
    hasher.update(pad_to(a_pub, len));
    hasher.update(pad_to(b_pub, len));
    BigUint::from_bytes_be(&hasher.finalize())
}

/// Compute the server public ephemeral `B = k·v + g^b mod N`.
pub fn calc_b_pub(b: &BigUint, n: &BigUint, g: &BigUint, v: &BigUint) -> BigUint {
    let k = calc_k(n, g);
    ((k * v) % n + g.modpow(b, n)) % n
}

/// Compute the client public ephemeral `A = g^a mod N`.
pub fn calc_a_pub(a: &BigUint, n: &BigUint, g: &BigUint) -> BigUint {
    g.modpow(a, n)
}

/// Safeguard against a malicious `A`: reject `A ≡ 0 (mod N)`.
pub fn verify_a_mod_n(a_pub: &BigUint, n: &BigUint) -> bool {
    !(a_pub % n).is_zero()
}

/// Compute the server-side shared value `S = (A · v^u)^b mod N`,
/// serialized big-endian.
pub fn server_key(
    a_pub: &BigUint,
    v: &BigUint,
    u: &BigUint,
    b: &BigUint,
    n: &BigUint,
) -> Zeroizing<Vec<u8>> {
    let base = (a_pub * v.modpow(u, n)) % n;
    Zeroizing::new(base.modpow(b, n).to_bytes_be())
}

/// Compute the client-side shared value
/// `S = (B - k·g^x)^(a + u·x) mod N`, serialized big-endian.
pub fn client_key(
    b_pub: &BigUint,
    x: &BigUint,
    a: &BigUint,
    u: &BigUint,
    n: &BigUint,
    g: &BigUint,
) -> Zeroizing<Vec<u8>> {
    let k = calc_k(n, g);
    let kgx = (k * g.modpow(x, n)) % n;
    let base = (b_pub % n + n - kgx) % n;
    let exponent = a + u * x;
    Zeroizing::new(base.modpow(&exponent, n).to_bytes_be())
}

/// Sample the private ephemeral `b`: 1024 bits from the system CSPRNG.
pub fn generate_private_ephemeral() -> Result<BigUint> {
    let mut bytes = Zeroizing::new([0u8; EPHEMERAL_SIZE]);
    OsRng
        .try_fill_bytes(&mut bytes[..])
        .map_err(|e| Error::Random(e.to_string()))?;
    Ok(BigUint::from_bytes_be(&bytes[..]))
}

/// Encode a username as UTF-16LE code units for hashing.
fn utf16le_bytes(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Serialize `value` big-endian, left-padded with zeros to `len` bytes.
fn pad_to(value: &BigUint, len: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    if bytes.len() >= len {
        return bytes;
    }
    let mut padded = vec![0u8; len - bytes.len()];
    padded.extend_from_slice(&bytes);
    padded
}
