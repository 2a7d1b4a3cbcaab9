//! Session token generation and hashing.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Session token prefix, so leaked tokens are recognisable.
pub const SESSION_TOKEN_PREFIX: &str = "sf";

/// Number of random bytes in a token.
pub const SESSION_TOKEN_SECRET_BYTES: usize = 32;

/// A freshly generated bearer token. Only ever shown once.
pub struct SessionToken {
    encoded: String,
}

impl SessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Hash used to store and look up the session.
    #[must_use]
    pub fn hash(&self) -> String {
        hash_session_token(&self.encoded)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(**redacted**)")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        self.encoded.zeroize();
    }
}

/// Generate a new random session token.
#[must_use]
pub fn generate_session_token() -> SessionToken {
    let mut secret = [0_u8; SESSION_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    let encoded = format!("{SESSION_TOKEN_PREFIX}_{}", encode_hex(&secret));

    secret.zeroize();

    SessionToken { encoded }
}

/// Hash a raw session token for storage and lookup.
#[must_use]
pub fn hash_session_token(token: &str) -> String {
    encode_hex(&Sha256::digest(token.as_bytes()))
}

fn encode_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(bytes.len() * 2);

    for byte in bytes {
        encoded.push(char::from(HEX[usize::from(byte >> 4)]));
        encoded.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }

    encoded
}
