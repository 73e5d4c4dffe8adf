//! Salted password digests for stored user credentials.
//!
//! digest = hex(SHA-256(password || salt))
//!
//! New accounts get a random per-user salt stored next to the digest.
//! Records created without one are verified against the server-wide
//! salt from the server config.

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of a per-user salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Hash `password` with `salt`. Deterministic for identical inputs.
pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt);
    hex_encode(&hasher.finalize())
}

/// Generate a cryptographically random per-user salt.
pub fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Compare two digests without leaking timing information.
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;

    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_sha256_hex() {
        // sha256("abc") with an empty salt.
        assert_eq!(
            hash_password("abc", b""),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn salts_are_random() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), SALT_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn digests_match_is_exact() {
        let d = hash_password("pw", b"salt");
        assert!(digests_match(&d, &d.clone()));
        assert!(!digests_match(&d, &hash_password("pw", b"salt2")));
        assert!(!digests_match(&d, ""));
    }
}
