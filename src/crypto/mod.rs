//! Cryptographic primitives for VaultKeeper.
//!
//! This module provides:
//! - AES-256-GCM field encryption with the client key (`encryption`)
//! - Salted SHA-256 password digests for stored credentials (`password`)

pub mod encryption;
pub mod password;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{ItemCipher, VaultKey, hash_password, ...};
pub use encryption::{ItemCipher, VaultKey};
pub use password::{digests_match, generate_salt, hash_password};
