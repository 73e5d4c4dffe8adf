//! Stored vault models.
//!
//! This module provides:
//! - the `User` document and its identifier (`user`)
//! - the four item kinds and the `VaultItem` union (`item`)
//!
//! Byte fields use base64 serde helpers so the JSON document store keeps
//! them as strings rather than number arrays.

pub mod item;
pub mod user;

pub use item::{BankCardItem, BinaryItem, ItemCategory, LoginItem, Meta, TextItem, VaultItem};
pub use user::{User, UserId};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serializer};

/// Serialize bytes as a base64 string.
pub fn base64_encode<S>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&BASE64.encode(bytes))
}

/// Deserialize a base64 string back into bytes.
pub fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(s).map_err(serde::de::Error::custom)
}

/// Same as `base64_encode` for optional byte fields.
pub fn base64_encode_opt<S>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match bytes {
        Some(b) => serializer.serialize_some(&BASE64.encode(b)),
        None => serializer.serialize_none(),
    }
}

/// Same as `base64_decode` for optional byte fields.
pub fn base64_decode_opt<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map(|s| BASE64.decode(s).map_err(serde::de::Error::custom))
        .transpose()
}
