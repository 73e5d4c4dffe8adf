//! The user document.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{BankCardItem, BinaryItem, LoginItem, TextItem, VaultItem};
use super::{base64_decode_opt, base64_encode_opt};
use crate::errors::KeeperError;

/// Opaque user identifier, assigned once at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = KeeperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| KeeperError::InvalidIdentifier {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

/// A user document: credentials plus the four item sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Unique, case-sensitive login.
    pub login: String,

    /// Hex digest of the salted password, never plaintext.
    pub password: String,

    /// Per-user salt. `None` for legacy records hashed with the
    /// server-wide salt.
    #[serde(
        default,
        serialize_with = "base64_encode_opt",
        deserialize_with = "base64_decode_opt"
    )]
    pub salt: Option<Vec<u8>>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub logins: Vec<LoginItem>,

    #[serde(default)]
    pub cards: Vec<BankCardItem>,

    #[serde(default)]
    pub texts: Vec<TextItem>,

    #[serde(default)]
    pub binaries: Vec<BinaryItem>,
}

impl User {
    /// A freshly signed-up user with empty item sequences.
    pub fn new(id: UserId, login: &str, password_hash: String, salt: Vec<u8>) -> Self {
        Self {
            id,
            login: login.to_string(),
            password: password_hash,
            salt: Some(salt),
            created_at: Utc::now(),
            logins: Vec::new(),
            cards: Vec::new(),
            texts: Vec::new(),
            binaries: Vec::new(),
        }
    }

    /// Append one item to the sequence named by its variant.
    pub fn push_item(&mut self, item: VaultItem) {
        match item {
            VaultItem::Login(i) => self.logins.push(i),
            VaultItem::BankCard(i) => self.cards.push(i),
            VaultItem::Text(i) => self.texts.push(i),
            VaultItem::Binary(i) => self.binaries.push(i),
        }
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        self.logins.len() + self.cards.len() + self.texts.len() + self.binaries.len()
    }
}
