//! Vault item records.
//!
//! Sensitive scalar fields (`LoginItem::password`,
//! `BankCardItem::security_code`) are opaque bytes here: the server
//! stores whatever ciphertext the client produced.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{base64_decode, base64_encode};

/// Free-form key/value metadata attached to every item.
pub type Meta = HashMap<String, String>;

/// A single login/password entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginItem {
    pub login: String,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub password: Vec<u8>,

    #[serde(default)]
    pub meta: Meta,
}

/// Bank card details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankCardItem {
    pub number: String,
    pub holder: String,
    pub expires: String,

    /// Card security code, always ciphertext.
    #[serde(
        rename = "csc",
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub security_code: Vec<u8>,

    #[serde(default)]
    pub meta: Meta,
}

/// Arbitrary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    pub value: String,

    #[serde(default)]
    pub meta: Meta,
}

/// Arbitrary binary data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryItem {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub value: Vec<u8>,

    #[serde(default)]
    pub meta: Meta,
}

/// The item sequences of a user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Logins,
    Cards,
    Texts,
    Binaries,
}

impl ItemCategory {
    /// Field name of the sequence in the stored document.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Logins => "logins",
            Self::Cards => "cards",
            Self::Texts => "texts",
            Self::Binaries => "binaries",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// One item of any kind, as passed to `VaultRepository::append_item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultItem {
    Login(LoginItem),
    BankCard(BankCardItem),
    Text(TextItem),
    Binary(BinaryItem),
}

impl VaultItem {
    /// The sequence this item is appended to.
    pub fn category(&self) -> ItemCategory {
        match self {
            Self::Login(_) => ItemCategory::Logins,
            Self::BankCard(_) => ItemCategory::Cards,
            Self::Text(_) => ItemCategory::Texts,
            Self::Binary(_) => ItemCategory::Binaries,
        }
    }
}

impl From<LoginItem> for VaultItem {
    fn from(item: LoginItem) -> Self {
        Self::Login(item)
    }
}

impl From<BankCardItem> for VaultItem {
    fn from(item: BankCardItem) -> Self {
        Self::BankCard(item)
    }
}

impl From<TextItem> for VaultItem {
    fn from(item: TextItem) -> Self {
        Self::Text(item)
    }
}

impl From<BinaryItem> for VaultItem {
    fn from(item: BinaryItem) -> Self {
        Self::Binary(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_follows_variant() {
        let text = VaultItem::from(TextItem {
            value: "note".into(),
            meta: Meta::new(),
        });
        assert_eq!(text.category(), ItemCategory::Texts);
        assert_eq!(text.category().field_name(), "texts");
    }

    #[test]
    fn byte_fields_are_base64_in_json() {
        let item = BinaryItem {
            value: vec![0xde, 0xad, 0xbe, 0xef],
            meta: Meta::new(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["value"], "3q2+7w==");

        let back: BinaryItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn security_code_is_stored_as_csc() {
        let card = BankCardItem {
            number: "4111111111111111".into(),
            holder: "ALICE".into(),
            expires: "12/30".into(),
            security_code: vec![1, 2, 3],
            meta: Meta::new(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert!(json.get("csc").is_some());
        assert!(json.get("security_code").is_none());
    }

    #[test]
    fn missing_meta_defaults_to_empty() {
        let item: TextItem = serde_json::from_str(r#"{"value":"hi"}"#).unwrap();
        assert!(item.meta.is_empty());
    }
}
