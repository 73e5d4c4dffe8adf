//! Plaintext views of vault items and the sealing/opening functions
//! that sit between them and the wire.
//!
//! Only `LoginItem::password` and `BankCardItem::security_code` are
//! encrypted; text and binary items travel as-is.

use std::collections::HashMap;

use zeroize::Zeroizing;

use crate::crypto::ItemCipher;
use crate::errors::Result;
use crate::rpc::protocol::{BankCardItem, BinaryItem, LoginItem, TextItem, UserSnapshot};

/// A login entry with its password in the clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainLogin {
    pub login: String,
    pub password: Zeroizing<String>,
    pub meta: HashMap<String, String>,
}

/// A bank card with its security code in the clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainCard {
    pub number: String,
    pub holder: String,
    pub expires: String,
    pub security_code: Zeroizing<String>,
    pub meta: HashMap<String, String>,
}

/// A fully decrypted snapshot of one user's vault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vault {
    pub login: String,
    pub logins: Vec<PlainLogin>,
    pub cards: Vec<PlainCard>,
    pub texts: Vec<TextItem>,
    pub binaries: Vec<BinaryItem>,
}

impl Vault {
    pub fn item_count(&self) -> usize {
        self.logins.len() + self.cards.len() + self.texts.len() + self.binaries.len()
    }
}

pub fn seal_login(cipher: &ItemCipher, item: &PlainLogin) -> Result<LoginItem> {
    Ok(LoginItem {
        login: item.login.clone(),
        password: cipher.encrypt(item.password.as_bytes())?,
        meta: item.meta.clone(),
    })
}

pub fn seal_card(cipher: &ItemCipher, item: &PlainCard) -> Result<BankCardItem> {
    Ok(BankCardItem {
        number: item.number.clone(),
        holder: item.holder.clone(),
        expires: item.expires.clone(),
        security_code: cipher.encrypt(item.security_code.as_bytes())?,
        meta: item.meta.clone(),
    })
}

fn open_login(cipher: &ItemCipher, item: LoginItem) -> Result<PlainLogin> {
    Ok(PlainLogin {
        password: cipher.decrypt_string(&item.password)?,
        login: item.login,
        meta: item.meta,
    })
}

fn open_card(cipher: &ItemCipher, item: BankCardItem) -> Result<PlainCard> {
    Ok(PlainCard {
        security_code: cipher.decrypt_string(&item.security_code)?,
        number: item.number,
        holder: item.holder,
        expires: item.expires,
        meta: item.meta,
    })
}

/// Decrypt every sensitive field of `snapshot`.
///
/// A single field that fails to decrypt fails the whole snapshot.
pub fn open_snapshot(cipher: &ItemCipher, snapshot: UserSnapshot) -> Result<Vault> {
    let logins = snapshot
        .logins
        .into_iter()
        .map(|item| open_login(cipher, item))
        .collect::<Result<Vec<_>>>()?;
    let cards = snapshot
        .cards
        .into_iter()
        .map(|item| open_card(cipher, item))
        .collect::<Result<Vec<_>>>()?;

    Ok(Vault {
        login: snapshot.login,
        logins,
        cards,
        texts: snapshot.texts,
        binaries: snapshot.binaries,
    })
}
