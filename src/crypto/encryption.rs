//! AES-256-GCM field encryption for vault items.
//!
//! Each call to `ItemCipher::encrypt` draws a fresh random 12-byte nonce
//! and prepends it to the ciphertext, so no nonce is ever reused under
//! the client key.
//!
//! Layout of a sealed field:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{KeeperError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Length of the client key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// The client's static symmetric key. Zeroed on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct VaultKey {
    bytes: [u8; KEY_LEN],
}

impl VaultKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Parse a base64-encoded key as stored in the client config.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            BASE64
                .decode(encoded.trim())
                .map_err(|e| KeeperError::Crypto(format!("key is not valid base64: {e}")))?,
        );
        let bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            KeeperError::Crypto(format!(
                "key must be exactly {KEY_LEN} bytes, got {}",
                decoded.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Base64 form, suitable for the `key` config field.
    pub fn to_base64(&self) -> Zeroizing<String> {
        Zeroizing::new(BASE64.encode(self.bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

/// Authenticated cipher for the sensitive fields of vault items.
pub struct ItemCipher {
    cipher: Aes256Gcm,
}

impl ItemCipher {
    pub fn new(key: &VaultKey) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes())),
        }
    }

    /// Encrypt `plaintext`, returning nonce || ciphertext || tag.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| KeeperError::Crypto(format!("encryption error: {e}")))?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);
        Ok(output)
    }

    /// Decrypt data produced by `encrypt`.
    ///
    /// Fails on a wrong key, truncated input or any tampering.
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(KeeperError::Crypto(
                "ciphertext is too short to be valid".into(),
            ));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| {
                KeeperError::Crypto("decryption failed: wrong key or corrupted data".into())
            })
    }

    /// Decrypt into a UTF-8 string.
    pub fn decrypt_string(&self, sealed: &[u8]) -> Result<Zeroizing<String>> {
        let mut bytes = self.decrypt(sealed)?;
        let owned = std::mem::take(&mut *bytes);
        String::from_utf8(owned).map(Zeroizing::new).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            KeeperError::Crypto("decrypted value is not valid UTF-8".into())
        })
    }
}
