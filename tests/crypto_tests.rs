//! Integration tests for the VaultKeeper crypto module.

use vaultkeeper::crypto::{digests_match, generate_salt, hash_password, ItemCipher, VaultKey};
use vaultkeeper::errors::KeeperError;

// ---------------------------------------------------------------------------
// Item encryption
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let cipher = ItemCipher::new(&VaultKey::new([0xABu8; 32]));
    let plaintext = b"correct horse battery staple";

    let sealed = cipher.encrypt(plaintext).expect("encrypt should succeed");

    // 12-byte nonce + 16-byte tag.
    assert_eq!(sealed.len(), plaintext.len() + 28);

    let recovered = cipher.decrypt(&sealed).expect("decrypt should succeed");
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let cipher = ItemCipher::new(&VaultKey::new([0xCDu8; 32]));

    let ct1 = cipher.encrypt(b"123").expect("encrypt 1");
    let ct2 = cipher.encrypt(b"123").expect("encrypt 2");

    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
    assert_ne!(ct1[..12], ct2[..12], "nonces must differ");
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let sealed = ItemCipher::new(&VaultKey::generate())
        .encrypt(b"secret")
        .unwrap();

    let result = ItemCipher::new(&VaultKey::generate()).decrypt(&sealed);
    assert!(matches!(result, Err(KeeperError::Crypto(_))));
}

#[test]
fn decrypt_tampered_ciphertext_fails() {
    let cipher = ItemCipher::new(&VaultKey::generate());
    let mut sealed = cipher.encrypt(b"secret").unwrap();

    let last = sealed.len() - 1;
    sealed[last] ^= 0x01;

    assert!(cipher.decrypt(&sealed).is_err());
}

#[test]
fn decrypt_truncated_input_fails() {
    let cipher = ItemCipher::new(&VaultKey::generate());
    assert!(cipher.decrypt(&[0u8; 10]).is_err());
    assert!(cipher.decrypt(&[]).is_err());
}

#[test]
fn empty_plaintext_roundtrips() {
    let cipher = ItemCipher::new(&VaultKey::generate());
    let sealed = cipher.encrypt(b"").unwrap();
    assert_eq!(cipher.decrypt_string(&sealed).unwrap().as_str(), "");
}

#[test]
fn key_survives_base64_config_roundtrip() {
    let key = VaultKey::generate();
    let sealed = ItemCipher::new(&key).encrypt(b"pin").unwrap();

    let reloaded = VaultKey::from_base64(&key.to_base64()).unwrap();
    let opened = ItemCipher::new(&reloaded).decrypt_string(&sealed).unwrap();
    assert_eq!(opened.as_str(), "pin");
}

#[test]
fn malformed_base64_key_is_rejected() {
    assert!(VaultKey::from_base64("not base64 !!").is_err());
}

// ---------------------------------------------------------------------------
// Password hashing
// ---------------------------------------------------------------------------

#[test]
fn hashing_is_deterministic() {
    let salt = b"fixed-salt";
    assert_eq!(hash_password("pw1", salt), hash_password("pw1", salt));
}

#[test]
fn hashing_depends_on_password_and_salt() {
    let salt = generate_salt();
    let other_salt = generate_salt();
    assert_ne!(salt, other_salt);

    let base = hash_password("pw1", &salt);
    assert_ne!(base, hash_password("pw2", &salt));
    assert_ne!(base, hash_password("pw1", &other_salt));
}

#[test]
fn digest_is_lowercase_hex_sha256() {
    let digest = hash_password("pw", b"salt");
    assert_eq!(digest.len(), 64);
    assert!(digest
        .chars()
        .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn digests_match_compares_exactly() {
    let digest = hash_password("pw", b"salt");
    assert!(digests_match(&digest, &digest.clone()));
    assert!(!digests_match(&digest, &hash_password("pw", b"pepper")));
    assert!(!digests_match(&digest, ""));
}
