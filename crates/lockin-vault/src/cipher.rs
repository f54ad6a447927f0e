// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM field encryption.
//!
//! A sealed field is `base64(nonce || ciphertext || tag)` using the standard
//! padded alphabet. Every call to [`seal`] generates a fresh random 96-bit
//! nonce via the system CSPRNG; nonce reuse would be catastrophic for GCM.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lockin_core::LockinError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use crate::kdf::KEY_LEN;
use crate::keys::KeyManager;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, LockinError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| LockinError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext`, returning `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, LockinError> {
    let key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| LockinError::Crypto("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| LockinError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);
    Ok(blob)
}

/// Decrypt a `nonce || ciphertext || tag` blob produced by [`seal`].
///
/// Any malformed or unauthentic input is a [`LockinError::DecryptionFailure`].
pub fn open(key: &[u8; KEY_LEN], blob: &[u8]) -> Result<Vec<u8>, LockinError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(LockinError::DecryptionFailure);
    }
    let key = aead_key(key)?;
    let (nonce_bytes, sealed) = blob.split_at(NONCE_LEN);
    let nonce =
        Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| LockinError::DecryptionFailure)?;

    let mut in_out = sealed.to_vec();
    let plaintext = key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| LockinError::DecryptionFailure)?;
    Ok(plaintext.to_vec())
}

/// Encrypt a text field with the session key.
pub fn encrypt_field(keys: &KeyManager, plaintext: &str) -> Result<String, LockinError> {
    let key = keys.active().ok_or(LockinError::VaultLocked)?;
    let blob = seal(&key, plaintext.as_bytes())?;
    Ok(STANDARD.encode(blob))
}

/// Decrypt a text field with the session key.
pub fn decrypt_field(keys: &KeyManager, encoded: &str) -> Result<String, LockinError> {
    let key = keys.active().ok_or(LockinError::VaultLocked)?;
    let blob = STANDARD
        .decode(encoded)
        .map_err(|_| LockinError::DecryptionFailure)?;
    let plaintext = open(&key, &blob)?;
    String::from_utf8(plaintext).map_err(|_| LockinError::DecryptionFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn unlocked(byte: u8) -> KeyManager {
        let mut keys = KeyManager::new();
        keys.store(&[byte; KEY_LEN]);
        keys
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let keys = unlocked(7);
        let a = encrypt_field(&keys, "hunter2").unwrap();
        let b = encrypt_field(&keys, "hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn blob_layout_is_nonce_ciphertext_tag() {
        let blob = seal(&[9u8; KEY_LEN], b"hello").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn wrong_key_is_decryption_failure() {
        let blob = encrypt_field(&unlocked(1), "secret").unwrap();
        let err = decrypt_field(&unlocked(2), &blob).unwrap_err();
        assert!(matches!(err, LockinError::DecryptionFailure));
    }

    #[test]
    fn locked_manager_is_vault_locked() {
        let keys = KeyManager::new();
        assert!(encrypt_field(&keys, "x").unwrap_err().is_locked());
        assert!(decrypt_field(&keys, "AAAA").unwrap_err().is_locked());
    }

    #[test]
    fn malformed_blobs_are_decryption_failures() {
        let keys = unlocked(3);
        for bad in ["not base64!!", "", "AAAA"] {
            assert!(
                matches!(decrypt_field(&keys, bad), Err(LockinError::DecryptionFailure)),
                "{bad:?} should fail"
            );
        }
    }

    #[test]
    fn tampered_blob_fails() {
        let keys = unlocked(4);
        let mut blob = seal(&[4u8; KEY_LEN], b"do not tamper").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        let encoded = STANDARD.encode(blob);
        assert!(matches!(
            decrypt_field(&keys, &encoded),
            Err(LockinError::DecryptionFailure)
        ));
    }

    #[test]
    fn non_utf8_plaintext_fails() {
        let keys = unlocked(5);
        let blob = seal(&[5u8; KEY_LEN], &[0xff, 0xfe, 0xfd]).unwrap();
        assert!(matches!(
            decrypt_field(&keys, &STANDARD.encode(blob)),
            Err(LockinError::DecryptionFailure)
        ));
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let keys = unlocked(6);
        let blob = encrypt_field(&keys, "").unwrap();
        assert_eq!(decrypt_field(&keys, &blob).unwrap(), "");
    }

    proptest! {
        #[test]
        fn any_text_roundtrips(text in ".*", key_byte in any::<u8>()) {
            let keys = unlocked(key_byte);
            let blob = encrypt_field(&keys, &text).unwrap();
            prop_assert_eq!(decrypt_field(&keys, &blob).unwrap(), text);
        }
    }
}
