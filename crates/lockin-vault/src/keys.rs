// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session custody of the master key.
//!
//! While unlocked the key is held XOR-masked against a fixed pattern. The
//! mask keeps the raw key out of casual memory dumps and nothing more; anyone
//! who can read process memory can also read the mask.

use zeroize::{Zeroize, Zeroizing};

use crate::kdf::KEY_LEN;

const KEY_MASK: [u8; KEY_LEN] = [
    0x3c, 0x7f, 0x1a, 0x9e, 0x5b, 0xd2, 0x48, 0xe3, 0x71, 0x0c, 0x8a, 0xf5, 0x29, 0x64, 0xb7, 0x03,
    0x3c, 0x7f, 0x1a, 0x9e, 0x5b, 0xd2, 0x48, 0xe3, 0x71, 0x0c, 0x8a, 0xf5, 0x29, 0x64, 0xb7, 0x03,
];

/// Holds at most one master key for the unlocked session.
#[derive(Default)]
pub struct KeyManager {
    masked: Option<Zeroizing<[u8; KEY_LEN]>>,
}

impl KeyManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain `key` for the session, discarding any previous key.
    pub fn store(&mut self, key: &[u8; KEY_LEN]) {
        self.clear();
        let mut masked = Zeroizing::new([0u8; KEY_LEN]);
        for (out, (k, m)) in masked.iter_mut().zip(key.iter().zip(KEY_MASK.iter())) {
            *out = k ^ m;
        }
        self.masked = Some(masked);
    }

    /// The unmasked key, if one is held. Zeroed when the returned value drops.
    pub fn active(&self) -> Option<Zeroizing<[u8; KEY_LEN]>> {
        let masked = self.masked.as_ref()?;
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        for (out, (k, m)) in key.iter_mut().zip(masked.iter().zip(KEY_MASK.iter())) {
            *out = k ^ m;
        }
        Some(key)
    }

    pub fn is_set(&self) -> bool {
        self.masked.is_some()
    }

    /// Overwrite and drop the held key. Safe to call with no key held.
    pub fn clear(&mut self) {
        if let Some(mut masked) = self.masked.take() {
            masked.zeroize();
        }
    }
}

impl Drop for KeyManager {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("key", &self.masked.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_active_returns_original() {
        let key = [0xAB; KEY_LEN];
        let mut keys = KeyManager::new();
        keys.store(&key);
        assert_eq!(*keys.active().unwrap(), key);
    }

    #[test]
    fn held_bytes_are_masked() {
        let key = [0u8; KEY_LEN];
        let mut keys = KeyManager::new();
        keys.store(&key);
        assert_eq!(**keys.masked.as_ref().unwrap(), KEY_MASK);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut keys = KeyManager::new();
        keys.clear();
        keys.store(&[1u8; KEY_LEN]);
        assert!(keys.is_set());
        keys.clear();
        keys.clear();
        assert!(!keys.is_set());
        assert!(keys.active().is_none());
    }

    #[test]
    fn store_replaces_previous_key() {
        let mut keys = KeyManager::new();
        keys.store(&[1u8; KEY_LEN]);
        keys.store(&[2u8; KEY_LEN]);
        assert_eq!(*keys.active().unwrap(), [2u8; KEY_LEN]);
    }

    #[test]
    fn debug_hides_key() {
        let mut keys = KeyManager::new();
        keys.store(&[0x42; KEY_LEN]);
        let debug = format!("{keys:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("66"));
    }
}
