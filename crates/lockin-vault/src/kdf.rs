// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master key derivation from the master password.
//!
//! Two algorithms are supported: PBKDF2-HMAC-SHA256 (the default) and
//! Argon2id. The parameters a vault was keyed with are persisted next to its
//! salt so later unlocks derive the same key regardless of configuration.

use std::num::NonZeroU32;

use lockin_config::model::{KdfAlgorithm, VaultConfig};
use lockin_core::LockinError;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Length of a derived master key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of a generated salt in bytes.
pub const SALT_LEN: usize = 16;

/// Iteration count used by stores written before salts were recorded.
pub const LEGACY_PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt used by stores written before salts were recorded.
pub const LEGACY_SALT: [u8; SALT_LEN] = [
    0x59, 0xa8, 0x42, 0x85, 0x8d, 0x95, 0xe1, 0xb9, 0x0e, 0x19, 0x11, 0x17, 0x03, 0x2e, 0x0a, 0x9d,
];

/// KDF algorithm and cost, as stored in `vault_meta.kdf_params`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm")]
pub enum KdfParams {
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256 { iterations: u32 },
    #[serde(rename = "argon2id")]
    Argon2id {
        memory_cost: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl KdfParams {
    /// Parameters for a newly keyed vault.
    pub fn from_config(config: &VaultConfig) -> Self {
        match config.kdf {
            KdfAlgorithm::Pbkdf2Sha256 => KdfParams::Pbkdf2Sha256 {
                iterations: config.pbkdf2_iterations,
            },
            KdfAlgorithm::Argon2id => KdfParams::Argon2id {
                memory_cost: config.argon2_memory_cost,
                iterations: config.argon2_iterations,
                parallelism: config.argon2_parallelism,
            },
        }
    }

    /// Parameters of stores that predate recorded KDF settings.
    pub fn legacy() -> Self {
        KdfParams::Pbkdf2Sha256 {
            iterations: LEGACY_PBKDF2_ITERATIONS,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, LockinError> {
        serde_json::to_vec(self)
            .map_err(|e| LockinError::Internal(format!("cannot encode kdf params: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LockinError> {
        serde_json::from_slice(bytes)
            .map_err(|e| LockinError::Crypto(format!("unreadable kdf params: {e}")))
    }

    /// Derive a 32-byte key. Deterministic for equal inputs.
    ///
    /// The returned key is wrapped in [`Zeroizing`] for automatic memory
    /// zeroing on drop.
    pub fn derive_key(
        &self,
        passphrase: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEY_LEN]>, LockinError> {
        let mut output = Zeroizing::new([0u8; KEY_LEN]);
        match *self {
            KdfParams::Pbkdf2Sha256 { iterations } => {
                let iterations = NonZeroU32::new(iterations).ok_or_else(|| {
                    LockinError::Crypto("PBKDF2 iteration count must be non-zero".to_string())
                })?;
                ring::pbkdf2::derive(
                    ring::pbkdf2::PBKDF2_HMAC_SHA256,
                    iterations,
                    salt,
                    passphrase,
                    output.as_mut(),
                );
            }
            KdfParams::Argon2id {
                memory_cost,
                iterations,
                parallelism,
            } => {
                let params =
                    argon2::Params::new(memory_cost, iterations, parallelism, Some(KEY_LEN))
                        .map_err(|e| {
                            LockinError::Crypto(format!("invalid Argon2id parameters: {e}"))
                        })?;
                let argon2 = argon2::Argon2::new(
                    argon2::Algorithm::Argon2id,
                    argon2::Version::V0x13,
                    params,
                );
                argon2
                    .hash_password_into(passphrase, salt, output.as_mut())
                    .map_err(|e| {
                        LockinError::Crypto(format!("Argon2id key derivation failed: {e}"))
                    })?;
            }
        }
        Ok(output)
    }
}

/// Generate a random salt for a new vault.
pub fn generate_salt() -> Result<[u8; SALT_LEN], LockinError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| LockinError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_pbkdf2() -> KdfParams {
        KdfParams::Pbkdf2Sha256 { iterations: 1000 }
    }

    #[test]
    fn pbkdf2_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        let k1 = fast_pbkdf2().derive_key(b"correct horse", &salt).unwrap();
        let k2 = fast_pbkdf2().derive_key(b"correct horse", &salt).unwrap();
        assert_eq!(*k1, *k2);
    }

    #[test]
    fn pbkdf2_matches_known_vector() {
        // RFC 7914 section 11 PBKDF2-HMAC-SHA256 test vector, first 32 bytes.
        let params = KdfParams::Pbkdf2Sha256 { iterations: 1 };
        let key = params.derive_key(b"passwd", b"salt").unwrap();
        assert_eq!(
            key[..8],
            [0x55, 0xac, 0x04, 0x6e, 0x56, 0xe3, 0x08, 0x9f]
        );
    }

    #[test]
    fn different_salt_changes_key() {
        let k1 = fast_pbkdf2().derive_key(b"pw", &[1u8; SALT_LEN]).unwrap();
        let k2 = fast_pbkdf2().derive_key(b"pw", &[2u8; SALT_LEN]).unwrap();
        assert_ne!(*k1, *k2);
    }

    #[test]
    fn argon2id_is_deterministic_and_distinct_from_pbkdf2() {
        let params = KdfParams::Argon2id {
            memory_cost: 32768,
            iterations: 2,
            parallelism: 1,
        };
        let salt = [3u8; SALT_LEN];
        let k1 = params.derive_key(b"pw", &salt).unwrap();
        let k2 = params.derive_key(b"pw", &salt).unwrap();
        assert_eq!(*k1, *k2);
        assert_ne!(*k1, *fast_pbkdf2().derive_key(b"pw", &salt).unwrap());
    }

    #[test]
    fn zero_iterations_rejected() {
        let params = KdfParams::Pbkdf2Sha256 { iterations: 0 };
        assert!(matches!(
            params.derive_key(b"pw", &LEGACY_SALT),
            Err(LockinError::Crypto(_))
        ));
    }

    #[test]
    fn params_survive_json_encoding() {
        let params = KdfParams::Argon2id {
            memory_cost: 65536,
            iterations: 3,
            parallelism: 4,
        };
        let bytes = params.to_bytes().unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("\"algorithm\":\"argon2id\""));
        assert_eq!(KdfParams::from_bytes(&bytes).unwrap(), params);
    }

    #[test]
    fn from_config_follows_selected_algorithm() {
        let mut config = VaultConfig::default();
        assert_eq!(
            KdfParams::from_config(&config),
            KdfParams::Pbkdf2Sha256 { iterations: 100_000 }
        );
        config.kdf = KdfAlgorithm::Argon2id;
        assert!(matches!(
            KdfParams::from_config(&config),
            KdfParams::Argon2id { memory_cost: 65536, .. }
        ));
    }

    #[test]
    fn generate_salt_produces_random_values() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }
}
