// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: KDF cost floors,
//! a complete mirror target when mirroring is on, and a parseable log level.

use crate::diagnostic::ConfigError;
use crate::model::{KdfAlgorithm, LockinConfig};

/// Lowest PBKDF2 iteration count accepted for new vaults.
pub const MIN_PBKDF2_ITERATIONS: u32 = 10_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LockinConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(invalid("storage.database_path", "must not be empty"));
    }

    let vault = &config.vault;
    match vault.kdf {
        KdfAlgorithm::Pbkdf2Sha256 => {
            if vault.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
                errors.push(invalid(
                    "vault.pbkdf2_iterations",
                    format!("must be at least {MIN_PBKDF2_ITERATIONS}, got {}", vault.pbkdf2_iterations),
                ));
            }
        }
        KdfAlgorithm::Argon2id => {
            if vault.argon2_memory_cost < 32768 {
                errors.push(invalid(
                    "vault.argon2_memory_cost",
                    format!("must be at least 32768 (32 MiB), got {}", vault.argon2_memory_cost),
                ));
            }
            if vault.argon2_iterations < 2 {
                errors.push(invalid(
                    "vault.argon2_iterations",
                    format!("must be at least 2, got {}", vault.argon2_iterations),
                ));
            }
            if vault.argon2_parallelism < 1 {
                errors.push(invalid(
                    "vault.argon2_parallelism",
                    format!("must be at least 1, got {}", vault.argon2_parallelism),
                ));
            }
        }
    }

    let mirror = &config.mirror;
    if mirror.enabled() {
        for (key, value) in [
            ("mirror.host", &mirror.host),
            ("mirror.share", &mirror.share),
            ("mirror.mount_path", &mirror.mount_path),
            ("mirror.remote_file_name", &mirror.remote_file_name),
        ] {
            if value.trim().is_empty() {
                errors.push(invalid(key, "must be set when mirror.enabled = true"));
            }
        }
        if mirror.port == 0 {
            errors.push(invalid("mirror.port", "must not be 0"));
        }
        if mirror.remote_file_name.contains(['/', '\\']) {
            errors.push(invalid(
                "mirror.remote_file_name",
                format!("`{}` must be a bare file name", mirror.remote_file_name),
            ));
        }
        if mirror.connect_timeout_secs == 0 {
            errors.push(invalid("mirror.connect_timeout_secs", "must be at least 1"));
        }
    }

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(invalid(
            "log.level",
            format!("`{}` is not one of: {}", config.log.level, LOG_LEVELS.join(", ")),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        key: key.to_string(),
        message: message.into(),
    }
}
