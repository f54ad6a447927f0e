// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for LockIn.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level LockIn configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockinConfig {
    /// Local credential database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Master key derivation settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Remote mirror settings.
    #[serde(default)]
    pub mirror: MirrorConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file. A leading `~/` expands to the home directory.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

impl StorageConfig {
    /// The database path with `~/` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.database_path)
    }
}

fn default_database_path() -> String {
    lockin_home()
        .join("credentials.db")
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Key derivation function used for new vaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum KdfAlgorithm {
    /// PBKDF2-HMAC-SHA256.
    #[default]
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256,
    /// Argon2id, version 0x13.
    #[serde(rename = "argon2id")]
    Argon2id,
}

/// Master key derivation configuration.
///
/// Only consulted when a vault is first keyed; afterwards the parameters
/// recorded in the vault itself win.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// KDF for newly created vaults.
    #[serde(default)]
    pub kdf: KdfAlgorithm,

    /// PBKDF2 iteration count (default: 100000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_argon2_memory_cost")]
    pub argon2_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf: KdfAlgorithm::default(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            argon2_memory_cost: default_argon2_memory_cost(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

fn default_pbkdf2_iterations() -> u32 {
    100_000
}

fn default_argon2_memory_cost() -> u32 {
    65536
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

/// Remote mirror configuration.
///
/// The share `//host:port/share` is reached through `mount_path`. With
/// `auto_mount`, LockIn mounts it there itself using `user` and `password`
/// when nothing is mounted yet, and unmounts it again on lock.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MirrorConfig {
    /// Push the database to the share after every change.
    #[serde(default)]
    pub enabled: bool,

    /// File server host name or address.
    #[serde(default)]
    pub host: String,

    /// File server port (default: 445).
    #[serde(default = "default_mirror_port")]
    pub port: u16,

    /// Share name on the server.
    #[serde(default)]
    pub share: String,

    /// Account used for the share.
    #[serde(default)]
    pub user: String,

    /// Password for `user`. Handed to the mount helper through its
    /// environment, never on the command line.
    #[serde(default)]
    pub password: Option<String>,

    /// Local directory where the share is mounted.
    #[serde(default)]
    pub mount_path: String,

    /// Mount the share at `mount_path` when it is not already a mount point
    /// (default: true). When false the directory is used as is.
    #[serde(default = "default_auto_mount")]
    pub auto_mount: bool,

    /// File name of the mirrored copy on the share.
    #[serde(default = "default_remote_file_name")]
    pub remote_file_name: String,

    /// Seconds to wait for the server before giving up (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: default_mirror_port(),
            share: String::new(),
            user: String::new(),
            password: None,
            mount_path: String::new(),
            auto_mount: default_auto_mount(),
            remote_file_name: default_remote_file_name(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for MirrorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("share", &self.share)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("mount_path", &self.mount_path)
            .field("auto_mount", &self.auto_mount)
            .field("remote_file_name", &self.remote_file_name)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl MirrorConfig {
    /// Whether mirroring is switched on.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// `host:port` of the file server.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `//host:port/share`, for display.
    pub fn target(&self) -> String {
        format!("//{}:{}/{}", self.host, self.port, self.share)
    }

    /// `//host/share`, the UNC source handed to the mount helper.
    pub fn unc(&self) -> String {
        format!("//{}/{}", self.host, self.share.trim_start_matches('/'))
    }

    /// The mount path with `~/` expanded.
    pub fn resolved_mount_path(&self) -> PathBuf {
        expand_home(&self.mount_path)
    }
}

fn default_mirror_port() -> u16 {
    445
}

fn default_auto_mount() -> bool {
    true
}

fn default_remote_file_name() -> String {
    "credentials.db".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `~/.lockin`, the per-user data directory.
pub fn lockin_home() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".lockin"))
        .unwrap_or_else(|| PathBuf::from(".lockin"))
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = LockinConfig::default();
        assert!(config.storage.database_path.ends_with("credentials.db"));
        assert!(config.storage.wal_mode);
        assert_eq!(config.vault.kdf, KdfAlgorithm::Pbkdf2Sha256);
        assert_eq!(config.vault.pbkdf2_iterations, 100_000);
        assert!(!config.mirror.enabled());
        assert_eq!(config.mirror.port, 445);
        assert_eq!(config.mirror.remote_file_name, "credentials.db");
        assert!(config.mirror.auto_mount);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn mirror_debug_redacts_password() {
        let mirror = MirrorConfig {
            password: Some("s3cret".into()),
            ..MirrorConfig::default()
        };
        let debug = format!("{mirror:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn mirror_address_and_target() {
        let mirror = MirrorConfig {
            host: "nas.local".into(),
            share: "backup".into(),
            ..MirrorConfig::default()
        };
        assert_eq!(mirror.address(), "nas.local:445");
        assert_eq!(mirror.target(), "//nas.local:445/backup");
        assert_eq!(mirror.unc(), "//nas.local/backup");
    }

    #[test]
    fn expand_home_leaves_absolute_paths_alone() {
        assert_eq!(expand_home("/tmp/x.db"), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn expand_home_rewrites_tilde_prefix() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/vault.db"), home.join("vault.db"));
        }
    }
}
