// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for vault integration testing.
//!
//! `TestVault` assembles a `VaultController` over a temporary SQLite file
//! with cheap KDF settings. With a [`MockShare`] attached, mirroring is
//! enabled and every push lands in memory.

use secrecy::SecretString;

use lockin_config::model::{LockinConfig, MirrorConfig, StorageConfig};
use lockin_core::{LockinError, NewEntry};
use lockin_mirror::MirrorSync;
use lockin_storage::SqliteCredentialStore;
use lockin_vault::VaultController;

use crate::mock_share::MockShare;

/// Remote file name used by mirrored harnesses.
pub const MIRROR_FILE: &str = "credentials.db";

/// Builder for creating test vaults with configurable options.
pub struct TestVaultBuilder {
    password: String,
    share: Option<MockShare>,
    unlocked: bool,
    seed: Vec<NewEntry>,
}

impl TestVaultBuilder {
    fn new() -> Self {
        Self {
            password: "correct horse battery staple".to_string(),
            share: None,
            unlocked: true,
            seed: Vec::new(),
        }
    }

    /// Use a specific master password.
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// Enable mirroring to `share`.
    pub fn with_mirror(mut self, share: MockShare) -> Self {
        self.share = Some(share);
        self
    }

    /// Leave the vault locked after building.
    pub fn locked(mut self) -> Self {
        self.unlocked = false;
        self
    }

    /// Create these entries before returning. Implies an unlock.
    pub fn with_entries(mut self, entries: Vec<NewEntry>) -> Self {
        self.seed = entries;
        self
    }

    /// Build the harness.
    pub async fn build(self) -> Result<TestVault, LockinError> {
        let temp_dir = tempfile::TempDir::new().map_err(LockinError::persistence)?;
        let config = test_config(temp_dir.path(), self.share.is_some());

        let mut harness = TestVault {
            vault: open_vault(&config, self.share.clone()).await?,
            share: self.share,
            password: SecretString::from(self.password),
            config,
            _temp_dir: temp_dir,
        };

        if self.unlocked || !self.seed.is_empty() {
            harness.unlock().await?;
        }
        for entry in self.seed {
            harness.vault.create(entry).await.into_result()?;
        }
        if !self.unlocked {
            harness.vault.lock().await;
        }
        Ok(harness)
    }
}

/// A vault over a temporary database.
///
/// The database lives as long as the harness.
pub struct TestVault {
    pub vault: VaultController,
    pub share: Option<MockShare>,
    pub password: SecretString,
    pub config: LockinConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestVault {
    pub fn builder() -> TestVaultBuilder {
        TestVaultBuilder::new()
    }

    /// An unlocked vault with mirroring disabled.
    pub async fn new() -> Result<Self, LockinError> {
        Self::builder().build().await
    }

    /// Unlock with the harness password.
    pub async fn unlock(&mut self) -> Result<(), LockinError> {
        self.vault.unlock(&self.password).await
    }

    /// Close the vault and open a fresh controller on the same file. Locked.
    pub async fn reopen(&mut self) -> Result<(), LockinError> {
        self.vault.close().await?;
        self.vault = open_vault(&self.config, self.share.clone()).await?;
        Ok(())
    }

    /// The mock share, when mirroring is enabled.
    pub fn share(&self) -> Option<&MockShare> {
        self.share.as_ref()
    }

    /// Path of the local database file.
    pub fn database_path(&self) -> std::path::PathBuf {
        self.config.storage.resolved_path()
    }
}

fn test_config(dir: &std::path::Path, mirrored: bool) -> LockinConfig {
    let mut config = LockinConfig::default();
    config.storage = StorageConfig {
        database_path: dir.join("vault.db").display().to_string(),
        wal_mode: true,
    };
    // Fast KDF for tests.
    config.vault.pbkdf2_iterations = 1000;
    if mirrored {
        config.mirror = MirrorConfig {
            enabled: true,
            host: "mock".into(),
            share: "share".into(),
            mount_path: dir.join("mnt").display().to_string(),
            remote_file_name: MIRROR_FILE.into(),
            ..MirrorConfig::default()
        };
    }
    config
}

async fn open_vault(
    config: &LockinConfig,
    share: Option<MockShare>,
) -> Result<VaultController, LockinError> {
    let store = SqliteCredentialStore::open(&config.storage).await?;
    let mirror = match share {
        Some(share) => MirrorSync::new(&config.mirror, Box::new(share)),
        None => MirrorSync::from_config(&config.mirror),
    };
    Ok(VaultController::from_parts(
        Box::new(store),
        mirror,
        config.vault.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_harness_is_unlocked_without_mirror() {
        let harness = TestVault::new().await.unwrap();
        assert!(!harness.vault.is_locked());
        assert!(!harness.vault.sync_enabled());
        assert!(harness.share().is_none());
    }

    #[tokio::test]
    async fn seeded_locked_harness() {
        let harness = TestVault::builder()
            .with_entries(vec![NewEntry::new("A", "u", "p")])
            .locked()
            .build()
            .await
            .unwrap();
        assert!(harness.vault.is_locked());
        assert!(harness.vault.exists().await.unwrap());
    }

    #[tokio::test]
    async fn reopen_preserves_data() {
        let mut harness = TestVault::builder()
            .with_entries(vec![NewEntry::new("Keep", "u", "p")])
            .build()
            .await
            .unwrap();
        harness.reopen().await.unwrap();
        assert!(harness.vault.is_locked());
        harness.unlock().await.unwrap();
        assert_eq!(harness.vault.list().await.unwrap()[0].name, "Keep");
    }
}
