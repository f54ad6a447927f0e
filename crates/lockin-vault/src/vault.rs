// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: unlock, lock, and encrypted credential operations.
//!
//! The controller owns the session key and the mirror connection. Every
//! successful mutation is followed by a whole-file push to the mirror; a
//! failed push is reported next to the mutation's result and never undoes it.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use lockin_config::model::{LockinConfig, VaultConfig};
use lockin_core::{
    CredentialStore, Entry, EntryId, LockinError, MirrorStatus, MutationResult, NewEntry,
    StoredEntry, SyncResult,
};
use lockin_mirror::MirrorSync;
use lockin_storage::SqliteCredentialStore;

use crate::cipher;
use crate::import::ImportReport;
use crate::kdf::{self, KdfParams};
use crate::keys::KeyManager;

/// `vault_meta` key holding the JSON-encoded [`KdfParams`].
pub const META_KDF_PARAMS: &str = "kdf_params";

/// `vault_meta` key holding the per-vault salt.
pub const META_KDF_SALT: &str = "kdf_salt";

/// Mediates every access to the credential store.
///
/// Starts locked. Debug output omits key material.
pub struct VaultController {
    store: Box<dyn CredentialStore>,
    mirror: MirrorSync,
    vault_config: VaultConfig,
    keys: KeyManager,
}

impl std::fmt::Debug for VaultController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultController")
            .field("path", &self.store.path())
            .field("locked", &self.is_locked())
            .field("mirror", &self.mirror)
            .finish()
    }
}

impl VaultController {
    /// Open the SQLite store and mirror described by `config`.
    pub async fn open(config: &LockinConfig) -> Result<Self, LockinError> {
        let store = SqliteCredentialStore::open(&config.storage).await?;
        let mirror = MirrorSync::from_config(&config.mirror);
        info!(
            path = %store.path().display(),
            mirror = config.mirror.enabled(),
            "vault opened"
        );
        Ok(Self::from_parts(
            Box::new(store),
            mirror,
            config.vault.clone(),
        ))
    }

    /// Assemble a controller from already built parts.
    pub fn from_parts(
        store: Box<dyn CredentialStore>,
        mirror: MirrorSync,
        vault_config: VaultConfig,
    ) -> Self {
        Self {
            store,
            mirror,
            vault_config,
            keys: KeyManager::new(),
        }
    }

    // --- Lifecycle ---

    /// Derive the master key and enter the unlocked state.
    ///
    /// The password is not checked against existing data: a wrong password
    /// surfaces as [`LockinError::DecryptionFailure`] on the first read.
    /// Mirroring connects only when the store already holds entries.
    pub async fn unlock(&mut self, password: &SecretString) -> Result<(), LockinError> {
        let has_entries = self.store.exists().await?;
        let (params, salt) = self.key_material(has_entries).await?;

        let passphrase = password.clone();
        let key = tokio::task::spawn_blocking(move || {
            params.derive_key(passphrase.expose_secret().as_bytes(), &salt)
        })
        .await
        .map_err(|e| LockinError::Internal(format!("key derivation task failed: {e}")))??;

        self.keys.store(&key);
        info!("vault unlocked");

        if has_entries {
            self.mirror.connect_if_enabled().await;
        } else {
            debug!("empty vault, mirror connection deferred");
        }
        Ok(())
    }

    /// Salt and KDF parameters for this vault, creating them on first use.
    async fn key_material(&self, has_entries: bool) -> Result<(KdfParams, Vec<u8>), LockinError> {
        if let Some(salt) = self.store.meta_get(META_KDF_SALT).await? {
            let params = match self.store.meta_get(META_KDF_PARAMS).await? {
                Some(bytes) => KdfParams::from_bytes(&bytes)?,
                None => KdfParams::legacy(),
            };
            return Ok((params, salt));
        }

        if has_entries {
            warn!("vault has no recorded salt, using legacy key derivation");
            return Ok((KdfParams::legacy(), kdf::LEGACY_SALT.to_vec()));
        }

        let params = KdfParams::from_config(&self.vault_config);
        let salt = kdf::generate_salt()?.to_vec();
        // Params first: a stored salt implies stored params.
        self.store
            .meta_put(META_KDF_PARAMS, &params.to_bytes()?)
            .await?;
        self.store.meta_put(META_KDF_SALT, &salt).await?;
        info!(?params, "vault keyed");
        Ok((params, salt))
    }

    /// Discard the key and disconnect the mirror. Idempotent.
    pub async fn lock(&mut self) {
        let was_unlocked = !self.is_locked();
        self.keys.clear();
        self.mirror.close().await;
        if was_unlocked {
            info!("vault locked");
        }
    }

    pub fn is_locked(&self) -> bool {
        !self.keys.is_set()
    }

    /// Lock and release the store.
    pub async fn close(&mut self) -> Result<(), LockinError> {
        self.lock().await;
        self.store.close().await?;
        info!("vault closed");
        Ok(())
    }

    /// True iff the store holds at least one entry. Works while locked.
    pub async fn exists(&self) -> Result<bool, LockinError> {
        self.store.exists().await
    }

    /// Mirroring is configured and connected.
    pub fn sync_enabled(&self) -> bool {
        self.mirror.is_active()
    }

    pub fn mirror_status(&self) -> MirrorStatus {
        self.mirror.status()
    }

    // --- Mutations ---

    /// Encrypt and store a new entry.
    pub async fn create(&self, entry: NewEntry) -> MutationResult<EntryId> {
        let result = self.create_entry(&entry).await;
        self.finish(result).await
    }

    /// Overwrite the entry with `entry.id`.
    pub async fn update(&self, entry: &Entry) -> MutationResult<()> {
        let result = self.update_entry(entry).await;
        self.finish(result).await
    }

    /// Remove the entry with `id`.
    pub async fn delete(&self, id: EntryId) -> MutationResult<()> {
        let result = match self.ensure_unlocked() {
            Ok(()) => self.store.delete(id).await,
            Err(e) => Err(e),
        };
        self.finish(result).await
    }

    /// Create every entry in turn, pushing to the mirror once at the end.
    pub async fn import(&self, entries: Vec<NewEntry>) -> MutationResult<ImportReport> {
        if let Err(e) = self.ensure_unlocked() {
            return MutationResult::new(self.idle_sync(), Err(e));
        }

        let mut report = ImportReport::default();
        for entry in entries {
            match self.create_entry(&entry).await {
                Ok(id) => {
                    debug!(id, "imported entry");
                    report.added.push(entry.name);
                }
                Err(e) => {
                    warn!(name = %entry.name, error = %e, "import entry rejected");
                    report.failed.push((entry.name, e));
                }
            }
        }

        info!(
            added = report.added_count(),
            failed = report.failed_count(),
            "import complete"
        );
        let sync = if report.added.is_empty() {
            self.idle_sync()
        } else {
            self.sync_after_change().await
        };
        MutationResult::new(sync, Ok(report))
    }

    async fn create_entry(&self, entry: &NewEntry) -> Result<EntryId, LockinError> {
        self.ensure_unlocked()?;
        validate(&entry.name, &entry.password)?;

        let stored = StoredEntry {
            id: 0,
            name: entry.name.trim().to_string(),
            username: cipher::encrypt_field(&self.keys, &entry.username)?,
            password: cipher::encrypt_field(&self.keys, &entry.password)?,
            url: entry.url.clone(),
            notes: entry.notes.clone(),
            created_at: 0,
            updated_at: 0,
        };
        self.store.create(&stored).await
    }

    async fn update_entry(&self, entry: &Entry) -> Result<(), LockinError> {
        self.ensure_unlocked()?;
        validate(&entry.name, &entry.password)?;

        let stored = StoredEntry {
            id: entry.id,
            name: entry.name.trim().to_string(),
            username: cipher::encrypt_field(&self.keys, &entry.username)?,
            password: cipher::encrypt_field(&self.keys, &entry.password)?,
            url: entry.url.clone(),
            notes: entry.notes.clone(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        };
        self.store.update(&stored).await
    }

    /// Pair a mutation result with its mirror outcome.
    async fn finish<T>(&self, result: Result<T, LockinError>) -> MutationResult<T> {
        match result {
            Ok(value) => MutationResult::new(self.sync_after_change().await, Ok(value)),
            Err(e) => MutationResult::new(self.idle_sync(), Err(e)),
        }
    }

    async fn sync_after_change(&self) -> SyncResult {
        if !self.mirror.is_active() {
            return SyncResult::disabled();
        }
        if let Err(e) = self.store.checkpoint().await {
            warn!(error = %e, "checkpoint before mirror push failed");
            return SyncResult::failed(LockinError::sync("cannot flush database before push", e));
        }
        self.mirror.push(self.store.path()).await
    }

    /// Sync state reported when no push was attempted.
    fn idle_sync(&self) -> SyncResult {
        SyncResult {
            enabled: self.sync_enabled(),
            failure: None,
        }
    }

    // --- Reads ---

    pub async fn get(&self, id: EntryId) -> Result<Entry, LockinError> {
        self.ensure_unlocked()?;
        let stored = self.store.get(id).await?;
        self.decrypt(stored)
    }

    /// Case-insensitive exact lookup by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Entry, LockinError> {
        self.ensure_unlocked()?;
        let stored = self.store.get_by_name(name.trim()).await?;
        self.decrypt(stored)
    }

    /// Every entry, ordered by name.
    pub async fn list(&self) -> Result<Vec<Entry>, LockinError> {
        self.ensure_unlocked()?;
        let rows = self.store.list().await?;
        self.decrypt_all(rows)
    }

    /// Entries whose name contains `query`, ignoring case.
    pub async fn search(&self, query: &str) -> Result<Vec<Entry>, LockinError> {
        self.ensure_unlocked()?;
        let rows = self.store.search(query).await?;
        self.decrypt_all(rows)
    }

    fn decrypt_all(&self, rows: Vec<StoredEntry>) -> Result<Vec<Entry>, LockinError> {
        rows.into_iter().map(|row| self.decrypt(row)).collect()
    }

    fn decrypt(&self, row: StoredEntry) -> Result<Entry, LockinError> {
        Ok(Entry {
            id: row.id,
            name: row.name,
            username: cipher::decrypt_field(&self.keys, &row.username)?,
            password: cipher::decrypt_field(&self.keys, &row.password)?,
            url: row.url,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn ensure_unlocked(&self) -> Result<(), LockinError> {
        if self.is_locked() {
            return Err(LockinError::VaultLocked);
        }
        Ok(())
    }
}

fn validate(name: &str, password: &str) -> Result<(), LockinError> {
    if name.trim().is_empty() {
        return Err(LockinError::InvalidEntry("name must not be empty".to_string()));
    }
    if password.trim().is_empty() {
        return Err(LockinError::InvalidEntry(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}
