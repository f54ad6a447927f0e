// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence contract for credential records.

use std::path::Path;

use async_trait::async_trait;

use crate::error::LockinError;
use crate::types::{EntryId, StoredEntry};

/// Durable storage of credential rows.
///
/// Implementations never see plaintext secrets: `username` and `password`
/// arrive and leave as ciphertext blobs. Names are unique under
/// case-insensitive comparison, and lookup by name and search ignore case
/// the same way.
///
/// Case folding covers ASCII letters only, matching SQLite's `NOCASE`
/// collation and `lower()`: "GitHub" and "github" collide, while "Äpfel"
/// and "äpfel" are distinct names and a search for "ä" does not find "Ä".
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Insert a new row with both timestamps set to now and return its id.
    ///
    /// Fails with [`LockinError::DuplicateEntry`] when the name is taken.
    async fn create(&self, entry: &StoredEntry) -> Result<EntryId, LockinError>;

    /// Overwrite every mutable field of `entry.id` and refresh `updated_at`.
    async fn update(&self, entry: &StoredEntry) -> Result<(), LockinError>;

    /// Remove a row.
    async fn delete(&self, id: EntryId) -> Result<(), LockinError>;

    async fn get(&self, id: EntryId) -> Result<StoredEntry, LockinError>;

    /// Case-insensitive exact match on `name`.
    async fn get_by_name(&self, name: &str) -> Result<StoredEntry, LockinError>;

    /// All rows ordered by name.
    async fn list(&self) -> Result<Vec<StoredEntry>, LockinError>;

    /// Rows whose name contains `query` (case-insensitive, trimmed), ordered by name.
    async fn search(&self, query: &str) -> Result<Vec<StoredEntry>, LockinError>;

    /// True iff at least one row is present.
    async fn exists(&self) -> Result<bool, LockinError>;

    /// Read a vault metadata value.
    async fn meta_get(&self, key: &str) -> Result<Option<Vec<u8>>, LockinError>;

    /// Insert or replace a vault metadata value.
    async fn meta_put(&self, key: &str, value: &[u8]) -> Result<(), LockinError>;

    /// Flush pending writes so the file at [`path`](Self::path) is complete.
    async fn checkpoint(&self) -> Result<(), LockinError>;

    /// Location of the backing file.
    fn path(&self) -> &Path;

    /// Flush and release the store.
    async fn close(&self) -> Result<(), LockinError>;
}
