// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the CredentialStore trait.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use lockin_config::model::StorageConfig;
use lockin_core::{CredentialStore, EntryId, LockinError, StoredEntry};

use crate::database::Database;
use crate::queries;

/// SQLite-backed credential store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    db: Database,
}

impl SqliteCredentialStore {
    /// Open the database named by `config`, creating it when missing.
    pub async fn open(config: &StorageConfig) -> Result<Self, LockinError> {
        let db = Database::open(config.resolved_path(), config.wal_mode).await?;
        Ok(Self { db })
    }

    /// Wrap an already opened database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying Database.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn create(&self, entry: &StoredEntry) -> Result<EntryId, LockinError> {
        let id = queries::credentials::insert_credential(&self.db, entry).await?;
        debug!(id, "credential inserted");
        Ok(id)
    }

    async fn update(&self, entry: &StoredEntry) -> Result<(), LockinError> {
        queries::credentials::update_credential(&self.db, entry).await?;
        debug!(id = entry.id, "credential updated");
        Ok(())
    }

    async fn delete(&self, id: EntryId) -> Result<(), LockinError> {
        queries::credentials::delete_credential(&self.db, id).await?;
        debug!(id, "credential deleted");
        Ok(())
    }

    async fn get(&self, id: EntryId) -> Result<StoredEntry, LockinError> {
        queries::credentials::get_credential(&self.db, id)
            .await?
            .ok_or_else(|| LockinError::EntryNotFound(format!("id {id}")))
    }

    async fn get_by_name(&self, name: &str) -> Result<StoredEntry, LockinError> {
        queries::credentials::get_credential_by_name(&self.db, name)
            .await?
            .ok_or_else(|| LockinError::EntryNotFound(format!("name `{name}`")))
    }

    async fn list(&self) -> Result<Vec<StoredEntry>, LockinError> {
        queries::credentials::list_credentials(&self.db).await
    }

    async fn search(&self, query: &str) -> Result<Vec<StoredEntry>, LockinError> {
        queries::credentials::search_credentials(&self.db, query).await
    }

    async fn exists(&self) -> Result<bool, LockinError> {
        Ok(queries::credentials::count_credentials(&self.db).await? > 0)
    }

    async fn meta_get(&self, key: &str) -> Result<Option<Vec<u8>>, LockinError> {
        queries::meta::get_meta(&self.db, key).await
    }

    async fn meta_put(&self, key: &str, value: &[u8]) -> Result<(), LockinError> {
        queries::meta::put_meta(&self.db, key, value).await
    }

    async fn checkpoint(&self) -> Result<(), LockinError> {
        self.db.checkpoint().await
    }

    fn path(&self) -> &Path {
        self.db.path()
    }

    async fn close(&self) -> Result<(), LockinError> {
        self.db.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stored(name: &str) -> StoredEntry {
        StoredEntry {
            id: 0,
            name: name.to_string(),
            username: "u-blob".into(),
            password: "p-blob".into(),
            url: Some("https://example.test".into()),
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    async fn open_store() -> (SqliteCredentialStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("store.db").display().to_string(),
            wal_mode: true,
        };
        (SqliteCredentialStore::open(&config).await.unwrap(), dir)
    }

    #[tokio::test]
    async fn create_get_roundtrip_keeps_ciphertext() {
        let (store, _dir) = open_store().await;
        let id = store.create(&stored("GitHub")).await.unwrap();
        let row = store.get(id).await.unwrap();
        assert_eq!(row.id, id);
        assert_eq!(row.username, "u-blob");
        assert_eq!(row.password, "p-blob");
        assert_eq!(row.url.as_deref(), Some("https://example.test"));
    }

    #[tokio::test]
    async fn get_by_name_ignores_case() {
        let (store, _dir) = open_store().await;
        let id = store.create(&stored("GitHub")).await.unwrap();
        assert_eq!(store.get_by_name("GITHUB").await.unwrap().id, id);
        assert!(matches!(
            store.get_by_name("gitlab").await.unwrap_err(),
            LockinError::EntryNotFound(_)
        ));
    }

    #[tokio::test]
    async fn list_orders_by_name() {
        let (store, _dir) = open_store().await;
        store.create(&stored("Zebra")).await.unwrap();
        store.create(&stored("apple")).await.unwrap();
        store.create(&stored("Mango")).await.unwrap();
        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["apple", "Mango", "Zebra"]);
    }

    #[tokio::test]
    async fn search_trims_and_ignores_case() {
        let (store, _dir) = open_store().await;
        store.create(&stored("GitHub")).await.unwrap();
        store.create(&stored("Digits")).await.unwrap();
        let hits = store.search("  GIT ").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "GitHub");
        assert_eq!(store.search("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let (store, _dir) = open_store().await;
        assert!(matches!(store.delete(999).await.unwrap_err(), LockinError::EntryNotFound(_)));
        assert!(matches!(store.get(999).await.unwrap_err(), LockinError::EntryNotFound(_)));
        let mut ghost = stored("Ghost");
        ghost.id = 999;
        assert!(matches!(store.update(&ghost).await.unwrap_err(), LockinError::EntryNotFound(_)));
    }

    #[tokio::test]
    async fn exists_reflects_contents() {
        let (store, _dir) = open_store().await;
        assert!(!store.exists().await.unwrap());
        let id = store.create(&stored("One")).await.unwrap();
        assert!(store.exists().await.unwrap());
        store.delete(id).await.unwrap();
        assert!(!store.exists().await.unwrap());
    }

    #[tokio::test]
    async fn checkpoint_leaves_complete_file() {
        let (store, dir) = open_store().await;
        store.create(&stored("Flushed")).await.unwrap();
        store.checkpoint().await.unwrap();

        // A fresh connection on a copy of the main file alone sees the row.
        let copy = dir.path().join("copy.db");
        std::fs::copy(store.path(), &copy).unwrap();
        let conn = rusqlite::Connection::open(&copy).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM credentials", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn operations_after_close_fail() {
        let (store, _dir) = open_store().await;
        store.close().await.unwrap();
        assert!(matches!(
            store.list().await.unwrap_err(),
            LockinError::Persistence { .. }
        ));
    }
}
