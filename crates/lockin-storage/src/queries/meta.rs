// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value access to the `vault_meta` table.

use lockin_core::LockinError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};

/// Read a metadata value.
pub async fn get_meta(db: &Database, key: &str) -> Result<Option<Vec<u8>>, LockinError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            match conn.query_row(
                "SELECT value FROM vault_meta WHERE key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            ) {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a metadata value.
pub async fn put_meta(db: &Database, key: &str, value: &[u8]) -> Result<(), LockinError> {
    let key = key.to_string();
    let value = value.to_vec();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("m.db"), true).await.unwrap();

        assert_eq!(get_meta(&db, "kdf_salt").await.unwrap(), None);
        put_meta(&db, "kdf_salt", &[1, 2, 3]).await.unwrap();
        assert_eq!(get_meta(&db, "kdf_salt").await.unwrap(), Some(vec![1, 2, 3]));
        put_meta(&db, "kdf_salt", &[9]).await.unwrap();
        assert_eq!(get_meta(&db, "kdf_salt").await.unwrap(), Some(vec![9]));
    }
}
