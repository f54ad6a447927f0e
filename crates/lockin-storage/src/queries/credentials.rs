// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential CRUD operations.
//!
//! Rows carry ciphertext for `username` and `password`; nothing here
//! touches key material.

use lockin_core::{EntryId, LockinError, StoredEntry};
use rusqlite::params;

use crate::database::{Database, map_tr_err};

const COLUMNS: &str = "id, name, username, password, url, notes, created_at, updated_at";

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredEntry> {
    Ok(StoredEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        password: row.get(3)?,
        url: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Insert a credential with both timestamps set to now.
pub async fn insert_credential(db: &Database, entry: &StoredEntry) -> Result<EntryId, LockinError> {
    let entry = entry.clone();
    let name = entry.name.clone();
    let ts = now();
    db.connection()
        .call(move |conn| -> Result<EntryId, rusqlite::Error> {
            conn.execute(
                "INSERT INTO credentials (name, username, password, url, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    entry.name,
                    entry.username,
                    entry.password,
                    entry.url,
                    entry.notes,
                    ts,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(|e| map_write_err(e, &name))
}

/// Overwrite every mutable field of `entry.id`.
///
/// `updated_at` becomes now, clamped so it never falls below `created_at`.
pub async fn update_credential(db: &Database, entry: &StoredEntry) -> Result<(), LockinError> {
    let entry = entry.clone();
    let id = entry.id;
    let name = entry.name.clone();
    let ts = now();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE credentials
                 SET name = ?2, username = ?3, password = ?4, url = ?5, notes = ?6,
                     updated_at = MAX(?7, created_at)
                 WHERE id = ?1",
                params![
                    entry.id,
                    entry.name,
                    entry.username,
                    entry.password,
                    entry.url,
                    entry.notes,
                    ts,
                ],
            )
        })
        .await
        .map_err(|e| map_write_err(e, &name))?;

    if changed == 0 {
        return Err(LockinError::EntryNotFound(format!("id {id}")));
    }
    Ok(())
}

/// Delete a credential by id.
pub async fn delete_credential(db: &Database, id: EntryId) -> Result<(), LockinError> {
    let changed = db
        .connection()
        .call(move |conn| conn.execute("DELETE FROM credentials WHERE id = ?1", params![id]))
        .await
        .map_err(map_tr_err)?;

    if changed == 0 {
        return Err(LockinError::EntryNotFound(format!("id {id}")));
    }
    Ok(())
}

/// Get a credential by id.
pub async fn get_credential(db: &Database, id: EntryId) -> Result<Option<StoredEntry>, LockinError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM credentials WHERE id = ?1"))?;
            match stmt.query_row(params![id], row_to_entry) {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Get a credential by name, ignoring ASCII case.
pub async fn get_credential_by_name(
    db: &Database,
    name: &str,
) -> Result<Option<StoredEntry>, LockinError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM credentials WHERE name = ?1 COLLATE NOCASE"
            ))?;
            match stmt.query_row(params![name], row_to_entry) {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All credentials ordered by name.
pub async fn list_credentials(db: &Database) -> Result<Vec<StoredEntry>, LockinError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM credentials ORDER BY name COLLATE NOCASE ASC, id ASC"
            ))?;
            let rows = stmt.query_map([], row_to_entry)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Credentials whose name contains `query`, ignoring case and surrounding
/// whitespace. An empty query matches everything.
pub async fn search_credentials(
    db: &Database,
    query: &str,
) -> Result<Vec<StoredEntry>, LockinError> {
    let pattern = format!("%{}%", escape_like(query.trim()));
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM credentials
                 WHERE lower(name) LIKE lower(?1) ESCAPE '\\'
                 ORDER BY name COLLATE NOCASE ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![pattern], row_to_entry)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Number of stored credentials.
pub async fn count_credentials(db: &Database) -> Result<i64, LockinError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM credentials", [], |row| row.get(0)))
        .await
        .map_err(map_tr_err)
}

/// Escape LIKE wildcards so they match literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn map_write_err(e: tokio_rusqlite::Error<rusqlite::Error>, name: &str) -> LockinError {
    match e {
        tokio_rusqlite::Error::Error(err) if is_unique_violation(&err) => {
            LockinError::DuplicateEntry {
                name: name.to_string(),
            }
        }
        other => map_tr_err(other),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stored(name: &str) -> StoredEntry {
        StoredEntry {
            id: 0,
            name: name.to_string(),
            username: "enc-user".to_string(),
            password: "enc-pass".to_string(),
            url: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    async fn open_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("q.db"), true).await.unwrap();
        (db, dir)
    }

    #[test]
    fn escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn insert_sets_equal_timestamps() {
        let (db, _dir) = open_db().await;
        let id = insert_credential(&db, &stored("GitHub")).await.unwrap();
        let row = get_credential(&db, id).await.unwrap().unwrap();
        assert_eq!(row.created_at, row.updated_at);
        assert!(row.created_at > 0);
    }

    #[tokio::test]
    async fn duplicate_name_ignores_case() {
        let (db, _dir) = open_db().await;
        insert_credential(&db, &stored("GitHub")).await.unwrap();
        let err = insert_credential(&db, &stored("github")).await.unwrap_err();
        assert!(matches!(err, LockinError::DuplicateEntry { name } if name == "github"));
    }

    #[tokio::test]
    async fn case_folding_is_ascii_only() {
        let (db, _dir) = open_db().await;
        insert_credential(&db, &stored("Äpfel")).await.unwrap();
        insert_credential(&db, &stored("äpfel")).await.unwrap();

        let found = get_credential_by_name(&db, "ÄPFEL").await.unwrap().unwrap();
        assert_eq!(found.name, "Äpfel");
        let hits = search_credentials(&db, "ä").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "äpfel");
    }

    #[tokio::test]
    async fn rename_into_existing_name_is_duplicate() {
        let (db, _dir) = open_db().await;
        insert_credential(&db, &stored("Mail")).await.unwrap();
        let id = insert_credential(&db, &stored("Bank")).await.unwrap();
        let mut row = get_credential(&db, id).await.unwrap().unwrap();
        row.name = "MAIL".into();
        let err = update_credential(&db, &row).await.unwrap_err();
        assert!(matches!(err, LockinError::DuplicateEntry { .. }));
    }

    #[tokio::test]
    async fn updated_at_never_precedes_created_at() {
        let (db, _dir) = open_db().await;
        let id = insert_credential(&db, &stored("Clock")).await.unwrap();
        // Push created_at into the future to simulate a skewed clock.
        db.connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE credentials SET created_at = created_at + 3600 WHERE id = ?1",
                    params![id],
                )
            })
            .await
            .unwrap();

        let row = get_credential(&db, id).await.unwrap().unwrap();
        update_credential(&db, &row).await.unwrap();
        let after = get_credential(&db, id).await.unwrap().unwrap();
        assert!(after.updated_at >= after.created_at);
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let (db, _dir) = open_db().await;
        insert_credential(&db, &stored("100% Bank")).await.unwrap();
        insert_credential(&db, &stored("1000 Club")).await.unwrap();
        insert_credential(&db, &stored("my_site")).await.unwrap();
        insert_credential(&db, &stored("mysite")).await.unwrap();

        let hits = search_credentials(&db, "0%").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "100% Bank");

        let hits = search_credentials(&db, "_").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "my_site");
    }

    #[tokio::test]
    async fn count_tracks_rows() {
        let (db, _dir) = open_db().await;
        assert_eq!(count_credentials(&db).await.unwrap(), 0);
        let id = insert_credential(&db, &stored("One")).await.unwrap();
        assert_eq!(count_credentials(&db).await.unwrap(), 1);
        delete_credential(&db, id).await.unwrap();
        assert_eq!(count_credentials(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let (db, _dir) = open_db().await;
        let first = insert_credential(&db, &stored("A")).await.unwrap();
        delete_credential(&db, first).await.unwrap();
        let second = insert_credential(&db, &stored("A")).await.unwrap();
        assert!(second > first);
    }
}
