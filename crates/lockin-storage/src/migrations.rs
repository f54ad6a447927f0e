// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

use lockin_core::LockinError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), LockinError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(LockinError::persistence)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_create_tables_and_are_idempotent() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(tables.contains(&"credentials".to_string()));
        assert!(tables.contains(&"vault_meta".to_string()));
    }

    #[test]
    fn migrations_adopt_pre_existing_credentials_table() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE credentials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL,
                password TEXT NOT NULL,
                url TEXT,
                notes TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            INSERT INTO credentials (name, username, password, created_at, updated_at)
            VALUES ('GitHub', 'u', 'p', 1, 1);",
        )
        .unwrap();

        run_migrations(&mut conn).unwrap();

        let dup = conn.execute(
            "INSERT INTO credentials (name, username, password, created_at, updated_at)
             VALUES ('github', 'u', 'p', 2, 2)",
            [],
        );
        assert!(dup.is_err(), "index must enforce case-insensitive uniqueness");
    }
}
