// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::{Path, PathBuf};

use lockin_core::LockinError;
use tracing::{debug, info};

use crate::migrations;

/// Handle to the vault database file.
///
/// Cloning is cheap; clones share the same background connection thread.
#[derive(Debug, Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: PathBuf,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs and run migrations.
    ///
    /// The parent directory is created when missing, restricted to the owner
    /// on unix.
    pub async fn open(path: impl AsRef<Path>, wal_mode: bool) -> Result<Self, LockinError> {
        let path = path.as_ref().to_path_buf();
        ensure_parent_dir(&path)?;

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(LockinError::persistence)?;

        conn.call(move |conn| -> Result<(), LockinError> {
            conn.execute_batch(&pragmas(wal_mode))
                .map_err(LockinError::persistence)?;
            migrations::run_migrations(conn)
        })
        .await
        .map_err(map_call_err)?;

        info!(path = %path.display(), wal_mode, "database opened");
        Ok(Self { conn, path })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fold the WAL back into the main file so the file alone is a full copy.
    pub async fn checkpoint(&self) -> Result<(), LockinError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Checkpoint and close the connection.
    ///
    /// Later calls through any clone fail with a persistence error. Closing
    /// an already closed database is a no-op.
    pub async fn close(&self) -> Result<(), LockinError> {
        if self.is_closed().await {
            return Ok(());
        }
        self.checkpoint().await?;
        self.conn.clone().close().await.map_err(map_tr_err)?;
        debug!(path = %self.path.display(), "database closed");
        Ok(())
    }

    async fn is_closed(&self) -> bool {
        matches!(
            self.conn.call(|_| Ok::<_, rusqlite::Error>(())).await,
            Err(tokio_rusqlite::Error::ConnectionClosed)
        )
    }
}

fn pragmas(wal_mode: bool) -> String {
    let journal = if wal_mode { "WAL" } else { "DELETE" };
    format!(
        "PRAGMA journal_mode = {journal};
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;
         PRAGMA foreign_keys = ON;"
    )
}

fn ensure_parent_dir(path: &Path) -> Result<(), LockinError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.exists() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(parent).map_err(LockinError::persistence)
}

/// Convert a tokio-rusqlite error from a `rusqlite::Error` closure.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> LockinError {
    match e {
        tokio_rusqlite::Error::Error(err) => LockinError::persistence(err),
        tokio_rusqlite::Error::Close((_, err)) => LockinError::persistence(err),
        _ => LockinError::persistence(std::io::Error::other("database connection closed")),
    }
}

/// Convert a tokio-rusqlite error from a closure that already speaks `LockinError`.
pub fn map_call_err(e: tokio_rusqlite::Error<LockinError>) -> LockinError {
    match e {
        tokio_rusqlite::Error::Error(err) => err,
        tokio_rusqlite::Error::Close((_, err)) => LockinError::persistence(err),
        _ => LockinError::persistence(std::io::Error::other("database connection closed")),
    }
}
