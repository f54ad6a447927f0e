// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential records and operation results shared across crates.

use serde::{Deserialize, Serialize};

use crate::error::LockinError;

/// Store-assigned surrogate key of a credential.
pub type EntryId = i64;

/// Input for creating a credential. Sensitive fields are plaintext.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewEntry {
    pub name: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewEntry {
    /// Convenience constructor for the required fields.
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
            url: None,
            notes: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl std::fmt::Debug for NewEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewEntry")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

/// A decrypted credential as handed to the presentation layer.
///
/// Debug output omits the password.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// A credential row exactly as persisted.
///
/// `username` and `password` hold ciphertext blobs; `url` and `notes` are
/// plaintext. Timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub id: EntryId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Outcome of the mirror push that followed a mutation.
///
/// Produced by every mutating vault call; never persisted.
#[derive(Debug, Default)]
pub struct SyncResult {
    /// Mirroring is configured and connected for this session.
    pub enabled: bool,
    /// Set when the push (or the mutation before it) prevented a sync.
    pub failure: Option<LockinError>,
}

impl SyncResult {
    /// Mirroring is off or not connected; nothing was attempted.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// The push completed.
    pub fn synced() -> Self {
        Self {
            enabled: true,
            failure: None,
        }
    }

    /// Mirroring is active but the push failed.
    pub fn failed(err: LockinError) -> Self {
        Self {
            enabled: true,
            failure: Some(err),
        }
    }

    /// True unless an enabled mirror reported a failure.
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }
}

/// A mutation's primary result together with its mirror outcome.
///
/// The sync outcome is available even when the mutation itself failed.
#[derive(Debug)]
#[must_use]
pub struct MutationResult<T> {
    pub sync: SyncResult,
    pub result: Result<T, LockinError>,
}

impl<T> MutationResult<T> {
    pub fn new(sync: SyncResult, result: Result<T, LockinError>) -> Self {
        Self { sync, result }
    }

    /// Drop the sync outcome and keep only the primary result.
    pub fn into_result(self) -> Result<T, LockinError> {
        self.result
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Mirror state reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MirrorStatus {
    /// Mirroring is switched on in configuration.
    pub configured: bool,
    /// A remote connection is currently held.
    pub active: bool,
}
