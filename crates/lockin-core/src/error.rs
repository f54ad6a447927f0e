// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the LockIn credential vault.

use thiserror::Error;

/// The error type shared by every vault component.
#[derive(Debug, Error)]
pub enum LockinError {
    /// An operation needed the master key but none is held.
    #[error("vault is locked")]
    VaultLocked,

    /// A credential with the same name (compared case-insensitively) exists.
    #[error("entry with name `{name}` already exists")]
    DuplicateEntry { name: String },

    /// The referenced id or name has no matching credential.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// A stored field failed its authenticity check or was malformed.
    ///
    /// There is no separate password check, so this is how a wrong master
    /// password shows up.
    #[error("incorrect master password or corrupted data")]
    DecryptionFailure,

    /// Required credential fields are missing or empty.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// Underlying storage I/O or SQL failure.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Mirror push or connection failed. Never fatal to a local mutation.
    #[error("sync failed: {message}")]
    SyncFailure {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Key derivation or randomness failure.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LockinError {
    /// Wrap any error as a persistence failure.
    pub fn persistence<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LockinError::Persistence {
            source: Box::new(err),
        }
    }

    /// Build a sync failure from a message and its cause.
    pub fn sync<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LockinError::SyncFailure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the error indicates the vault must be unlocked first.
    pub fn is_locked(&self) -> bool {
        matches!(self, LockinError::VaultLocked)
    }
}
