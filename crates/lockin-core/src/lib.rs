// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the LockIn credential vault.
//!
//! Holds the error taxonomy, the credential record types, and the traits
//! implemented by the storage and mirror crates.

pub mod error;
pub mod traits;
pub mod types;

pub use error::LockinError;
pub use traits::{CredentialStore, RemoteShare, ShareConnector};
pub use types::{
    Entry, EntryId, MirrorStatus, MutationResult, NewEntry, StoredEntry, SyncResult,
};
