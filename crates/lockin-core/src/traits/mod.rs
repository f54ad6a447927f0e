// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the vault's I/O seams.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility.

pub mod share;
pub mod store;

pub use share::{RemoteShare, ShareConnector};
pub use store::CredentialStore;
