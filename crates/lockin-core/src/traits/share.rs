// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote file share seam used by the mirror.

use async_trait::async_trait;

use crate::error::LockinError;

/// Opens connections to the mirror target.
///
/// A connector is built once from configuration; each successful
/// [`connect`](ShareConnector::connect) yields an independent handle.
#[async_trait]
pub trait ShareConnector: Send + Sync + 'static {
    /// Human-readable target description for logs, e.g. `//host:445/share`.
    fn describe(&self) -> String;

    async fn connect(&self) -> Result<Box<dyn RemoteShare>, LockinError>;
}

/// An open connection to a remote share.
#[async_trait]
pub trait RemoteShare: Send + Sync {
    /// Create or truncate `name` on the share and write `contents` to it.
    ///
    /// Returns the number of bytes written.
    async fn put(&self, name: &str, contents: &[u8]) -> Result<u64, LockinError>;

    /// Release the connection. Must tolerate repeated calls.
    async fn close(&mut self);
}
