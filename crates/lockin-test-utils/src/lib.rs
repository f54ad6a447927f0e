// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for LockIn integration tests.
//!
//! Provides a mock mirror share and a harness that assembles a vault over a
//! temporary database, so tests run without a file server.
//!
//! # Components
//!
//! - [`MockShare`] - In-memory share with recorded pushes and failure injection
//! - [`TestVault`] - Vault over a temp SQLite file, optionally mirrored to a `MockShare`

pub mod harness;
pub mod mock_share;

pub use harness::{TestVault, TestVaultBuilder};
pub use mock_share::MockShare;
