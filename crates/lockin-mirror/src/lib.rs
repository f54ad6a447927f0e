// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote mirroring for the LockIn vault.
//!
//! After every successful change the whole database file is copied to a
//! network share, overwriting the previous copy. There is no diffing,
//! versioning, or conflict detection: the mirror is a cold backup.

pub mod mounted;
pub mod sync;

pub use mounted::{MountedShare, MountedShareConnector};
pub use sync::MirrorSync;
