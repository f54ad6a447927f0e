// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted credential vault for LockIn.
//!
//! A master key is derived from the master password (PBKDF2-HMAC-SHA256 or
//! Argon2id) and held masked in memory while the vault is unlocked. The
//! username and password of every entry are sealed independently with
//! AES-256-GCM; names, URLs and notes stay in plaintext so they can be
//! listed and searched without the key.

pub mod cipher;
pub mod import;
pub mod kdf;
pub mod keys;
pub mod prompt;
pub mod vault;

pub use import::{ImportReport, read_csv, read_csv_path};
pub use kdf::KdfParams;
pub use keys::KeyManager;
pub use prompt::{get_master_password, get_master_password_with_confirm};
pub use vault::VaultController;
