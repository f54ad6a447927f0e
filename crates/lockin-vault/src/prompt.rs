// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or `LOCKIN_MASTER_PASSWORD`.

use lockin_core::LockinError;
use secrecy::SecretString;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "LOCKIN_MASTER_PASSWORD";

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `LOCKIN_MASTER_PASSWORD` (scripts and automation)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_password() -> Result<SecretString, LockinError> {
    if let Some(password) = from_env() {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return read_non_empty("Master password: ");
    }

    Err(no_password())
}

/// Like [`get_master_password`], but asks twice when prompting.
///
/// Used when the vault has no entries yet, since nothing else catches a
/// mistyped first password.
pub fn get_master_password_with_confirm() -> Result<SecretString, LockinError> {
    if let Some(password) = from_env() {
        return Ok(password);
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let first = rpassword::prompt_password("New master password: ").map_err(read_failed)?;
        let second =
            rpassword::prompt_password("Confirm master password: ").map_err(read_failed)?;
        if first != second {
            return Err(LockinError::Config("passwords do not match".to_string()));
        }
        if first.is_empty() {
            return Err(LockinError::Config("empty master password not allowed".to_string()));
        }
        return Ok(SecretString::from(first));
    }

    Err(no_password())
}

fn from_env() -> Option<SecretString> {
    std::env::var(MASTER_PASSWORD_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn read_non_empty(prompt: &str) -> Result<SecretString, LockinError> {
    let password = rpassword::prompt_password(prompt).map_err(read_failed)?;
    if password.is_empty() {
        return Err(LockinError::Config("empty master password not allowed".to_string()));
    }
    Ok(SecretString::from(password))
}

fn read_failed(e: std::io::Error) -> LockinError {
    LockinError::Config(format!("failed to read master password: {e}"))
}

fn no_password() -> LockinError {
    LockinError::Config(format!(
        "no master password provided; set {MASTER_PASSWORD_ENV_VAR} or run interactively"
    ))
}
