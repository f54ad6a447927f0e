// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./lockin.toml` > `~/.lockin/lockin.toml` >
//! `~/.config/lockin/lockin.toml` > `/etc/lockin/lockin.toml`, with
//! environment variable overrides via the `LOCKIN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::{LockinConfig, lockin_home};

/// Config sections reachable from `LOCKIN_*` variables.
///
/// Anything else under the prefix (e.g. `LOCKIN_MASTER_PASSWORD`) is not
/// configuration and must not reach `deny_unknown_fields`.
const ENV_SECTIONS: &[&str] = &["storage_", "vault_", "mirror_", "log_"];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lockin/lockin.toml` (system-wide)
/// 3. `~/.config/lockin/lockin.toml` (user XDG config)
/// 4. `~/.lockin/lockin.toml` (next to the vault)
/// 5. `./lockin.toml` (local directory)
/// 6. `LOCKIN_*` environment variables
pub fn load_config() -> Result<LockinConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit config file specification.
pub fn load_config_from_str(toml_content: &str) -> Result<LockinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockinConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LockinConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockinConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(LockinConfig::default()));
    for path in search_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Candidate config files, lowest precedence first.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/lockin/lockin.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("lockin/lockin.toml"));
    }
    paths.push(lockin_home().join("lockin.toml"));
    paths.push(PathBuf::from("lockin.toml"));
    paths
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that
/// `LOCKIN_MIRROR_REMOTE_FILE_NAME` maps to `mirror.remote_file_name`,
/// not `mirror.remote.file.name`.
fn env_provider() -> Env {
    Env::prefixed("LOCKIN_")
        .filter(|key| is_config_key(key.as_str()))
        .map(|key| map_env_key(key.as_str()).into())
}

fn is_config_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS.iter().any(|section| key.starts_with(section))
}

/// Map a prefix-stripped env var name to its dotted config path.
///
/// `MIRROR_REMOTE_FILE_NAME` becomes `mirror.remote_file_name`.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    ENV_SECTIONS
        .iter()
        .find(|section| key.starts_with(**section))
        .map(|section| key.replacen(section, &section.replace('_', "."), 1))
        .unwrap_or(key)
}
