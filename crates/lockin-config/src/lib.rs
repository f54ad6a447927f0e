// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the LockIn credential vault.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! file hierarchy lookup, `LOCKIN_*` environment variable overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use lockin_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Vault at: {}", config.storage.resolved_path().display());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

use lockin_core::LockinError;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{KdfAlgorithm, LockinConfig, LogConfig, MirrorConfig, StorageConfig, VaultConfig};

/// Load configuration from the file hierarchy and validate it.
///
/// On a Figment error the TOML sources are re-read so diagnostics can point
/// at the offending key.
pub fn load_and_validate() -> Result<LockinConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<LockinConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from an explicit file (the `--config` flag) and validate it.
///
/// Unlike the hierarchy lookup, a missing file is an error here.
pub fn load_and_validate_path(path: &Path) -> Result<LockinConfig, Vec<ConfigError>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        vec![ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        }]
    })?;

    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let name = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            let sources = vec![(name.display().to_string(), content)];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collapse diagnostics into a single [`LockinError::Config`] for library callers.
pub fn into_lockin_error(errors: &[ConfigError]) -> LockinError {
    let joined = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    LockinError::Config(joined)
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::search_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            // figment records files by absolute path
            let display = std::path::absolute(&path)
                .unwrap_or(path)
                .display()
                .to_string();
            Some((display, content))
        })
        .collect()
}
