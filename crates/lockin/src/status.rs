// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockin status` command implementation.
//!
//! Reports where the vault lives, whether it holds entries, and how the
//! mirror is configured. Never asks for the master password.

use std::io::IsTerminal;

use lockin_config::LockinConfig;
use lockin_core::LockinError;
use lockin_vault::VaultController;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub database_path: String,
    pub has_entries: bool,
    pub kdf: String,
    pub mirror: MirrorReport,
}

#[derive(Debug, Serialize)]
pub struct MirrorReport {
    pub enabled: bool,
    pub target: Option<String>,
    pub mount_path: Option<String>,
    pub mount_present: bool,
}

impl StatusResponse {
    fn new(config: &LockinConfig, has_entries: bool) -> Self {
        let mirror = &config.mirror;
        let mount = mirror.enabled().then(|| mirror.resolved_mount_path());
        Self {
            database_path: config.storage.resolved_path().display().to_string(),
            has_entries,
            kdf: match config.vault.kdf {
                lockin_config::KdfAlgorithm::Pbkdf2Sha256 => "pbkdf2-sha256".to_string(),
                lockin_config::KdfAlgorithm::Argon2id => "argon2id".to_string(),
            },
            mirror: MirrorReport {
                enabled: mirror.enabled(),
                target: mirror.enabled().then(|| mirror.target()),
                mount_present: mount.as_ref().is_some_and(|p| p.is_dir()),
                mount_path: mount.map(|p| p.display().to_string()),
            },
        }
    }
}

/// Run the `lockin status` command.
///
/// With `--json`, outputs structured JSON for scripting. With `--plain` or
/// when stdout is not a TTY, disables colors.
pub async fn run_status(
    vault: &VaultController,
    config: &LockinConfig,
    json: bool,
    plain: bool,
) -> Result<(), LockinError> {
    let status = StatusResponse::new(config, vault.exists().await?);

    if json {
        let text = serde_json::to_string_pretty(&status)
            .map_err(|e| LockinError::Internal(format!("failed to encode status: {e}")))?;
        println!("{text}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  lockin status");
    println!("  {}", "-".repeat(35));
    println!("    Database: {}", status.database_path);
    println!(
        "    Entries:  {}",
        if status.has_entries { "yes" } else { "none (new vault)" }
    );
    println!("    KDF:      {} (new vaults)", status.kdf);

    let Some(target) = &status.mirror.target else {
        println!("    Mirror:   disabled");
        println!();
        return;
    };
    let mount = status.mirror.mount_path.as_deref().unwrap_or("");
    if use_color {
        use colored::Colorize;
        if status.mirror.mount_present {
            println!("    Mirror:   {} {target} at {mount}", "✓".green());
        } else {
            println!(
                "    Mirror:   {} {target} ({})",
                "✗".red(),
                format!("{mount} is not mounted").red()
            );
        }
    } else if status.mirror.mount_present {
        println!("    Mirror:   [OK] {target} at {mount}");
    } else {
        println!("    Mirror:   [FAIL] {target} ({mount} is not mounted)");
    }
    println!();
}
