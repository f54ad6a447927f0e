// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential subcommands: add, get, list, search, edit, rm, import.

use std::io::IsTerminal;
use std::path::Path;

use lockin_core::{Entry, LockinError, NewEntry, SyncResult};
use lockin_vault::VaultController;

use crate::{AddArgs, EditArgs};

const MASK: &str = "********";

/// Prompt for the master password and unlock.
///
/// An empty vault asks twice, since nothing else would catch a typo in the
/// password that is about to key it.
pub async fn unlock(vault: &mut VaultController) -> Result<(), LockinError> {
    let password = if vault.exists().await? {
        lockin_vault::get_master_password()?
    } else {
        lockin_vault::get_master_password_with_confirm()?
    };
    vault.unlock(&password).await
}

pub async fn add(vault: &VaultController, args: AddArgs) -> Result<(), LockinError> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_entry_password()?,
    };
    let entry = NewEntry {
        name: args.name,
        username: args.username,
        password,
        url: non_empty(args.url),
        notes: non_empty(args.notes),
    };
    let name = entry.name.trim().to_string();

    let outcome = vault.create(entry).await;
    report_sync(&outcome.sync);
    let id = outcome.into_result()?;
    println!("added {name} (id {id})");
    Ok(())
}

pub async fn get(
    vault: &VaultController,
    name: &str,
    show: bool,
    json: bool,
) -> Result<(), LockinError> {
    let entry = vault.get_by_name(name).await?;
    if json {
        print_json(&entry_json(&entry, show))?;
    } else {
        print_entry(&entry, show);
    }
    Ok(())
}

pub async fn list(vault: &VaultController, json: bool) -> Result<(), LockinError> {
    let entries = vault.list().await?;
    print_entries(&entries, json)
}

pub async fn search(vault: &VaultController, query: &str, json: bool) -> Result<(), LockinError> {
    let entries = vault.search(query).await?;
    print_entries(&entries, json)
}

pub async fn edit(vault: &VaultController, args: EditArgs) -> Result<(), LockinError> {
    let mut entry = vault.get_by_name(&args.name).await?;
    let password = if args.prompt_password {
        Some(prompt_entry_password()?)
    } else {
        args.password.clone()
    };
    if !apply_edit(&mut entry, &args, password) {
        return Err(LockinError::InvalidEntry("nothing to change".to_string()));
    }

    let outcome = vault.update(&entry).await;
    report_sync(&outcome.sync);
    outcome.into_result()?;
    println!("updated {}", entry.name.trim());
    Ok(())
}

/// Delete by name. Asks first when attached to a terminal, unless `yes`.
pub async fn remove(vault: &VaultController, name: &str, yes: bool) -> Result<(), LockinError> {
    let entry = vault.get_by_name(name).await?;
    if !yes && std::io::stdin().is_terminal() && !confirm(&format!("Delete {}?", entry.name))? {
        println!("kept {}", entry.name);
        return Ok(());
    }
    let outcome = vault.delete(entry.id).await;
    report_sync(&outcome.sync);
    outcome.into_result()?;
    println!("removed {}", entry.name);
    Ok(())
}

pub async fn import(vault: &VaultController, csv: &Path) -> Result<(), LockinError> {
    let entries = lockin_vault::read_csv_path(csv)?;
    let outcome = vault.import(entries).await;
    report_sync(&outcome.sync);
    let report = outcome.into_result()?;

    for (name, err) in &report.failed {
        eprintln!("  failed {name}: {err}");
    }
    println!(
        "imported {} of {} entries ({} failed)",
        report.added_count(),
        report.added_count() + report.failed_count(),
        report.failed_count()
    );
    Ok(())
}

/// Apply the edit flags to `entry`. Returns false when no flag was given.
fn apply_edit(entry: &mut Entry, args: &EditArgs, password: Option<String>) -> bool {
    let mut changed = false;
    if let Some(name) = &args.rename {
        entry.name = name.clone();
        changed = true;
    }
    if let Some(username) = &args.username {
        entry.username = username.clone();
        changed = true;
    }
    if let Some(password) = password {
        entry.password = password;
        changed = true;
    }
    if let Some(url) = &args.url {
        entry.url = non_empty(Some(url.clone()));
        changed = true;
    }
    if let Some(notes) = &args.notes {
        entry.notes = non_empty(Some(notes.clone()));
        changed = true;
    }
    changed
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn confirm(question: &str) -> Result<bool, LockinError> {
    use std::io::Write;

    print!("{question} [y/N] ");
    std::io::stdout()
        .flush()
        .map_err(|e| LockinError::Internal(format!("failed to write prompt: {e}")))?;
    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|e| LockinError::Internal(format!("failed to read answer: {e}")))?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn prompt_entry_password() -> Result<String, LockinError> {
    if !std::io::stdin().is_terminal() {
        return Err(LockinError::InvalidEntry(
            "no password given; pass --password or set LOCKIN_ENTRY_PASSWORD".to_string(),
        ));
    }
    rpassword::prompt_password("Entry password: ")
        .map_err(|e| LockinError::Internal(format!("failed to read password: {e}")))
}

/// Warn about a failed mirror push. The local change already succeeded.
fn report_sync(sync: &SyncResult) {
    if let Some(err) = &sync.failure {
        eprintln!("warning: {err}; the local vault is up to date");
    }
}

fn entry_json(entry: &Entry, show: bool) -> serde_json::Value {
    serde_json::json!({
        "id": entry.id,
        "name": entry.name,
        "username": entry.username,
        "password": if show { entry.password.as_str() } else { MASK },
        "url": entry.url,
        "notes": entry.notes,
        "created_at": entry.created_at,
        "updated_at": entry.updated_at,
    })
}

fn print_json(value: &serde_json::Value) -> Result<(), LockinError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| LockinError::Internal(format!("failed to encode JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

fn print_entry(entry: &Entry, show: bool) {
    println!("name:     {}", entry.name);
    println!("username: {}", entry.username);
    println!(
        "password: {}",
        if show { entry.password.as_str() } else { MASK }
    );
    if let Some(url) = &entry.url {
        println!("url:      {url}");
    }
    if let Some(notes) = &entry.notes {
        println!("notes:    {notes}");
    }
}

fn print_entries(entries: &[Entry], json: bool) -> Result<(), LockinError> {
    if json {
        let values: Vec<_> = entries.iter().map(|e| entry_json(e, false)).collect();
        return print_json(&serde_json::Value::Array(values));
    }
    if entries.is_empty() {
        println!("no entries");
        return Ok(());
    }
    for line in format_rows(entries) {
        println!("{line}");
    }
    Ok(())
}

/// One line per entry: name and username padded into columns, then the URL.
fn format_rows(entries: &[Entry]) -> Vec<String> {
    let name_width = entries.iter().map(|e| e.name.chars().count()).max().unwrap_or(0);
    let user_width = entries
        .iter()
        .map(|e| e.username.chars().count())
        .max()
        .unwrap_or(0);
    entries
        .iter()
        .map(|e| {
            let line = format!(
                "{:<name_width$}  {:<user_width$}  {}",
                e.name,
                e.username,
                e.url.as_deref().unwrap_or("")
            );
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, username: &str, url: Option<&str>) -> Entry {
        Entry {
            id: 1,
            name: name.into(),
            username: username.into(),
            password: "pw".into(),
            url: url.map(Into::into),
            notes: Some("old notes".into()),
            created_at: 1,
            updated_at: 1,
        }
    }

    fn edit_args() -> EditArgs {
        EditArgs {
            name: "Mail".into(),
            rename: None,
            username: None,
            password: None,
            prompt_password: false,
            url: None,
            notes: None,
        }
    }

    #[test]
    fn apply_edit_without_flags_changes_nothing() {
        let mut e = entry("Mail", "me", None);
        assert!(!apply_edit(&mut e, &edit_args(), None));
        assert_eq!(e.name, "Mail");
    }

    #[test]
    fn apply_edit_sets_and_clears_fields() {
        let mut e = entry("Mail", "me", Some("https://old"));
        let args = EditArgs {
            rename: Some("Work Mail".into()),
            url: Some(String::new()),
            ..edit_args()
        };
        assert!(apply_edit(&mut e, &args, Some("new".into())));
        assert_eq!(e.name, "Work Mail");
        assert_eq!(e.password, "new");
        assert_eq!(e.url, None);
        assert_eq!(e.notes.as_deref(), Some("old notes"));
    }

    #[test]
    fn json_masks_password_unless_shown() {
        let e = entry("Mail", "me", None);
        assert_eq!(entry_json(&e, false)["password"], MASK);
        assert_eq!(entry_json(&e, true)["password"], "pw");
    }

    #[test]
    fn rows_are_aligned() {
        let rows = format_rows(&[
            entry("A", "alice", Some("https://a")),
            entry("Longer", "bob", None),
        ]);
        assert_eq!(rows[0], "A       alice  https://a");
        assert_eq!(rows[1], "Longer  bob");
    }

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }

    #[test]
    fn blank_optional_values_become_none() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
    }
}
