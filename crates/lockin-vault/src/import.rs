// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bulk import of credentials from CSV.
//!
//! The file needs a header row with `name`, `username` and `password`
//! columns; `url` and `notes` are optional. Column order is free.

use std::io::Read;
use std::path::Path;

use lockin_core::{LockinError, NewEntry};

/// Per-entry outcome of an import.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Names that were stored.
    pub added: Vec<String>,
    /// Names that were rejected, with the reason.
    pub failed: Vec<(String, LockinError)>,
}

impl ImportReport {
    pub fn added_count(&self) -> usize {
        self.added.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Parse CSV rows into entries. A malformed row aborts the whole parse.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<NewEntry>, LockinError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    rdr.deserialize::<NewEntry>()
        .map(|row| row.map_err(map_csv_err))
        .collect()
}

/// Parse the CSV file at `path`.
pub fn read_csv_path(path: &Path) -> Result<Vec<NewEntry>, LockinError> {
    let file = std::fs::File::open(path).map_err(LockinError::persistence)?;
    read_csv(file)
}

fn map_csv_err(e: csv::Error) -> LockinError {
    if e.is_io_error() {
        return LockinError::persistence(e);
    }
    let line = e
        .position()
        .map(|p| format!("line {}: ", p.line()))
        .unwrap_or_default();
    LockinError::InvalidEntry(format!("{line}{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_and_optional_columns() {
        let data = "name,username,password,url,notes\n\
                    GitHub,octocat,hunter2,https://github.com,\n\
                    Bank,me,pin,,second account\n";
        let entries = read_csv(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "GitHub");
        assert_eq!(entries[0].url.as_deref(), Some("https://github.com"));
        assert_eq!(entries[0].notes, None);
        assert_eq!(entries[1].url, None);
        assert_eq!(entries[1].notes.as_deref(), Some("second account"));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let data = "password,name,username\nsecret,Mail,me\n";
        let entries = read_csv(data.as_bytes()).unwrap();
        assert_eq!(entries[0], NewEntry::new("Mail", "me", "secret"));
    }

    #[test]
    fn missing_required_column_is_invalid() {
        let data = "name,username\nMail,me\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LockinError::InvalidEntry(msg) if msg.contains("password")));
    }

    #[test]
    fn header_only_yields_nothing() {
        assert!(read_csv("name,username,password\n".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv_path(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LockinError::Persistence { .. }));
    }
}
