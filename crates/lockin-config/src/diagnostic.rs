// SPDX-FileCopyrightText: 2026 LockIn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config error reporting.
//!
//! Figment failures and validation findings become miette diagnostics that
//! point at the offending line of `lockin.toml` and say what the section
//! expects. Misspelled sections, keys and KDF names get a "did you mean"
//! suggestion.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::ops::Range;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Top-level sections of `lockin.toml` and what each one controls.
pub const SECTIONS: &[(&str, &str)] = &[
    ("storage", "where the vault database lives"),
    ("vault", "how the master key is derived for new vaults"),
    ("mirror", "copying the vault to a network share after every change"),
    ("log", "log verbosity"),
];

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown section `[{section}]`")]
    #[diagnostic(
        code(lockin::config::unknown_section),
        help("{}", section_list_help(suggestion.as_deref()))
    )]
    UnknownSection {
        section: String,
        suggestion: Option<String>,
        #[label("not a LockIn section")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("unknown key `{key}` in [{section}]")]
    #[diagnostic(
        code(lockin::config::unknown_key),
        help("{}", unknown_key_help(section, suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        section: String,
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted in `section`.
        valid_keys: String,
        #[label("not recognized here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value of the wrong type, or a KDF name LockIn does not know.
    #[error("invalid value for `{key}`: found {found}, expected {expected}")]
    #[diagnostic(code(lockin::config::invalid_value), help("{}", value_help(key, suggestion.as_deref())))]
    InvalidValue {
        key: String,
        found: String,
        expected: String,
        suggestion: Option<String>,
        #[label("this value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A well-typed value that breaks a rule, e.g. a KDF cost below its floor.
    #[error("`{key}`: {message}")]
    #[diagnostic(code(lockin::config::validation), help("{}", validation_hint(key)))]
    Validation { key: String, message: String },

    #[error("cannot read {path}: {reason}")]
    #[diagnostic(
        code(lockin::config::unreadable),
        help("check the path given to --config")
    )]
    Unreadable { path: String, reason: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(lockin::config::other))]
    Other(String),
}

fn section_list_help(suggestion: Option<&str>) -> String {
    let sections = SECTIONS
        .iter()
        .map(|(name, purpose)| format!("[{name}] {purpose}"))
        .collect::<Vec<_>>()
        .join("; ");
    match suggestion {
        Some(s) => format!("did you mean `[{s}]`? Sections: {sections}"),
        None => format!("sections: {sections}"),
    }
}

fn unknown_key_help(section: &str, suggestion: Option<&str>, valid_keys: &str) -> String {
    let purpose = SECTIONS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, purpose)| format!("[{section}] configures {purpose}. "))
        .unwrap_or_default();
    match suggestion {
        Some(s) => format!("did you mean `{s}`? {purpose}Keys: {valid_keys}"),
        None => format!("{purpose}Keys: {valid_keys}"),
    }
}

fn value_help(key: &str, suggestion: Option<&str>) -> String {
    let hint = validation_hint(key);
    match suggestion {
        Some(s) => format!("did you mean \"{s}\"? {hint}"),
        None => hint.to_string(),
    }
}

/// Per-key guidance shown under validation and value errors.
pub fn validation_hint(key: &str) -> &'static str {
    match key {
        "storage.database_path" => "a leading `~/` expands to your home directory",
        "vault.kdf" => "\"pbkdf2-sha256\" (default) or \"argon2id\"; existing vaults keep the KDF they were created with",
        "vault.pbkdf2_iterations" => {
            "PBKDF2 cost for new vaults; the default is 100000 and existing vaults keep their recorded count"
        }
        "vault.argon2_memory_cost" => "Argon2id memory in KiB: 65536 is 64 MiB, the floor is 32768",
        "vault.argon2_iterations" | "vault.argon2_parallelism" => {
            "Argon2id costs only apply when vault.kdf = \"argon2id\""
        }
        "mirror.remote_file_name" => "a file name such as \"credentials.db\", written at the root of the share",
        "mirror.connect_timeout_secs" => "seconds to wait for the file server; 5 by default",
        "log.level" => "one of trace, debug, info, warn, error, off; RUST_LOG overrides it",
        key if key.starts_with("mirror.") => {
            "fill it in under [mirror], or set `enabled = false` to turn mirroring off"
        }
        _ => "see the [storage], [vault], [mirror] and [log] sections of lockin.toml",
    }
}

/// Convert a `figment::Error` into one diagnostic per underlying failure.
///
/// `toml_sources` pairs each loaded file's path with its content so spans
/// can point into it. When only one source was loaded it is used for every
/// error, including those figment reports without a file path.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let source = source_for(&error, toml_sources);
            let path: Vec<&str> = error.path.iter().map(String::as_str).collect();
            match &error.kind {
                Kind::UnknownField(field, expected) if path.is_empty() => {
                    let sections: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();
                    let (span, src) = spanned(source, |text| locate_section(text, field));
                    ConfigError::UnknownSection {
                        section: field.clone(),
                        suggestion: suggest(field, expected).or_else(|| suggest(field, &sections)),
                        span,
                        src,
                    }
                }
                Kind::UnknownField(field, expected) => {
                    let section = path[0];
                    let (span, src) = spanned(source, |text| locate_key(text, section, field));
                    ConfigError::UnknownKey {
                        section: section.to_string(),
                        key: field.clone(),
                        suggestion: suggest(field, expected),
                        valid_keys: expected.join(", "),
                        span,
                        src,
                    }
                }
                Kind::UnknownVariant(found, expected) => {
                    invalid_value(&path, source, format!("\"{found}\""), variants(expected), suggest(found, expected))
                }
                Kind::InvalidType(actual, expected) | Kind::InvalidValue(actual, expected) => {
                    invalid_value(&path, source, actual.to_string(), expected.clone(), None)
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn invalid_value(
    path: &[&str],
    source: Option<(&str, &str)>,
    found: String,
    expected: String,
    suggestion: Option<String>,
) -> ConfigError {
    let (span, src) = match path {
        [section, key] => spanned(source, |text| locate_value(text, section, key)),
        _ => (None, None),
    };
    ConfigError::InvalidValue {
        key: path.join("."),
        found,
        expected,
        suggestion,
        span,
        src,
    }
}

fn variants(expected: &[&str]) -> String {
    expected
        .iter()
        .map(|v| format!("\"{v}\""))
        .collect::<Vec<_>>()
        .join(" or ")
}

/// The `(name, content)` the error was read from, if known.
fn source_for<'a>(
    error: &figment::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|s| s.file_path())
        .map(|p| p.display().to_string());

    let by_name = file.and_then(|file| toml_sources.iter().find(|(name, _)| *name == file));
    let found = match by_name {
        Some(found) => Some(found),
        None if toml_sources.len() == 1 => toml_sources.first(),
        None => None,
    };
    found.map(|(name, content)| (name.as_str(), content.as_str()))
}

fn spanned(
    source: Option<(&str, &str)>,
    locate: impl FnOnce(&str) -> Option<Range<usize>>,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some((name, content)) = source else {
        return (None, None);
    };
    match locate(content) {
        Some(range) => (
            Some(SourceSpan::from(range)),
            Some(NamedSource::new(name, content.to_string())),
        ),
        None => (None, None),
    }
}

/// One logical line of TOML: its byte offset and the text without a comment.
fn lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    content.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let text = raw.split('#').next().unwrap_or("").trim_end();
        (start, text)
    })
}

/// `name` of a `[name]` or `[name.sub]` header line.
fn header(text: &str) -> Option<&str> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    Some(inner.split('.').next().unwrap_or(inner).trim())
}

/// Byte range of `section`'s name in its `[section]` header.
pub fn locate_section(content: &str, section: &str) -> Option<Range<usize>> {
    lines(content).find_map(|(start, text)| {
        (header(text) == Some(section)).then(|| {
            let at = start + text.find(section).unwrap_or(0);
            at..at + section.len()
        })
    })
}

/// Byte range of `key` as written inside `[section]`, or as a dotted
/// `section.key` before any header.
pub fn locate_key(content: &str, section: &str, key: &str) -> Option<Range<usize>> {
    let dotted = format!("{section}.{key}");
    let mut current: Option<&str> = None;
    for (start, text) in lines(content) {
        if let Some(name) = header(text) {
            current = Some(name);
            continue;
        }
        let Some((lhs, _)) = text.split_once('=') else {
            continue;
        };
        let written = lhs.trim();
        let hit = match current {
            Some(name) => name == section && written == key,
            None => written == dotted,
        };
        if hit {
            let at = start + text.find(written).unwrap_or(0);
            return Some(at..at + written.len());
        }
    }
    None
}

/// Byte range of the value assigned to `section.key`.
pub fn locate_value(content: &str, section: &str, key: &str) -> Option<Range<usize>> {
    let key_range = locate_key(content, section, key)?;
    let line_end = content[key_range.end..]
        .find('\n')
        .map_or(content.len(), |i| key_range.end + i);
    let rest = &content[key_range.end..line_end];
    let eq = rest.find('=')?;
    let value = rest[eq + 1..].split('#').next().unwrap_or("");
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let at = key_range.end + eq + 1 + value.find(trimmed).unwrap_or(0);
    Some(at..at + trimmed.len())
}

/// Closest candidate to `unknown` by Jaro-Winkler similarity, if any is close.
pub fn suggest(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(unknown, c), *c))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
