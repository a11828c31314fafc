//! Target files: pattern expansion and in-place version updates.
//!
//! JSON manifests are rewritten through `serde_json` with key order,
//! indentation and trailing newline preserved. Any other file is treated
//! as text and has standalone occurrences of the old version replaced.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::manifest;
use crate::operation::{Operation, ProgressEvent, StateUpdate};

/// Path components that are never bump targets.
const IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "bower_components",
    "__tests__",
    "fixtures",
    "fixture",
];

/// Errors from reading, matching or writing target files.
#[derive(Error, Debug)]
pub enum FileError {
    /// A file pattern is not a valid glob.
    #[error("invalid file pattern {pattern:?}: {source}")]
    Pattern {
        /// The rejected pattern.
        pattern: String,
        /// Glob diagnostic.
        source: glob::PatternError,
    },

    /// A target file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A target file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An updated manifest could not be serialized.
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        /// The file.
        path: Utf8PathBuf,
        /// Serializer diagnostic.
        source: serde_json::Error,
    },
}

/// Result alias for file operations.
pub type FileResult<T> = Result<T, FileError>;

/// What happened to one target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file now carries the new version.
    Updated,
    /// Nothing to change (unparseable, not a manifest, or already current).
    Skipped,
}

// ──────────────────────────────────────────────
// Pattern expansion
// ──────────────────────────────────────────────

/// Expand glob patterns relative to `cwd` into existing files.
///
/// Returned paths are relative to `cwd`, deduplicated, and keep pattern
/// order (matches of a single pattern come back sorted). Anything under an
/// ignored directory such as `node_modules` is dropped.
#[instrument(skip(patterns), fields(%cwd, count = patterns.len()))]
pub fn expand_patterns(cwd: &Utf8Path, patterns: &[String]) -> FileResult<Vec<Utf8PathBuf>> {
    let root = glob::Pattern::escape(cwd.as_str());
    let mut found: Vec<Utf8PathBuf> = Vec::new();

    for pattern in patterns {
        let full = format!("{root}/{}", pattern.trim_start_matches("./"));
        let entries = glob::glob(&full).map_err(|source| FileError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    debug!(error = %e, "skipping unreadable glob entry");
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Ok(path) = Utf8PathBuf::try_from(path) else {
                warn!("skipping non-UTF-8 path");
                continue;
            };
            let relative = path
                .strip_prefix(cwd)
                .map_or_else(|_| path.clone(), Utf8Path::to_path_buf);
            if is_ignored(&relative) || found.contains(&relative) {
                continue;
            }
            found.push(relative);
        }
    }

    debug!(files = found.len(), "expanded file patterns");
    Ok(found)
}

fn is_ignored(path: &Utf8Path) -> bool {
    path.components()
        .any(|component| IGNORED_DIRS.contains(&component.as_str()))
}

// ──────────────────────────────────────────────
// Updating
// ──────────────────────────────────────────────

/// Update every target file of the operation, emitting a progress event
/// per file.
#[instrument(skip_all)]
pub fn update_files(operation: &mut Operation<'_>) -> FileResult<()> {
    let cwd = operation.options().cwd.clone();
    let files = operation.options().files.clone();
    let old = operation.state().old_version.clone();
    let new = operation.state().new_version.clone();

    for file in files {
        match update_file(&cwd, &file, &old, &new)? {
            FileOutcome::Updated => {
                let mut updated = operation.state().updated_files.clone();
                updated.push(file.to_string());
                operation.update(
                    StateUpdate {
                        updated_files: Some(updated),
                        ..StateUpdate::default()
                    },
                    Some(ProgressEvent::FileUpdated),
                );
            }
            FileOutcome::Skipped => {
                let mut skipped = operation.state().skipped_files.clone();
                skipped.push(file.to_string());
                operation.update(
                    StateUpdate {
                        skipped_files: Some(skipped),
                        ..StateUpdate::default()
                    },
                    Some(ProgressEvent::FileSkipped),
                );
            }
        }
    }
    Ok(())
}

/// Update a single file (relative to `cwd`) from `old` to `new`.
#[instrument(skip(cwd, file), fields(%file))]
pub fn update_file(cwd: &Utf8Path, file: &Utf8Path, old: &str, new: &str) -> FileResult<FileOutcome> {
    let path = cwd.join(file);
    let original = fs::read_to_string(&path).map_err(|source| FileError::Read {
        path: path.clone(),
        source,
    })?;

    let updated = if file.extension() == Some("json") {
        update_json(&path, &original, new)?
    } else {
        replace_version(&original, old, new)
    };

    let Some(contents) = updated else {
        debug!("no change needed");
        return Ok(FileOutcome::Skipped);
    };

    fs::write(&path, contents).map_err(|source| FileError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(%new, "file updated");
    Ok(FileOutcome::Updated)
}

fn update_json(path: &Utf8Path, original: &str, new: &str) -> FileResult<Option<String>> {
    let mut value: Value = match serde_json::from_str(original) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "not valid JSON, skipping");
            return Ok(None);
        }
    };
    if !manifest::is_manifest(&value) || !manifest::set_version(&mut value, new) {
        return Ok(None);
    }
    render_json(&value, original)
        .map(Some)
        .map_err(|source| FileError::Serialize {
            path: path.to_path_buf(),
            source,
        })
}

/// Serialize `value` in the layout of `original`.
fn render_json(value: &Value, original: &str) -> Result<String, serde_json::Error> {
    let indent = detect_indent(original);
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut ser)?;

    let mut out = String::from_utf8_lossy(&buf).into_owned();
    if original.ends_with('\n') {
        out.push('\n');
    }
    if original.contains("\r\n") {
        out = out.replace('\n', "\r\n");
    }
    Ok(out)
}

/// The indentation unit of a JSON document; two spaces when none is found.
fn detect_indent(text: &str) -> &str {
    text.lines()
        .skip(1)
        .map(|line| {
            let end = line
                .find(|c: char| c != ' ' && c != '\t')
                .unwrap_or(line.len());
            &line[..end]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or("  ")
}

/// Replace standalone occurrences of `old` with `new`.
///
/// An occurrence is standalone when it is not part of a longer version:
/// `1.2.3` matches in `v1.2.3` and `"1.2.3"` but not in `11.2.3`,
/// `1.2.3.4` or `1.2.3-beta`. Returns `None` when nothing matched.
pub fn replace_version(text: &str, old: &str, new: &str) -> Option<String> {
    if old.is_empty() || old == new {
        return None;
    }
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (idx, _) in text.match_indices(old) {
        let end = idx + old.len();
        if bounded_before(&text[..idx]) && bounded_after(&text[end..]) {
            out.push_str(&text[last..idx]);
            out.push_str(new);
            last = end;
        }
    }
    if last == 0 {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

fn bounded_before(head: &str) -> bool {
    head.chars()
        .next_back()
        .is_none_or(|c| !(c.is_ascii_digit() || c == '.'))
}

fn bounded_after(tail: &str) -> bool {
    let mut chars = tail.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_alphanumeric() || c == '+' => false,
        Some('.' | '-') => !chars.next().is_some_and(|c| c.is_ascii_alphanumeric()),
        Some(_) => true,
    }
}
