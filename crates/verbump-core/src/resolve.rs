//! Current-version resolution.
//!
//! The old version comes from the caller when given, otherwise from the
//! first JSON manifest among the target files that carries a valid one.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use semver::Version;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::manifest::{self, DEFAULT_MANIFESTS};
use crate::version::{VersionError, parse_version};

/// Source label for a caller-supplied current version.
pub const USER_SOURCE: &str = "user";

/// Errors from resolving the current version.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No candidate file yields a version.
    #[error("Unable to determine the current version number. Checked {}.", .checked.join(", "))]
    NoVersionFound {
        /// Files that were consulted.
        checked: Vec<String>,
    },

    /// The single candidate file exists but cannot be used.
    #[error("unable to read the current version from {path}: {reason}")]
    Unreadable {
        /// The file.
        path: Utf8PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// The caller-supplied current version is not valid.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Result alias for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// The resolved current version and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OldVersion {
    /// The version.
    pub version: Version,
    /// A file path relative to the working directory, or [`USER_SOURCE`].
    pub source: String,
}

/// Files consulted for the current version: the JSON files among
/// `files`, or the default manifests when there are none.
pub fn candidate_files(files: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    let json: Vec<Utf8PathBuf> = files
        .iter()
        .filter(|f| f.extension() == Some("json"))
        .cloned()
        .collect();
    if json.is_empty() {
        DEFAULT_MANIFESTS.iter().map(|m| Utf8PathBuf::from(*m)).collect()
    } else {
        json
    }
}

/// Resolve the current version.
///
/// `current_version` wins when given. Otherwise candidates are tried in
/// order and the first manifest with a valid version is used. Files that
/// cannot be parsed are skipped, except when there is exactly one
/// candidate: its parse failure is reported instead of the generic "no
/// version found".
#[instrument(skip(files))]
pub fn resolve_old_version(
    cwd: &Utf8Path,
    files: &[Utf8PathBuf],
    current_version: Option<&str>,
) -> ResolveResult<OldVersion> {
    if let Some(given) = current_version {
        let version = parse_version(given)?;
        debug!(%version, "using caller-supplied version");
        return Ok(OldVersion {
            version,
            source: USER_SOURCE.to_string(),
        });
    }

    let candidates = candidate_files(files);
    let lone = candidates.len() == 1;

    for file in &candidates {
        let path = cwd.join(file);
        if !path.is_file() {
            debug!(%file, "candidate missing");
            continue;
        }
        match read_version(&path) {
            Ok(Some(version)) => {
                debug!(%file, %version, "found current version");
                return Ok(OldVersion {
                    version,
                    source: file.to_string(),
                });
            }
            Ok(None) => debug!(%file, "no usable version"),
            Err(reason) if lone => {
                return Err(ResolveError::Unreadable {
                    path: file.clone(),
                    reason,
                });
            }
            Err(reason) => warn!(%file, %reason, "skipping unparseable version candidate"),
        }
    }

    Err(ResolveError::NoVersionFound {
        checked: candidates.iter().map(ToString::to_string).collect(),
    })
}

/// `Err` when the file cannot be read or parsed as a manifest, `Ok(None)`
/// when it parses but has no valid version.
fn read_version(path: &Utf8Path) -> Result<Option<Version>, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: Value = serde_json::from_str(&text).map_err(|e| format!("invalid JSON: {e}"))?;
    if !manifest::is_manifest(&value) {
        return Err("not a package manifest".to_string());
    }
    Ok(manifest::version_of(&value).and_then(|raw| match parse_version(raw) {
        Ok(version) => Some(version),
        Err(e) => {
            warn!(error = %e, "ignoring invalid version");
            None
        }
    }))
}
