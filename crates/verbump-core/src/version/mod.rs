//! Version calculation.
//!
//! Given the current version and a [`ReleaseRequest`](crate::release::ReleaseRequest),
//! work out the next version. Three paths:
//!
//! - [`explicit`] — validate and canonicalize a literal version
//! - [`increment`] — apply a release kind (the deterministic path)
//! - [`interactive`] — offer every candidate and let the user pick

pub mod explicit;
pub mod increment;
pub mod interactive;

use semver::Version;
use thiserror::Error;

use crate::prompt::PromptError;

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    /// A version string is not a valid semantic version.
    #[error("invalid version {version:?}: {source}")]
    InvalidVersion {
        /// The rejected input.
        version: String,
        /// Parser diagnostic.
        source: semver::Error,
    },

    /// The prerelease identifier cannot appear in a semantic version.
    #[error("invalid prerelease identifier {preid:?}: {source}")]
    InvalidPreid {
        /// The rejected identifier.
        preid: String,
        /// Parser diagnostic.
        source: semver::Error,
    },

    /// The user's selection produced no usable version.
    #[error("aborted")]
    Aborted,

    /// The interactive collaborator failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Parse a version string, accepting the loose forms `v1.2.3`, `=1.2.3`
/// and surrounding whitespace.
pub fn parse_version(s: &str) -> VersionResult<Version> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    let trimmed = trimmed
        .strip_prefix(['v', 'V'])
        .unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|source| VersionError::InvalidVersion {
        version: s.to_string(),
        source,
    })
}

/// Whether `s` parses as a version under [`parse_version`].
pub fn is_valid_version(s: &str) -> bool {
    parse_version(s).is_ok()
}
