//! Release kinds and release requests.
//!
//! A [`ReleaseRequest`] is what the caller asked for: a literal version,
//! an interactive prompt, or a relative bump of a given [`ReleaseKind`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prerelease identifier used when none is given.
pub const DEFAULT_PREID: &str = "beta";

/// A semantic-version increment category.
///
/// `Next` is a convenience kind: it bumps the prerelease counter when the
/// current version already has one, and the patch number otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    /// `X.0.0`
    Major,
    /// `x.Y.0`
    Minor,
    /// `x.y.Z`
    Patch,
    /// `X.0.0-<preid>.0`
    Premajor,
    /// `x.Y.0-<preid>.0`
    Preminor,
    /// `x.y.Z-<preid>.0`
    Prepatch,
    /// Bump the prerelease counter, or start a prerelease of the next patch.
    Prerelease,
    /// `prerelease` if already a prerelease, `patch` otherwise.
    Next,
}

impl ReleaseKind {
    /// Every release kind, in the order they are offered to users.
    pub const ALL: &[Self] = &[
        Self::Major,
        Self::Minor,
        Self::Patch,
        Self::Premajor,
        Self::Preminor,
        Self::Prepatch,
        Self::Prerelease,
        Self::Next,
    ];

    /// The prerelease kinds.
    pub const PRERELEASE: &[Self] = &[
        Self::Premajor,
        Self::Preminor,
        Self::Prepatch,
        Self::Prerelease,
    ];

    /// Whether this kind produces a prerelease version.
    pub const fn is_prerelease(self) -> bool {
        matches!(
            self,
            Self::Premajor | Self::Preminor | Self::Prepatch | Self::Prerelease
        )
    }

    /// Lowercase name, as accepted on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Premajor => "premajor",
            Self::Preminor => "preminor",
            Self::Prepatch => "prepatch",
            Self::Prerelease => "prerelease",
            Self::Next => "next",
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the release kind names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown release kind: {0}")]
pub struct UnknownReleaseKind(pub String);

impl FromStr for ReleaseKind {
    type Err = UnknownReleaseKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownReleaseKind(s.to_string()))
    }
}

/// Whether `value` names one of the eight release kinds.
pub fn is_release_kind(value: &str) -> bool {
    value.parse::<ReleaseKind>().is_ok()
}

/// What the caller asked the version calculator to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReleaseRequest {
    /// Use this literal version.
    Explicit {
        /// The requested version, not yet validated.
        version: String,
    },
    /// Ask the user.
    Prompt {
        /// Prerelease identifier for the prerelease candidates.
        preid: String,
    },
    /// Increment relative to the current version.
    Bump {
        /// Which increment to apply.
        kind: ReleaseKind,
        /// Prerelease identifier for prerelease kinds.
        preid: String,
    },
}

impl ReleaseRequest {
    /// Interpret a raw `release` option.
    ///
    /// Missing or `"prompt"` means [`ReleaseRequest::Prompt`], a release kind
    /// name means [`ReleaseRequest::Bump`], anything else is taken as a
    /// literal version.
    pub fn from_option(release: Option<&str>, preid: Option<&str>) -> Self {
        let preid = preid.unwrap_or(DEFAULT_PREID).to_string();
        match release.map(str::trim) {
            None | Some("" | "prompt") => Self::Prompt { preid },
            Some(value) => value.parse::<ReleaseKind>().map_or_else(
                |_| Self::Explicit {
                    version: value.to_string(),
                },
                |kind| Self::Bump { kind, preid },
            ),
        }
    }

    /// Whether satisfying this request needs user interaction.
    pub const fn needs_prompt(&self) -> bool {
        matches!(self, Self::Prompt { .. })
    }
}
