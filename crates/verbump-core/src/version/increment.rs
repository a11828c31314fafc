//! Release-kind increments.
//!
//! Follows the increment rules npm users know from `npm version`:
//!
//! | current        | kind         | result           |
//! |----------------|--------------|------------------|
//! | `1.2.3`        | `major`      | `2.0.0`          |
//! | `2.0.0-beta.1` | `major`      | `2.0.0`          |
//! | `1.2.3`        | `premajor`   | `2.0.0-beta.0`   |
//! | `1.2.3`        | `prerelease` | `1.2.4-beta.1`   |
//! | `1.2.4-beta.1` | `prerelease` | `1.2.4-beta.2`   |
//!
//! The one deliberate deviation is the `prerelease` row: starting a
//! prerelease from a stable version yields `.1`, not `.0`.

use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};
use tracing::{debug, instrument};

use crate::release::ReleaseKind;
use crate::version::{VersionError, VersionResult};

/// One dot-separated prerelease component.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Ident {
    Num(u64),
    Alpha(String),
}

impl Ident {
    fn parse(s: &str) -> Self {
        if !s.is_empty()
            && s.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = s.parse()
        {
            return Self::Num(n);
        }
        Self::Alpha(s.to_string())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Alpha(s) => f.write_str(s),
        }
    }
}

/// Mutable working copy of a version while an increment is applied.
struct Parts {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<Ident>,
}

impl Parts {
    fn from_version(version: &Version) -> Self {
        let pre = if version.pre.is_empty() {
            Vec::new()
        } else {
            version.pre.as_str().split('.').map(Ident::parse).collect()
        };
        Self {
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre,
        }
    }

    fn into_version(self, preid: &str) -> VersionResult<Version> {
        let joined = self
            .pre
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        let pre = if joined.is_empty() {
            Prerelease::EMPTY
        } else {
            Prerelease::new(&joined).map_err(|source| VersionError::InvalidPreid {
                preid: preid.to_string(),
                source,
            })?
        };
        Ok(Version {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            pre,
            build: BuildMetadata::EMPTY,
        })
    }

    fn major(&mut self) {
        if self.minor != 0 || self.patch != 0 || self.pre.is_empty() {
            self.major += 1;
        }
        self.minor = 0;
        self.patch = 0;
        self.pre.clear();
    }

    fn minor(&mut self) {
        if self.patch != 0 || self.pre.is_empty() {
            self.minor += 1;
        }
        self.patch = 0;
        self.pre.clear();
    }

    fn patch(&mut self) {
        if self.pre.is_empty() {
            self.patch += 1;
        }
        self.pre.clear();
    }

    /// Bump the last numeric prerelease component, then apply `preid`.
    fn pre(&mut self, preid: &str) {
        if self.pre.is_empty() {
            self.pre.push(Ident::Num(0));
        } else {
            let last_numeric = self.pre.iter_mut().rev().find_map(|ident| match ident {
                Ident::Num(n) => Some(n),
                Ident::Alpha(_) => None,
            });
            match last_numeric {
                Some(n) => *n += 1,
                None => self.pre.push(Ident::Num(0)),
            }
        }

        if preid.is_empty() {
            return;
        }
        let fresh = vec![Ident::Alpha(preid.to_string()), Ident::Num(0)];
        let same_id = self.pre.first().is_some_and(|first| first.to_string() == preid);
        if !same_id || !matches!(self.pre.get(1), Some(Ident::Num(_))) {
            self.pre = fresh;
        }
    }
}

/// Resolve [`ReleaseKind::Next`] against a concrete version.
///
/// Other kinds are returned unchanged.
pub fn resolve_next(current: &Version, kind: ReleaseKind) -> ReleaseKind {
    match kind {
        ReleaseKind::Next if current.pre.is_empty() => ReleaseKind::Patch,
        ReleaseKind::Next => ReleaseKind::Prerelease,
        other => other,
    }
}

/// Apply a release kind using plain increment rules.
///
/// `preid` is only consulted for prerelease kinds (and `next` on a
/// prerelease version).
pub fn increment(current: &Version, kind: ReleaseKind, preid: &str) -> VersionResult<Version> {
    let mut parts = Parts::from_version(current);
    match resolve_next(current, kind) {
        ReleaseKind::Major => parts.major(),
        ReleaseKind::Minor => parts.minor(),
        ReleaseKind::Patch => parts.patch(),
        ReleaseKind::Premajor => {
            parts.pre.clear();
            parts.major += 1;
            parts.minor = 0;
            parts.patch = 0;
            parts.pre(preid);
        }
        ReleaseKind::Preminor => {
            parts.pre.clear();
            parts.minor += 1;
            parts.patch = 0;
            parts.pre(preid);
        }
        ReleaseKind::Prepatch => {
            parts.pre.clear();
            parts.patch();
            parts.pre(preid);
        }
        // resolve_next never yields Next
        ReleaseKind::Prerelease | ReleaseKind::Next => {
            if parts.pre.is_empty() {
                parts.patch();
            }
            parts.pre(preid);
        }
    }
    parts.into_version(preid)
}

/// Compute the next version for a bump request.
///
/// Returns the release kind actually applied (`next` resolved) and the new
/// version. A `prerelease` bump of a stable version starts counting at 1:
/// `1.2.3` becomes `1.2.4-beta.1` rather than `1.2.4-beta.0`.
#[instrument(skip(current), fields(%current))]
pub fn next_version(
    current: &Version,
    kind: ReleaseKind,
    preid: &str,
) -> VersionResult<(ReleaseKind, Version)> {
    let applied = resolve_next(current, kind);
    let mut next = increment(current, applied, preid)?;

    if applied == ReleaseKind::Prerelease && current.pre.is_empty() {
        let parts: Vec<&str> = next.pre.as_str().split('.').collect();
        if let [id, "0"] = parts.as_slice()
            && *id == preid
        {
            next.pre = Prerelease::new(&format!("{preid}.1")).map_err(|source| {
                VersionError::InvalidPreid {
                    preid: preid.to_string(),
                    source,
                }
            })?;
        }
    }

    debug!(%applied, %next, "computed next version");
    Ok((applied, next))
}
