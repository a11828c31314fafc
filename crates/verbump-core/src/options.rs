//! Bump options: the raw form callers fill in, and the normalized form the
//! pipeline runs with.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::files::{self, FileError};
use crate::manifest::{DEFAULT_MANIFESTS, LOCK_MANIFEST, PRIMARY_MANIFEST};
use crate::release::{DEFAULT_PREID, ReleaseRequest};

/// Default commit message template.
pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: release v{version}";

/// Default tag name template.
pub const DEFAULT_TAG_NAME: &str = "v{version}";

/// Errors from option normalization.
#[derive(Error, Debug)]
pub enum OptionsError {
    /// The version must be chosen interactively but no prompter is available.
    #[error("no release type or version given, and prompting is unavailable (not a terminal)")]
    PromptUnavailable,

    /// Confirmation was requested but no prompter is available.
    #[error("confirmation requested but prompting is unavailable; pass --yes to skip it")]
    ConfirmUnavailable,

    /// The working directory could not be determined.
    #[error("cannot determine working directory: {0}")]
    Cwd(#[source] std::io::Error),

    /// The working directory is not valid UTF-8.
    #[error("working directory is not valid UTF-8: {0}")]
    NonUtf8Cwd(String),

    /// File patterns could not be expanded.
    #[error(transparent)]
    Files(#[from] FileError),
}

/// Result alias for option handling.
pub type OptionsResult<T> = Result<T, OptionsError>;

/// A step that is either switched on/off or given a template.
///
/// Deserializes from `true`, `false`, or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Toggle {
    /// Enabled with the default template, or disabled.
    Enabled(bool),
    /// Enabled with this template.
    Template(String),
}

impl Default for Toggle {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl Toggle {
    /// The template to use, or `None` when disabled.
    fn resolve(&self, default: &str) -> Option<String> {
        match self {
            Self::Enabled(false) => None,
            Self::Enabled(true) => Some(default.to_string()),
            Self::Template(t) if t.trim().is_empty() => Some(default.to_string()),
            Self::Template(t) => Some(t.clone()),
        }
    }
}

/// Options as callers supply them. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BumpOptions {
    /// A release kind, `"prompt"`, or a literal version. Absent means prompt.
    pub release: Option<String>,
    /// Prerelease identifier.
    pub preid: Option<String>,
    /// Create a git commit.
    pub commit: Toggle,
    /// Create a git tag.
    pub tag: Toggle,
    /// Push commits and tags.
    pub push: bool,
    /// Commit every tracked change, not just the updated files.
    pub all: bool,
    /// Bypass git hooks when committing.
    pub no_verify: bool,
    /// Sign the commit and tag.
    pub sign: bool,
    /// Ask before making changes.
    pub confirm: bool,
    /// Target file patterns.
    pub files: Vec<String>,
    /// Target every `package.json` below the working directory.
    pub recursive: bool,
    /// Skip npm lifecycle scripts.
    pub ignore_scripts: bool,
    /// Shell command to run after files are updated.
    pub execute: Option<String>,
    /// Use this as the current version instead of reading files.
    pub current_version: Option<String>,
    /// Working directory; defaults to the process's.
    pub cwd: Option<Utf8PathBuf>,
}

impl Default for BumpOptions {
    fn default() -> Self {
        Self {
            release: None,
            preid: None,
            commit: Toggle::default(),
            tag: Toggle::default(),
            push: true,
            all: false,
            no_verify: false,
            sign: false,
            confirm: true,
            files: Vec::new(),
            recursive: false,
            ignore_scripts: false,
            execute: None,
            current_version: None,
            cwd: None,
        }
    }
}

/// Commit settings, present only when committing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOptions {
    /// Message template.
    pub message: String,
    /// Pass `--no-verify`.
    pub no_verify: bool,
    /// Include every tracked change (`git commit --all`).
    pub all: bool,
    /// GPG-sign the commit.
    pub sign: bool,
}

/// Tag settings, present only when tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOptions {
    /// Tag name template.
    pub name: String,
    /// GPG-sign the tag.
    pub sign: bool,
}

/// Options with every default applied and every pattern expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    /// How the new version is chosen.
    pub release: ReleaseRequest,
    /// Commit settings; `None` disables the commit.
    pub commit: Option<CommitOptions>,
    /// Tag settings; `None` disables the tag.
    pub tag: Option<TagOptions>,
    /// Push after committing/tagging.
    pub push: bool,
    /// Target files, relative to `cwd`.
    pub files: Vec<Utf8PathBuf>,
    /// Working directory.
    pub cwd: Utf8PathBuf,
    /// Whether a prompter is available.
    pub interactive: bool,
    /// Ask for confirmation before changing anything.
    pub confirm: bool,
    /// Skip npm lifecycle scripts.
    pub ignore_scripts: bool,
    /// Shell command to run after files are updated.
    pub execute: Option<String>,
    /// Caller-supplied current version.
    pub current_version: Option<String>,
}

/// Patterns used in recursive mode.
fn recursive_patterns() -> Vec<String> {
    vec![
        PRIMARY_MANIFEST.to_string(),
        LOCK_MANIFEST.to_string(),
        format!("**/{PRIMARY_MANIFEST}"),
    ]
}

/// Apply defaults, expand file patterns and check that interactive
/// requests can be honored.
#[instrument(skip(raw))]
pub fn normalize(raw: &BumpOptions, interactive: bool) -> OptionsResult<NormalizedOptions> {
    let preid = raw
        .preid
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PREID);
    let release = ReleaseRequest::from_option(raw.release.as_deref(), Some(preid));

    if release.needs_prompt() && !interactive {
        return Err(OptionsError::PromptUnavailable);
    }
    if raw.confirm && !interactive {
        return Err(OptionsError::ConfirmUnavailable);
    }

    let cwd = match &raw.cwd {
        Some(cwd) => cwd.clone(),
        None => {
            let cwd = std::env::current_dir().map_err(OptionsError::Cwd)?;
            Utf8PathBuf::try_from(cwd)
                .map_err(|e| OptionsError::NonUtf8Cwd(e.into_path_buf().display().to_string()))?
        }
    };

    if raw.recursive && !raw.files.is_empty() {
        warn!("recursive ignored because a file list was given");
    }
    let recursive = raw.recursive && raw.files.is_empty();
    let patterns = if recursive {
        recursive_patterns()
    } else if raw.files.is_empty() {
        DEFAULT_MANIFESTS.iter().map(ToString::to_string).collect()
    } else {
        raw.files.clone()
    };

    let mut files = files::expand_patterns(&cwd, &patterns)?;
    if recursive {
        // Root manifests lead so the primary one stays the version source.
        let roots = files
            .iter()
            .take_while(|f| DEFAULT_MANIFESTS.contains(&f.as_str()))
            .count();
        files[roots..].sort();
    }
    debug!(?files, "resolved target files");

    let commit = raw
        .commit
        .resolve(DEFAULT_COMMIT_MESSAGE)
        .map(|message| CommitOptions {
            message,
            no_verify: raw.no_verify,
            all: raw.all,
            sign: raw.sign,
        });
    let tag = raw.tag.resolve(DEFAULT_TAG_NAME).map(|name| TagOptions {
        name,
        sign: raw.sign,
    });

    Ok(NormalizedOptions {
        release,
        commit,
        tag,
        push: raw.push,
        files,
        cwd,
        interactive,
        confirm: raw.confirm,
        ignore_scripts: raw.ignore_scripts,
        execute: raw.execute.clone().filter(|cmd| !cmd.trim().is_empty()),
        current_version: raw
            .current_version
            .clone()
            .filter(|v| !v.trim().is_empty()),
    })
}

/// Normalized options for a patch bump of `package.json` with every git
/// step enabled and no confirmation.
#[cfg(test)]
pub(crate) fn test_options() -> NormalizedOptions {
    NormalizedOptions {
        release: ReleaseRequest::from_option(Some("patch"), None),
        commit: Some(CommitOptions {
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
            no_verify: false,
            all: false,
            sign: false,
        }),
        tag: Some(TagOptions {
            name: DEFAULT_TAG_NAME.to_string(),
            sign: false,
        }),
        push: true,
        files: vec![Utf8PathBuf::from(PRIMARY_MANIFEST)],
        cwd: Utf8PathBuf::from("."),
        interactive: false,
        confirm: false,
        ignore_scripts: false,
        execute: None,
        current_version: None,
    }
}
