//! The interactive collaborator.
//!
//! The core never touches the terminal. When it needs a decision from the
//! user it calls a [`Prompter`] supplied by the caller; the CLI implements
//! one with `inquire`, tests use a scripted one.

use thiserror::Error;

use crate::operation::Summary;
use crate::release::ReleaseKind;

/// A prompt could not be shown or answered.
#[derive(Error, Debug)]
#[error("prompt failed: {message}")]
pub struct PromptError {
    message: String,
}

impl PromptError {
    /// Wrap an error from the prompting backend.
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Result alias for prompt operations.
pub type PromptResult<T> = Result<T, PromptError>;

/// What a version-picker entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelection {
    /// Apply this release kind.
    Kind(ReleaseKind),
    /// Keep the current version.
    AsIs,
    /// Ask for a version string.
    Custom,
}

/// One entry in the version picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChoice {
    /// What choosing this entry means.
    pub selection: VersionSelection,
    /// The version it leads to; `None` for [`VersionSelection::Custom`].
    pub version: Option<String>,
}

impl VersionChoice {
    /// Short display label (`"pre-minor"`, `"as-is"`, ...).
    pub const fn label(&self) -> &'static str {
        match self.selection {
            VersionSelection::Kind(kind) => match kind {
                ReleaseKind::Major => "major",
                ReleaseKind::Minor => "minor",
                ReleaseKind::Patch => "patch",
                ReleaseKind::Next => "next",
                ReleaseKind::Prepatch => "pre-patch",
                ReleaseKind::Preminor => "pre-minor",
                ReleaseKind::Premajor => "pre-major",
                ReleaseKind::Prerelease => "pre-release",
            },
            VersionSelection::AsIs => "as-is",
            VersionSelection::Custom => "custom ...",
        }
    }
}

/// Asks the user for decisions the pipeline cannot make alone.
///
/// Returning `Ok(None)` from a selection means the user cancelled.
pub trait Prompter {
    /// Let the user pick one of `choices`; `default` is the preselected index.
    fn select_version(
        &mut self,
        current: &str,
        choices: &[VersionChoice],
        default: usize,
    ) -> PromptResult<Option<usize>>;

    /// Ask for a free-form version. `error` carries the reason the previous
    /// answer was rejected, if any.
    fn custom_version(&mut self, current: &str, error: Option<&str>)
    -> PromptResult<Option<String>>;

    /// Show the summary of what is about to happen and ask to proceed.
    fn confirm(&mut self, summary: &Summary) -> PromptResult<bool>;
}
