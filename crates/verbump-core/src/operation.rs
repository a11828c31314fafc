//! The running bump: normalized options, accumulated state, and the
//! progress listener.
//!
//! Every pipeline step reads from and writes to one [`Operation`]. A step
//! records what it did through [`Operation::update`], which merges the
//! changed fields and, when an event is given, hands the listener a
//! [`Progress`] carrying a snapshot of the results so far.

use serde::Serialize;
use tracing::debug;

use crate::git::format_version_string;
use crate::options::NormalizedOptions;
use crate::release::ReleaseKind;
use crate::scripts::LifecycleScript;

// ──────────────────────────────────────────────
// State
// ──────────────────────────────────────────────

/// Mutable state accumulated while the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    /// The release kind applied, when a kind (rather than a literal
    /// version) determined the new version.
    pub release: Option<ReleaseKind>,
    /// The version before the bump.
    pub old_version: String,
    /// Where the old version came from: a file path, or `"user"`.
    pub old_version_source: String,
    /// The version after the bump.
    pub new_version: String,
    /// Rendered commit message.
    pub commit_message: String,
    /// Rendered tag name.
    pub tag_name: String,
    /// Files rewritten with the new version.
    pub updated_files: Vec<String>,
    /// Files left untouched.
    pub skipped_files: Vec<String>,
}

/// A partial state change. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    /// See [`OperationState::release`].
    pub release: Option<ReleaseKind>,
    /// See [`OperationState::old_version`].
    pub old_version: Option<String>,
    /// See [`OperationState::old_version_source`].
    pub old_version_source: Option<String>,
    /// See [`OperationState::new_version`].
    pub new_version: Option<String>,
    /// See [`OperationState::commit_message`].
    pub commit_message: Option<String>,
    /// See [`OperationState::tag_name`].
    pub tag_name: Option<String>,
    /// See [`OperationState::updated_files`].
    pub updated_files: Option<Vec<String>>,
    /// See [`OperationState::skipped_files`].
    pub skipped_files: Option<Vec<String>>,
}

// ──────────────────────────────────────────────
// Events and results
// ──────────────────────────────────────────────

/// Something observable happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "script")]
pub enum ProgressEvent {
    /// A file was rewritten; it is the last entry of `updated_files`.
    FileUpdated,
    /// A file was left alone; it is the last entry of `skipped_files`.
    FileSkipped,
    /// The release commit was created.
    GitCommit,
    /// The release tag was created.
    GitTag,
    /// Commits and tags were pushed.
    GitPush,
    /// An npm lifecycle script ran.
    ScriptRan(LifecycleScript),
    /// The user's execute command finished.
    CommandExecuted,
}

/// The externally visible outcome of a bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpResults {
    /// Release kind applied, if any.
    pub release: Option<ReleaseKind>,
    /// Version before the bump.
    pub old_version: String,
    /// File path the old version came from, or `"user"`.
    pub old_version_source: String,
    /// Version after the bump.
    pub new_version: String,
    /// Commit message, when committing is enabled.
    pub commit: Option<String>,
    /// Tag name, when tagging is enabled.
    pub tag: Option<String>,
    /// Files rewritten.
    pub updated_files: Vec<String>,
    /// Files left untouched.
    pub skipped_files: Vec<String>,
}

/// What the progress listener receives.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    /// What just happened.
    #[serde(flatten)]
    pub event: ProgressEvent,
    /// Results as of this event.
    pub results: BumpResults,
}

/// What is about to happen, shown before asking for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Target files.
    pub files: Vec<String>,
    /// Commit message, when committing.
    pub commit: Option<String>,
    /// Tag name, when tagging.
    pub tag: Option<String>,
    /// Command to execute, if any.
    pub execute: Option<String>,
    /// Whether to push.
    pub push: bool,
    /// Old version.
    pub from: String,
    /// New version.
    pub to: String,
}

/// Progress listener.
pub type ProgressCallback<'a> = Box<dyn FnMut(&Progress) + 'a>;

// ──────────────────────────────────────────────
// Operation
// ──────────────────────────────────────────────

/// One bump from start to finish.
pub struct Operation<'a> {
    options: NormalizedOptions,
    state: OperationState,
    progress: Option<ProgressCallback<'a>>,
}

impl std::fmt::Debug for Operation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl<'a> Operation<'a> {
    /// Begin an operation with empty state.
    pub fn new(options: NormalizedOptions, progress: Option<ProgressCallback<'a>>) -> Self {
        Self {
            options,
            state: OperationState::default(),
            progress,
        }
    }

    /// The normalized options this operation runs with.
    pub const fn options(&self) -> &NormalizedOptions {
        &self.options
    }

    /// The state accumulated so far.
    pub const fn state(&self) -> &OperationState {
        &self.state
    }

    /// Merge `update` into the state, then notify the listener if `event`
    /// is given.
    pub fn update(&mut self, update: StateUpdate, event: Option<ProgressEvent>) -> &mut Self {
        let state = &mut self.state;
        if let Some(release) = update.release {
            state.release = Some(release);
        }
        if let Some(v) = update.old_version {
            state.old_version = v;
        }
        if let Some(v) = update.old_version_source {
            state.old_version_source = v;
        }
        if let Some(v) = update.new_version {
            state.new_version = v;
        }
        if let Some(v) = update.commit_message {
            state.commit_message = v;
        }
        if let Some(v) = update.tag_name {
            state.tag_name = v;
        }
        if let Some(v) = update.updated_files {
            state.updated_files = v;
        }
        if let Some(v) = update.skipped_files {
            state.skipped_files = v;
        }

        if let Some(event) = event {
            debug!(?event, "progress");
            if self.progress.is_some() {
                let progress = Progress {
                    event,
                    results: self.results(),
                };
                if let Some(listener) = self.progress.as_mut() {
                    listener(&progress);
                }
            }
        }
        self
    }

    /// Snapshot of the externally visible results.
    ///
    /// `commit` and `tag` are present only when that step is enabled.
    pub fn results(&self) -> BumpResults {
        let state = &self.state;
        BumpResults {
            release: state.release,
            old_version: state.old_version.clone(),
            old_version_source: state.old_version_source.clone(),
            new_version: state.new_version.clone(),
            commit: self
                .options
                .commit
                .as_ref()
                .map(|_| state.commit_message.clone()),
            tag: self.options.tag.as_ref().map(|_| state.tag_name.clone()),
            updated_files: state.updated_files.clone(),
            skipped_files: state.skipped_files.clone(),
        }
    }

    /// Render the commit message and tag name for the new version.
    pub fn render_git_names(&mut self) -> &mut Self {
        let version = self.state.new_version.clone();
        let commit_message = self
            .options
            .commit
            .as_ref()
            .map(|commit| format_version_string(&commit.message, &version));
        let tag_name = self
            .options
            .tag
            .as_ref()
            .map(|tag| format_version_string(&tag.name, &version));
        self.update(
            StateUpdate {
                commit_message,
                tag_name,
                ..StateUpdate::default()
            },
            None,
        )
    }

    /// What the remaining pipeline will do.
    pub fn summary(&self) -> Summary {
        let results = self.results();
        Summary {
            files: self.options.files.iter().map(ToString::to_string).collect(),
            commit: results.commit,
            tag: results.tag,
            execute: self.options.execute.clone(),
            push: self.options.push,
            from: results.old_version,
            to: results.new_version,
        }
    }
}
