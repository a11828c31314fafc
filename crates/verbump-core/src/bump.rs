//! The bump pipeline.
//!
//! All orchestration logic lives here. The CLI is purely a display layer.
//!
//! # Steps
//!
//! 1. Normalize options and expand file patterns.
//! 2. Resolve the current version.
//! 3. Calculate the new version (explicit, increment, or prompt).
//! 4. Confirm, if requested.
//! 5. `preversion` script, file updates, execute command, `version` script.
//! 6. Commit, tag, `postversion` script, push.
//!
//! [`version_bump_info`] stops after step 3 and touches nothing.

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::files::{self, FileError};
use crate::git::{self, GitError};
use crate::operation::{BumpResults, Operation, ProgressCallback, ProgressEvent, StateUpdate};
use crate::options::{self, BumpOptions, OptionsError};
use crate::prompt::{PromptError, Prompter};
use crate::release::ReleaseRequest;
use crate::resolve::{self, ResolveError};
use crate::scripts::{self, LifecycleScript, ScriptError};
use crate::version::explicit::validate_explicit;
use crate::version::increment::next_version;
use crate::version::interactive::prompt_for_version;
use crate::version::{VersionError, parse_version};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from the bump pipeline.
#[derive(Error, Debug)]
pub enum BumpError {
    /// The options are inconsistent or cannot be honored.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// The current version could not be determined.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A version was invalid or could not be computed.
    #[error(transparent)]
    Version(VersionError),

    /// An npm lifecycle script failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The execute command failed.
    #[error("execute command failed: {0}")]
    Execute(#[source] ScriptError),

    /// A git step failed.
    #[error(transparent)]
    Git(#[from] GitError),

    /// The prompter failed.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// A target file could not be updated.
    #[error(transparent)]
    Files(#[from] FileError),

    /// The user cancelled or declined.
    #[error("aborted")]
    Aborted,
}

impl From<VersionError> for BumpError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::Aborted => Self::Aborted,
            VersionError::Prompt(e) => Self::Prompt(e),
            other => Self::Version(other),
        }
    }
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

// ──────────────────────────────────────────────
// Entry points
// ──────────────────────────────────────────────

/// Run the full bump pipeline.
///
/// Interaction is available exactly when `prompter` is given. `progress`
/// is called after every observable step.
#[instrument(skip_all)]
pub fn version_bump(
    options: &BumpOptions,
    mut prompter: Option<&mut dyn Prompter>,
    progress: Option<ProgressCallback<'_>>,
) -> BumpResult<BumpResults> {
    let reborrowed = prompter.as_mut().map(|p| &mut **p as &mut dyn Prompter);
    let mut operation = prepare(options, reborrowed, progress)?;

    if operation.options().confirm {
        let summary = operation.summary();
        let prompter = prompter.ok_or(OptionsError::ConfirmUnavailable)?;
        if !prompter.confirm(&summary)? {
            debug!("declined at confirmation");
            return Err(BumpError::Aborted);
        }
    }

    scripts::run_lifecycle_script(&mut operation, LifecycleScript::PreVersion)?;
    files::update_files(&mut operation)?;

    if let Some(command) = operation.options().execute.clone() {
        let cwd = operation.options().cwd.clone();
        info!(%command, "executing");
        scripts::run_shell_command(&command, &cwd).map_err(BumpError::Execute)?;
        operation.update(StateUpdate::default(), Some(ProgressEvent::CommandExecuted));
    }

    scripts::run_lifecycle_script(&mut operation, LifecycleScript::Version)?;
    git::commit(&mut operation)?;
    git::tag(&mut operation)?;
    scripts::run_lifecycle_script(&mut operation, LifecycleScript::PostVersion)?;
    git::push(&mut operation)?;

    let results = operation.results();
    info!(
        old = %results.old_version,
        new = %results.new_version,
        updated = results.updated_files.len(),
        "bump complete"
    );
    Ok(results)
}

/// Resolve the current version and calculate the new one without changing
/// anything.
///
/// The returned operation carries normalized options and state for
/// inspection (`results()`, `summary()`).
#[instrument(skip_all)]
pub fn version_bump_info(
    options: &BumpOptions,
    prompter: Option<&mut dyn Prompter>,
) -> BumpResult<Operation<'static>> {
    let options = BumpOptions {
        confirm: false,
        ..options.clone()
    };
    prepare(&options, prompter, None)
}

// ──────────────────────────────────────────────
// Steps
// ──────────────────────────────────────────────

/// Normalize, resolve the old version and calculate the new one.
fn prepare<'a>(
    options: &BumpOptions,
    prompter: Option<&mut dyn Prompter>,
    progress: Option<ProgressCallback<'a>>,
) -> BumpResult<Operation<'a>> {
    let normalized = options::normalize(options, prompter.is_some())?;
    let mut operation = Operation::new(normalized, progress);
    resolve_old_version(&mut operation)?;
    calculate_new_version(&mut operation, prompter)?;
    operation.render_git_names();
    Ok(operation)
}

fn resolve_old_version(operation: &mut Operation<'_>) -> BumpResult<()> {
    let opts = operation.options();
    let old = resolve::resolve_old_version(&opts.cwd, &opts.files, opts.current_version.as_deref())?;
    debug!(version = %old.version, source = %old.source, "old version");
    operation.update(
        StateUpdate {
            old_version: Some(old.version.to_string()),
            old_version_source: Some(old.source),
            ..StateUpdate::default()
        },
        None,
    );
    Ok(())
}

fn calculate_new_version(
    operation: &mut Operation<'_>,
    prompter: Option<&mut dyn Prompter>,
) -> BumpResult<()> {
    let old = parse_version(&operation.state().old_version)?;

    let (release, new) = match operation.options().release.clone() {
        ReleaseRequest::Explicit { version } => (None, validate_explicit(&version)?),
        ReleaseRequest::Bump { kind, preid } => {
            let (applied, new) = next_version(&old, kind, &preid)?;
            (Some(applied), new)
        }
        ReleaseRequest::Prompt { preid } => {
            let prompter = prompter.ok_or(OptionsError::PromptUnavailable)?;
            prompt_for_version(&old, &preid, prompter)?
        }
    };
    debug!(?release, %new, "new version");

    operation.update(
        StateUpdate {
            release,
            new_version: Some(new.to_string()),
            ..StateUpdate::default()
        },
        None,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;

    use camino::Utf8PathBuf;

    use super::*;
    use crate::operation::Progress;
    use crate::options::Toggle;
    use crate::prompt::scripted::ScriptedPrompter;
    use crate::release::ReleaseKind;

    fn project(files: &[(&str, &str)]) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        for (name, contents) in files {
            fs::write(root.join(name), contents).unwrap();
        }
        (dir, root)
    }

    /// Options for a non-interactive bump with every git step off.
    fn offline(root: &Utf8PathBuf, release: &str) -> BumpOptions {
        BumpOptions {
            release: Some(release.into()),
            commit: Toggle::Enabled(false),
            tag: Toggle::Enabled(false),
            push: false,
            confirm: false,
            ignore_scripts: true,
            cwd: Some(root.clone()),
            ..BumpOptions::default()
        }
    }

    fn read(root: &Utf8PathBuf, name: &str) -> String {
        fs::read_to_string(root.join(name)).unwrap()
    }

    #[test]
    fn patch_bump_updates_manifest() {
        let (_dir, root) = project(&[("package.json", "{\n  \"version\": \"1.0.0\"\n}\n")]);
        let results = version_bump(&offline(&root, "patch"), None, None).unwrap();

        assert_eq!(results.release, Some(ReleaseKind::Patch));
        assert_eq!(results.old_version, "1.0.0");
        assert_eq!(results.old_version_source, "package.json");
        assert_eq!(results.new_version, "1.0.1");
        assert_eq!(results.updated_files, vec!["package.json".to_string()]);
        assert!(results.commit.is_none());
        assert!(results.tag.is_none());
        assert_eq!(read(&root, "package.json"), "{\n  \"version\": \"1.0.1\"\n}\n");
    }

    #[test]
    fn lock_file_is_updated_alongside_manifest() {
        let (_dir, root) = project(&[
            ("package.json", r#"{"version": "1.0.0"}"#),
            (
                "package-lock.json",
                r#"{"version": "1.0.0", "packages": {"": {"version": "1.0.0"}}}"#,
            ),
        ]);
        let results = version_bump(&offline(&root, "minor"), None, None).unwrap();
        assert_eq!(results.updated_files.len(), 2);
        assert!(read(&root, "package-lock.json").contains("1.1.0"));
    }

    #[test]
    fn prerelease_from_stable_starts_at_one() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.2.3"}"#)]);
        let results = version_bump(&offline(&root, "prerelease"), None, None).unwrap();
        assert_eq!(results.new_version, "1.2.4-beta.1");
    }

    #[test]
    fn explicit_version_records_no_release_kind() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let results = version_bump(&offline(&root, "v3.0.0"), None, None).unwrap();
        assert_eq!(results.release, None);
        assert_eq!(results.new_version, "3.0.0");
    }

    #[test]
    fn explicit_version_drops_build_metadata() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let results = version_bump(&offline(&root, "1.2.3+build.5"), None, None).unwrap();
        assert_eq!(results.new_version, "1.2.3");
        assert_eq!(read(&root, "package.json"), r#"{"version":"1.2.3"}"#);
    }

    #[test]
    fn file_list_wins_over_recursive() {
        let (_dir, root) = project(&[
            ("package.json", r#"{"version": "1.0.0"}"#),
            ("VERSION", "1.0.0\n"),
        ]);
        fs::create_dir_all(root.join("packages/a")).unwrap();
        fs::write(root.join("packages/a/package.json"), r#"{"version": "1.0.0"}"#).unwrap();
        let results = version_bump(
            &BumpOptions {
                recursive: true,
                files: vec!["VERSION".into()],
                ..offline(&root, "patch")
            },
            None,
            None,
        )
        .unwrap();
        assert_eq!(results.old_version_source, "package.json");
        assert_eq!(results.updated_files, vec!["VERSION".to_string()]);
        assert_eq!(read(&root, "packages/a/package.json"), r#"{"version": "1.0.0"}"#);
    }

    #[test]
    fn failing_preversion_stops_before_files_change() {
        if which::which("npm").is_err() {
            return;
        }
        let (_dir, root) = project(&[(
            "package.json",
            r#"{"name": "demo", "version": "1.0.0", "scripts": {"preversion": "exit 2"}}"#,
        )]);
        let err = version_bump(
            &BumpOptions {
                ignore_scripts: false,
                ..offline(&root, "patch")
            },
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BumpError::Script(ScriptError::Failed { .. })));
        assert!(read(&root, "package.json").contains(r#""version": "1.0.0""#));
    }

    #[test]
    fn invalid_explicit_version_fails_before_touching_files() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let err = version_bump(&offline(&root, "not-a-version"), None, None).unwrap_err();
        assert!(matches!(err, BumpError::Version(VersionError::InvalidVersion { .. })));
        assert_eq!(read(&root, "package.json"), r#"{"version": "1.0.0"}"#);
    }

    #[test]
    fn missing_version_is_reported() {
        let (_dir, root) = project(&[("package.json", r#"{"version": ""}"#)]);
        let err = version_bump(&offline(&root, "patch"), None, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to determine the current version number. Checked package.json."
        );
    }

    #[test]
    fn current_version_override_comes_from_user() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let results = version_bump(
            &BumpOptions {
                current_version: Some("2.0.0".into()),
                ..offline(&root, "patch")
            },
            None,
            None,
        )
        .unwrap();
        assert_eq!(results.old_version_source, "user");
        assert_eq!(results.new_version, "2.0.1");
        // the manifest holds 1.0.0, which the JSON updater overwrites anyway
        assert!(read(&root, "package.json").contains("2.0.1"));
    }

    #[test]
    fn already_current_file_is_skipped() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let results = version_bump(
            &BumpOptions {
                current_version: Some("0.9.9".into()),
                ..offline(&root, "1.0.0")
            },
            None,
            None,
        )
        .unwrap();
        assert!(results.updated_files.is_empty());
        assert_eq!(results.skipped_files, vec!["package.json".to_string()]);
    }

    #[test]
    fn progress_events_follow_the_pipeline() {
        let (_dir, root) = project(&[
            ("package.json", r#"{"version": "1.0.0"}"#),
            ("VERSION", "1.0.0\n"),
            ("NOTES.md", "nothing to see\n"),
        ]);
        let seen = RefCell::new(Vec::new());
        let listener = |p: &Progress| seen.borrow_mut().push(p.event);
        version_bump(
            &BumpOptions {
                files: vec!["package.json".into(), "VERSION".into(), "NOTES.md".into()],
                ..offline(&root, "patch")
            },
            None,
            Some(Box::new(listener)),
        )
        .unwrap();
        assert_eq!(
            seen.into_inner(),
            vec![
                ProgressEvent::FileUpdated,
                ProgressEvent::FileUpdated,
                ProgressEvent::FileSkipped
            ]
        );
        assert_eq!(read(&root, "VERSION"), "1.0.1\n");
    }

    #[test]
    fn info_calculates_without_touching_files() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let op = version_bump_info(&offline(&root, "major"), None).unwrap();
        assert_eq!(op.state().new_version, "2.0.0");
        assert_eq!(op.state().release, Some(ReleaseKind::Major));
        assert_eq!(read(&root, "package.json"), r#"{"version": "1.0.0"}"#);
    }

    #[test]
    fn prompt_without_prompter_is_a_configuration_error() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let err = version_bump(
            &BumpOptions {
                release: None,
                ..offline(&root, "patch")
            },
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BumpError::Options(OptionsError::PromptUnavailable)));
    }

    #[test]
    fn interactive_pick_then_confirm() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.2.3"}"#)]);
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([Some(0)]),
            confirms: VecDeque::from([true]),
            ..ScriptedPrompter::default()
        };
        let results = version_bump(
            &BumpOptions {
                release: Some("prompt".into()),
                confirm: true,
                ..offline(&root, "patch")
            },
            Some(&mut prompter),
            None,
        )
        .unwrap();
        assert_eq!(results.release, Some(ReleaseKind::Major));
        assert_eq!(results.new_version, "2.0.0");
        let summary = prompter.seen_summary.unwrap();
        assert_eq!(summary.from, "1.2.3");
        assert_eq!(summary.to, "2.0.0");
    }

    #[test]
    fn declining_confirmation_aborts_without_changes() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let mut prompter = ScriptedPrompter::confirming(false);
        let err = version_bump(
            &BumpOptions {
                confirm: true,
                ..offline(&root, "patch")
            },
            Some(&mut prompter),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BumpError::Aborted));
        assert_eq!(read(&root, "package.json"), r#"{"version": "1.0.0"}"#);
    }

    #[test]
    fn cancelled_selection_aborts() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let mut prompter = ScriptedPrompter {
            selections: VecDeque::from([None]),
            ..ScriptedPrompter::default()
        };
        let err = version_bump(
            &BumpOptions {
                release: None,
                ..offline(&root, "patch")
            },
            Some(&mut prompter),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BumpError::Aborted));
    }

    #[cfg(unix)]
    #[test]
    fn execute_runs_after_files_are_updated() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let seen = RefCell::new(Vec::new());
        version_bump(
            &BumpOptions {
                execute: Some("cp package.json snapshot.json".into()),
                ..offline(&root, "patch")
            },
            None,
            Some(Box::new(|p: &Progress| seen.borrow_mut().push(p.event))),
        )
        .unwrap();
        assert!(read(&root, "snapshot.json").contains("1.0.1"));
        assert_eq!(
            seen.into_inner().last(),
            Some(&ProgressEvent::CommandExecuted)
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_execute_is_fatal() {
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let err = version_bump(
            &BumpOptions {
                execute: Some("exit 2".into()),
                ..offline(&root, "patch")
            },
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BumpError::Execute(_)));
    }

    #[test]
    fn commit_and_tag_in_temp_repo() {
        if which::which("git").is_err() {
            return;
        }
        let (_dir, root) = project(&[("package.json", r#"{"version": "1.0.0"}"#)]);
        let run = |args: &[&str]| {
            let out = std::process::Command::new("git")
                .args(args)
                .current_dir(&root)
                .output()
                .unwrap();
            assert!(out.status.success(), "git {args:?} failed");
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        };
        run(&["init", "--quiet"]);
        run(&["config", "user.name", "Test"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "commit.gpgsign", "false"]);
        run(&["config", "tag.gpgsign", "false"]);
        run(&["add", "--all"]);
        run(&["commit", "--quiet", "--message", "init"]);

        let seen = RefCell::new(Vec::new());
        let results = version_bump(
            &BumpOptions {
                commit: Toggle::Template("release {version}".into()),
                tag: Toggle::Enabled(true),
                ..offline(&root, "minor")
            },
            None,
            Some(Box::new(|p: &Progress| seen.borrow_mut().push(p.event))),
        )
        .unwrap();

        assert_eq!(results.commit.as_deref(), Some("release 1.1.0"));
        assert_eq!(results.tag.as_deref(), Some("v1.1.0"));
        assert_eq!(run(&["log", "-1", "--format=%s"]), "release 1.1.0");
        assert_eq!(run(&["tag", "--list"]), "v1.1.0");
        assert_eq!(
            seen.into_inner(),
            vec![
                ProgressEvent::FileUpdated,
                ProgressEvent::GitCommit,
                ProgressEvent::GitTag
            ]
        );
    }
}
