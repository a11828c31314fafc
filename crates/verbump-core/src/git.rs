//! Git steps of a bump: commit, tag, push.
//!
//! Shells out to `git` for all operations. This ensures we inherit the user's
//! SSH keys, GPG signing, hooks, and other configuration.

use std::process::Command;

use camino::Utf8Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::operation::{Operation, ProgressEvent, StateUpdate};

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    /// Failed to execute the `git` command.
    #[error("failed to run git: {0}")]
    Exec(#[from] std::io::Error),

    /// `git` returned a non-zero exit code.
    #[error("git {command} failed: {stderr}")]
    Command {
        /// The git subcommand that failed (e.g., "commit").
        command: String,
        /// Captured stderr, verbatim.
        stderr: String,
    },
}

/// Result alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Substitute the version into a commit message or tag template.
///
/// `{version}` and the legacy `%s` are both replaced. A template with
/// neither placeholder gets the version appended.
pub fn format_version_string(template: &str, version: &str) -> String {
    if template.contains("{version}") || template.contains("%s") {
        template.replace("{version}", version).replace("%s", version)
    } else {
        format!("{template}{version}")
    }
}

/// Commit, then emit [`ProgressEvent::GitCommit`].
///
/// With `all` every tracked change goes in (`git commit --all`); otherwise
/// the updated files are passed as pathspecs so nothing else that happens to
/// be staged is included. Does nothing when committing is disabled.
#[instrument(skip_all)]
pub fn commit(operation: &mut Operation<'_>) -> GitResult<()> {
    let Some(settings) = operation.options().commit.clone() else {
        debug!("commit disabled");
        return Ok(());
    };
    let cwd = operation.options().cwd.clone();
    let message = operation.state().commit_message.clone();
    let files = operation.state().updated_files.clone();

    let mut args = vec!["commit", "--message", message.as_str()];
    if settings.all {
        args.push("--all");
    }
    if settings.no_verify {
        args.push("--no-verify");
    }
    if settings.sign {
        args.push("--gpg-sign");
    }
    if !settings.all && !files.is_empty() {
        args.push("--");
        args.extend(files.iter().map(String::as_str));
    }
    git(&cwd, &args)?;
    debug!(%message, "committed");

    operation.update(StateUpdate::default(), Some(ProgressEvent::GitCommit));
    Ok(())
}

/// Create an annotated tag, then emit [`ProgressEvent::GitTag`].
///
/// The tag message is the tag name. Does nothing when tagging is disabled.
#[instrument(skip_all)]
pub fn tag(operation: &mut Operation<'_>) -> GitResult<()> {
    let Some(settings) = operation.options().tag.clone() else {
        debug!("tag disabled");
        return Ok(());
    };
    let cwd = operation.options().cwd.clone();
    let name = operation.state().tag_name.clone();

    let mut args = vec!["tag", "--annotate", "--message", name.as_str()];
    if settings.sign {
        args.push("--sign");
    }
    args.push(name.as_str());
    git(&cwd, &args)?;
    debug!(%name, "tagged");

    operation.update(StateUpdate::default(), Some(ProgressEvent::GitTag));
    Ok(())
}

/// Push commits, and tags when one was created, then emit
/// [`ProgressEvent::GitPush`]. Does nothing when pushing is disabled.
#[instrument(skip_all)]
pub fn push(operation: &mut Operation<'_>) -> GitResult<()> {
    if !operation.options().push {
        debug!("push disabled");
        return Ok(());
    }
    let cwd = operation.options().cwd.clone();

    git(&cwd, &["push"])?;
    if operation.options().tag.is_some() {
        git(&cwd, &["push", "--tags"])?;
    }

    operation.update(StateUpdate::default(), Some(ProgressEvent::GitPush));
    Ok(())
}

/// Run a git command in `cwd` and return its stdout.
fn git(cwd: &Utf8Path, args: &[&str]) -> GitResult<String> {
    debug!(?args, "git");
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd.as_std_path())
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        Err(GitError::Command {
            command: args.first().unwrap_or(&"").to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
