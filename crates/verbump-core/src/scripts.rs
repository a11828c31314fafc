//! npm lifecycle scripts and the user's execute command.
//!
//! Lifecycle scripts are looked up in the primary manifest of the working
//! directory and run through `npm run`; the execute command runs through
//! the platform shell. Both inherit stdio so their output reaches the user
//! as-is.

use std::fs;
use std::process::Command;

use camino::Utf8Path;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::manifest::{self, PRIMARY_MANIFEST};
use crate::operation::{Operation, ProgressEvent, StateUpdate};

/// Errors from running scripts or commands.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// `npm` is not on `PATH`.
    #[error("npm not found: {0}")]
    NpmNotFound(#[from] which::Error),

    /// The process could not be started.
    #[error("failed to run {command}: {source}")]
    Exec {
        /// What was being run.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("{command} failed{}", exit_suffix(*.exit_code))]
    Failed {
        /// What was run.
        command: String,
        /// Exit code, if the process exited normally.
        exit_code: Option<i32>,
    },
}

fn exit_suffix(code: Option<i32>) -> String {
    code.map(|c| format!(" with exit code {c}")).unwrap_or_default()
}

/// Result alias for script operations.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// The npm lifecycle hooks around a version change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleScript {
    /// Before any file is touched.
    PreVersion,
    /// After files are updated, before committing.
    Version,
    /// After committing and tagging, before pushing.
    PostVersion,
}

impl LifecycleScript {
    /// The script name in `package.json`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreVersion => "preversion",
            Self::Version => "version",
            Self::PostVersion => "postversion",
        }
    }
}

impl std::fmt::Display for LifecycleScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the primary manifest in `cwd` defines `script`.
///
/// A missing or unparseable manifest defines nothing.
pub fn defines_script(cwd: &Utf8Path, script: LifecycleScript) -> bool {
    fs::read_to_string(cwd.join(PRIMARY_MANIFEST))
        .ok()
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .is_some_and(|value| manifest::has_script(&value, script.as_str()))
}

/// Run a lifecycle script if the manifest defines it and scripts are not
/// ignored, then emit [`ProgressEvent::ScriptRan`].
#[instrument(skip(operation))]
pub fn run_lifecycle_script(
    operation: &mut Operation<'_>,
    script: LifecycleScript,
) -> ScriptResult<()> {
    let options = operation.options();
    if options.ignore_scripts {
        debug!("scripts ignored");
        return Ok(());
    }
    if !defines_script(&options.cwd, script) {
        debug!("script not defined");
        return Ok(());
    }

    let npm = which::which("npm")?;
    let command = format!("npm run {script}");
    debug!(npm = %npm.display(), "running lifecycle script");
    let status = Command::new(npm)
        .args(["run", script.as_str(), "--silent"])
        .current_dir(options.cwd.as_std_path())
        .status()
        .map_err(|source| ScriptError::Exec {
            command: command.clone(),
            source,
        })?;
    if !status.success() {
        return Err(ScriptError::Failed {
            command,
            exit_code: status.code(),
        });
    }

    operation.update(
        StateUpdate::default(),
        Some(ProgressEvent::ScriptRan(script)),
    );
    Ok(())
}

/// Run `command` through the platform shell in `cwd`.
#[instrument]
pub fn run_shell_command(command: &str, cwd: &Utf8Path) -> ScriptResult<()> {
    let mut shell = if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    };

    let status = shell
        .current_dir(cwd.as_std_path())
        .status()
        .map_err(|source| ScriptError::Exec {
            command: command.to_string(),
            source,
        })?;
    if status.success() {
        debug!("command finished");
        Ok(())
    } else {
        Err(ScriptError::Failed {
            command: command.to_string(),
            exit_code: status.code(),
        })
    }
}
