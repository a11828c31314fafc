//! Bump command: thin CLI layer over `verbump_core::version_bump`.

use std::io::IsTerminal;

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use tracing::{debug, instrument};

use verbump_core::operation::Progress;
use verbump_core::release::is_release_kind;
use verbump_core::version::is_valid_version;
use verbump_core::{BumpOptions, Config, ProgressEvent, Prompter, Toggle, version_bump};

use crate::prompter::TerminalPrompter;

/// Arguments describing the bump itself.
#[derive(Args, Debug, Default)]
pub struct BumpArgs {
    /// Release type (major, minor, patch, premajor, preminor, prepatch,
    /// prerelease, next), "prompt", or an explicit version
    #[arg(value_name = "RELEASE")]
    pub release: Option<String>,

    /// Files to update (glob patterns; default: package.json, package-lock.json)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Prerelease identifier (e.g. beta, rc)
    #[arg(long, value_name = "ID")]
    pub preid: Option<String>,

    /// Commit, optionally with a message template (e.g. -c="release %s")
    #[arg(
        short = 'c',
        long,
        value_name = "MSG",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub commit: Option<String>,

    /// Don't create a git commit
    #[arg(long, conflicts_with = "commit")]
    pub no_commit: bool,

    /// Tag, optionally with a tag name template (e.g. -t="v%s")
    #[arg(
        short = 't',
        long,
        value_name = "NAME",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ""
    )]
    pub tag: Option<String>,

    /// Don't create a git tag
    #[arg(long, conflicts_with = "tag")]
    pub no_tag: bool,

    /// Push commits and tags to the remote
    #[arg(short = 'p', long)]
    pub push: bool,

    /// Don't push
    #[arg(long, conflicts_with = "push")]
    pub no_push: bool,

    /// Stage all tracked changes in the release commit
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Bypass git hooks when committing
    #[arg(long)]
    pub no_verify: bool,

    /// Sign the commit and tag
    #[arg(long)]
    pub sign: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Update every package.json below the working directory
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Don't run npm lifecycle scripts
    #[arg(long)]
    pub ignore_scripts: bool,

    /// Shell command to run after the files are updated
    #[arg(short = 'x', long, value_name = "CMD")]
    pub execute: Option<String>,

    /// Use this as the current version instead of reading it from files
    #[arg(long, value_name = "VERSION")]
    pub current_version: Option<String>,
}

impl BumpArgs {
    /// Layer these arguments over options loaded from configuration.
    ///
    /// A first positional that is neither a release kind, `prompt`, nor a
    /// version is treated as the first file pattern.
    pub fn apply(&self, mut options: BumpOptions) -> BumpOptions {
        let mut files = self.files.clone();
        match self.release.as_deref() {
            Some(release) if looks_like_release(release) => {
                options.release = Some(release.to_string());
            }
            Some(pattern) => files.insert(0, pattern.to_string()),
            None => {}
        }
        if !files.is_empty() {
            options.files = files;
        }

        if let Some(preid) = &self.preid {
            options.preid = Some(preid.clone());
        }
        options.commit = toggle(self.no_commit, self.commit.as_deref(), options.commit);
        options.tag = toggle(self.no_tag, self.tag.as_deref(), options.tag);
        if self.no_push {
            options.push = false;
        } else if self.push {
            options.push = true;
        }

        options.all |= self.all;
        options.no_verify |= self.no_verify;
        options.sign |= self.sign;
        options.recursive |= self.recursive;
        options.ignore_scripts |= self.ignore_scripts;
        if self.yes {
            options.confirm = false;
        }
        if let Some(execute) = &self.execute {
            options.execute = Some(execute.clone());
        }
        if let Some(current) = &self.current_version {
            options.current_version = Some(current.clone());
        }
        options
    }
}

fn looks_like_release(value: &str) -> bool {
    value == "prompt" || is_release_kind(value) || is_valid_version(value)
}

fn toggle(disabled: bool, template: Option<&str>, configured: Toggle) -> Toggle {
    match (disabled, template) {
        (true, _) => Toggle::Enabled(false),
        (false, Some("")) => Toggle::Enabled(true),
        (false, Some(template)) => Toggle::Template(template.to_string()),
        (false, None) => configured,
    }
}

/// Execute the bump.
#[instrument(name = "cmd_bump", skip_all, fields(json_output, quiet))]
pub fn cmd_bump(
    args: &BumpArgs,
    global_json: bool,
    quiet: bool,
    config: &Config,
    cwd: &Utf8Path,
) -> anyhow::Result<()> {
    debug!(json_output = global_json, "executing bump command");

    let mut options = args.apply(config.bump_options());
    options.cwd = Some(cwd.to_path_buf());

    let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
    let mut terminal = TerminalPrompter;
    let prompter = interactive.then_some(&mut terminal as &mut dyn Prompter);

    let show_progress = !global_json && !quiet;
    let execute = options.execute.clone();
    let listener = move |progress: &Progress| {
        if show_progress {
            print_progress(progress, execute.as_deref());
        }
    };

    let results = version_bump(&options, prompter, Some(Box::new(listener)))?;

    if global_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&results).context("failed to serialize results")?
        );
    }
    Ok(())
}

fn print_progress(progress: &Progress, execute: Option<&str>) {
    let done = "✔".if_supports_color(Stream::Stdout, |t| t.green());
    let results = &progress.results;
    match progress.event {
        ProgressEvent::FileUpdated => {
            if let Some(file) = results.updated_files.last() {
                println!(
                    "{done} Updated {} to {}",
                    file.if_supports_color(Stream::Stdout, |t| t.bold()),
                    results
                        .new_version
                        .if_supports_color(Stream::Stdout, |t| t.green())
                );
            }
        }
        ProgressEvent::FileSkipped => {
            if let Some(file) = results.skipped_files.last() {
                println!(
                    "{} {} did not need to be updated",
                    "ℹ".if_supports_color(Stream::Stdout, |t| t.cyan()),
                    file.if_supports_color(Stream::Stdout, |t| t.bold())
                );
            }
        }
        ProgressEvent::GitCommit => println!("{done} Git commit"),
        ProgressEvent::GitTag => println!("{done} Git tag"),
        ProgressEvent::GitPush => println!("{done} Git push"),
        ProgressEvent::ScriptRan(script) => println!("{done} Npm run {script}"),
        ProgressEvent::CommandExecuted => {
            println!(
                "{done} Executed {}",
                execute
                    .unwrap_or_default()
                    .if_supports_color(Stream::Stdout, |t| t.dimmed())
            );
        }
    }
}
