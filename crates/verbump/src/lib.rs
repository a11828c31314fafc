//! Library interface for the `verbump` CLI.
//!
//! Exposes the argument parser and the command implementation as a library,
//! primarily for documentation generation and testing. The actual entry
//! point is in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`commands`] - Command implementation
//! - [`prompter`] - Terminal prompts backing interactive mode

pub mod commands;

pub mod prompter;

use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// Exit code for command-line usage errors.
pub const USAGE_EXIT_CODE: u8 = 9;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG            Log filter (e.g., debug, verbump_core=trace)
    VERBUMP_LOG_PATH    Explicit log file path
    VERBUMP_LOG_DIR     Log directory
    DEBUG               Print full error details on failure
";

/// Command-line interface definition for verbump.
#[derive(Parser, Debug)]
#[command(name = "verbump")]
#[command(about = "Bump the version in package.json, then commit, tag and push", long_about = None)]
#[command(version)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// What to bump and where.
    #[command(flatten)]
    pub bump: commands::bump::BumpArgs,

    /// Path to configuration file (overrides discovery)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses progress and warnings)
    #[arg(short, long)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Print the results as JSON instead of progress lines
    #[arg(long)]
    pub json: bool,
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}
