//! Core library for verbump.
//!
//! Bumps the semantic version in `package.json` (and friends), then runs the
//! npm lifecycle scripts, an optional command, and the git commit, tag and
//! push. The `verbump` CLI is a thin display layer over [`version_bump`].
//!
//! # Modules
//!
//! - [`bump`] - The pipeline driver
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`files`] - File pattern expansion and version rewriting
//! - [`git`] - Commit, tag and push
//! - [`manifest`] - Recognizing package manifests
//! - [`operation`] - Pipeline state and progress events
//! - [`options`] - Raw and normalized options
//! - [`prompt`] - The interactive collaborator trait
//! - [`release`] - Release kinds and requests
//! - [`resolve`] - Finding the current version
//! - [`scripts`] - npm lifecycle scripts and the execute command
//! - [`version`] - Computing the next version
//!
//! # Quick Start
//!
//! ```no_run
//! use verbump_core::{BumpOptions, Toggle, version_bump};
//!
//! let options = BumpOptions {
//!     release: Some("minor".into()),
//!     confirm: false,
//!     push: false,
//!     tag: Toggle::Enabled(false),
//!     ..BumpOptions::default()
//! };
//! let results = version_bump(&options, None, None).expect("bump failed");
//! println!("{} -> {}", results.old_version, results.new_version);
//! ```
#![deny(unsafe_code)]

pub mod bump;

pub mod config;

pub mod error;

pub mod files;

pub mod git;

pub mod manifest;

pub mod operation;

pub mod options;

pub mod prompt;

pub mod release;

pub mod resolve;

pub mod scripts;

pub mod version;

pub use bump::{BumpError, BumpResult, version_bump, version_bump_info};

pub use config::{Config, ConfigLoader, LogLevel};

pub use error::{ConfigError, ConfigResult};

pub use operation::{BumpResults, Operation, Progress, ProgressCallback, ProgressEvent, Summary};

pub use options::{BumpOptions, Toggle};

pub use prompt::{PromptError, PromptResult, Prompter, VersionChoice, VersionSelection};

pub use release::{ReleaseKind, ReleaseRequest};

// Re-export semver so downstream crates don't need a direct dependency.
pub use semver;
