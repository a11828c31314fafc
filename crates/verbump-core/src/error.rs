//! Error types for verbump-core.
//!
//! Each module owns its error enum; this module defines the configuration
//! error and re-exports the rest so callers can match on them from one
//! place. [`BumpError`] wraps everything the pipeline can fail with.

use thiserror::Error;

pub use crate::bump::{BumpError, BumpResult};
pub use crate::files::FileError;
pub use crate::git::GitError;
pub use crate::options::OptionsError;
pub use crate::prompt::PromptError;
pub use crate::resolve::ResolveError;
pub use crate::scripts::ScriptError;
pub use crate::version::VersionError;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file is malformed or holds a value of the wrong type.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;
