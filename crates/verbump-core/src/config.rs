//! Configuration loading and discovery.
//!
//! Settings come from, in order of precedence (highest first):
//! - a file passed explicitly (`--config FILE`)
//! - `.verbump.<ext>` or `verbump.<ext>` in the current directory or any
//!   parent, stopping at the repository root (the first directory holding
//!   `.git`)
//! - `~/.config/verbump/config.<ext>` (user config)
//! - built-in defaults
//!
//! Where `<ext>` is one of: `toml`, `yaml`, `yml`, `json`
//!
//! Every bump setting is optional; command-line flags override whatever the
//! files say. See [`Config::bump_options`].
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use verbump_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let config = ConfigLoader::new()
//!     .with_project_search(&cwd)
//!     .load()
//!     .unwrap();
//! let options = config.bump_options();
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::options::{BumpOptions, Toggle};

/// The configuration for verbump.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application (e.g., "debug", "info", "warn", "error").
    pub log_level: LogLevel,
    /// Directory for JSONL log files (falls back to platform defaults if unset).
    pub log_dir: Option<Utf8PathBuf>,

    /// Prerelease identifier (default `beta`).
    pub preid: Option<String>,
    /// `true`/`false`, or a commit message template such as
    /// `"chore: release v{version}"`.
    pub commit: Option<Toggle>,
    /// `true`/`false`, or a tag name template such as `"v{version}"`.
    pub tag: Option<Toggle>,
    /// Push commits and tags after creating them.
    pub push: Option<bool>,
    /// Stage all tracked changes when committing.
    pub all: Option<bool>,
    /// Bypass git hooks when committing.
    pub no_verify: Option<bool>,
    /// Sign commits and tags.
    pub sign: Option<bool>,
    /// Ask for confirmation before changing anything.
    pub confirm: Option<bool>,
    /// Target file patterns.
    pub files: Option<Vec<String>>,
    /// Bump every `package.json` below the working directory.
    pub recursive: Option<bool>,
    /// Skip npm lifecycle scripts.
    pub ignore_scripts: Option<bool>,
    /// Shell command to run after the files are updated.
    pub execute: Option<String>,
    /// Treat this as the current version instead of reading it from files.
    pub current_version: Option<String>,
}

impl Config {
    /// Bump options with these settings applied over the defaults.
    pub fn bump_options(&self) -> BumpOptions {
        let defaults = BumpOptions::default();
        BumpOptions {
            preid: self.preid.clone(),
            commit: self.commit.clone().unwrap_or(defaults.commit),
            tag: self.tag.clone().unwrap_or(defaults.tag),
            push: self.push.unwrap_or(defaults.push),
            all: self.all.unwrap_or(defaults.all),
            no_verify: self.no_verify.unwrap_or(defaults.no_verify),
            sign: self.sign.unwrap_or(defaults.sign),
            confirm: self.confirm.unwrap_or(defaults.confirm),
            files: self.files.clone().unwrap_or_default(),
            recursive: self.recursive.unwrap_or(defaults.recursive),
            ignore_scripts: self.ignore_scripts.unwrap_or(defaults.ignore_scripts),
            execute: self.execute.clone(),
            current_version: self.current_version.clone(),
            ..defaults
        }
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
pub const APP_NAME: &str = "verbump";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from XDG directory.
    include_user_config: bool,
    /// Stop searching when we hit a directory containing this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load.
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/verbump/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file; later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        tracing::debug!("loading configuration");
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            tracing::debug!(path = %user_config, "user config");
            figment = merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            tracing::debug!(path = %project_config, "project config");
            figment = merge_file(figment, &project_config);
        }

        for file in &self.explicit_files {
            figment = merge_file(figment, file);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::debug!(log_level = config.log_level.as_str(), "configuration loaded");
        Ok(config)
    }

    /// Walk up from `start` looking for a project config file.
    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    return Some(dotfile);
                }
                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    return Some(regular);
                }
            }

            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }
            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        None
    }
}

/// Find the project config file that discovery from `start` would use.
pub fn find_project_config<P: AsRef<Utf8Path>>(start: P) -> Option<Utf8PathBuf> {
    ConfigLoader::new().find_project_config(start.as_ref())
}

fn find_user_config() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    let config_dir = proj_dirs.config_dir();
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}

/// Merge a config file into the figment, detecting format from extension.
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}
