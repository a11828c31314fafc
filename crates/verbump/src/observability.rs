//! Logging setup.
//!
//! Progress and results go to stdout, so log records never do. They are
//! written as JSON lines to a daily-rolled file, and mirrored to stderr in
//! compact form when `-v` is given.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const ENV_LOG_PATH: &str = "VERBUMP_LOG_PATH";
const ENV_LOG_DIR: &str = "VERBUMP_LOG_DIR";
const LOG_FILE_SUFFIX: &str = ".jsonl";

/// Where logs go and how loudly.
#[derive(Clone, Debug)]
pub struct ObservabilityConfig {
    /// Service name; also the log file stem.
    pub service: String,
    /// Log directory from configuration, below the env overrides.
    pub log_dir: Option<PathBuf>,
    /// Mirror records to stderr.
    pub stderr: bool,
}

impl ObservabilityConfig {
    /// Build from the environment, the configured log directory, and the
    /// CLI verbosity.
    pub fn from_env_with_overrides(log_dir: Option<PathBuf>, verbose: u8) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            log_dir,
            stderr: verbose > 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LogTarget {
    dir: PathBuf,
    file_name: String,
}

/// Hold for the life of the process so buffered records get flushed.
pub struct ObservabilityGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// A missing or unwritable log directory disables the file layer rather than
/// failing the run.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_observability(
    cfg: &ObservabilityConfig,
    env_filter: EnvFilter,
) -> Result<ObservabilityGuard> {
    let (file_layer, file_guard) = match resolve_log_target(&cfg.service, cfg.log_dir.as_deref()) {
        Ok(target) => {
            let appender = tracing_appender::rolling::daily(&target.dir, &target.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(reason) => {
            if cfg.stderr {
                eprintln!("Warning: {reason}; file logging disabled");
            }
            (None, None)
        }
    };

    let stderr_layer = cfg.stderr.then(|| {
        fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::debug!("observability initialized");

    Ok(ObservabilityGuard {
        _file_guard: file_guard,
    })
}

/// Build an `EnvFilter` from CLI flags and environment.
///
/// Priority: quiet flag > verbose flag > RUST_LOG env > default_level
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

// ============================================================================
// Log Target Resolution
// ============================================================================

fn resolve_log_target(service: &str, config_log_dir: Option<&Path>) -> Result<LogTarget, String> {
    let path_override = std::env::var_os(ENV_LOG_PATH).map(PathBuf::from);
    let dir_override = std::env::var_os(ENV_LOG_DIR).map(PathBuf::from);
    let data_dir = directories::ProjectDirs::from("", "", service)
        .map(|dirs| dirs.data_local_dir().join("logs"));

    resolve_log_target_with(
        service,
        path_override,
        dir_override,
        config_log_dir.map(PathBuf::from),
        data_dir,
    )
}

/// The working directory is never a candidate: a log file there would end
/// up in the release commit under `--all`.
fn resolve_log_target_with(
    service: &str,
    path_override: Option<PathBuf>,
    dir_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<LogTarget, String> {
    if let Some(path) = path_override {
        return log_target_from_path(path);
    }

    let file_name = format!("{service}{LOG_FILE_SUFFIX}");
    let dir = dir_override
        .or(config_dir)
        .or(data_dir)
        .ok_or_else(|| "no log directory available".to_string())?;
    ensure_writable(&dir, &file_name)?;
    Ok(LogTarget { dir, file_name })
}

fn log_target_from_path(path: PathBuf) -> Result<LogTarget, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| format!("{ENV_LOG_PATH} must end in a UTF-8 file name"))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_writable(&dir, &file_name)?;

    Ok(LogTarget { dir, file_name })
}

fn ensure_writable(dir: &Path, file_name: &str) -> Result<(), String> {
    std::fs::create_dir_all(dir)
        .map_err(|e| format!("cannot create log directory {}: {e}", dir.display()))?;

    let path = dir.join(file_name);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| format!("cannot open log file {}: {e}", path.display()))?;

    Ok(())
}
