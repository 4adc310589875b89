//! Logging setup for the CLI.
//!
//! Console output goes to stderr. A log file is written only when a log
//! path or directory is configured, through a non-blocking writer whose
//! guard must live until the process exits.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Explicit log file path.
pub const LOG_PATH_ENV: &str = "ADDON_MAINT_LOG_PATH";
/// Directory receiving `addon-maint.log`.
pub const LOG_DIR_ENV: &str = "ADDON_MAINT_LOG_DIR";

const LOG_FILE_NAME: &str = "addon-maint.log";

/// Where (and whether) to write a log file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Explicit log file.
    pub log_path: Option<PathBuf>,
    /// Directory for the default log file name.
    pub log_dir: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Read the log environment variables, falling back to `config_log_dir`.
    ///
    /// Environment variables take precedence over the configuration file.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        Self::resolve(
            std::env::var_os(LOG_PATH_ENV).map(PathBuf::from),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            config_log_dir,
        )
    }

    fn resolve(
        env_path: Option<PathBuf>,
        env_dir: Option<PathBuf>,
        config_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            log_path: env_path.filter(|p| !p.as_os_str().is_empty()),
            log_dir: env_dir.filter(|p| !p.as_os_str().is_empty()).or(config_dir),
        }
    }

    /// The log file to write, if any.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_path
            .clone()
            .or_else(|| self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME)))
    }
}

/// Build a filter from the CLI verbosity flags.
///
/// `-q` wins over `-v`. Without either flag, `RUST_LOG` is honored, then
/// `default_level`.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    match (quiet, verbose) {
        (true, _) => EnvFilter::new("error"),
        (false, 1) => EnvFilter::new("debug"),
        (false, 2..) => EnvFilter::new("trace"),
        (false, 0) => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level)),
    }
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is enabled.
pub fn init_observability(
    config: &ObservabilityConfig,
    console_filter: EnvFilter,
    file_filter: EnvFilter,
) -> anyhow::Result<Option<WorkerGuard>> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_filter(console_filter);

    let (file_layer, guard) = match config.log_file() {
        Some(path) => {
            let (dir, name) = split_log_path(&path)?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(guard)
}

fn split_log_path(path: &Path) -> anyhow::Result<(&Path, &std::ffi::OsStr)> {
    let name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_log_file_by_default() {
        let config = ObservabilityConfig::resolve(None, None, None);
        assert_eq!(config.log_file(), None);
    }

    #[test]
    fn config_dir_gives_default_file_name() {
        let config = ObservabilityConfig::resolve(None, None, Some(PathBuf::from("/var/log/am")));
        assert_eq!(
            config.log_file(),
            Some(PathBuf::from("/var/log/am/addon-maint.log"))
        );
    }

    #[test]
    fn env_dir_overrides_config_dir() {
        let config = ObservabilityConfig::resolve(
            None,
            Some(PathBuf::from("/tmp/env")),
            Some(PathBuf::from("/tmp/config")),
        );
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/env")));
    }

    #[test]
    fn explicit_path_wins() {
        let config = ObservabilityConfig::resolve(
            Some(PathBuf::from("/tmp/custom.log")),
            Some(PathBuf::from("/tmp/env")),
            None,
        );
        assert_eq!(config.log_file(), Some(PathBuf::from("/tmp/custom.log")));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config = ObservabilityConfig::resolve(Some(PathBuf::new()), Some(PathBuf::new()), None);
        assert_eq!(config.log_file(), None);
    }

    #[test]
    fn quiet_and_verbose_filters() {
        assert_eq!(env_filter(true, 2, "info").to_string(), "error");
        assert_eq!(env_filter(false, 1, "info").to_string(), "debug");
        assert_eq!(env_filter(false, 3, "info").to_string(), "trace");
    }

    #[test]
    fn split_bare_file_name_uses_current_dir() {
        let (dir, name) = split_log_path(Path::new("run.log")).unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "run.log");
    }
}
