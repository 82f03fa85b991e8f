//! Run logging
//!
//! Logs go to stderr and, when the config directory exists, to a dated file
//! under ~/.config/inkfont/logs/.

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config_file::ConfigFile;

pub const DEFAULT_FILTER: &str = "inkfont=info";
pub const VERBOSE_FILTER: &str = "inkfont=debug";

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    ConfigFile::logs_dir()
}

/// Name of today's log file
pub fn log_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d");
    format!("inkfont-{timestamp}.log")
}

/// Get the path to the current log file
pub fn current_log_file() -> PathBuf {
    logs_dir().join(log_file_name())
}

/// Initialize the logs directory
pub fn initialize_logs_directory() -> anyhow::Result<()> {
    fs::create_dir_all(logs_dir())?;
    Ok(())
}

/// `RUST_LOG` wins, then `--verbose`, then the settings file, then the default.
pub fn filter_directive(verbose: bool, configured: Option<&str>) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        if !env.is_empty() {
            return env;
        }
    }
    if verbose {
        return VERBOSE_FILTER.to_string();
    }
    configured.unwrap_or(DEFAULT_FILTER).to_string()
}

/// Install the global subscriber. Keep the returned guard alive for the
/// whole run so buffered file output is flushed on exit.
pub fn init(verbose: bool, configured: Option<&str>) -> Option<WorkerGuard> {
    let directive = filter_directive(verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let console = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard, file_problem) = match open_log_file() {
        Ok((writer, guard)) => (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
            None,
        ),
        Err(e) => (None, None, Some(e)),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();

    if installed.is_ok() {
        match file_problem {
            Some(e) => tracing::warn!("File logging disabled: {}", e),
            None => tracing::debug!("Logging to {:?}", current_log_file()),
        }
    }
    guard
}

fn open_log_file() -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    // never create the config directory just to log
    let config_dir = ConfigFile::config_dir();
    if !config_dir.exists() {
        return Err(anyhow::anyhow!(
            "config directory {:?} does not exist (run with --new-config)",
            config_dir
        ));
    }
    initialize_logs_directory()?;
    let appender = tracing_appender::rolling::never(logs_dir(), log_file_name());
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_files_are_dated() {
        let name = log_file_name();
        assert!(name.starts_with("inkfont-"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "inkfont-YYYY-MM-DD.log".len());
    }

    #[test]
    fn verbose_beats_the_settings_file() {
        if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() {
            return;
        }
        assert_eq!(filter_directive(true, Some("inkfont=warn")), VERBOSE_FILTER);
        assert_eq!(filter_directive(false, Some("inkfont=warn")), "inkfont=warn");
        assert_eq!(filter_directive(false, None), DEFAULT_FILTER);
    }
}
