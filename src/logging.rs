//! Tracing setup: stderr always, plus an optional per-run log file.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogConfig;
use crate::error::ConfigError;

/// Keeps the file writer flushing. Drop it only at process exit.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
    pub file_path: Option<PathBuf>,
}

/// File name for a run started at `now`, e.g. `law-digest-2025-03-25_08-00-00.log`.
pub fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("law-digest-{}.log", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init(config: &LogConfig) -> Result<LogGuard, ConfigError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let (file_layer, guard, file_path) = match &config.dir {
        Some(dir) => {
            let (writer, guard, path) = file_writer(dir)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard), Some(path))
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::InvalidValue {
            key: "logging".into(),
            message: e.to_string(),
        })?;

    Ok(LogGuard {
        _file: guard,
        file_path,
    })
}

fn file_writer(
    dir: &Path,
) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard, PathBuf), ConfigError> {
    std::fs::create_dir_all(dir)?;
    let name = log_file_name(chrono::Local::now());
    let path = dir.join(&name);
    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((writer, guard, path))
}
