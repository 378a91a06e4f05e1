use std::{fs, io};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

static INIT: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// Logs go to stderr so stdout stays reserved for the verdict.
///
/// With a log directory configured, the returned guard must be held until
/// exit: dropping it flushes the file writer. Later calls are no-ops and
/// return `None`.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let mut guard = None;
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let console_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .with_ansi(true);

        let file_layer = match &config.logs_dir {
            Some(dir) => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create directory {}", dir.display()))?;
                let file_appender = tracing_appender::rolling::daily(dir, "spam-link-guard.log");
                let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
                guard = Some(file_guard);
                Some(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_ansi(false),
                )
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .context("failed to install tracing subscriber")?;

        match &config.logs_dir {
            Some(dir) => tracing::debug!(target: "config", logs = %dir.display(), "tracing initialized"),
            None => tracing::debug!(target: "config", "tracing initialized"),
        }
        Ok(())
    })?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logs_are_flushed_when_the_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "info".to_string(),
            logs_dir: Some(dir.path().join("logs")),
        };

        let guard = init_tracing(&config).unwrap();
        assert!(guard.is_some());
        assert!(init_tracing(&config).unwrap().is_none());

        tracing::warn!(target: "config", "written before exit");
        drop(guard);

        let written: String = fs::read_dir(dir.path().join("logs"))
            .unwrap()
            .filter_map(|entry| fs::read_to_string(entry.ok()?.path()).ok())
            .collect();
        assert!(written.contains("written before exit"));
    }
}
