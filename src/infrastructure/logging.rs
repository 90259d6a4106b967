use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

static INIT: OnceCell<()> = OnceCell::new();
static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Console output always; a daily rolling file when a logs directory is set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let logs_dir = config.logs_dir.as_deref().map(ensure_dir).transpose()?;
        let file_layer = logs_dir.as_ref().map(|dir| {
            let file_appender = tracing_appender::rolling::daily(dir, "detector.log");
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let _ = GUARD.set(guard);
            fmt::layer()
                .with_writer(file_writer)
                .with_target(true)
                .with_ansi(false)
        });

        let console_layer = fmt::layer()
            .with_writer(io::stdout)
            .with_target(true)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        match &logs_dir {
            Some(dir) => tracing::info!(logs = %dir.display(), "tracing initialized"),
            None => tracing::info!("tracing initialized (console only)"),
        }
        Ok(())
    })?;
    Ok(())
}

fn ensure_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    fs::create_dir_all(&dir).with_context(|| format!("failed to create log directory {path}"))?;
    Ok(dir.canonicalize().unwrap_or(dir))
}
