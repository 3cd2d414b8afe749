//! Sluice CLI - binary entry point.
//!
//! ```text
//! main() -> init_tracing() -> SluiceConfig::load() -> resolve()
//!                                                        |
//!                                                        v
//!                     Pipeline::run(ctrl_c) -> RunSummary -> exit
//! ```
//!
//! Report lines go to stdout through [`ConsoleReporter`]. Diagnostics go to
//! the log file only, so they never interleave with the report stream.
//!
//! The first Ctrl-C closes the channel and lets the buffer drain. A second
//! Ctrl-C during the drain discards what is left.

use anyhow::{Context, Result};
use std::{
    fs::{self, File, OpenOptions},
    future::pending,
    iter,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sluice_config::{SluiceConfig, config_path};
use sluice_console::ConsoleReporter;
use sluice_engine::Pipeline;

const LOG_FILE_NAME: &str = "sluice.log";

/// Log directories in order of preference: next to the config file, then
/// `./.sluice/logs`.
fn log_file_candidates() -> impl Iterator<Item = PathBuf> {
    config_path()
        .and_then(|config| config.parent().map(|dir| dir.join("logs")))
        .into_iter()
        .chain(iter::once(PathBuf::from(".sluice").join("logs")))
        .map(|dir| dir.join(LOG_FILE_NAME))
}

fn open_log_file(problems: &mut Vec<String>) -> Option<(PathBuf, File)> {
    log_file_candidates().find_map(|path| {
        let opened = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| OpenOptions::new().create(true).append(true).open(&path));
        match opened {
            Ok(file) => Some((path, file)),
            Err(e) => {
                problems.push(format!("Cannot log to {}: {e}", path.display()));
                None
            }
        }
    })
}

/// Without a usable log file diagnostics are dropped; stdout belongs to the
/// report lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let mut problems = Vec::new();
    let (log_path, file_layer) = match open_log_file(&mut problems) {
        Some((path, file)) => (
            Some(path),
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter)
        .init();

    if let Some(path) = log_path {
        tracing::info!(path = %path.display(), "Logging initialized");
    }
    for problem in problems {
        tracing::warn!("{problem}");
    }
}

/// One shutdown request per call. If the handler cannot be installed the
/// request never arrives and the run ends through the producer's own close.
async fn ctrl_c_request() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        pending::<()>().await;
    }
    tracing::info!("Ctrl-C received");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = SluiceConfig::load()
        .context("failed to load configuration")?
        .unwrap_or_default();
    let settings = config.resolve().context("invalid configuration")?;

    let reporter = Arc::new(ConsoleReporter::stdout(settings.color));
    let summary = Pipeline::new(settings.run, reporter)
        .run(ctrl_c_request)
        .await
        .context("pipeline failed")?;

    tracing::info!(
        written = summary.written,
        dropped = summary.dropped,
        read = summary.read,
        discarded = summary.discarded,
        closed_by_producer = summary.closed_by_producer,
        "Run complete"
    );
    Ok(())
}
