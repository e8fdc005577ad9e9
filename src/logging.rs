use std::fs;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{AppPaths, DEFAULT_LOG_FILTER};

/// Install the global subscriber. Output goes to a file in the data directory
/// because the terminal belongs to the TUI while the app runs. Writes are
/// synchronous; there is no background logging thread.
pub fn init(paths: &AppPaths) -> Result<()> {
    fs::create_dir_all(&paths.data_dir).context("failed to create data directory")?;

    let appender = tracing_appender::rolling::never(&paths.data_dir, paths.log_file_name);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(appender).with_ansi(false))
        .try_init()
        .context("failed to install log subscriber")
}
