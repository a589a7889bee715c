use std::{
    fs::{self, File, OpenOptions},
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, anyhow};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use crate::cli::LogLevel;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Filter for our crates at `level`, everything else at `warn`.
/// `RUST_LOG` wins when set.
fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_directive();
        EnvFilter::new(format!("weather_bot={level},weather_core={level},warn"))
    })
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

/// Installs the global subscriber writing plain-text lines to `path`.
pub fn init(level: LogLevel, path: &Path) -> anyhow::Result<()> {
    let file = open_log_file(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
        .try_init()
        .map_err(|err| anyhow!("Failed to install log subscriber: {err}"))
}
