//! File logging. The TUI owns the terminal, so nothing is ever logged to stdout/stderr.

use anyhow::{anyhow, Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use std::env;
use std::fs;
use std::path::Path;

pub const LEVEL_ENV: &str = "KANBAN_LOG";
const LOG_FILE_BASENAME: &str = "kanban";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Starts the file logger under `<dir>/logs`. The returned handle must stay alive
/// for the lifetime of the program.
pub fn init(configured_level: &str, dir: &Path) -> Result<LoggerHandle> {
    let requested = env::var(LEVEL_ENV).unwrap_or_else(|_| configured_level.to_string());
    let level = normalize_level(&requested)?;
    let log_dir = dir.join("logs");
    fs::create_dir_all(&log_dir).with_context(|| format!("creating {:?}", log_dir))?;

    let handle = Logger::try_with_str(level)
        .with_context(|| format!("invalid log level `{}`", level))?
        .log_to_file(
            FileSpec::default()
                .directory(&log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .context("starting logger")?;

    info!(
        "kanban {} started, level={} dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(handle)
}

fn normalize_level(level: &str) -> Result<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(anyhow!(
            "unsupported log level `{}` (expected trace|debug|info|warn|error|off)",
            other
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_level;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert_eq!(normalize_level("off").unwrap(), "off");
    }

    #[test]
    fn normalize_level_rejects_unknown_values() {
        let err = normalize_level("loud").unwrap_err();
        assert!(err.to_string().contains("unsupported log level"));
    }
}
