//! Logging initialization for the graphload binary.
//!
//! Logs always go to STDERR so that STDOUT stays free for command output
//! (stats, search hits). Optionally they are also written to a rolling log
//! file, which is rolled over at 5 MB, compressed on rotation and capped at
//! 20 rotated files.
//!
//! `RUST_LOG` selects the level unless `verbose` forces `debug`.

use anyhow::{Result, anyhow};
use file_rotate::{ContentLimit, FileRotate, compression::Compression, suffix::AppendCount};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const MAX_LOG_BYTES: usize = 5 * 1024 * 1024;
const MAX_ROTATED_FILES: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub format: LogFormat,
    pub verbose: bool,
    /// Also write logs to this rolling file.
    pub file: Option<PathBuf>,
}

/// Guard that keeps background logging workers alive.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn rolling_file(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let writer = FileRotate::new(
        path,
        AppendCount::new(MAX_ROTATED_FILES),
        ContentLimit::Bytes(MAX_LOG_BYTES),
        Compression::OnRotate(1),
        None,
    );
    Ok(tracing_appender::non_blocking(writer))
}

fn stderr_writer() -> (NonBlocking, WorkerGuard) {
    // Drop lines past the buffer limit rather than block when STDERR is not drained.
    NonBlockingBuilder::default()
        .lossy(true)
        .buffered_lines_limit(10_000)
        .finish(std::io::stderr())
}

pub fn init(config: &LogConfig) -> Result<LoggingGuards> {
    let (stderr, stderr_guard) = stderr_writer();
    let mut guards = vec![stderr_guard];

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let (file, file_guard) = rolling_file(path)?;
            guards.push(file_guard);
            (BoxMakeWriter::new(stderr.and(file)), false)
        }
        None => (BoxMakeWriter::new(stderr), std::io::stderr().is_terminal()),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config.verbose))
        .with_writer(writer)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Text => builder.with_ansi(ansi).try_init(),
        LogFormat::Json => builder.with_ansi(false).json().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to initialize logging: {e}"))?;

    Ok(LoggingGuards { _guards: guards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_verbose_forces_debug() {
        assert_eq!(
            env_filter(true).max_level_hint(),
            Some(tracing::level_filters::LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_rolling_file_creates_parent_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs/graphload.log");

        let (mut writer, guard) = rolling_file(&path).unwrap();
        writer.write_all(b"hello\n").unwrap();
        drop(guard);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
