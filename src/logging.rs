//! Tracing subscriber setup.
//!
//! Events go to stderr, human-readable or JSON, filtered by `RUST_LOG` when
//! set and by `--verbose` otherwise. An optional log file receives the same
//! events through a non-blocking writer.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LogOptions {
    /// Directive used when `RUST_LOG` is unset.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "msort_health=debug,info"
        } else {
            "info"
        }
    }
}

fn file_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let appender = tracing_appender::rolling::never(dir, name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber. Keep the returned guard alive for the
/// life of the process so buffered file output is flushed.
pub fn init(opts: &LogOptions) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(opts.default_directive()));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(match opts.format {
        LogFormat::Human => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    });

    let mut guard = None;
    if let Some(path) = &opts.file {
        let (writer, file_guard) = file_writer(path)?;
        layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
        guard = Some(file_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_directive() {
        assert_eq!(LogOptions::default().default_directive(), "info");
        let verbose = LogOptions {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(verbose.default_directive(), "msort_health=debug,info");
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("msort.log");
        let (_writer, _guard) = file_writer(&path).unwrap();
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_directive_parses() {
        assert!(EnvFilter::try_new(LogOptions::default().default_directive()).is_ok());
        assert!(EnvFilter::try_new("msort_health=debug,info").is_ok());
    }
}
