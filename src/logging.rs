use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Overrides the configured level, e.g. `EXOFINDER_LOG=exofinder=debug`
pub const LOG_ENV: &str = "EXOFINDER_LOG";

#[derive(Debug, Clone)]
pub enum LogTarget {
    /// Append to a file; used while the TUI owns the terminal
    File(PathBuf),
    Stderr,
}

pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level))
}

pub fn init(level: &str, target: LogTarget) -> io::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(level));

    let result = match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
    };

    result.map_err(io::Error::other)
}
