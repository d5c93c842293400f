use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const DB_FILE: &str = "vertexhire.db";
pub const LOG_FILE: &str = "vertexhire.log";
pub const LOG_ENV: &str = "VERTEXHIRE_LOG";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub reply_delay: Duration,
}

impl Config {
    pub fn resolve(db: Option<PathBuf>, reply_delay_ms: u64) -> Self {
        Self {
            db_path: db.unwrap_or_else(default_db_path),
            reply_delay: Duration::from_millis(reply_delay_ms),
        }
    }

    /// Log file used while the full-screen UI owns the terminal.
    pub fn log_path(&self) -> PathBuf {
        match self.db_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(LOG_FILE),
            _ => PathBuf::from(LOG_FILE),
        }
    }
}

fn default_db_path() -> PathBuf {
    // XDG data directory, or the working directory when there is none
    directories::ProjectDirs::from("", "", "vertexhire")
        .map(|dirs| dirs.data_dir().join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}

pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub fn init_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
