//! File-backed logging
//!
//! The terminal UI owns stdout, so log output goes to a file that is truncated
//! on every start. Components log through the regular `tracing` macros with a
//! `target` naming the component (`view`, `api`, `tui`, ...).

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter
pub const LOG_ENV: &str = "STYLESENSE_LOG";

const LOG_FILE_NAME: &str = "stylesense.log";

/// Log file location: the user data dir when it exists, else the working directory
pub fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("stylesense"))
        .filter(|d| std::fs::create_dir_all(d).is_ok())
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE_NAME)
}

/// Build the filter: `STYLESENSE_LOG` wins over the level passed in
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global subscriber. Returns the log path when a file could be opened.
///
/// Calling this twice is harmless; the second call leaves the first subscriber in place.
pub fn init(default_level: &str) -> Option<PathBuf> {
    let path = log_path();
    let file = open_truncated(&path)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(target: "main", path = %path.display(), "logging initialized");
    }
    Some(path)
}

fn open_truncated(path: &PathBuf) -> Option<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .ok()
}

/// Write a separator line for readability between sessions of activity
pub fn separator(label: &str) {
    tracing::info!(target: "main", "========== {} ==========", label);
}
