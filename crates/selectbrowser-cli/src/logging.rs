//! Daily log file in the temp directory.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "selectbrowser=info,selectbrowser_core=info";

/// `selectbrowser-YYYY-MM-DD.log`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("selectbrowser-{}.log", date.format("%Y-%m-%d"))
}

/// Open (or create) the log file for `date` in append mode.
pub fn open_log_file(dir: &Path, date: NaiveDate) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(log_file_name(date)))
}

/// Initialize logging to today's file, or stderr if it cannot be opened.
pub fn init(log_dir: Option<&Path>) {
    // RUST_LOG overrides the default filter
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let dir = log_dir.map_or_else(std::env::temp_dir, PathBuf::from);

    match open_log_file(&dir, Local::now().date_naive()) {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init(),
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(io::stderr)
                .init();
            warn!("Failed to open log file in {}: {}", dir.display(), e);
        }
    }
}
