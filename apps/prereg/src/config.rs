//! # Configuration
//!
//! Runtime settings resolved from flags and the environment.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Database file used when neither `--db` nor `PREREG_DB` is given.
pub const DEFAULT_DB_PATH: &str = "student_registration.redb";

/// Environment variable overriding the database path.
pub const DB_PATH_ENV: &str = "PREREG_DB";

/// Log filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Path of the redb database file.
    pub db_path: PathBuf,
    /// Emit JSON instead of text.
    pub json: bool,
}

impl AppConfig {
    pub fn new(db_path: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            db_path: db_path.into(),
            json,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH, false)
    }
}

/// `RUST_LOG` if it parses, [`DEFAULT_LOG_FILTER`] otherwise.
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter())
        .with_target(false)
        .try_init();
}
