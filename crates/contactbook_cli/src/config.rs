//! Runtime configuration for the CLI.
//!
//! Values come from command-line flags first, then `CONTACTBOOK_*`
//! environment variables (both handled by clap), then the defaults below.

use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "contactbook";
const DB_FILE_NAME: &str = "contacts.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Fills unset values from the platform data directory.
    pub fn resolve(
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
    ) -> Self {
        Self::resolve_with_base(db_path, log_dir, log_level, &default_base_dir())
    }

    fn resolve_with_base(
        db_path: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
        base_dir: &Path,
    ) -> Self {
        Self {
            db_path: non_empty_path(db_path).unwrap_or_else(|| base_dir.join(DB_FILE_NAME)),
            log_dir: non_empty_path(log_dir).unwrap_or_else(|| base_dir.join(LOG_DIR_NAME)),
            log_level: log_level
                .map(|level| level.trim().to_string())
                .filter(|level| !level.is_empty())
                .unwrap_or_else(|| contactbook_core::default_log_level().to_string()),
        }
    }
}

fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

fn non_empty_path(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|value| !value.as_os_str().is_empty())
}
