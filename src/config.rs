use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-catalog";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log file name, next to the database.
const LOG_FILE_NAME: &str = "library-catalog.log";
/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "library_catalog=info";

/// Where the application keeps its files.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_file_name: &'static str,
}

impl AppPaths {
    /// Resolve every path beneath the current user's home directory.
    pub fn resolve() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::under(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Lay the files out inside an explicit data directory.
    pub fn under(data_dir: PathBuf) -> Self {
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            data_dir,
            log_file_name: LOG_FILE_NAME,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(self.log_file_name)
    }
}
