//! App Core for WinWork.
//!
//! Owns the database and resolves where it lives on disk.

use std::path::{Path, PathBuf};

use crate::database::connection::Database;
use crate::platform;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "WINWORK_DATA_DIR";
/// File name of the link database inside the data directory.
pub const DB_FILE_NAME: &str = "winwork.db";

/// Central application struct.
///
/// Repositories and services borrow the connection with a lifetime, so they
/// are created on demand, e.g. `LinkService::new(app.db.connection())`.
pub struct App {
    pub db: Database,
    db_path: PathBuf,
}

impl App {
    /// Opens the database at `db_path`, creating parent directories as needed.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create data directory {}: {}", parent.display(), e))?;
        }
        let db = Database::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "link store ready");
        Ok(Self { db, db_path })
    }

    /// Opens the database at [`App::default_db_path`].
    pub fn open_default() -> Result<Self, Box<dyn std::error::Error>> {
        Self::new(Self::default_db_path())
    }

    /// `$WINWORK_DATA_DIR/winwork.db`, or the platform data directory.
    pub fn default_db_path() -> PathBuf {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir).join(DB_FILE_NAME),
            _ => platform::get_data_dir().join(DB_FILE_NAME),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}
