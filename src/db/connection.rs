use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;
use rusqlite::Connection;
use tracing::trace;

use super::error::{DaoError, DaoResult};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".schedule-browser";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "scheduler.sqlite";

/// Hands out connections to the scheduling store.
///
/// Accessors ask for one connection per call and drop it before returning,
/// so implementations are free to open a fresh handle every time.
pub trait ConnectionProvider {
    fn connection(&self) -> DaoResult<Connection>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn connection(&self) -> DaoResult<Connection> {
        (**self).connection()
    }
}

/// Opens a new connection to a SQLite file on every request.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    /// Point at a database file. Nothing is opened until the first
    /// [`ConnectionProvider::connection`] call.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The database file this connector opens.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteConnector {
    /// Open the file and toggle `PRAGMA foreign_keys = ON`; SQLite resets it
    /// per connection and the cascade from lecturer to its children depends
    /// on it.
    fn connection(&self) -> DaoResult<Connection> {
        trace!(path = %self.path.display(), "opening connection");
        let conn = Connection::open(&self.path).map_err(|source| DaoError::Connection {
            path: self.path.clone(),
            source,
        })?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|source| DaoError::Connection {
                path: self.path.clone(),
                source,
            })?;
        Ok(conn)
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
pub fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}
