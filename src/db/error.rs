use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by every record accessor.
pub type DaoResult<T> = Result<T, DaoError>;

/// Failures surfaced by the data-access layer.
///
/// `InvalidState` is a caller bug and is raised before any connection is
/// acquired. Every other variant means the store itself refused or failed.
#[derive(Error, Debug)]
pub enum DaoError {
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("failed to open database at {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to {action}: {source}")]
    Persistence {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("could not {0}, no rows were affected")]
    NoRowsAffected(&'static str),

    #[error("could not {0}, no id was returned by the database")]
    MissingGeneratedKey(&'static str),
}

impl DaoError {
    /// True for anything the store did wrong, as opposed to a caller bug.
    pub fn is_persistence(&self) -> bool {
        !matches!(self, DaoError::InvalidState(_))
    }
}

/// Attach the attempted action to a raw rusqlite error, the same way
/// `anyhow::Context` does for the application layer.
pub(crate) trait PersistenceContext<T> {
    fn persistence(self, action: &'static str) -> DaoResult<T>;
}

impl<T> PersistenceContext<T> for rusqlite::Result<T> {
    fn persistence(self, action: &'static str) -> DaoResult<T> {
        self.map_err(|source| DaoError::Persistence { action, source })
    }
}
