//! Shared fixtures for the storage tests.

use std::cell::Cell;
use std::path::PathBuf;

use rusqlite::Connection;
use tempfile::TempDir;

use super::bootstrap::create_schema;
use super::connection::{ConnectionProvider, SqliteConnector};
use super::error::{DaoError, DaoResult};

/// A fresh store with the full schema and no rows. Keep the `TempDir`
/// alive for as long as the connector is used.
pub(crate) fn scratch_store() -> (TempDir, SqliteConnector) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let connector = SqliteConnector::new(dir.path().join("scheduler.sqlite"));
    create_schema(&connector).expect("failed to create schema");
    (dir, connector)
}

fn unreachable() -> DaoError {
    DaoError::Connection {
        path: PathBuf::from("unreachable.sqlite"),
        source: rusqlite::Error::InvalidPath(PathBuf::from("unreachable.sqlite")),
    }
}

/// Records how often a connection was requested and never hands one out.
#[derive(Debug, Default)]
pub(crate) struct CountingProvider {
    acquired: Cell<usize>,
}

impl CountingProvider {
    pub(crate) fn acquired(&self) -> usize {
        self.acquired.get()
    }
}

impl ConnectionProvider for CountingProvider {
    fn connection(&self) -> DaoResult<Connection> {
        self.acquired.set(self.acquired.get() + 1);
        Err(unreachable())
    }
}

/// A store that is always down.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FailingProvider;

impl ConnectionProvider for FailingProvider {
    fn connection(&self) -> DaoResult<Connection> {
        Err(unreachable())
    }
}
