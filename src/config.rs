//! Runtime settings resolved from command-line flags and the environment.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::default_db_path;

/// Tracing filter used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Everything the binary needs to open the store and set up logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// SQLite file backing the store.
    pub database_path: PathBuf,
    /// Drop, recreate and reseed every table on startup.
    pub reset: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Settings {
    /// Fill in defaults for anything the user left out. The database lives
    /// under the home directory unless a path is given explicitly.
    pub fn resolve(
        database: Option<PathBuf>,
        reset: bool,
        log_filter: Option<String>,
    ) -> Result<Self> {
        let database_path = match database {
            Some(path) => path,
            None => default_db_path()?,
        };

        Ok(Self {
            database_path,
            reset,
            log_filter: log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Make sure the folder holding the database file exists.
    pub fn ensure_data_dir(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let settings = Settings::resolve(
            Some(PathBuf::from("/tmp/sched.sqlite")),
            true,
            Some("debug".to_string()),
        )
        .unwrap();

        assert_eq!(settings.database_path, PathBuf::from("/tmp/sched.sqlite"));
        assert!(settings.reset);
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn log_filter_defaults_to_warn() {
        let settings = Settings::resolve(Some(PathBuf::from("db.sqlite")), false, None).unwrap();
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn ensure_data_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("db.sqlite");
        let settings = Settings::resolve(Some(nested.clone()), false, None).unwrap();

        settings.ensure_data_dir().unwrap();

        assert!(nested.parent().unwrap().is_dir());
    }
}
