//! Core library surface for the schedule browser.
//!
//! `db` maps the five scheduling tables into composite records, `console`
//! is the thin interactive front end the binary drives, and `config`
//! resolves where the store lives.
pub mod config;
pub mod console;
pub mod db;
pub mod models;

/// Persistence entry points used by `main.rs` and by external tooling.
pub use db::{
    ConnectionProvider, DaoError, DaoResult, LecturerDao, RecordAccessor, RoomDao, SqliteConnector,
    SubjectDao,
};

/// The composite records that flow out of the accessors.
pub use models::{Availability, Contact, Lecturer, LecturerSchedule, Room, Subject};

pub use config::Settings;
pub use console::Session;
