//! Persistence layer split across logical submodules: one accessor per
//! entity, a typed statement binder they all share, and the resolver that
//! fills nested collections on read.

mod accessor;
mod associations;
pub mod bootstrap;
mod connection;
mod error;
mod lecturers;
mod rooms;
mod statement;
mod subjects;

#[cfg(test)]
mod test_support;

pub use accessor::RecordAccessor;
pub use connection::{default_db_path, ConnectionProvider, SqliteConnector};
pub use error::{DaoError, DaoResult};
pub use lecturers::LecturerDao;
pub use rooms::RoomDao;
pub use statement::{prepare_statement, BoundStatement, SqlValue};
pub use subjects::SubjectDao;
