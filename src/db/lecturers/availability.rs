use rusqlite::Connection;
use tracing::debug;

use crate::db::error::{DaoError, DaoResult, PersistenceContext};
use crate::db::statement::{insert_returning_key, prepare_statement, SqlValue};
use crate::models::Availability;

const INSERT_QUERY: &str = r#"INSERT INTO available (lecturer, start, "end") VALUES (?, ?, ?)"#;
const FIND_BY_LECTURER_QUERY: &str = r#"SELECT id, start, "end" FROM available WHERE lecturer = ?"#;

/// Availability windows of a single lecturer, reachable only from inside `db`.
pub(in crate::db) struct AvailabilityDao<'c> {
    conn: &'c Connection,
}

impl<'c> AvailabilityDao<'c> {
    pub(in crate::db) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub(in crate::db) fn insert(
        &self,
        availability: &Availability,
        lecturer_id: Option<i64>,
    ) -> DaoResult<i64> {
        let lecturer_id = lecturer_id.ok_or(DaoError::InvalidState(
            "lecturer id must be set before adding availability",
        ))?;
        if availability.id.is_some() {
            return Err(DaoError::InvalidState(
                "availability id must be unset, it already exists",
            ));
        }

        let values = [
            SqlValue::from(lecturer_id),
            SqlValue::from(availability.start),
            SqlValue::from(availability.end),
        ];
        let id = insert_returning_key(self.conn, INSERT_QUERY, &values, "create availability")?;
        debug!(id, lecturer_id, "inserted availability");
        Ok(id)
    }

    pub(in crate::db) fn find_for_lecturer(
        &self,
        lecturer_id: i64,
    ) -> DaoResult<Vec<Availability>> {
        let action = "fetch availability";
        let mut stmt =
            prepare_statement(self.conn, FIND_BY_LECTURER_QUERY, false, &[lecturer_id.into()])
                .persistence(action)?;
        stmt.fetch_all(|row| {
            Ok(Availability {
                id: Some(row.get(0)?),
                start: row.get(1)?,
                end: row.get(2)?,
            })
        })
        .persistence(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::scratch_store;
    use crate::db::ConnectionProvider;

    #[test]
    fn insert_then_read_back() {
        let (_dir, connector) = scratch_store();
        let conn = connector.connection().unwrap();
        conn.execute("INSERT INTO lecturer (name) VALUES ('Slot Owner')", [])
            .unwrap();
        let dao = AvailabilityDao::new(&conn);

        let id = dao.insert(&Availability::new(900, 1130), Some(1)).unwrap();
        let stored = dao.find_for_lecturer(1).unwrap();

        assert_eq!(
            stored,
            vec![Availability {
                id: Some(id),
                start: 900,
                end: 1130,
            }]
        );
    }

    #[test]
    fn lecturer_without_windows_resolves_empty() {
        let (_dir, connector) = scratch_store();
        let conn = connector.connection().unwrap();

        assert!(AvailabilityDao::new(&conn).find_for_lecturer(42).unwrap().is_empty());
    }

    #[test]
    fn insert_requires_parent_id() {
        let (_dir, connector) = scratch_store();
        let conn = connector.connection().unwrap();

        let err = AvailabilityDao::new(&conn)
            .insert(&Availability::new(800, 1000), None)
            .unwrap_err();

        assert!(matches!(err, DaoError::InvalidState(_)));
    }
}
