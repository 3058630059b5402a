use rusqlite::Connection;
use tracing::debug;

use crate::db::error::{DaoError, DaoResult, PersistenceContext};
use crate::db::statement::{insert_returning_key, prepare_statement, SqlValue};
use crate::models::Contact;

const INSERT_QUERY: &str = "INSERT INTO contact (lecturer, number, email) VALUES (?, ?, ?)";
const FIND_BY_LECTURER_QUERY: &str = "SELECT id, number, email FROM contact WHERE lecturer = ?";

/// Contact rows of a single lecturer. Only the lecturer accessor and the
/// association resolver hold one, always on a connection they already own.
pub(in crate::db) struct ContactDao<'c> {
    conn: &'c Connection,
}

impl<'c> ContactDao<'c> {
    pub(in crate::db) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert `contact` for the lecturer with `lecturer_id` and return the
    /// generated key. The caller assigns it once its own write is final.
    pub(in crate::db) fn insert(
        &self,
        contact: &Contact,
        lecturer_id: Option<i64>,
    ) -> DaoResult<i64> {
        let lecturer_id = lecturer_id.ok_or(DaoError::InvalidState(
            "lecturer id must be set before adding contacts",
        ))?;
        if contact.id.is_some() {
            return Err(DaoError::InvalidState("contact id must be unset, it already exists"));
        }

        let values = [
            SqlValue::from(lecturer_id),
            SqlValue::from(contact.number.as_str()),
            SqlValue::from(contact.email.as_str()),
        ];
        let id = insert_returning_key(self.conn, INSERT_QUERY, &values, "create contact")?;
        debug!(id, lecturer_id, "inserted contact");
        Ok(id)
    }

    /// Every contact owned by the lecturer, in store order.
    pub(in crate::db) fn find_for_lecturer(&self, lecturer_id: i64) -> DaoResult<Vec<Contact>> {
        let action = "fetch contacts";
        let mut stmt =
            prepare_statement(self.conn, FIND_BY_LECTURER_QUERY, false, &[lecturer_id.into()])
                .persistence(action)?;
        stmt.fetch_all(|row| {
            Ok(Contact {
                id: Some(row.get(0)?),
                number: row.get(1)?,
                email: row.get(2)?,
            })
        })
        .persistence(action)
    }
}
