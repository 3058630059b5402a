//! Positional parameter binding shared by every record accessor.
//!
//! Values go through the closed [`SqlValue`] enum instead of arbitrary
//! `ToSql` trait objects, so each accessor spells out exactly which column
//! types it writes and the compiler checks the conversions.

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, Row, Rows, Statement};
use tracing::debug;

use super::error::{DaoError, DaoResult, PersistenceContext};

/// A single bindable query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Int(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            SqlValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            SqlValue::Bool(true) => ToSqlOutput::Owned(Value::Integer(1)),
            SqlValue::Bool(false) => ToSqlOutput::Owned(Value::Integer(0)),
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
        })
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// A prepared statement with every parameter already bound, ready to run.
pub struct BoundStatement<'conn> {
    conn: &'conn Connection,
    stmt: Statement<'conn>,
    return_keys: bool,
}

impl<'conn> BoundStatement<'conn> {
    /// Run an INSERT/UPDATE/DELETE and report how many rows it touched.
    pub fn execute_update(&mut self) -> rusqlite::Result<usize> {
        self.stmt.raw_execute()
    }

    /// Run a SELECT and hand back its row cursor.
    pub fn query(&mut self) -> Rows<'_> {
        self.stmt.raw_query()
    }

    /// Run a SELECT and map every row.
    pub fn fetch_all<T, F>(&mut self, f: F) -> rusqlite::Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.stmt.raw_query().mapped(f).collect()
    }

    /// Run a SELECT and map only the first row, if any.
    pub fn fetch_first<T, F>(&mut self, f: F) -> rusqlite::Result<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut rows = self.stmt.raw_query();
        match rows.next()? {
            Some(row) => f(row).map(Some),
            None => Ok(None),
        }
    }

    /// Key generated by the last insert on this connection. `None` when the
    /// statement was prepared without key retrieval or nothing was inserted.
    pub fn generated_key(&self) -> Option<i64> {
        if !self.return_keys {
            return None;
        }
        match self.conn.last_insert_rowid() {
            0 => None,
            id => Some(id),
        }
    }
}

/// Prepare `query` on `conn` and bind `values` to its `?` placeholders in
/// order. Nothing is executed.
pub fn prepare_statement<'conn>(
    conn: &'conn Connection,
    query: &str,
    return_keys: bool,
    values: &[SqlValue],
) -> rusqlite::Result<BoundStatement<'conn>> {
    let mut stmt = conn.prepare(query)?;

    let expected = stmt.parameter_count();
    if values.len() != expected {
        return Err(rusqlite::Error::InvalidParameterCount(values.len(), expected));
    }

    for (index, value) in values.iter().enumerate() {
        stmt.raw_bind_parameter(index + 1, value)?;
    }

    debug!(query, params = values.len(), "prepared statement");
    Ok(BoundStatement {
        conn,
        stmt,
        return_keys,
    })
}

/// Run a single-row INSERT and return the key the store generated for it.
pub(crate) fn insert_returning_key(
    conn: &Connection,
    query: &str,
    values: &[SqlValue],
    action: &'static str,
) -> DaoResult<i64> {
    let mut stmt = prepare_statement(conn, query, true, values).persistence(action)?;
    let affected = stmt.execute_update().persistence(action)?;
    if affected == 0 {
        return Err(DaoError::NoRowsAffected(action));
    }
    stmt.generated_key().ok_or(DaoError::MissingGeneratedKey(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT,
                qty INTEGER,
                flag INTEGER
            )",
        )
        .unwrap();
        conn
    }

    #[test]
    fn binds_values_in_order_and_returns_key() {
        let conn = scratch();
        let values = [
            SqlValue::from("widget"),
            SqlValue::from(7_i64),
            SqlValue::from(true),
        ];

        let mut stmt = prepare_statement(
            &conn,
            "INSERT INTO item (label, qty, flag) VALUES (?, ?, ?)",
            true,
            &values,
        )
        .unwrap();

        assert_eq!(stmt.execute_update().unwrap(), 1);
        assert_eq!(stmt.generated_key(), Some(1));

        let (label, qty, flag): (String, i64, i64) = conn
            .query_row("SELECT label, qty, flag FROM item WHERE id = 1", [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .unwrap();
        assert_eq!((label.as_str(), qty, flag), ("widget", 7, 1));
    }

    #[test]
    fn none_binds_as_null() {
        let conn = scratch();
        let label: Option<&str> = None;
        let mut stmt = prepare_statement(
            &conn,
            "INSERT INTO item (label) VALUES (?)",
            false,
            &[label.into()],
        )
        .unwrap();
        stmt.execute_update().unwrap();

        assert_eq!(stmt.generated_key(), None);
        let stored: Option<String> = conn
            .query_row("SELECT label FROM item", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, None);
    }

    #[test]
    fn rejects_mismatched_parameter_count() {
        let conn = scratch();
        let result = prepare_statement(
            &conn,
            "SELECT id FROM item WHERE label = ? AND qty = ?",
            false,
            &[SqlValue::from("only one")],
        );

        assert!(matches!(
            result.err(),
            Some(rusqlite::Error::InvalidParameterCount(1, 2))
        ));
    }

    #[test]
    fn query_reads_back_bound_rows() {
        let conn = scratch();
        conn.execute_batch("INSERT INTO item (label, qty) VALUES ('a', 1), ('b', 2), ('c', 3)")
            .unwrap();

        let mut stmt = prepare_statement(
            &conn,
            "SELECT label FROM item WHERE qty >= ? ORDER BY qty",
            false,
            &[SqlValue::Int(2)],
        )
        .unwrap();
        let mut rows = stmt.query();
        let mut labels = Vec::new();
        while let Some(row) = rows.next().unwrap() {
            labels.push(row.get::<_, String>(0).unwrap());
        }

        assert_eq!(labels, ["b", "c"]);
    }
}
