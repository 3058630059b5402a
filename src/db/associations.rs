//! Follow-up queries that fill the nested collections of a composite record.
//!
//! One-to-many children (contacts, availability) come from a parent-id
//! query against their own table. Many-to-many partners are found through
//! the `subject_lecturer` junction table first, then loaded one id at a
//! time through the owning accessor's row mapping. That is one query per
//! partner, which is fine for a dataset of a few dozen rows.
//!
//! Everything runs on the connection of the accessor call that asked for
//! it, so a single resolve sees its own writes and nothing is cached past
//! the call.

use rusqlite::Connection;
use tracing::{debug, warn};

use super::error::{DaoError, DaoResult, PersistenceContext};
use super::lecturers::{self, AvailabilityDao, ContactDao};
use super::statement::{prepare_statement, SqlValue};
use super::subjects;
use crate::models::{Lecturer, Subject};

const LECTURERS_FOR_SUBJECT_QUERY: &str =
    "SELECT lecturer FROM subject_lecturer WHERE subject = ?";
const SUBJECTS_FOR_LECTURER_QUERY: &str =
    "SELECT subject FROM subject_lecturer WHERE lecturer = ?";
const LINK_QUERY: &str = "INSERT INTO subject_lecturer (subject, lecturer) VALUES (?, ?)";

pub(crate) struct AssociationResolver<'c> {
    conn: &'c Connection,
}

impl<'c> AssociationResolver<'c> {
    pub(crate) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Compose a lecturer from its root row plus its owned children.
    pub(crate) fn lecturer(&self, id: i64, name: String) -> DaoResult<Lecturer> {
        Ok(Lecturer {
            id: Some(id),
            name,
            contacts: ContactDao::new(self.conn).find_for_lecturer(id)?,
            availability: AvailabilityDao::new(self.conn).find_for_lecturer(id)?,
        })
    }

    /// Lecturers teaching the subject, fully composed.
    pub(crate) fn lecturers_for_subject(&self, subject_id: i64) -> DaoResult<Vec<Lecturer>> {
        let ids = self.junction_ids(
            LECTURERS_FOR_SUBJECT_QUERY,
            subject_id,
            "fetch subject lecturers",
        )?;
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            match lecturers::find_by_id_on(self.conn, id)? {
                Some(lecturer) => resolved.push(lecturer),
                None => warn!(
                    subject_id,
                    lecturer_id = id,
                    "junction row points at a missing lecturer"
                ),
            }
        }
        Ok(resolved)
    }

    /// Subjects the lecturer teaches, each with its own lecturer list resolved.
    pub(crate) fn subjects_for_lecturer(&self, lecturer_id: i64) -> DaoResult<Vec<Subject>> {
        let ids = self.junction_ids(
            SUBJECTS_FOR_LECTURER_QUERY,
            lecturer_id,
            "fetch lecturer subjects",
        )?;
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            match subjects::find_by_id_on(self.conn, id)? {
                Some(subject) => resolved.push(subject),
                None => warn!(
                    lecturer_id,
                    subject_id = id,
                    "junction row points at a missing subject"
                ),
            }
        }
        Ok(resolved)
    }

    /// Write one junction row pairing a subject with a lecturer.
    pub(crate) fn link(&self, subject_id: i64, lecturer_id: i64) -> DaoResult<()> {
        let action = "link lecturer to subject";
        let mut stmt = prepare_statement(
            self.conn,
            LINK_QUERY,
            false,
            &[SqlValue::from(subject_id), SqlValue::from(lecturer_id)],
        )
        .persistence(action)?;
        if stmt.execute_update().persistence(action)? == 0 {
            return Err(DaoError::NoRowsAffected(action));
        }
        debug!(subject_id, lecturer_id, "linked lecturer to subject");
        Ok(())
    }

    fn junction_ids(&self, query: &str, key: i64, action: &'static str) -> DaoResult<Vec<i64>> {
        let mut stmt =
            prepare_statement(self.conn, query, false, &[key.into()]).persistence(action)?;
        stmt.fetch_all(|row| row.get(0)).persistence(action)
    }
}
