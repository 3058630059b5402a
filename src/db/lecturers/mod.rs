//! Lecturer rows and the contact/availability rows they own.
//!
//! The child accessors live in private submodules: outside `db` the only
//! way to write a contact or availability window is to attach it to a
//! lecturer and create the lecturer.

mod availability;
mod contacts;

pub(in crate::db) use availability::AvailabilityDao;
pub(in crate::db) use contacts::ContactDao;

use rusqlite::Connection;
use tracing::{debug, warn};

use super::accessor::{degrade, RecordAccessor};
use super::associations::AssociationResolver;
use super::connection::ConnectionProvider;
use super::error::{DaoError, DaoResult, PersistenceContext};
use super::statement::{insert_returning_key, prepare_statement, SqlValue};
use crate::models::{Lecturer, LecturerSchedule, Subject};

const INSERT_QUERY: &str = "INSERT INTO lecturer (name) VALUES (?)";
const LIST_QUERY: &str = "SELECT id, name FROM lecturer";
const FIND_BY_NAME_QUERY: &str = "SELECT id, name FROM lecturer WHERE name = ?";
const FIND_BY_ID_QUERY: &str = "SELECT id, name FROM lecturer WHERE id = ?";

/// Creates and reads lecturers as composite records.
#[derive(Debug, Clone)]
pub struct LecturerDao<P> {
    provider: P,
}

impl<P: ConnectionProvider> LecturerDao<P> {
    /// Build an accessor that asks `provider` for a connection per call.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Load a lecturer with its contacts and availability by id.
    /// `Ok(None)` when no row has that id.
    pub fn try_find_by_id(&self, id: i64) -> DaoResult<Option<Lecturer>> {
        let conn = self.provider.connection()?;
        find_by_id_on(&conn, id)
    }

    /// Like [`Self::try_find_by_id`], but a failed lookup is logged and
    /// reported as `None`.
    pub fn find_by_id(&self, id: i64) -> Option<Lecturer> {
        degrade(Self::ENTITY, id, self.try_find_by_id(id))
    }

    /// Pair a lecturer with the subjects it teaches. A failed subject lookup
    /// degrades to an empty subject list; the lecturer itself is kept.
    pub fn schedule(&self, lecturer: Lecturer) -> LecturerSchedule {
        let subjects = match lecturer.id {
            Some(id) => self.try_subjects_for(id).unwrap_or_else(|err| {
                warn!(lecturer_id = id, error = %err, "could not resolve subjects");
                Vec::new()
            }),
            None => Vec::new(),
        };
        LecturerSchedule { lecturer, subjects }
    }

    fn try_subjects_for(&self, lecturer_id: i64) -> DaoResult<Vec<Subject>> {
        let conn = self.provider.connection()?;
        AssociationResolver::new(&conn).subjects_for_lecturer(lecturer_id)
    }
}

impl<P: ConnectionProvider> RecordAccessor for LecturerDao<P> {
    type Record = Lecturer;

    const ENTITY: &'static str = "lecturer";

    /// Insert the lecturer and, in the same transaction, every attached
    /// contact and availability window. Ids are assigned only after commit,
    /// so a failure anywhere leaves both the store and `lecturer` untouched.
    fn create(&self, lecturer: &mut Lecturer) -> DaoResult<()> {
        if lecturer.id.is_some() {
            return Err(DaoError::InvalidState(
                "lecturer id must be unset, this lecturer already exists",
            ));
        }
        if lecturer.contacts.iter().any(|contact| contact.id.is_some()) {
            return Err(DaoError::InvalidState("contact id must be unset, it already exists"));
        }
        if lecturer.availability.iter().any(|slot| slot.id.is_some()) {
            return Err(DaoError::InvalidState(
                "availability id must be unset, it already exists",
            ));
        }

        let mut conn = self.provider.connection()?;
        let tx = conn.transaction().persistence("begin lecturer transaction")?;

        let id = insert_returning_key(
            &tx,
            INSERT_QUERY,
            &[SqlValue::from(lecturer.name.as_str())],
            "create lecturer",
        )?;

        let contacts = ContactDao::new(&tx);
        let contact_ids = lecturer
            .contacts
            .iter()
            .map(|contact| contacts.insert(contact, Some(id)))
            .collect::<DaoResult<Vec<_>>>()?;

        let availability = AvailabilityDao::new(&tx);
        let availability_ids = lecturer
            .availability
            .iter()
            .map(|slot| availability.insert(slot, Some(id)))
            .collect::<DaoResult<Vec<_>>>()?;

        tx.commit().persistence("commit lecturer")?;

        lecturer.id = Some(id);
        for (contact, contact_id) in lecturer.contacts.iter_mut().zip(contact_ids) {
            contact.id = Some(contact_id);
        }
        for (slot, slot_id) in lecturer.availability.iter_mut().zip(availability_ids) {
            slot.id = Some(slot_id);
        }

        debug!(
            id,
            contacts = lecturer.contacts.len(),
            availability = lecturer.availability.len(),
            "created lecturer"
        );
        Ok(())
    }

    /// Every lecturer, children resolved, in store order.
    fn try_list(&self) -> DaoResult<Vec<Lecturer>> {
        let conn = self.provider.connection()?;
        find_all_on(&conn, LIST_QUERY, &[])
    }

    /// Exact match on the lecturer's name.
    fn try_find(&self, name: &str) -> DaoResult<Option<Lecturer>> {
        let conn = self.provider.connection()?;
        find_first_on(&conn, FIND_BY_NAME_QUERY, &[name.into()])
    }
}

/// Load one lecturer by id on a connection the caller already holds.
pub(in crate::db) fn find_by_id_on(conn: &Connection, id: i64) -> DaoResult<Option<Lecturer>> {
    find_first_on(conn, FIND_BY_ID_QUERY, &[id.into()])
}

fn find_first_on(
    conn: &Connection,
    query: &str,
    values: &[SqlValue],
) -> DaoResult<Option<Lecturer>> {
    let action = "find lecturer";
    let root = prepare_statement(conn, query, false, values)
        .persistence(action)?
        .fetch_first(|row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .persistence(action)?;

    root.map(|(id, name)| AssociationResolver::new(conn).lecturer(id, name))
        .transpose()
}

fn find_all_on(conn: &Connection, query: &str, values: &[SqlValue]) -> DaoResult<Vec<Lecturer>> {
    let action = "list lecturers";
    let roots = prepare_statement(conn, query, false, values)
        .persistence(action)?
        .fetch_all(|row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .persistence(action)?;

    let resolver = AssociationResolver::new(conn);
    roots
        .into_iter()
        .map(|(id, name)| resolver.lecturer(id, name))
        .collect()
}
