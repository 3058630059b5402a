use rusqlite::Connection;
use tracing::{debug, warn};

use super::accessor::{degrade, RecordAccessor};
use super::associations::AssociationResolver;
use super::connection::ConnectionProvider;
use super::error::{DaoError, DaoResult, PersistenceContext};
use super::statement::{insert_returning_key, prepare_statement, SqlValue};
use crate::models::{Lecturer, Subject};

const INSERT_QUERY: &str = "INSERT INTO subject (name, shortname, enrolled) VALUES (?, ?, ?)";
const LIST_QUERY: &str = "SELECT id, name, shortname, enrolled FROM subject";
const FIND_BY_ID_QUERY: &str = "SELECT id, name, shortname, enrolled FROM subject WHERE id = ?";
const FIND_BY_SHORT_QUERY: &str =
    "SELECT id, name, shortname, enrolled FROM subject WHERE shortname = ?";
const FIND_BY_NAME_QUERY: &str = "SELECT id, name, shortname, enrolled FROM subject WHERE name = ?";
const FIND_BY_NAME_LIKE_QUERY: &str =
    r"SELECT id, name, shortname, enrolled FROM subject WHERE name LIKE ? ESCAPE '\'";

/// Creates, links and reads subjects. Every subject read comes back with
/// its lecturers resolved through the junction table.
#[derive(Debug, Clone)]
pub struct SubjectDao<P> {
    provider: P,
}

impl<P: ConnectionProvider> SubjectDao<P> {
    /// Build an accessor that asks `provider` for a connection per call.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Load a subject and its lecturers by id. `Ok(None)` when no row has
    /// that id.
    pub fn try_find_by_id(&self, id: i64) -> DaoResult<Option<Subject>> {
        let conn = self.provider.connection()?;
        find_by_id_on(&conn, id)
    }

    /// Like [`Self::try_find_by_id`], with failures logged and reported as
    /// `None`.
    pub fn find_by_id(&self, id: i64) -> Option<Subject> {
        degrade(Self::ENTITY, id, self.try_find_by_id(id))
    }

    /// Record that `lecturer` teaches `subject`. Both must already be
    /// stored; a missing id is rejected before the store is touched.
    pub fn link_lecturer(&self, subject: &Subject, lecturer: &Lecturer) -> DaoResult<()> {
        let subject_id = subject
            .id
            .ok_or(DaoError::InvalidState("subject id can not be unset when linking"))?;
        let lecturer_id = lecturer
            .id
            .ok_or(DaoError::InvalidState("lecturer id can not be unset when linking"))?;

        let conn = self.provider.connection()?;
        AssociationResolver::new(&conn).link(subject_id, lecturer_id)
    }

    /// Subjects taught by `lecturer`. A lecturer that was never stored has
    /// no links, so no query is issued for it.
    pub fn try_find_for_lecturer(&self, lecturer: &Lecturer) -> DaoResult<Vec<Subject>> {
        let Some(lecturer_id) = lecturer.id else {
            return Ok(Vec::new());
        };
        let conn = self.provider.connection()?;
        AssociationResolver::new(&conn).subjects_for_lecturer(lecturer_id)
    }

    /// Like [`Self::try_find_for_lecturer`], with failures logged and
    /// reported as an empty list.
    pub fn find_for_lecturer(&self, lecturer: &Lecturer) -> Vec<Subject> {
        self.try_find_for_lecturer(lecturer).unwrap_or_else(|err| {
            warn!(lecturer = %lecturer.name, error = %err, "could not resolve subjects");
            Vec::new()
        })
    }
}

impl<P: ConnectionProvider> RecordAccessor for SubjectDao<P> {
    type Record = Subject;

    const ENTITY: &'static str = "subject";

    /// Insert the subject row only. Lecturers are attached separately with
    /// [`SubjectDao::link_lecturer`].
    fn create(&self, subject: &mut Subject) -> DaoResult<()> {
        if subject.id.is_some() {
            return Err(DaoError::InvalidState("subject id must be unset, it already exists"));
        }

        let conn = self.provider.connection()?;
        let values = [
            SqlValue::from(subject.name.as_str()),
            SqlValue::from(subject.short_name.as_str()),
            SqlValue::from(subject.enrolled),
        ];
        let id = insert_returning_key(&conn, INSERT_QUERY, &values, "create subject")?;
        subject.id = Some(id);
        debug!(id, code = %subject.short_name, "created subject");
        Ok(())
    }

    fn try_list(&self) -> DaoResult<Vec<Subject>> {
        let conn = self.provider.connection()?;
        let action = "list subjects";
        let roots = prepare_statement(&conn, LIST_QUERY, false, &[])
            .persistence(action)?
            .fetch_all(map_root)
            .persistence(action)?;

        let resolver = AssociationResolver::new(&conn);
        roots
            .into_iter()
            .map(|subject| resolve(&resolver, subject))
            .collect()
    }

    /// Look a subject up by free text. The short code is authoritative, then
    /// the exact name, then any name containing the text. The first stage
    /// with a hit wins and later stages are skipped.
    fn try_find(&self, text: &str) -> DaoResult<Option<Subject>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let conn = self.provider.connection()?;
        let stages = [
            (FIND_BY_SHORT_QUERY, SqlValue::from(text)),
            (FIND_BY_NAME_QUERY, SqlValue::from(text)),
            (FIND_BY_NAME_LIKE_QUERY, SqlValue::from(format!("%{}%", escape_like(text)))),
        ];
        for (query, value) in stages {
            if let Some(subject) = find_first_on(&conn, query, value)? {
                return Ok(Some(subject));
            }
        }
        Ok(None)
    }
}

/// Load one subject by id on a connection the caller already holds.
pub(in crate::db) fn find_by_id_on(conn: &Connection, id: i64) -> DaoResult<Option<Subject>> {
    find_first_on(conn, FIND_BY_ID_QUERY, SqlValue::from(id))
}

fn find_first_on(conn: &Connection, query: &str, value: SqlValue) -> DaoResult<Option<Subject>> {
    let action = "find subject";
    let root = prepare_statement(conn, query, false, &[value])
        .persistence(action)?
        .fetch_first(map_root)
        .persistence(action)?;

    let resolver = AssociationResolver::new(conn);
    root.map(|subject| resolve(&resolver, subject)).transpose()
}

fn map_root(row: &rusqlite::Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        short_name: row.get(2)?,
        enrolled: row.get(3)?,
        lecturers: Vec::new(),
    })
}

fn resolve(resolver: &AssociationResolver<'_>, mut subject: Subject) -> DaoResult<Subject> {
    if let Some(id) = subject.id {
        subject.lecturers = resolver.lecturers_for_subject(id)?;
    }
    Ok(subject)
}

/// Make `%`, `_` and `\` in user input match literally inside a LIKE pattern.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{scratch_store, CountingProvider, FailingProvider};
    use crate::db::LecturerDao;
    use crate::models::Contact;

    fn store_programming(dao: &SubjectDao<&crate::db::SqliteConnector>) -> Subject {
        let mut subject = Subject::new("Programming 2", "PGR200", 120);
        dao.create(&mut subject).unwrap();
        subject
    }

    #[test]
    fn create_assigns_id_and_find_round_trips() {
        let (_dir, connector) = scratch_store();
        let dao = SubjectDao::new(&connector);
        let subject = store_programming(&dao);

        let found = dao.find_by_id(subject.id.unwrap()).unwrap();

        assert_eq!(found, subject);
    }

    #[test]
    fn search_prefers_code_then_name_then_substring() {
        let (_dir, connector) = scratch_store();
        let dao = SubjectDao::new(&connector);
        let subject = store_programming(&dao);

        assert_eq!(dao.find("PGR200").unwrap().id, subject.id);
        assert_eq!(dao.find("Programming 2").unwrap().id, subject.id);
        assert_eq!(dao.find("ogram").unwrap().id, subject.id);
        assert_eq!(dao.find("nonexistent"), None);
    }

    #[test]
    fn exact_code_beats_substring_name_match() {
        let (_dir, connector) = scratch_store();
        let dao = SubjectDao::new(&connector);
        let mut decoy = Subject::new("Intro to DB100 topics", "INT100", 10);
        dao.create(&mut decoy).unwrap();
        let mut target = Subject::new("Databases", "DB100", 80);
        dao.create(&mut target).unwrap();

        assert_eq!(dao.find("DB100").unwrap().id, target.id);
    }

    #[test]
    fn exact_name_beats_substring_name_match() {
        let (_dir, connector) = scratch_store();
        let dao = SubjectDao::new(&connector);
        let mut longer = Subject::new("Advanced Databases", "DB200", 30);
        dao.create(&mut longer).unwrap();
        let mut exact = Subject::new("Databases", "DB100", 80);
        dao.create(&mut exact).unwrap();

        assert_eq!(dao.find("Databases").unwrap().id, exact.id);
    }

    #[test]
    fn substring_search_treats_wildcards_literally() {
        let (_dir, connector) = scratch_store();
        let dao = SubjectDao::new(&connector);
        store_programming(&dao);

        assert_eq!(dao.find("%"), None);
        assert_eq!(dao.find("Program_ing"), None);
    }

    #[test]
    fn blank_search_issues_no_query() {
        let provider = CountingProvider::default();
        let dao = SubjectDao::new(&provider);

        assert_eq!(dao.find("   "), None);
        assert_eq!(provider.acquired(), 0);
    }

    #[test]
    fn create_identified_subject_touches_no_connection() {
        let provider = CountingProvider::default();
        let dao = SubjectDao::new(&provider);
        let mut subject = Subject::new("Stored", "STR100", 1);
        subject.id = Some(1);

        assert!(matches!(
            dao.create(&mut subject),
            Err(DaoError::InvalidState(_))
        ));
        assert_eq!(provider.acquired(), 0);
    }

    #[test]
    fn link_requires_both_ids_before_io() {
        let provider = CountingProvider::default();
        let dao = SubjectDao::new(&provider);
        let mut subject = Subject::new("Unsaved", "UNS100", 1);
        let lecturer = Lecturer::new("Unsaved Lecturer");

        assert!(matches!(
            dao.link_lecturer(&subject, &lecturer),
            Err(DaoError::InvalidState(_))
        ));
        subject.id = Some(1);
        assert!(matches!(
            dao.link_lecturer(&subject, &lecturer),
            Err(DaoError::InvalidState(_))
        ));
        assert_eq!(provider.acquired(), 0);
    }

    #[test]
    fn linked_lecturer_resolves_on_both_sides() {
        let (_dir, connector) = scratch_store();
        let subjects = SubjectDao::new(&connector);
        let lecturers = LecturerDao::new(&connector);
        let subject = store_programming(&subjects);
        let mut lecturer = Lecturer::new("Per Lauvås")
            .with_contact(Contact::new("555-0200", "per@example.com"))
            .with_contact(Contact::new("555-0201", "lauvas@example.com"));
        lecturers.create(&mut lecturer).unwrap();

        subjects.link_lecturer(&subject, &lecturer).unwrap();

        let resolved = subjects.find("PGR200").unwrap();
        assert_eq!(resolved.lecturers.len(), 1);
        assert_eq!(resolved.lecturers[0].name, "Per Lauvås");
        assert_eq!(resolved.lecturers[0].contacts.len(), 2);
        assert_eq!(resolved.lecturer_names(), "Per Lauvås");

        let taught = subjects.find_for_lecturer(&lecturer);
        assert_eq!(taught.len(), 1);
        assert_eq!(taught[0].short_name, "PGR200");
    }

    #[test]
    fn duplicate_link_is_a_persistence_error() {
        let (_dir, connector) = scratch_store();
        let subjects = SubjectDao::new(&connector);
        let lecturers = LecturerDao::new(&connector);
        let subject = store_programming(&subjects);
        let mut lecturer = Lecturer::new("Twice");
        lecturers.create(&mut lecturer).unwrap();

        subjects.link_lecturer(&subject, &lecturer).unwrap();
        let err = subjects.link_lecturer(&subject, &lecturer).unwrap_err();

        assert!(matches!(err, DaoError::Persistence { .. }));
    }

    #[test]
    fn unlinked_subject_has_placeholder_lecturer_names() {
        let (_dir, connector) = scratch_store();
        let dao = SubjectDao::new(&connector);
        store_programming(&dao);

        let listed = dao.list();

        assert_eq!(listed.len(), 1);
        assert!(listed[0].lecturers.is_empty());
        assert_eq!(listed[0].lecturer_names(), crate::models::NO_LECTURERS);
    }

    #[test]
    fn unstored_lecturer_teaches_nothing() {
        let provider = CountingProvider::default();
        let dao = SubjectDao::new(&provider);

        assert!(dao.find_for_lecturer(&Lecturer::new("Nobody")).is_empty());
        assert_eq!(provider.acquired(), 0);
    }

    #[test]
    fn reads_degrade_when_store_is_unreachable() {
        let dao = SubjectDao::new(FailingProvider);

        assert!(dao.list().is_empty());
        assert_eq!(dao.find("PGR200"), None);
        assert!(dao.try_find("PGR200").is_err());
        let mut subject = Subject::new("Programming 2", "PGR200", 120);
        assert!(dao.create(&mut subject).unwrap_err().is_persistence());
        assert_eq!(subject.id, None);
    }

    #[test]
    fn escape_like_marks_wildcards() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
