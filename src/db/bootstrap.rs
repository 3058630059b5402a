//! Schema creation and first-run seeding.
//!
//! The DDL and the three seed arrays ship inside the binary. Seeding goes
//! exclusively through the accessors' create operations, so the invariants
//! they enforce hold for seeded rows too.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::accessor::RecordAccessor;
use super::connection::ConnectionProvider;
use super::lecturers::LecturerDao;
use super::rooms::RoomDao;
use super::subjects::SubjectDao;
use crate::models::{Availability, Contact, Lecturer, Room, Subject};

const SCHEMA_SQL: &str = include_str!("../../resources/schema.sql");
const LECTURERS_JSON: &str = include_str!("../../resources/lecturers.json");
const ROOMS_JSON: &str = include_str!("../../resources/rooms.json");
const SUBJECTS_JSON: &str = include_str!("../../resources/subjects.json");

/// Dependents first so a drop never trips a foreign key even if the pragma
/// is ignored.
const TABLES: [&str; 6] = [
    "subject_lecturer",
    "available",
    "contact",
    "subject",
    "room",
    "lecturer",
];

/// Create any missing table. Safe to run against an existing store.
pub fn create_schema<P: ConnectionProvider>(provider: &P) -> Result<()> {
    let conn = provider.connection()?;
    conn.execute_batch(SCHEMA_SQL)
        .context("failed to create database schema")?;
    Ok(())
}

/// Drop every scheduling table, data included.
pub fn drop_schema<P: ConnectionProvider>(provider: &P) -> Result<()> {
    let conn = provider.connection()?;
    conn.pragma_update(None, "foreign_keys", "OFF")
        .context("failed to disable foreign keys")?;
    for table in TABLES {
        conn.execute(&format!("DROP TABLE IF EXISTS {table}"), [])
            .with_context(|| format!("failed to drop table {table}"))?;
    }
    conn.pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    info!("dropped all tables");
    Ok(())
}

/// Build and seed the store on first run, or unconditionally when
/// `overwrite` is set. Returns whether anything was (re)initialized.
pub fn initialize<P: ConnectionProvider>(provider: &P, overwrite: bool) -> Result<bool> {
    let first_run = !schema_exists(&provider.connection()?)?;
    if !first_run && !overwrite {
        debug!("schema present, skipping initialization");
        return Ok(false);
    }

    if overwrite {
        info!("overwrite requested, dropping existing tables");
        drop_schema(provider)?;
    } else {
        info!("first run detected, initializing database structure");
    }

    create_schema(provider)?;
    let summary = seed(provider, SeedData::embedded()?)?;
    info!(
        lecturers = summary.lecturers,
        rooms = summary.rooms,
        subjects = summary.subjects,
        links = summary.links,
        "database initialization complete"
    );
    Ok(true)
}

fn schema_exists(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'lecturer'",
            [],
            |row| row.get(0),
        )
        .context("failed to inspect database schema")?;
    Ok(count > 0)
}

#[derive(Debug, Deserialize)]
struct LecturerSeed {
    name: String,
    #[serde(default)]
    contact: Vec<ContactSeed>,
    #[serde(default)]
    available: Vec<AvailableSeed>,
}

#[derive(Debug, Deserialize)]
struct ContactSeed {
    number: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct AvailableSeed {
    start: i64,
    end: i64,
}

#[derive(Debug, Deserialize)]
struct RoomSeed {
    name: String,
    capacity: u32,
    campus: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectSeed {
    name: String,
    short_name: String,
    enrolled: u32,
    #[serde(default)]
    lecturers: Vec<LecturerRef>,
}

/// Subjects refer to lecturers by name only.
#[derive(Debug, Deserialize)]
struct LecturerRef {
    name: String,
}

impl From<LecturerSeed> for Lecturer {
    fn from(seed: LecturerSeed) -> Self {
        Lecturer {
            id: None,
            name: seed.name,
            contacts: seed
                .contact
                .into_iter()
                .map(|c| Contact::new(c.number, c.email))
                .collect(),
            availability: seed
                .available
                .into_iter()
                .map(|a| Availability::new(a.start, a.end))
                .collect(),
        }
    }
}

/// Parsed seed arrays, ready to be written.
#[derive(Debug)]
pub struct SeedData {
    lecturers: Vec<LecturerSeed>,
    rooms: Vec<RoomSeed>,
    subjects: Vec<SubjectSeed>,
}

impl SeedData {
    /// The dataset compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_json(LECTURERS_JSON, ROOMS_JSON, SUBJECTS_JSON)
    }

    /// Parse the three seed arrays, naming the one that is malformed.
    pub fn from_json(lecturers: &str, rooms: &str, subjects: &str) -> Result<Self> {
        Ok(Self {
            lecturers: serde_json::from_str(lecturers).context("failed to parse lecturer seed")?,
            rooms: serde_json::from_str(rooms).context("failed to parse room seed")?,
            subjects: serde_json::from_str(subjects).context("failed to parse subject seed")?,
        })
    }
}

/// Row counts written by [`seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub lecturers: usize,
    pub rooms: usize,
    pub subjects: usize,
    pub links: usize,
}

/// Write lecturers, then rooms, then subjects, then the subject/lecturer
/// links. A lecturer name that matches nothing is skipped with a warning.
pub fn seed<P: ConnectionProvider>(provider: &P, data: SeedData) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let lecturer_dao = LecturerDao::new(provider);
    for seed in data.lecturers {
        let mut lecturer = Lecturer::from(seed);
        lecturer_dao
            .create(&mut lecturer)
            .with_context(|| format!("failed to insert lecturer {lecturer}"))?;
        summary.lecturers += 1;
    }

    let room_dao = RoomDao::new(provider);
    for seed in data.rooms {
        let mut room = Room::new(seed.name, seed.capacity, seed.campus);
        room_dao
            .create(&mut room)
            .with_context(|| format!("failed to insert room {}", room.name))?;
        summary.rooms += 1;
    }

    let subject_dao = SubjectDao::new(provider);
    for seed in data.subjects {
        let mut subject = Subject::new(seed.name, seed.short_name, seed.enrolled);
        subject_dao
            .create(&mut subject)
            .with_context(|| format!("failed to insert subject {subject}"))?;
        summary.subjects += 1;

        for reference in seed.lecturers {
            let Some(lecturer) = lecturer_dao.try_find(&reference.name)? else {
                warn!(
                    %subject,
                    lecturer = %reference.name,
                    "seed refers to an unknown lecturer, skipping link"
                );
                continue;
            };
            subject_dao
                .link_lecturer(&subject, &lecturer)
                .with_context(|| format!("failed to link {lecturer} to {subject}"))?;
            summary.links += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteConnector;

    fn empty_store() -> (tempfile::TempDir, SqliteConnector) {
        let dir = tempfile::tempdir().unwrap();
        let connector = SqliteConnector::new(dir.path().join("bootstrap.sqlite"));
        (dir, connector)
    }

    #[test]
    fn embedded_seed_parses() {
        let data = SeedData::embedded().unwrap();
        assert!(!data.lecturers.is_empty());
        assert!(!data.rooms.is_empty());
        assert!(!data.subjects.is_empty());
    }

    #[test]
    fn first_run_initializes_and_second_run_skips() {
        let (_dir, connector) = empty_store();

        assert!(initialize(&connector, false).unwrap());
        let rooms = RoomDao::new(&connector).list().len();
        assert!(rooms > 0);

        assert!(!initialize(&connector, false).unwrap());
        assert_eq!(RoomDao::new(&connector).list().len(), rooms);
    }

    #[test]
    fn overwrite_reseeds_without_duplicates() {
        let (_dir, connector) = empty_store();
        initialize(&connector, false).unwrap();
        let lecturers = LecturerDao::new(&connector).list().len();

        assert!(initialize(&connector, true).unwrap());

        assert_eq!(LecturerDao::new(&connector).list().len(), lecturers);
    }

    #[test]
    fn seed_links_subjects_by_lecturer_name() {
        let (_dir, connector) = empty_store();
        create_schema(&connector).unwrap();
        let data = SeedData::from_json(
            r#"[{"name": "Ada", "contact": [{"number": "1", "email": "ada@example.com"}]}]"#,
            r#"[{"name": "R1", "capacity": 10, "campus": "Main"}]"#,
            r#"[{"name": "Engines", "shortName": "ENG100", "enrolled": 3,
                 "lecturers": [{"name": "Ada"}, {"name": "Ghost"}]}]"#,
        )
        .unwrap();

        let summary = seed(&connector, data).unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                lecturers: 1,
                rooms: 1,
                subjects: 1,
                links: 1,
            }
        );
        let subject = SubjectDao::new(&connector).find("ENG100").unwrap();
        assert_eq!(subject.lecturer_names(), "Ada");
    }

    #[test]
    fn malformed_seed_is_reported() {
        let err = SeedData::from_json("[]", "{", "[]").unwrap_err();
        assert!(err.to_string().contains("room seed"));
    }
}
