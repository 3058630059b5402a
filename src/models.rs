//! Composite records that mirror the scheduling schema. They are plain data
//! holders: the `db` module fills them in, the console renders them. An `id`
//! of `None` marks a record that has not been written to the store yet; the
//! accessors assign it exactly once after a successful insert.

use std::fmt;

/// Placeholder shown when a subject has no lecturers attached.
pub const NO_LECTURERS: &str = "None";

/// A lecturer together with the contact points and availability windows it
/// owns. Deleting the lecturer row cascades to both child tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lecturer {
    /// Store-generated key, `None` until the lecturer has been created.
    pub id: Option<i64>,
    pub name: String,
    pub contacts: Vec<Contact>,
    pub availability: Vec<Availability>,
}

impl Lecturer {
    /// Build an unidentified lecturer with no children attached.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a contact point that will be written together with the lecturer.
    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contacts.push(contact);
        self
    }

    /// Attach an availability window that will be written together with the
    /// lecturer.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability.push(availability);
        self
    }
}

impl fmt::Display for Lecturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Phone number and email for a lecturer. Never exists without its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub id: Option<i64>,
    pub number: String,
    pub email: String,
}

impl Contact {
    pub fn new(number: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            number: number.into(),
            email: email.into(),
        }
    }
}

/// A time slot during which a lecturer can teach. Both ends are stored as
/// plain integers; their encoding is up to whoever seeds the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    pub id: Option<i64>,
    pub start: i64,
    pub end: i64,
}

impl Availability {
    pub fn new(start: i64, end: i64) -> Self {
        Self {
            id: None,
            start,
            end,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// A course offering. `lecturers` is never written directly: it is filled in
/// from the `subject_lecturer` junction table whenever a subject is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subject {
    pub id: Option<i64>,
    pub name: String,
    /// Short course code such as `PGR200`, the preferred lookup key.
    pub short_name: String,
    pub enrolled: u32,
    pub lecturers: Vec<Lecturer>,
}

impl Subject {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>, enrolled: u32) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
            enrolled,
            ..Self::default()
        }
    }

    /// Join the resolved lecturer names into a single comma separated line.
    /// An empty association renders as [`NO_LECTURERS`] so table cells never
    /// come out blank.
    pub fn lecturer_names(&self) -> String {
        if self.lecturers.is_empty() {
            return NO_LECTURERS.to_string();
        }

        self.lecturers
            .iter()
            .map(|lecturer| lecturer.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.short_name)
    }
}

/// A teaching room. Rooms have no associations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Room {
    pub id: Option<i64>,
    pub name: String,
    /// Seats available; must be positive for the room to be created.
    pub capacity: u32,
    pub campus: String,
}

impl Room {
    pub fn new(name: impl Into<String>, capacity: u32, campus: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            capacity,
            campus: campus.into(),
        }
    }
}

/// Everything the console shows for one lecturer. The three sequences are
/// unrelated associations of different lengths: index `i` of one says
/// nothing about index `i` of another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LecturerSchedule {
    pub lecturer: Lecturer,
    pub subjects: Vec<Subject>,
}

impl LecturerSchedule {
    /// Contacts of the lecturer, independent of the other two sequences.
    pub fn contacts(&self) -> &[Contact] {
        &self.lecturer.contacts
    }

    pub fn availability(&self) -> &[Availability] {
        &self.lecturer.availability
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }
}
