//! Plain-text table rows for the console. Colour is applied by the session;
//! everything here returns unstyled strings so it can be checked directly.

use crate::models::{LecturerSchedule, Room, Subject};

use super::command::{Entity, Topic};

/// Cell text for a missing value on the first line of a record.
const MISSING: &str = "None";

pub(crate) const NO_RESULT: &str = "No result was found.";
pub(crate) const EMPTY_LIST: &str = "None";

pub(crate) fn header(entity: Entity) -> (String, String) {
    let title = match entity {
        Entity::Lecturer => format!(
            "{:<30} {:<32} {:<14} {:<10} {}",
            "Name", "Email", "Number", "Subject", "Available"
        ),
        Entity::Subject => format!(
            "{:<30} {:<10} {:<10} {}",
            "Subject", "Code", "Enrolled", "Lecturer(s)"
        ),
        Entity::Room => format!("{:<15} {:<15} {:<15}", "Room", "Capacity", "Campus"),
    };
    let rule = "-".repeat(title.chars().count().max(45));
    (title, rule)
}

/// One line per position of the longest association. The three columns are
/// independent lists that merely share the screen: the first line fills
/// gaps with a placeholder, continuation lines leave them blank.
pub(crate) fn lecturer_lines(schedule: &LecturerSchedule) -> Vec<String> {
    let contacts = schedule.contacts();
    let availability = schedule.availability();
    let subjects = schedule.subjects();
    let rows = contacts
        .len()
        .max(availability.len())
        .max(subjects.len())
        .max(1);

    (0..rows)
        .map(|i| {
            let gap = if i == 0 { MISSING } else { "" };
            let name = if i == 0 {
                schedule.lecturer.name.as_str()
            } else {
                ""
            };
            let contact = contacts.get(i);
            let email = contact.map_or(gap, |c| c.email.as_str());
            let number = contact.map_or(gap, |c| c.number.as_str());
            let subject = subjects.get(i).map_or(gap, |s| s.short_name.as_str());
            let window = availability
                .get(i)
                .map_or_else(|| gap.to_string(), ToString::to_string);

            format!("{name:<30} {email:<32} {number:<14} {subject:<10} {window}")
                .trim_end()
                .to_string()
        })
        .collect()
}

pub(crate) fn subject_line(subject: &Subject) -> String {
    format!(
        "{:<30} {:<10} {:<10} {}",
        subject.name,
        subject.short_name,
        subject.enrolled,
        subject.lecturer_names()
    )
}

pub(crate) fn room_line(room: &Room) -> String {
    format!("{:<15} {:<15} {:<15}", room.name, room.capacity, room.campus)
        .trim_end()
        .to_string()
}

pub(crate) fn usage(topic: Topic) -> &'static str {
    match topic {
        Topic::List => "Usage: list lecturer|subject|room",
        Topic::Search => "Usage: search lecturer|subject|room <search term>",
    }
}

/// Body text for `help <topic>`.
pub(crate) fn help_lines(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Search => &[
            "The search command is used to find a single record.",
            "Lecturers and rooms match on their exact name. Subjects match on",
            "their code first, then their exact name, then any part of the name.",
        ],
        Topic::List => &[
            "The list command prints every record of one kind.",
            "You can use it to view all lecturers, subjects or rooms.",
        ],
    }
}

pub(crate) fn help_examples(topic: Topic) -> &'static [&'static str] {
    match topic {
        Topic::Search => &[
            "search lecturer Praskovya Pokrovskaya",
            "search subject PGR200",
            "search room KA-201",
        ],
        Topic::List => &["list lecturer", "list room"],
    }
}
