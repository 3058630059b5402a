use std::fmt;
use std::str::FromStr;

/// The three browsable record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Lecturer,
    Subject,
    Room,
}

impl FromStr for Entity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lecturer" | "lecturers" => Ok(Entity::Lecturer),
            "subject" | "subjects" => Ok(Entity::Subject),
            "room" | "rooms" => Ok(Entity::Room),
            other => Err(format!("unknown entity '{other}'")),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Lecturer => "lecturer",
            Entity::Subject => "subject",
            Entity::Room => "room",
        };
        f.write_str(name)
    }
}

/// Commands whose usage line can be printed on bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    List,
    Search,
}

/// One parsed line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Entity),
    /// Entity plus the search term, casing kept as typed.
    Search(Entity, String),
    Help(Option<String>),
    /// Recognised command with missing or malformed arguments.
    Usage(Topic),
    Unknown(String),
    Empty,
    Quit,
}

impl Command {
    /// Keywords are case-insensitive; the search term is passed through as
    /// typed, with runs of whitespace collapsed to single spaces.
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Command::Empty;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "list" => match words.next().map(str::parse::<Entity>) {
                Some(Ok(entity)) => Command::List(entity),
                _ => Command::Usage(Topic::List),
            },
            "search" => {
                let entity = words.next().map(str::parse::<Entity>);
                let term = words.collect::<Vec<_>>().join(" ");
                match entity {
                    Some(Ok(entity)) if !term.is_empty() => Command::Search(entity, term),
                    _ => Command::Usage(Topic::Search),
                }
            }
            "help" => Command::Help(words.next().map(str::to_ascii_lowercase)),
            "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}
