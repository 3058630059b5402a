//! Line-oriented console front end: parse a command, run it against the
//! accessors, print coloured tables.

mod command;
mod render;

pub use command::{Command, Entity, Topic};

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use tracing::debug;

use crate::db::{ConnectionProvider, LecturerDao, RecordAccessor, RoomDao, SubjectDao};
use crate::models::Lecturer;

const PROMPT: &str = ">>> ";
const GREETING: &str = "This is the CLI for browsing the database.
Type \"help\" for a list of available commands.";

/// Whether the read loop should keep going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Holds one accessor per entity, all sharing the same provider.
pub struct Session<P> {
    lecturers: LecturerDao<P>,
    subjects: SubjectDao<P>,
    rooms: RoomDao<P>,
}

impl<P: ConnectionProvider + Clone> Session<P> {
    /// One session per store. The provider is cloned into each accessor.
    pub fn new(provider: P) -> Self {
        Self {
            lecturers: LecturerDao::new(provider.clone()),
            subjects: SubjectDao::new(provider.clone()),
            rooms: RoomDao::new(provider),
        }
    }

    /// Read commands from stdin until `quit` or end of input.
    pub fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        writeln!(stdout, "{}", GREETING.green()).context("failed to write greeting")?;

        let mut line = String::new();
        loop {
            write!(stdout, "{PROMPT}").context("failed to write prompt")?;
            stdout.flush().context("failed to flush prompt")?;

            line.clear();
            let read = stdin
                .lock()
                .read_line(&mut line)
                .context("failed to read command")?;
            if read == 0 {
                writeln!(stdout).context("failed to write newline")?;
                break;
            }

            if self.execute(&Command::parse(&line), &mut stdout)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Run one command, writing its output to `out`.
    pub fn execute<W: Write>(&self, command: &Command, out: &mut W) -> Result<Flow> {
        debug!(?command, "executing command");
        match command {
            Command::List(entity) => self.list(*entity, out)?,
            Command::Search(entity, term) => self.search(*entity, term, out)?,
            Command::Help(topic) => print_help(topic.as_deref(), out)?,
            Command::Usage(topic) => print_usage(*topic, out)?,
            Command::Unknown(keyword) => writeln!(
                out,
                "{}",
                format!("Unknown command '{keyword}'. Type \"help\" for a list of commands.").red()
            )?,
            Command::Empty => {}
            Command::Quit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    fn list<W: Write>(&self, entity: Entity, out: &mut W) -> Result<()> {
        debug!(%entity, "listing records");
        print_header(entity, out)?;
        let lines = match entity {
            Entity::Lecturer => self
                .lecturers
                .list()
                .into_iter()
                .map(|lecturer| self.lecturer_block(lecturer))
                .collect::<Vec<_>>(),
            Entity::Subject => self
                .subjects
                .list()
                .iter()
                .map(|subject| vec![render::subject_line(subject)])
                .collect(),
            Entity::Room => self
                .rooms
                .list()
                .iter()
                .map(|room| vec![render::room_line(room)])
                .collect(),
        };

        if lines.is_empty() {
            writeln!(out, "{}", render::EMPTY_LIST)?;
        }
        for block in lines {
            write_block(&block, out)?;
        }
        Ok(())
    }

    fn search<W: Write>(&self, entity: Entity, term: &str, out: &mut W) -> Result<()> {
        debug!(%entity, term, "searching records");
        print_header(entity, out)?;
        let block = match entity {
            Entity::Lecturer => self
                .lecturers
                .find(term)
                .map(|lecturer| self.lecturer_block(lecturer)),
            Entity::Subject => self
                .subjects
                .find(term)
                .map(|subject| vec![render::subject_line(&subject)]),
            Entity::Room => self
                .rooms
                .find(term)
                .map(|room| vec![render::room_line(&room)]),
        };

        match block {
            Some(block) => write_block(&block, out)?,
            None => writeln!(out, "{}", render::NO_RESULT)?,
        }
        Ok(())
    }

    fn lecturer_block(&self, lecturer: Lecturer) -> Vec<String> {
        render::lecturer_lines(&self.lecturers.schedule(lecturer))
    }
}

/// A record spanning several lines gets a blank line after it.
fn write_block<W: Write>(block: &[String], out: &mut W) -> io::Result<()> {
    for line in block {
        writeln!(out, "{line}")?;
    }
    if block.len() > 1 {
        writeln!(out)?;
    }
    Ok(())
}

fn print_header<W: Write>(entity: Entity, out: &mut W) -> io::Result<()> {
    let (title, rule) = render::header(entity);
    writeln!(out, "{}", title.cyan())?;
    writeln!(out, "{}", rule.cyan())
}

fn print_usage<W: Write>(topic: Topic, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", render::usage(topic).blue())
}

fn print_help<W: Write>(topic: Option<&str>, out: &mut W) -> io::Result<()> {
    let topic = match topic {
        None => {
            writeln!(out, "{}", "Help:\n----------------------------".cyan())?;
            writeln!(
                out,
                "{}",
                "The following commands are available.\nFor more information, type \"help <cmd>\"."
                    .magenta()
            )?;
            for name in ["search", "list", "help", "quit"] {
                writeln!(out, "{name}")?;
            }
            return Ok(());
        }
        Some("search") => Topic::Search,
        Some("list") => Topic::List,
        Some(other) => {
            return writeln!(
                out,
                "{}",
                format!("The command '{other}' does not exist.").red()
            );
        }
    };

    let title = match topic {
        Topic::Search => "Search:",
        Topic::List => "List:",
    };
    writeln!(out, "{}", format!("{title}\n-------------------------------").cyan())?;
    print_usage(topic, out)?;
    for line in render::help_lines(topic) {
        writeln!(out, "{line}")?;
    }
    writeln!(out, "{}", "Usage examples:".magenta())?;
    for example in render::help_examples(topic) {
        writeln!(out, "{example}")?;
    }
    writeln!(out, "{}", "-------------------------------".cyan())
}
