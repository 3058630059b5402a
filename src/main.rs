//! Binary entry point: resolve settings, bring up logging and the SQLite
//! store (seeding it on first run), then either run a single command or
//! hand over to the interactive prompt.
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use schedule_browser::console::{Command, Entity};
use schedule_browser::db::bootstrap;
use schedule_browser::{Session, Settings, SqliteConnector};
use tracing_subscriber::EnvFilter;

/// Browse lecturers, subjects and rooms stored in a local SQLite database.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file. Defaults to ~/.schedule-browser/scheduler.sqlite.
    #[arg(long, env = "SCHEDULE_BROWSER_DB")]
    database: Option<PathBuf>,

    /// Drop every table, recreate the schema and reseed it.
    #[arg(long)]
    reset: bool,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "schedule_browser=debug").
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every lecturer, subject or room.
    List { entity: Entity },
    /// Find a single lecturer, subject or room.
    Search {
        entity: Entity,
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(cli.database, cli.reset, cli.log_level)?;
    init_tracing(&settings.log_filter);

    settings.ensure_data_dir()?;
    let connector = SqliteConnector::new(settings.database_path.clone());
    if bootstrap::initialize(&connector, settings.reset)? {
        println!("Database initialized at {}", connector.path().display());
    }

    let session = Session::new(&connector);
    let command = match cli.command {
        Some(Commands::List { entity }) => Command::List(entity),
        Some(Commands::Search { entity, term }) => Command::Search(entity, term.join(" ")),
        None => return session.run(),
    };
    session.execute(&command, &mut io::stdout())?;
    Ok(())
}

/// Log to stderr so tables on stdout stay clean. `RUST_LOG` wins over the
/// configured filter.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
