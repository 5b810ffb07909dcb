//! Binary entry point: parse flags, set up logging on stderr, open the store,
//! and hand stdin/stdout to the menu loop.
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use hospital_admin::config::DEFAULT_DB_FILE;
use hospital_admin::{Config, Console, Database};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hospital-admin",
    about = "Console hospital administration: patients, doctors, appointments, billing"
)]
struct Cli {
    /// SQLite database file, created on first run
    #[arg(long = "db", value_name = "PATH", default_value = DEFAULT_DB_FILE)]
    db_path: PathBuf,

    /// Print status lines without ANSI colours
    #[arg(long)]
    no_color: bool,
}

/// Returning a `Result` surfaces startup failures, such as an unwritable
/// database location, instead of dropping into the menu with a broken store.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hospital_admin=warn")),
        )
        .init();

    let cli = Cli::parse();
    let color = !cli.no_color && io::stdout().is_terminal();
    let config = Config::new(cli.db_path).with_color(color);

    let database = Database::open(&config)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(&database, stdin.lock(), stdout.lock())
        .with_color(config.color)
        .run()
}
