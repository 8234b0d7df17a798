//! Contact book command-line front end.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the contact database.
//! - Dispatch one-shot subcommands or run the interactive menu.
//!
//! # Invariants
//! - The database connection is opened once here and dropped on exit,
//!   including error exits.

mod commands;
mod config;
mod interactive;
mod prompt;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::Output;
use config::AppConfig;
use contactbook_core::db::open_db;
use contactbook_core::{init_logging, ContactId, ContactService, SqliteContactRepository};
use interactive::Session;
use log::info;
use prompt::ReaderSource;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contactbook", version)]
#[command(about = "Personal contact book backed by a local SQLite file", long_about = None)]
struct Cli {
    /// Contact database file
    #[arg(long, global = true, env = "CONTACTBOOK_DB_PATH")]
    db: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, global = true, env = "CONTACTBOOK_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true, env = "CONTACTBOOK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a contact, optionally merging into an existing one with the same name
    Add {
        #[arg(short, long, default_value = "")]
        name: String,
        /// Phone number (repeatable)
        #[arg(short, long = "phone")]
        phones: Vec<String>,
        /// Email address (repeatable)
        #[arg(short, long = "email")]
        emails: Vec<String>,
        /// Postal address (repeatable)
        #[arg(short, long = "address")]
        addresses: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Merge into an existing contact with the same name
        #[arg(long)]
        merge: bool,
    },
    /// Show one contact
    Show { id: ContactId },
    /// List all contacts with their phones
    List,
    /// Search contacts by keyword
    Search {
        /// Keyword; omit to list everything
        keyword: Option<String>,
        /// Category: name, phone, email, address, all
        #[arg(short, long, default_value = "all")]
        category: String,
    },
    /// Replace name/notes, or add one phone/email/address
    Update {
        id: ContactId,
        field: String,
        value: String,
    },
    /// Remove one phone/email/address value
    Remove {
        id: ContactId,
        field: String,
        value: String,
    },
    /// Delete a contact and all its values
    Delete { id: ContactId },
    /// Run the interactive menu (default)
    Interactive,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.db, cli.log_dir, cli.log_level);

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create data directory `{}`", parent.display()))?;
    }
    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("cannot open contact database `{}`", config.db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut output = Output {
        out: &mut out,
        json: cli.json,
    };

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Add {
            name,
            phones,
            emails,
            addresses,
            notes,
            merge,
        } => {
            let contact = commands::new_contact_from_flags(name, phones, emails, addresses, notes)?;
            commands::add(&mut service, &mut output, &contact, merge)?;
        }
        Commands::Show { id } => commands::show(&service, &mut output, id)?,
        Commands::List => commands::list(&service, &mut output)?,
        Commands::Search { keyword, category } => commands::search(
            &service,
            &mut output,
            keyword.as_deref().unwrap_or_default(),
            &category,
        )?,
        Commands::Update { id, field, value } => {
            commands::update(&mut service, &mut output, id, &field, &value)?;
        }
        Commands::Remove { id, field, value } => {
            commands::remove(&mut service, &mut output, id, &field, &value)?;
        }
        Commands::Delete { id } => commands::delete(&mut service, &mut output, id)?,
        Commands::Interactive => {
            let source = ReaderSource::new(io::stdin().lock(), io::stdout());
            Session::new(&mut service, source, &mut *output.out).run()?;
        }
    }

    output.out.flush()?;
    Ok(())
}
