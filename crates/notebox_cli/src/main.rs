//! `notebox` command-line front end.
//!
//! # Responsibility
//! - Drive the notes store against a SQLite storage file.
//! - Render note lists with the core formatting helpers.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info};
use notebox_core::{
    core_version, default_log_level, format_updated_at, init_logging, ping, snippet,
    LoggingConfig, Note, NoteId, NotesStore, SortMode, SqliteStorage, StoreConfig,
    DEFAULT_SNIPPET_LEN, DEFAULT_STORAGE_KEY,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "notebox", version, about = "Local note keeping")]
struct Cli {
    /// SQLite file holding the notes slot.
    #[arg(long, global = true, default_value = "notebox.sqlite3")]
    db: PathBuf,

    /// Storage key of the notes slot.
    #[arg(long, global = true, default_value = DEFAULT_STORAGE_KEY)]
    key: String,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List notes, optionally filtered and sorted.
    List {
        #[arg(long, short, default_value = "")]
        query: String,
        #[arg(long, short, default_value_t = SortMode::UpdatedDesc)]
        sort: SortMode,
    },
    /// Show one note in full.
    Show { id: String },
    /// Add a note.
    Add {
        #[arg(long, short)]
        title: String,
        #[arg(long, short, default_value = "")]
        body: String,
    },
    /// Replace the title and body of a note.
    Edit {
        id: String,
        #[arg(long, short)]
        title: String,
        #[arg(long, short, default_value = "")]
        body: String,
    },
    /// Delete a note.
    Delete { id: String },
    /// Clear the notes slot; sample notes are seeded again on next use.
    Reset,
    /// Print `pong`.
    Ping,
    /// Print the core library version.
    Version,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::Reset => "reset",
            Self::Ping => "ping",
            Self::Version => "version",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let config = LoggingConfig::new(level, log_dir).map_err(anyhow::Error::msg)?;
        init_logging(&config).map_err(anyhow::Error::msg)?;
    }

    let command = cli.command.name();
    info!("event=cli_command module=cli status=start command={command}");
    match run(cli) {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok command={command}");
            Ok(())
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error command={command} error={err:#}");
            Err(err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ping => {
            println!("{}", ping());
            return Ok(());
        }
        Command::Version => {
            println!("{}", core_version());
            return Ok(());
        }
        _ => {}
    }

    let storage = SqliteStorage::open(&cli.db)
        .with_context(|| format!("failed to open storage `{}`", cli.db.display()))?;
    let config = StoreConfig::default().with_storage_key(cli.key.clone());
    let mut store = NotesStore::new(storage, config);

    if let Command::Reset = cli.command {
        store
            .into_persistence()
            .clear()
            .context("failed to clear notes")?;
        println!("notes cleared");
        return Ok(());
    }

    store.initialize().context("failed to load notes")?;

    match cli.command {
        Command::List { query, sort } => {
            let visible = store.view(&query, sort);
            if visible.is_empty() {
                println!("no notes");
            }
            for note in &visible {
                print_row(note);
            }
        }
        Command::Show { id } => {
            let Some(note) = store.get(&NoteId::new(id.as_str())) else {
                bail!("note not found: {id}");
            };
            println!("{}", note.title);
            println!("id: {}", note.id);
            println!("updated: {}", format_updated_at(note.updated_at));
            if !note.body.is_empty() {
                println!();
                println!("{}", note.body);
            }
        }
        Command::Add { title, body } => {
            let note = store.create(&title, &body)?;
            println!("created {}", note.id);
        }
        Command::Edit { id, title, body } => {
            let note = store.update(&NoteId::new(id), &title, &body)?;
            println!("updated {}", note.id);
        }
        Command::Delete { id } => {
            let id = NoteId::new(id);
            if store.delete(&id)? {
                println!("deleted {id}");
            } else {
                println!("nothing to delete for {id}");
            }
        }
        Command::Reset | Command::Ping | Command::Version => {}
    }

    Ok(())
}

fn print_row(note: &Note) {
    println!(
        "{}  {}  {}",
        note.id,
        format_updated_at(note.updated_at),
        note.title
    );
    let preview = snippet(&note.body, DEFAULT_SNIPPET_LEN);
    if !preview.is_empty() {
        println!("    {preview}");
    }
}
