//! mdpad - A terminal Markdown editor with live preview and autosave.
//!
//! # Usage
//!
//! ```bash
//! mdpad
//! mdpad notes.md
//! mdpad --layout preview --theme light
//! mdpad --print-words
//! ```

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use mdpad::app::App;
use mdpad::config::{
    ConfigFlags, LayoutMode, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use mdpad::document::{ControllerConfig, DocumentController, check_import_name};
use mdpad::highlight::{HighlightBackground, set_background};
use mdpad::store::{FileStore, KeyValueStore, MemoryStore};

/// A terminal Markdown editor with live preview and autosave
#[derive(Parser, Debug)]
#[command(name = "mdpad", version, about, long_about = None)]
struct Cli {
    /// Markdown file to import after the saved document is restored
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Force syntax highlight theme background (light or dark)
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Initial pane layout
    #[arg(long, value_enum)]
    layout: Option<LayoutMode>,

    /// Quiet period before an edit is saved, in milliseconds
    #[arg(long, value_name = "MS")]
    autosave_ms: Option<u64>,

    /// File the document snapshot is kept in
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Write logs to a file (the terminal is owned by the UI)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Restore the saved document but never write it back
    #[arg(long)]
    no_autosave: bool,

    /// Directory exports are written to
    #[arg(long, value_name = "PATH")]
    export_dir: Option<PathBuf>,

    /// Print the word count of the document and exit
    #[arg(long)]
    print_words: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            theme: self.theme,
            layout: self.layout,
            autosave_ms: self.autosave_ms,
            store: self.store.clone(),
            log_file: self.log_file.clone(),
            export_dir: self.export_dir.clone(),
            no_autosave: self.no_autosave,
        }
    }
}

/// Install the global subscriber.
///
/// Without a log file the TUI discards output so nothing is drawn over the
/// screen; `--print-words` logs to stderr instead.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None if interactive => BoxMakeWriter::new(std::io::sink),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(())
}

/// The store for this session.
///
/// With autosave off the saved snapshot is copied into memory, so it is
/// restored as usual but edits never reach the file.
fn open_store(flags: &ConfigFlags, storage_key: &str) -> Box<dyn KeyValueStore> {
    let file_store = FileStore::new(flags.store_path());
    if !flags.no_autosave {
        return Box::new(file_store);
    }
    let memory = match file_store.get(storage_key) {
        Ok(Some(snapshot)) => MemoryStore::new().with_entry(storage_key, &snapshot),
        Ok(None) => MemoryStore::new(),
        Err(err) => {
            tracing::warn!(%err, "could not read saved document");
            MemoryStore::new()
        }
    };
    Box::new(memory)
}

fn print_words(
    config: ControllerConfig,
    store: Box<dyn KeyValueStore>,
    file: Option<&Path>,
) -> Result<()> {
    let mut document = DocumentController::open(config, store);
    if let Some(path) = file {
        let name = path.to_string_lossy();
        check_import_name(&name)?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        document.import(&name, &content, std::time::Instant::now())?;
    }
    println!("{}", document.word_count());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref(), !cli.print_words)?;
    tracing::debug!(?effective, "configuration loaded");

    match effective.theme.unwrap_or(ThemeMode::Auto) {
        ThemeMode::Auto => set_background(None),
        ThemeMode::Light => set_background(Some(HighlightBackground::Light)),
        ThemeMode::Dark => set_background(Some(HighlightBackground::Dark)),
    }

    let config = ControllerConfig {
        autosave_delay: effective.autosave_delay(),
        ..ControllerConfig::default()
    };
    let store = open_store(&effective, &config.storage_key);

    if cli.print_words {
        return print_words(config, store, cli.file.as_deref());
    }

    if let Some(file) = cli.file.as_deref()
        && !file.exists()
    {
        anyhow::bail!("File not found: {}", file.display());
    }

    let mut app = App::new(config, store)
        .with_layout(effective.layout.unwrap_or_default())
        .with_export_dir(effective.export_dir())
        .with_initial_import(cli.file);

    app.run().context("Application error")
}
