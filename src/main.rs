//! tagpad - a terminal HTML/CSS scratchpad.
//!
//! # Usage
//!
//! ```bash
//! tagpad
//! tagpad --name "Ada" --indent tab
//! tagpad --draft-key lesson-3 --no-open --save
//! ```

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;

use tagpad::app::App;
use tagpad::cache::DEFAULT_QUIET_PERIOD_MS;
use tagpad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    save_config_flags,
};
use tagpad::editor::IndentStyle;
use tagpad::store::default_store_dir;

/// A terminal HTML/CSS scratchpad with tag auto-closing and a sandboxed preview
#[derive(Parser, Debug)]
#[command(name = "tagpad", version, about, long_about = None)]
struct Cli {
    /// Store key for the draft (lets several drafts coexist)
    #[arg(long, value_name = "KEY")]
    draft_key: Option<String>,

    /// Author name saved with the draft
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Indent with tabs or spaces
    #[arg(long, value_enum)]
    indent: Option<IndentStyle>,

    /// Spaces per indent level (1-16)
    #[arg(long, value_name = "N")]
    indent_width: Option<usize>,

    /// Quiet period before the draft is saved, in milliseconds
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Start from the starter page instead of the saved draft
    #[arg(long)]
    no_autoload: bool,

    /// Directory holding drafts and submissions
    #[arg(long, value_name = "PATH")]
    store_dir: Option<PathBuf>,

    /// Where the preview page is written
    #[arg(long, value_name = "PATH")]
    preview_path: Option<PathBuf>,

    /// Write the preview page without opening a browser
    #[arg(long)]
    no_open: bool,

    /// Write logs to a file (the terminal is busy with the editor)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn config_flags(&self) -> ConfigFlags {
        ConfigFlags {
            draft_key: self.draft_key.clone().filter(|key| !key.is_empty()),
            name: self.name.clone(),
            indent: self.indent,
            indent_width: self.indent_width,
            debounce_ms: self.debounce_ms,
            no_autoload: self.no_autoload,
            store_dir: self.store_dir.clone(),
            preview_path: self.preview_path.clone(),
            no_open: self.no_open,
            log_file: self.log_file.clone(),
        }
    }
}

fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if let Some(path) = path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.config_flags();

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

    let log_file = effective
        .log_file
        .clone()
        .or_else(|| std::env::var_os("TAGPAD_LOG_FILE").map(PathBuf::from));
    init_logging(log_file.as_ref())?;
    tracing::debug!(?effective, "effective configuration");

    let store_dir = effective.store_dir.clone().unwrap_or_else(default_store_dir);
    let preview_path = effective
        .preview_path
        .clone()
        .unwrap_or_else(|| store_dir.join("preview.html"));

    let mut app = App::new(store_dir)
        .with_draft_key(
            effective
                .draft_key
                .clone()
                .unwrap_or_else(|| tagpad::cache::DEFAULT_DRAFT_KEY.to_string()),
        )
        .with_author_name(effective.name.clone())
        .with_indent(effective.indent_config())
        .with_quiet_period_ms(effective.debounce_ms.unwrap_or(DEFAULT_QUIET_PERIOD_MS))
        .with_auto_load_default(!effective.no_autoload)
        .with_preview_path(preview_path)
        .with_open_preview(!effective.no_open);

    app.run().context("Application error")
}
