//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Store writes, submission and the draft timer live in the side-effect
//! handler that runs after each update.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{DEFAULT_DOCUMENT, Model, PersistStamp, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::cache::{DEFAULT_DRAFT_KEY, DEFAULT_QUIET_PERIOD_MS};
use crate::editor::IndentConfig;

/// Main application struct: settings for one editing session.
pub struct App {
    draft_key: String,
    author_name: Option<String>,
    indent: IndentConfig,
    quiet_period_ms: u64,
    auto_load_default: bool,
    store_dir: PathBuf,
    preview_path: PathBuf,
    open_preview: bool,
}

impl App {
    /// Create an application that keeps its data in `store_dir`.
    pub fn new(store_dir: PathBuf) -> Self {
        let preview_path = store_dir.join("preview.html");
        Self {
            draft_key: DEFAULT_DRAFT_KEY.to_string(),
            author_name: None,
            indent: IndentConfig::default(),
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
            auto_load_default: true,
            store_dir,
            preview_path,
            open_preview: true,
        }
    }

    /// Store key for the draft snapshot.
    pub fn with_draft_key(mut self, key: impl Into<String>) -> Self {
        self.draft_key = key.into();
        self
    }

    /// Author name used when no draft is restored.
    pub fn with_author_name(mut self, name: Option<String>) -> Self {
        self.author_name = name;
        self
    }

    pub const fn with_indent(mut self, indent: IndentConfig) -> Self {
        self.indent = indent;
        self
    }

    /// Quiet period before a changed draft is written.
    pub const fn with_quiet_period_ms(mut self, ms: u64) -> Self {
        self.quiet_period_ms = ms;
        self
    }

    /// Auto-load setting used until the user toggles it.
    pub const fn with_auto_load_default(mut self, enabled: bool) -> Self {
        self.auto_load_default = enabled;
        self
    }

    /// Where the preview page is written.
    pub fn with_preview_path(mut self, path: PathBuf) -> Self {
        self.preview_path = path;
        self
    }

    /// Open the preview page in a browser after each submit.
    pub const fn with_open_preview(mut self, enabled: bool) -> Self {
        self.open_preview = enabled;
        self
    }
}
