// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. cache::DraftCache)
    clippy::module_name_repetitions
)]

//! # tagpad
//!
//! A plain-text HTML/CSS scratchpad for the terminal.
//!
//! - Typing `>` after an opening tag inserts the matching closing tag
//! - Tab / Shift+Tab indent and outdent whole blocks in one edit
//! - Drafts are saved automatically after a short quiet period
//! - Submitting renders the page in a sandboxed, script-free preview
//!
//! ## Architecture
//!
//! The editing core is host-agnostic; the terminal host uses The Elm
//! Architecture (TEA):
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`editor`]: Document buffer and keystroke rules
//! - [`cache`]: Debounced draft persistence
//! - [`preview`]: Submission and sandboxed preview
//! - [`store`]: Key-value persistence backends
//! - [`config`]: Flag files and CLI defaults
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod cache;
pub mod config;
pub mod editor;
pub mod preview;
pub mod store;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::cache::{DraftCache, Hydration};
    pub use crate::editor::{Document, Edit, IndentConfig, Intercept, KeyPress, Selection, intercept};
    pub use crate::preview::{Renderer, SandboxPolicy, submit};
    pub use crate::store::{FileStore, MemoryStore, Store};
}
