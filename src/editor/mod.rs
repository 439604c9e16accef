//! Text editing core.
//!
//! Provides a rope-backed document with a byte-offset selection, and the
//! keystroke rules engine that turns key presses into single atomic edits.

mod buffer;
pub mod rules;

pub use buffer::{Direction, Document, Edit, Selection};
pub use rules::{IndentConfig, IndentStyle, Intercept, Key, KeyPress, intercept};
