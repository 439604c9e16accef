//! Keystroke rules engine.
//!
//! Pure functions that look at the current text, the selection and the key
//! that was pressed, and decide whether the host should insert the key
//! normally or apply a structural edit instead. Every edit produced here is a
//! single range replacement so the host can treat it as one undo step.
//!
//! Two rules exist and they are selected by key identity:
//! - `>` closes the HTML tag being typed (see [`auto_close_tag`]).
//! - Tab / Shift+Tab indent or outdent the affected lines (see [`indent`]
//!   and [`outdent`]).

mod autoclose;
mod indent;

pub use autoclose::{VOID_ELEMENTS, auto_close_tag, is_void_element};
pub use indent::{IndentConfig, IndentStyle, indent, outdent};

use super::{Edit, Selection};

/// Identity of a pressed key, as far as the rules engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Tab,
    Other,
}

/// A key press with its modifier flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyPress {
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }

    pub const fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    pub const fn tab() -> Self {
        Self::new(Key::Tab)
    }

    /// Shift+Tab.
    pub const fn back_tab() -> Self {
        Self {
            shift: true,
            ..Self::new(Key::Tab)
        }
    }

    pub const fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    /// Ctrl, Alt or Meta held. Shift is not a command modifier: it is how
    /// `>` is typed on most layouts.
    pub const fn has_command_modifier(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// What the host should do with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intercept {
    /// No rule applies; perform the default text input.
    PassThrough,
    /// Swallow the key without changing the text.
    Suppress,
    /// Swallow the key and apply this edit.
    Replace(Edit),
}

/// Run the rules engine for one key press.
pub fn intercept(
    text: &str,
    selection: Selection,
    press: KeyPress,
    indent_config: &IndentConfig,
) -> Intercept {
    if press.has_command_modifier() {
        return Intercept::PassThrough;
    }
    match press.key {
        Key::Char('>') => {
            auto_close_tag(text, selection).map_or(Intercept::PassThrough, Intercept::Replace)
        }
        Key::Tab if press.shift => {
            outdent(text, selection, indent_config).map_or(Intercept::Suppress, Intercept::Replace)
        }
        Key::Tab => indent(text, selection, indent_config).map_or(Intercept::Suppress, Intercept::Replace),
        Key::Char(_) | Key::Other => Intercept::PassThrough,
    }
}
