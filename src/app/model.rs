use std::time::{Duration, Instant};

use crate::cache::DraftSnapshot;
use crate::editor::{Document, IndentConfig};

/// Document shown on first launch and restored by reset.
pub const DEFAULT_DOCUMENT: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>My page</title>
  <style>
    body {
      font-family: sans-serif;
    }
  </style>
</head>
<body>
  <h1>Hello!</h1>
  <p>Edit this page, then press F5 to preview it.</p>
</body>
</html>
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Identifies the persisted content of a model: changes when the document
/// text or the author name changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistStamp {
    document_revision: u64,
    name_revision: u64,
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
pub struct Model {
    /// The edited document
    pub document: Document,
    /// Content restored by reset
    pub default_code: String,
    /// Author name saved alongside the draft
    pub author_name: String,
    name_revision: u64,
    /// Tab / Shift+Tab settings
    pub indent: IndentConfig,
    /// Whether the next launch restores the cached draft
    pub auto_load: bool,
    /// Whether keystrokes go to the author-name field
    pub name_editing: bool,
    /// Whether a submission record exists
    pub has_submission: bool,
    /// First visible editor line
    pub scroll_offset: usize,
    /// First visible display column
    pub scroll_col: usize,
    /// Terminal size (columns, rows)
    pub terminal_size: (u16, u16),
    toast: Option<Toast>,
    /// Set after the first reset press; a second press resets
    pub reset_confirmed: bool,
    /// Whether the app should quit
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("document", &self.document)
            .field("author_name", &self.author_name)
            .field("auto_load", &self.auto_load)
            .field("name_editing", &self.name_editing)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT, (80, 24))
    }
}

impl Model {
    /// Create a model showing `default_code`.
    pub fn new(default_code: impl Into<String>, terminal_size: (u16, u16)) -> Self {
        let default_code = default_code.into();
        Self {
            document: Document::from_text(&default_code),
            default_code,
            author_name: String::new(),
            name_revision: 0,
            indent: IndentConfig::default(),
            auto_load: true,
            name_editing: false,
            has_submission: false,
            scroll_offset: 0,
            scroll_col: 0,
            terminal_size,
            toast: None,
            reset_confirmed: false,
            should_quit: false,
        }
    }

    pub fn with_indent(mut self, indent: IndentConfig) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = name.into();
        self
    }

    /// Replace the document and author name with a cached draft.
    pub fn hydrate(&mut self, snapshot: DraftSnapshot) {
        self.document = Document::from_text(&snapshot.code);
        self.author_name = snapshot.name;
        self.scroll_offset = 0;
        self.scroll_col = 0;
    }

    pub fn set_author_name(&mut self, name: String) {
        if name != self.author_name {
            self.author_name = name;
            self.name_revision += 1;
        }
    }

    /// Restore the default document. The author name is kept.
    pub fn reset_document(&mut self) {
        let default_code = std::mem::take(&mut self.default_code);
        self.document.replace_all(&default_code);
        self.default_code = default_code;
        self.has_submission = false;
        self.scroll_offset = 0;
        self.scroll_col = 0;
    }

    pub const fn persist_stamp(&self) -> PersistStamp {
        PersistStamp {
            document_revision: self.document.revision(),
            name_revision: self.name_revision,
        }
    }

    /// Rows available to the editor pane.
    pub fn editor_rows(&self) -> usize {
        let footer = 1 + u16::from(self.toast.is_some());
        usize::from(self.terminal_size.1.saturating_sub(footer))
    }

    /// Columns available to editor text, after the gutter.
    pub fn editor_text_cols(&self) -> usize {
        let gutter = crate::ui::line_number_width(self.document.line_count()) + 1;
        usize::from(self.terminal_size.0.saturating_sub(gutter))
    }

    /// Scroll so the caret stays on screen.
    pub fn ensure_caret_visible(&mut self) {
        let (line, col) = self.document.caret_position();
        let rows = self.editor_rows();
        if rows == 0 || line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + rows {
            self.scroll_offset = line + 1 - rows;
        }

        let line_text = self.document.line_at(line).unwrap_or_default();
        let display_col = crate::ui::display_col(&line_text, col);
        let cols = self.editor_text_cols();
        if cols == 0 || display_col < self.scroll_col {
            self.scroll_col = display_col;
        } else if display_col >= self.scroll_col + cols {
            self.scroll_col = display_col + 1 - cols;
        }
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
