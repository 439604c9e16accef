use std::ops::Range;

use ropey::Rope;

/// Caret/selection state as byte offsets into the document.
///
/// `anchor` is where the selection started and `head` is where the caret
/// is. They are equal when nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    /// A collapsed selection (bare caret) at `offset`.
    pub const fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    pub const fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Lower bound of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper bound of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub const fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn range(&self) -> Range<usize> {
        self.start()..self.end()
    }
}

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A single atomic replacement: `range` is replaced by `text`, then the
/// selection is set to `selection` (offsets in the edited text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
    pub selection: Selection,
}

impl Edit {
    /// Apply the edit to a plain string.
    ///
    /// Returns `None` when the range is out of bounds or splits a character.
    pub fn apply_to(&self, text: &str) -> Option<String> {
        let head = text.get(..self.range.start)?;
        let tail = text.get(self.range.end..)?;
        let mut out = String::with_capacity(head.len() + self.text.len() + tail.len());
        out.push_str(head);
        out.push_str(&self.text);
        out.push_str(tail);
        Some(out)
    }
}

/// The edited document: text plus selection.
///
/// Offsets are byte offsets into UTF-8 text, always kept on char
/// boundaries, with `0 <= start <= end <= len`.
pub struct Document {
    rope: Rope,
    selection: Selection,
    /// Byte column remembered for vertical movement (sticky column).
    goal_col: Option<usize>,
    revision: u64,
    dirty: bool,
}

impl Document {
    /// Create a document from a string with the caret at the start.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Selection::default(),
            goal_col: None,
            revision: 0,
            dirty: false,
        }
    }

    /// Create an empty document.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// The full text content.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// The caret offset (selection head).
    pub const fn caret(&self) -> usize {
        self.selection.head
    }

    /// Monotonic counter bumped by every content change.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the text changed since creation or the last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Set the selection, clamping both ends into the document.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.selection = Selection::new(self.clamp(anchor), self.clamp(head));
        self.goal_col = None;
    }

    pub fn select_all(&mut self) {
        self.set_selection(0, self.len());
    }

    /// Replace the whole text and put the caret at the start.
    pub fn replace_all(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.selection = Selection::default();
        self.goal_col = None;
        self.touch();
    }

    /// Apply an atomic edit.
    ///
    /// Returns `false` and leaves the document untouched when the edit range
    /// is invalid for the current text.
    pub fn apply(&mut self, edit: &Edit) -> bool {
        let Range { start, end } = edit.range;
        if start > end || end > self.len() || self.clamp(start) != start || self.clamp(end) != end
        {
            return false;
        }
        let char_start = self.rope.byte_to_char(start);
        let char_end = self.rope.byte_to_char(end);
        self.rope.remove(char_start..char_end);
        self.rope.insert(char_start, &edit.text);
        self.selection = Selection::new(
            self.clamp(edit.selection.anchor),
            self.clamp(edit.selection.head),
        );
        self.goal_col = None;
        self.touch();
        true
    }

    /// Total number of lines.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// Byte offset where a line starts.
    pub fn line_start(&self, line_idx: usize) -> usize {
        let line_idx = line_idx.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_byte(line_idx)
    }

    /// Line index containing a byte offset.
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.byte_to_line(offset.min(self.len()))
    }

    /// Caret as (line, byte column).
    pub fn caret_position(&self) -> (usize, usize) {
        let line = self.line_of(self.selection.head);
        (line, self.selection.head - self.line_start(line))
    }

    /// Insert text at the caret, replacing any selection.
    pub fn insert_str(&mut self, s: &str) {
        let range = self.selection.range();
        if s.is_empty() && range.is_empty() {
            return;
        }
        let caret = range.start + s.len();
        self.apply(&Edit {
            range,
            text: s.to_string(),
            selection: Selection::caret(caret),
        });
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    /// Split the current line at the caret (Enter).
    pub fn split_line(&mut self) {
        self.insert_str("\n");
    }

    /// Delete the selection, or the character before the caret (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.insert_str("");
            return true;
        }
        let caret = self.selection.head;
        if caret == 0 {
            return false;
        }
        let prev = self.prev_boundary(caret);
        self.apply(&Edit {
            range: prev..caret,
            text: String::new(),
            selection: Selection::caret(prev),
        })
    }

    /// Delete the selection, or the character at the caret (Delete).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.insert_str("");
            return true;
        }
        let caret = self.selection.head;
        if caret >= self.len() {
            return false;
        }
        let next = self.next_boundary(caret);
        self.apply(&Edit {
            range: caret..next,
            text: String::new(),
            selection: Selection::caret(caret),
        })
    }

    /// Move the caret; with `extend` the anchor stays put.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        match direction {
            Direction::Left => {
                let target = if !extend && !self.selection.is_empty() {
                    self.selection.start()
                } else {
                    self.prev_boundary(self.selection.head)
                };
                self.move_head(target, extend);
            }
            Direction::Right => {
                let target = if !extend && !self.selection.is_empty() {
                    self.selection.end()
                } else {
                    self.next_boundary(self.selection.head)
                };
                self.move_head(target, extend);
            }
            Direction::Up => self.move_vertical(-1, extend),
            Direction::Down => self.move_vertical(1, extend),
        }
    }

    /// Move caret to the beginning of the line (Home).
    pub fn move_home(&mut self, extend: bool) {
        let line = self.line_of(self.selection.head);
        self.move_head(self.line_start(line), extend);
    }

    /// Move caret to the end of the line (End).
    pub fn move_end(&mut self, extend: bool) {
        let line = self.line_of(self.selection.head);
        self.move_head(self.line_start(line) + self.line_len(line), extend);
    }

    /// Move caret to the start of the document (Ctrl+Home).
    pub fn move_to_start(&mut self, extend: bool) {
        self.move_head(0, extend);
    }

    /// Move caret to the end of the document (Ctrl+End).
    pub fn move_to_end(&mut self, extend: bool) {
        self.move_head(self.len(), extend);
    }

    /// Move caret to a line and byte column, clamped.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        let col = col.min(self.line_len(line));
        self.move_head(self.line_start(line) + col, false);
    }

    // --- Private helpers ---

    const fn touch(&mut self) {
        self.revision += 1;
        self.dirty = true;
    }

    /// Clamp an offset into the document and back onto a char boundary.
    fn clamp(&self, offset: usize) -> usize {
        let offset = offset.min(self.len());
        self.rope.char_to_byte(self.rope.byte_to_char(offset))
    }

    fn prev_boundary(&self, offset: usize) -> usize {
        let char_idx = self.rope.byte_to_char(offset.min(self.len()));
        self.rope.char_to_byte(char_idx.saturating_sub(1))
    }

    fn next_boundary(&self, offset: usize) -> usize {
        let char_idx = self.rope.byte_to_char(offset.min(self.len()));
        let next = (char_idx + 1).min(self.rope.len_chars());
        self.rope.char_to_byte(next)
    }

    fn move_head(&mut self, target: usize, extend: bool) {
        let head = self.clamp(target);
        self.selection = if extend {
            Selection::new(self.selection.anchor, head)
        } else {
            Selection::caret(head)
        };
        self.goal_col = None;
    }

    fn move_vertical(&mut self, delta: isize, extend: bool) {
        let (line, col) = self.caret_position();
        let target_line = line.checked_add_signed(delta);
        let Some(target_line) = target_line.filter(|l| *l < self.line_count()) else {
            return;
        };
        let goal = self.goal_col.unwrap_or(col);
        let target = self.clamp(self.line_start(target_line) + goal.min(self.line_len(target_line)));
        self.move_head(target, extend);
        self.goal_col = Some(goal);
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Construction and basic queries ---

    #[test]
    fn test_empty_document_has_one_line() {
        let doc = Document::empty();
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line_at(0), Some(String::new()));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_from_text_preserves_content() {
        let doc = Document::from_text("<p>\n</p>");
        assert_eq!(doc.line_count(), 2);
        assert_eq!(doc.line_at(0), Some("<p>".to_string()));
        assert_eq!(doc.line_at(1), Some("</p>".to_string()));
        assert_eq!(doc.text(), "<p>\n</p>");
    }

    #[test]
    fn test_line_at_out_of_bounds_returns_none() {
        let doc = Document::from_text("hello");
        assert_eq!(doc.line_at(1), None);
    }

    #[test]
    fn test_caret_starts_at_origin() {
        let doc = Document::from_text("hello\nworld");
        assert_eq!(doc.selection(), Selection::caret(0));
        assert_eq!(doc.caret_position(), (0, 0));
    }

    // --- Selection ---

    #[test]
    fn test_selection_start_end_are_ordered() {
        let sel = Selection::new(7, 2);
        assert_eq!(sel.start(), 2);
        assert_eq!(sel.end(), 7);
        assert!(!sel.is_empty());
    }

    #[test]
    fn test_set_selection_clamps_to_length() {
        let mut doc = Document::from_text("abc");
        doc.set_selection(1, 99);
        assert_eq!(doc.selection(), Selection::new(1, 3));
    }

    #[test]
    fn test_set_selection_snaps_to_char_boundary() {
        let mut doc = Document::from_text("café");
        doc.set_selection(4, 4); // inside the two-byte 'é'
        assert_eq!(doc.caret(), 3);
    }

    #[test]
    fn test_select_all() {
        let mut doc = Document::from_text("one\ntwo");
        doc.select_all();
        assert_eq!(doc.selection().range(), 0..7);
    }

    // --- Atomic edits ---

    #[test]
    fn test_apply_replaces_range_and_sets_selection() {
        let mut doc = Document::from_text("<h1Hi");
        let applied = doc.apply(&Edit {
            range: 3..3,
            text: "></h1>".to_string(),
            selection: Selection::caret(4),
        });
        assert!(applied);
        assert_eq!(doc.text(), "<h1></h1>Hi");
        assert_eq!(doc.caret(), 4);
        assert_eq!(doc.revision(), 1);
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_apply_rejects_out_of_bounds_range() {
        let mut doc = Document::from_text("abc");
        let applied = doc.apply(&Edit {
            range: 2..10,
            text: String::new(),
            selection: Selection::caret(0),
        });
        assert!(!applied);
        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.revision(), 0);
    }

    #[test]
    fn test_apply_rejects_range_splitting_a_char() {
        let mut doc = Document::from_text("é");
        let applied = doc.apply(&Edit {
            range: 1..2,
            text: String::new(),
            selection: Selection::caret(0),
        });
        assert!(!applied);
        assert_eq!(doc.text(), "é");
    }

    #[test]
    fn test_edit_apply_to_string() {
        let edit = Edit {
            range: 1..2,
            text: "XY".to_string(),
            selection: Selection::caret(3),
        };
        assert_eq!(edit.apply_to("abc"), Some("aXYc".to_string()));
        assert_eq!(edit.apply_to(""), None);
    }

    #[test]
    fn test_replace_all_resets_caret() {
        let mut doc = Document::from_text("old");
        doc.move_to_end(false);
        doc.replace_all("new text");
        assert_eq!(doc.text(), "new text");
        assert_eq!(doc.selection(), Selection::caret(0));
    }

    // --- Dirty tracking ---

    #[test]
    fn test_new_document_is_clean() {
        let doc = Document::from_text("hello");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_mark_clean_resets_dirty_but_not_revision() {
        let mut doc = Document::from_text("hello");
        doc.insert_char('!');
        doc.mark_clean();
        assert!(!doc.is_dirty());
        assert_eq!(doc.revision(), 1);
    }

    // --- Insertion ---

    #[test]
    fn test_insert_char_advances_caret() {
        let mut doc = Document::from_text("ello");
        doc.insert_char('h');
        assert_eq!(doc.text(), "hello");
        assert_eq!(doc.caret(), 1);
    }

    #[test]
    fn test_insert_multibyte_char() {
        let mut doc = Document::from_text("caf");
        doc.move_to_end(false);
        doc.insert_char('é');
        assert_eq!(doc.text(), "café");
        assert_eq!(doc.caret(), 5);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut doc = Document::from_text("hello world");
        doc.set_selection(6, 11);
        doc.insert_str("there");
        assert_eq!(doc.text(), "hello there");
        assert_eq!(doc.selection(), Selection::caret(11));
    }

    #[test]
    fn test_insert_empty_str_is_noop() {
        let mut doc = Document::from_text("hello");
        doc.insert_str("");
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_split_line_in_middle() {
        let mut doc = Document::from_text("hello world");
        doc.move_to(0, 5);
        doc.split_line();
        assert_eq!(doc.line_at(0), Some("hello".to_string()));
        assert_eq!(doc.line_at(1), Some(" world".to_string()));
        assert_eq!(doc.caret_position(), (1, 0));
    }

    // --- Deletion ---

    #[test]
    fn test_delete_back_at_start_is_noop() {
        let mut doc = Document::from_text("hello");
        assert!(!doc.delete_back());
        assert_eq!(doc.text(), "hello");
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut doc = Document::from_text("hello\nworld");
        doc.move_to(1, 0);
        doc.delete_back();
        assert_eq!(doc.text(), "helloworld");
        assert_eq!(doc.caret_position(), (0, 5));
    }

    #[test]
    fn test_delete_back_multibyte() {
        let mut doc = Document::from_text("café");
        doc.move_to_end(false);
        doc.delete_back();
        assert_eq!(doc.text(), "caf");
    }

    #[test]
    fn test_delete_back_removes_selection() {
        let mut doc = Document::from_text("abcdef");
        doc.set_selection(4, 1);
        assert!(doc.delete_back());
        assert_eq!(doc.text(), "aef");
        assert_eq!(doc.caret(), 1);
    }

    #[test]
    fn test_delete_forward_at_end_is_noop() {
        let mut doc = Document::from_text("hello");
        doc.move_to_end(false);
        assert!(!doc.delete_forward());
    }

    #[test]
    fn test_delete_forward_removes_char() {
        let mut doc = Document::from_text("hello");
        doc.delete_forward();
        assert_eq!(doc.text(), "ello");
        assert_eq!(doc.caret(), 0);
    }

    // --- Caret movement ---

    #[test]
    fn test_move_left_wraps_to_prev_line() {
        let mut doc = Document::from_text("hello\nworld");
        doc.move_to(1, 0);
        doc.move_cursor(Direction::Left, false);
        assert_eq!(doc.caret_position(), (0, 5));
    }

    #[test]
    fn test_move_right_collapses_selection_to_end() {
        let mut doc = Document::from_text("hello");
        doc.set_selection(1, 3);
        doc.move_cursor(Direction::Right, false);
        assert_eq!(doc.selection(), Selection::caret(3));
    }

    #[test]
    fn test_shift_right_extends_selection() {
        let mut doc = Document::from_text("hello");
        doc.move_cursor(Direction::Right, true);
        doc.move_cursor(Direction::Right, true);
        assert_eq!(doc.selection(), Selection::new(0, 2));
    }

    #[test]
    fn test_move_up_clamps_to_shorter_line() {
        let mut doc = Document::from_text("hi\nhello");
        doc.move_to(1, 4);
        doc.move_cursor(Direction::Up, false);
        assert_eq!(doc.caret_position(), (0, 2));
    }

    #[test]
    fn test_column_memory_across_short_line() {
        let mut doc = Document::from_text("hello\nhi\nworld");
        doc.move_to(0, 4);
        doc.move_cursor(Direction::Down, false);
        assert_eq!(doc.caret_position(), (1, 2));
        doc.move_cursor(Direction::Down, false);
        assert_eq!(doc.caret_position(), (2, 4));
    }

    #[test]
    fn test_move_down_at_last_line_is_noop() {
        let mut doc = Document::from_text("hello\nworld");
        doc.move_to(1, 2);
        doc.move_cursor(Direction::Down, false);
        assert_eq!(doc.caret_position(), (1, 2));
    }

    #[test]
    fn test_home_and_end() {
        let mut doc = Document::from_text("one\ntwo three");
        doc.move_to(1, 4);
        doc.move_home(false);
        assert_eq!(doc.caret_position(), (1, 0));
        doc.move_end(true);
        assert_eq!(doc.selection(), Selection::new(4, 13));
    }

    #[test]
    fn test_move_to_clamps() {
        let mut doc = Document::from_text("hello");
        doc.move_to(100, 100);
        assert_eq!(doc.caret_position(), (0, 5));
    }
}
