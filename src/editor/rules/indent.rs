use crate::editor::{Edit, Selection};

/// Character used for one level of indentation.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Tab,
    Spaces,
}

/// Indentation settings for Tab / Shift+Tab.
///
/// With [`IndentStyle::Spaces`] one unit is `width` spaces. With
/// [`IndentStyle::Tab`] one unit is a tab character and `width` only bounds
/// the run of spaces that outdent accepts in place of a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentConfig {
    pub style: IndentStyle,
    pub width: usize,
}

impl IndentConfig {
    pub const MAX_WIDTH: usize = 16;

    pub fn new(style: IndentStyle, width: usize) -> Self {
        Self {
            style,
            width: width.clamp(1, Self::MAX_WIDTH),
        }
    }

    pub fn spaces(width: usize) -> Self {
        Self::new(IndentStyle::Spaces, width)
    }

    pub fn tab(width: usize) -> Self {
        Self::new(IndentStyle::Tab, width)
    }

    /// The text inserted for one indent level.
    pub fn unit(&self) -> String {
        match self.style {
            IndentStyle::Tab => "\t".to_string(),
            IndentStyle::Spaces => " ".repeat(self.width),
        }
    }

    /// Bytes of leading indentation outdent strips from `line`: one exact
    /// unit if present, otherwise a run of spaces no longer than `width`.
    fn removable_prefix(&self, line: &str) -> usize {
        if self.style == IndentStyle::Tab && line.starts_with('\t') {
            return 1;
        }
        line.bytes()
            .take_while(|b| *b == b' ')
            .count()
            .min(self.width)
    }
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self::spaces(2)
    }
}

/// Indent (Tab).
///
/// A bare caret gets one unit inserted in front of it. A selection indents
/// every line from the line of its start through the line of its end, and
/// keeps covering the same logical text.
pub fn indent(text: &str, selection: Selection, config: &IndentConfig) -> Option<Edit> {
    let unit = config.unit();
    if selection.is_empty() {
        let caret = selection.head;
        text.get(caret..)?;
        return Some(Edit {
            range: caret..caret,
            selection: Selection::caret(caret + unit.len()),
            text: unit,
        });
    }

    let block = Block::around(text, selection)?;
    let mut replaced = String::with_capacity(block.text.len() + unit.len() * block.line_count());
    for (idx, line) in block.text.split('\n').enumerate() {
        if idx > 0 {
            replaced.push('\n');
        }
        replaced.push_str(&unit);
        replaced.push_str(line);
    }

    let shift = |offset: usize| offset + unit.len() * (block.line_index(offset) + 1);
    Some(Edit {
        range: block.start..block.end,
        text: replaced,
        selection: Selection::new(shift(selection.anchor), shift(selection.head)),
    })
}

/// Outdent (Shift+Tab).
///
/// Strips one level of leading indentation from every affected line (just
/// the caret's line when nothing is selected). Lines without leading
/// whitespace are left alone. Each selection end moves back by what was
/// removed in front of it, never crossing the start of its own line.
///
/// Returns `None` when no line had anything to remove.
pub fn outdent(text: &str, selection: Selection, config: &IndentConfig) -> Option<Edit> {
    let block = Block::around(text, selection)?;

    let mut replaced = String::with_capacity(block.text.len());
    // (line start in the original text, bytes removed from that line)
    let mut removals = Vec::with_capacity(block.line_count());
    let mut line_start = block.start;
    for (idx, line) in block.text.split('\n').enumerate() {
        if idx > 0 {
            replaced.push('\n');
        }
        let removed = config.removable_prefix(line);
        replaced.push_str(&line[removed..]);
        removals.push((line_start, removed));
        line_start += line.len() + 1;
    }

    if removals.iter().all(|(_, removed)| *removed == 0) {
        return None;
    }

    let shift = |offset: usize| {
        let mut removed_before = 0;
        for &(start, removed) in &removals {
            if offset < start {
                break;
            }
            removed_before += removed.min(offset - start);
            if offset - start < removed {
                break;
            }
        }
        offset - removed_before
    };

    Some(Edit {
        range: block.start..block.end,
        text: replaced,
        selection: Selection::new(shift(selection.anchor), shift(selection.head)),
    })
}

/// Full lines covered by a selection.
struct Block<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

impl<'a> Block<'a> {
    fn around(text: &'a str, selection: Selection) -> Option<Self> {
        let before = text.get(..selection.start())?;
        let after = text.get(selection.end()..)?;
        let start = before.rfind('\n').map_or(0, |i| i + 1);
        let end = after
            .find('\n')
            .map_or(text.len(), |i| selection.end() + i);
        Some(Self {
            start,
            end,
            text: &text[start..end],
        })
    }

    fn line_count(&self) -> usize {
        self.text.bytes().filter(|b| *b == b'\n').count() + 1
    }

    /// Zero-based line within the block of an offset in the original text.
    fn line_index(&self, offset: usize) -> usize {
        let rel = offset.saturating_sub(self.start).min(self.text.len());
        self.text.as_bytes()[..rel]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
    }
}
