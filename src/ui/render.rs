use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::app::Model;

use super::status;

/// Columns a tab advances to.
pub const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Plain,
    Selected,
    Caret,
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();

    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let editor_area = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    render_editor(model, frame, editor_area);

    if toast_active && area.height >= 2 {
        status::render_toast_bar(model, frame, toast_area);
    }
    if model.name_editing {
        status::render_name_bar(model, frame, status_area);
    } else {
        status::render_status_bar(model, frame, status_area);
    }
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let doc = &model.document;
    let total_lines = doc.line_count();
    let gutter_width = line_number_width(total_lines);
    let [gutter_area, text_area] =
        Layout::horizontal([Constraint::Length(gutter_width + 1), Constraint::Fill(1)])
            .areas(area);

    let visible_height = area.height as usize;
    let start = model.scroll_offset.min(total_lines.saturating_sub(1));
    let end = (start + visible_height).min(total_lines);
    let selection = doc.selection();
    let selected = selection.range();
    let caret = selection.head;
    let caret_line = doc.line_of(caret);

    let mut numbers: Vec<Line> = Vec::with_capacity(end - start);
    let mut content: Vec<Line> = Vec::with_capacity(end - start);
    for line_idx in start..end {
        let line_text = doc.line_at(line_idx).unwrap_or_default();
        let line_start = doc.line_start(line_idx);
        let number_style = if line_idx == caret_line {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        numbers.push(Line::from(Span::styled(
            format!("{:>width$} ", line_idx + 1, width = gutter_width as usize),
            number_style,
        )));

        let mut runs: Vec<(CellKind, String)> = Vec::new();
        let mut col = 0;
        for (byte, ch) in line_text.char_indices() {
            let offset = line_start + byte;
            let kind = if offset == caret {
                CellKind::Caret
            } else if selected.contains(&offset) {
                CellKind::Selected
            } else {
                CellKind::Plain
            };
            let width = char_width(ch, col);
            if ch == '\t' {
                push_run(&mut runs, kind, &" ".repeat(width));
            } else {
                let mut buf = [0u8; 4];
                push_run(&mut runs, kind, ch.encode_utf8(&mut buf));
            }
            col += width;
        }
        let line_end = line_start + line_text.len();
        if caret == line_end {
            push_run(&mut runs, CellKind::Caret, " ");
        } else if selected.contains(&line_end) && line_idx + 1 < total_lines {
            // Selected line break.
            push_run(&mut runs, CellKind::Selected, " ");
        }

        let spans = runs
            .into_iter()
            .map(|(kind, text)| match kind {
                CellKind::Plain => Span::raw(text),
                CellKind::Selected => {
                    Span::styled(text, Style::default().bg(Color::Blue).fg(Color::White))
                }
                CellKind::Caret => {
                    Span::styled(text, Style::default().bg(Color::White).fg(Color::Black))
                }
            })
            .collect::<Vec<_>>();
        content.push(Line::from(spans));
    }

    let scroll_col = u16::try_from(model.scroll_col).unwrap_or(u16::MAX);
    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(numbers), gutter_area);
    frame.render_widget(Paragraph::new(content).scroll((0, scroll_col)), text_area);
}

fn push_run(runs: &mut Vec<(CellKind, String)>, kind: CellKind, text: &str) {
    if let Some((last, buf)) = runs.last_mut()
        && *last == kind
    {
        buf.push_str(text);
        return;
    }
    runs.push((kind, text.to_string()));
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

fn char_width(ch: char, col: usize) -> usize {
    if ch == '\t' {
        TAB_WIDTH - col % TAB_WIDTH
    } else {
        ch.width().unwrap_or(0)
    }
}

/// Display column of a byte offset within one line, expanding tabs.
pub fn display_col(line: &str, byte_col: usize) -> usize {
    let mut col = 0;
    for (byte, ch) in line.char_indices() {
        if byte >= byte_col {
            break;
        }
        col += char_width(ch, col);
    }
    col
}

/// Byte offset of the character covering a display column, or the line
/// length past the end.
pub fn byte_col_at(line: &str, display_col: usize) -> usize {
    let mut col = 0;
    for (byte, ch) in line.char_indices() {
        let width = char_width(ch, col);
        if display_col < col + width {
            return byte;
        }
        col += width;
    }
    line.len()
}
