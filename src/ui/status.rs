use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let name = if model.author_name.is_empty() {
        "(no name)"
    } else {
        model.author_name.as_str()
    };

    let (line, byte_col) = model.document.caret_position();
    let line_text = model.document.line_at(line).unwrap_or_default();
    let col = super::display_col(&line_text, byte_col);

    let saved = if model.document.is_dirty() {
        " [modified]"
    } else {
        " [saved]"
    };
    let autoload = if model.auto_load {
        " [autoload]"
    } else {
        " [autoload off]"
    };
    let submitted = if model.has_submission {
        " [submitted]"
    } else {
        ""
    };

    let status = format!(
        " {name}  Ln {}, Col {}{saved}{autoload}{submitted}  ^S:save F5:preview F2:name F6:autoload F8:reset ^Q:quit",
        line + 1,
        col + 1
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_name_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let text = format!(" Name: {}_  Enter/Esc: done", model.author_name);
    let bar = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
