use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::editor::rules::{Key, KeyPress};

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                resize_debouncer.queue((*w, *h), now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(mut key: KeyEvent, model: &Model) -> Option<Message> {
        // Windows reports AltGr as Ctrl+Alt; the character is already composed.
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        if matches!(key.code, KeyCode::Char(_)) && key.modifiers.contains(altgr) {
            key.modifiers = key.modifiers.difference(altgr);
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        if model.name_editing {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(Message::FinishNameEdit),
                KeyCode::Backspace => {
                    let mut next = model.author_name.clone();
                    next.pop();
                    Some(Message::NameInput(next))
                }
                KeyCode::Char(c) if !ctrl && !alt => {
                    let mut next = model.author_name.clone();
                    next.push(c);
                    Some(Message::NameInput(next))
                }
                _ => None,
            };
        }

        match key.code {
            // Application
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Char('s') if ctrl => Some(Message::Save),
            KeyCode::Char('a') if ctrl => Some(Message::SelectAll),
            KeyCode::F(2) => Some(Message::StartNameEdit),
            KeyCode::F(5) => Some(Message::Submit),
            KeyCode::F(6) => Some(Message::ToggleAutoLoad),
            KeyCode::F(8) => Some(Message::Reset),

            // Keys the rules engine sees
            KeyCode::Char(c) => Some(Message::EditorKey(key_press(Key::Char(c), key.modifiers))),
            KeyCode::Tab => Some(Message::EditorKey(key_press(Key::Tab, key.modifiers))),
            KeyCode::BackTab => Some(Message::EditorKey(
                key_press(Key::Tab, key.modifiers).with_shift(true),
            )),

            // Plain editing
            KeyCode::Enter => Some(Message::InsertNewline),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),

            // Navigation
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left, shift)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right, shift)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up, shift)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down, shift)),
            KeyCode::PageUp => Some(Message::MovePage(Direction::Up, shift)),
            KeyCode::PageDown => Some(Message::MovePage(Direction::Down, shift)),
            KeyCode::Home if ctrl => Some(Message::MoveToStart(shift)),
            KeyCode::End if ctrl => Some(Message::MoveToEnd(shift)),
            KeyCode::Home => Some(Message::MoveHome(shift)),
            KeyCode::End => Some(Message::MoveEnd(shift)),

            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(3)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(3)),
            MouseEventKind::Down(MouseButton::Left) => {
                if model.name_editing || usize::from(mouse.row) >= model.editor_rows() {
                    return None;
                }
                let line = model.scroll_offset + usize::from(mouse.row);
                if line >= model.document.line_count() {
                    return Some(Message::MoveToEnd(false));
                }
                let gutter = crate::ui::line_number_width(model.document.line_count()) + 1;
                let display_col =
                    model.scroll_col + usize::from(mouse.column.saturating_sub(gutter));
                let text = model.document.line_at(line).unwrap_or_default();
                Some(Message::MoveTo(line, crate::ui::byte_col_at(&text, display_col)))
            }
            _ => None,
        }
    }
}

fn key_press(key: Key, modifiers: KeyModifiers) -> KeyPress {
    KeyPress {
        key,
        shift: modifiers.contains(KeyModifiers::SHIFT),
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        alt: modifiers.contains(KeyModifiers::ALT),
        meta: modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::update;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Option<Message> {
        App::handle_key(KeyEvent::new(code, modifiers), &Model::default())
    }

    #[test]
    fn test_shifted_gt_reaches_rules_engine() {
        let msg = key(KeyCode::Char('>'), KeyModifiers::SHIFT);
        assert_eq!(
            msg,
            Some(Message::EditorKey(KeyPress::char('>').with_shift(true)))
        );
    }

    #[test]
    fn test_altgr_characters_are_typed() {
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        for c in ['{', '}', '[', ']', '|', '@'] {
            assert_eq!(
                key(KeyCode::Char(c), altgr),
                Some(Message::EditorKey(KeyPress::char(c)))
            );
        }

        let mut model = Model::new("", (80, 24));
        let msg = App::handle_key(KeyEvent::new(KeyCode::Char('{'), altgr), &model).unwrap();
        model = update(model, msg);
        assert_eq!(model.document.text(), "{");

        model.name_editing = true;
        assert_eq!(
            App::handle_key(KeyEvent::new(KeyCode::Char('@'), altgr), &model),
            Some(Message::NameInput("@".to_string()))
        );
    }

    #[test]
    fn test_ctrl_char_still_reaches_rules_as_command() {
        assert_eq!(
            key(KeyCode::Char('>'), KeyModifiers::CONTROL),
            Some(Message::EditorKey(KeyPress {
                ctrl: true,
                ..KeyPress::char('>')
            }))
        );
    }

    #[test]
    fn test_back_tab_is_shift_tab() {
        assert_eq!(
            key(KeyCode::BackTab, KeyModifiers::SHIFT),
            Some(Message::EditorKey(KeyPress::back_tab()))
        );
        assert_eq!(
            key(KeyCode::Tab, KeyModifiers::NONE),
            Some(Message::EditorKey(KeyPress::tab()))
        );
    }

    #[test]
    fn test_command_keys() {
        assert_eq!(key(KeyCode::Char('s'), KeyModifiers::CONTROL), Some(Message::Save));
        assert_eq!(key(KeyCode::Char('q'), KeyModifiers::CONTROL), Some(Message::Quit));
        assert_eq!(key(KeyCode::F(5), KeyModifiers::NONE), Some(Message::Submit));
        assert_eq!(key(KeyCode::F(8), KeyModifiers::NONE), Some(Message::Reset));
        assert_eq!(
            key(KeyCode::Home, KeyModifiers::CONTROL | KeyModifiers::SHIFT),
            Some(Message::MoveToStart(true))
        );
    }

    #[test]
    fn test_name_editing_captures_characters() {
        let mut model = Model::default();
        model.name_editing = true;
        model.author_name = "Ad".to_string();
        let msg = App::handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE), &model);
        assert_eq!(msg, Some(Message::NameInput("Ada".to_string())));
        let msg = App::handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE), &model);
        assert_eq!(msg, Some(Message::NameInput("A".to_string())));
        let msg = App::handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &model);
        assert_eq!(msg, Some(Message::FinishNameEdit));
    }

    #[test]
    fn test_resize_is_debounced() {
        let mut debouncer = ResizeDebouncer::new(100);
        let msg = App::handle_event(&Event::Resize(100, 40), &Model::default(), 0, &mut debouncer);
        assert_eq!(msg, None);
        assert_eq!(debouncer.take_ready(100), Some((100, 40)));
    }

    #[test]
    fn test_click_maps_to_line_and_column() {
        let mut model = Model::new("ab\n\tcd\n", (40, 10));
        model.scroll_offset = 0;
        // Gutter is "N " (2 columns); a tab expands to 4 columns.
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 2 + 5,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(App::handle_mouse(click, &model), Some(Message::MoveTo(1, 2)));
    }
}
