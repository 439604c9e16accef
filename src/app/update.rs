use crate::app::{Model, ToastLevel};
use crate::editor::rules::{Intercept, Key, KeyPress, intercept};
use crate::editor::Direction;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// A key that may trigger an editing rule (characters, Tab, Shift+Tab)
    EditorKey(KeyPress),
    /// Split line at the caret (Enter)
    InsertNewline,
    /// Delete selection or character before caret (Backspace)
    DeleteBack,
    /// Delete selection or character at caret (Delete)
    DeleteForward,
    /// Move the caret; `true` extends the selection
    MoveCursor(Direction, bool),
    /// Move the caret by one screen of lines
    MovePage(Direction, bool),
    /// Line start (Home)
    MoveHome(bool),
    /// Line end (End)
    MoveEnd(bool),
    /// Document start (Ctrl+Home)
    MoveToStart(bool),
    /// Document end (Ctrl+End)
    MoveToEnd(bool),
    /// Put the caret at (line, byte column), e.g. from a mouse click
    MoveTo(usize, usize),
    /// Select the whole document
    SelectAll,
    /// Scroll the editor up by n lines
    ScrollUp(usize),
    /// Scroll the editor down by n lines
    ScrollDown(usize),

    // Author name
    /// Start editing the author name
    StartNameEdit,
    /// Replace the author name
    NameInput(String),
    /// Stop editing the author name
    FinishNameEdit,

    // Persistence
    /// Save the draft now
    Save,
    /// Submit the document and open the preview
    Submit,
    /// Toggle restoring the draft at launch
    ToggleAutoLoad,
    /// Restore the default document (asks for confirmation first)
    Reset,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// Store writes and rendering happen afterwards in the side-effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    let confirmed_reset = matches!(msg, Message::Reset) && model.reset_confirmed;
    if !matches!(msg, Message::Reset | Message::Resize(..)) {
        model.reset_confirmed = false;
    }

    match msg {
        Message::EditorKey(press) => {
            apply_key(&mut model, press);
            model.ensure_caret_visible();
        }
        Message::InsertNewline => {
            model.document.split_line();
            model.ensure_caret_visible();
        }
        Message::DeleteBack => {
            model.document.delete_back();
            model.ensure_caret_visible();
        }
        Message::DeleteForward => {
            model.document.delete_forward();
            model.ensure_caret_visible();
        }
        Message::MoveCursor(dir, extend) => {
            model.document.move_cursor(dir, extend);
            model.ensure_caret_visible();
        }
        Message::MovePage(dir, extend) => {
            for _ in 0..model.editor_rows().max(1) {
                model.document.move_cursor(dir, extend);
            }
            model.ensure_caret_visible();
        }
        Message::MoveHome(extend) => {
            model.document.move_home(extend);
            model.ensure_caret_visible();
        }
        Message::MoveEnd(extend) => {
            model.document.move_end(extend);
            model.ensure_caret_visible();
        }
        Message::MoveToStart(extend) => {
            model.document.move_to_start(extend);
            model.ensure_caret_visible();
        }
        Message::MoveToEnd(extend) => {
            model.document.move_to_end(extend);
            model.ensure_caret_visible();
        }
        Message::MoveTo(line, col) => {
            model.document.move_to(line, col);
            model.ensure_caret_visible();
        }
        Message::SelectAll => model.document.select_all(),
        Message::ScrollUp(n) => {
            model.scroll_offset = model.scroll_offset.saturating_sub(n);
        }
        Message::ScrollDown(n) => {
            let max = model.document.line_count().saturating_sub(1);
            model.scroll_offset = (model.scroll_offset + n).min(max);
        }

        Message::StartNameEdit => model.name_editing = true,
        Message::NameInput(name) => model.set_author_name(name),
        Message::FinishNameEdit => model.name_editing = false,

        Message::ToggleAutoLoad => model.auto_load = !model.auto_load,
        Message::Reset => {
            if confirmed_reset {
                model.reset_document();
                model.reset_confirmed = false;
            } else {
                model.show_toast(
                    ToastLevel::Warning,
                    "Reset to the starter page? Press F8 again to confirm",
                );
                model.reset_confirmed = true;
            }
        }
        Message::Save | Message::Submit => {}

        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.ensure_caret_visible();
        }
        Message::Quit => model.should_quit = true,
    }
    model
}

/// Run a key press through the editing rules, falling back to plain input.
fn apply_key(model: &mut Model, press: KeyPress) {
    let text = model.document.text();
    match intercept(&text, model.document.selection(), press, &model.indent) {
        Intercept::Replace(edit) => {
            if !model.document.apply(&edit) {
                tracing::debug!(?edit, "rejected out-of-range edit");
            }
        }
        Intercept::Suppress => {}
        Intercept::PassThrough => {
            if let Key::Char(c) = press.key
                && !press.has_command_modifier()
            {
                model.document.insert_char(c);
            }
        }
    }
}
