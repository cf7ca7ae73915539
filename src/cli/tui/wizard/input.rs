//! Maps terminal key events to wizard input

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_input::InputRequest;

use super::events::UserInput;
use super::state::Step;

/// Translate a key press at `step` into a [`UserInput`]
///
/// Returns `None` for keys the wizard does not react to.
pub fn map_key(step: Step, key: KeyEvent) -> Option<UserInput> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => return Some(UserInput::Quit),
        KeyCode::Esc => return Some(UserInput::Quit),
        KeyCode::Enter => return Some(UserInput::Confirm),
        _ => {}
    }

    if step.is_text_entry() {
        return map_edit_key(key, ctrl).map(UserInput::Edit);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(UserInput::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(UserInput::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(UserInput::Down),
        KeyCode::Char(' ') if step == Step::SelectDefinitions => Some(UserInput::Toggle),
        _ => None,
    }
}

fn map_edit_key(key: KeyEvent, ctrl: bool) -> Option<InputRequest> {
    let request = match key.code {
        KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
        KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
        KeyCode::Char('a') if ctrl => InputRequest::GoToStart,
        KeyCode::Char('e') if ctrl => InputRequest::GoToEnd,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => InputRequest::InsertChar(c),
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return None,
    };
    Some(request)
}
