use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Action;

/// How key presses are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Single-key commands.
    Navigate,
    /// Characters go into a text field (chat draft or path prompt).
    Text,
}

/// Map a crossterm terminal event to a TUI action.
pub fn map_event(event: &Event, mode: InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => match mode {
            InputMode::Navigate => map_key(key),
            InputMode::Text => map_text_key(key),
        },
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_key(key: &KeyEvent) -> Action {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('g') => Action::GoTop,
        KeyCode::Char('G') => Action::GoBottom,
        KeyCode::Char('o') | KeyCode::Char('a') => Action::SelectFiles,
        KeyCode::Char('c') => Action::ClearSelection,
        KeyCode::Char('u') => Action::Upload,
        KeyCode::Char('d') | KeyCode::Delete => Action::DeleteSelected,
        KeyCode::Char('r') => Action::Refresh,
        KeyCode::Char('R') => Action::Reprocess,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Tab | KeyCode::BackTab => Action::FocusNext,
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Cancel,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Home => Action::GoTop,
        KeyCode::End => Action::GoBottom,
        _ => Action::None,
    }
}

fn map_text_key(key: &KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('u') => Action::PageUp,
            KeyCode::Char('d') => Action::PageDown,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Action::InsertChar(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Cancel,
        KeyCode::Tab | KeyCode::BackTab => Action::FocusNext,
        KeyCode::Up => Action::MoveUp,
        KeyCode::Down => Action::MoveDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    #[test]
    fn letters_are_commands_when_navigating() {
        assert_eq!(map_event(&press(KeyCode::Char('q')), InputMode::Navigate), Action::Quit);
        assert_eq!(map_event(&press(KeyCode::Char('u')), InputMode::Navigate), Action::Upload);
        assert_eq!(
            map_event(&press(KeyCode::Char('d')), InputMode::Navigate),
            Action::DeleteSelected
        );
    }

    #[test]
    fn letters_are_text_when_typing() {
        assert_eq!(
            map_event(&press(KeyCode::Char('q')), InputMode::Text),
            Action::InsertChar('q')
        );
        assert_eq!(map_event(&press(KeyCode::Enter), InputMode::Text), Action::Submit);
    }

    #[test]
    fn ctrl_c_quits_in_every_mode() {
        assert_eq!(map_event(&ctrl('c'), InputMode::Navigate), Action::Quit);
        assert_eq!(map_event(&ctrl('c'), InputMode::Text), Action::Quit);
    }

    #[test]
    fn resize_passes_through() {
        assert_eq!(
            map_event(&Event::Resize(80, 24), InputMode::Text),
            Action::Resize(80, 24)
        );
    }
}
