use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ToggleHelp,
    Dismiss,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Click,
    ClickCell(usize),
    Start,
    Stop,
    Reset,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Esc => InputAction::Dismiss,
        KeyCode::Up | KeyCode::Char('k') => InputAction::MoveUp,
        KeyCode::Down | KeyCode::Char('j') => InputAction::MoveDown,
        KeyCode::Left | KeyCode::Char('h') => InputAction::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => InputAction::MoveRight,
        KeyCode::Enter | KeyCode::Char(' ') => InputAction::Click,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('?') => InputAction::ToggleHelp,
        KeyCode::Char('s') => InputAction::Start,
        KeyCode::Char('x') => InputAction::Stop,
        KeyCode::Char('r') => InputAction::Reset,
        _ => InputAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_game_controls() {
        assert_eq!(map_key(key(KeyCode::Char('s'))), InputAction::Start);
        assert_eq!(map_key(key(KeyCode::Char('x'))), InputAction::Stop);
        assert_eq!(map_key(key(KeyCode::Char('r'))), InputAction::Reset);
        assert_eq!(map_key(key(KeyCode::Char('q'))), InputAction::Quit);
    }

    #[test]
    fn arrows_and_vim_keys_move() {
        assert_eq!(map_key(key(KeyCode::Up)), InputAction::MoveUp);
        assert_eq!(map_key(key(KeyCode::Char('j'))), InputAction::MoveDown);
        assert_eq!(map_key(key(KeyCode::Char('h'))), InputAction::MoveLeft);
        assert_eq!(map_key(key(KeyCode::Right)), InputAction::MoveRight);
    }

    #[test]
    fn enter_and_space_click() {
        assert_eq!(map_key(key(KeyCode::Enter)), InputAction::Click);
        assert_eq!(map_key(key(KeyCode::Char(' '))), InputAction::Click);
        assert_eq!(map_key(key(KeyCode::Char('z'))), InputAction::None);
    }
}
