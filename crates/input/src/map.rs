//! Key mapping from terminal events to game actions.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys that auto-repeat while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKey {
    Left,
    Right,
    Down,
    Rotate,
}

impl RepeatKey {
    /// Action performed on press and on every repeat.
    pub fn action(self) -> GameAction {
        match self {
            RepeatKey::Left => GameAction::MoveLeft,
            RepeatKey::Right => GameAction::MoveRight,
            RepeatKey::Down => GameAction::SoftDrop,
            RepeatKey::Rotate => GameAction::Rotate,
        }
    }
}

/// Classify a key as one of the repeating keys.
pub fn repeat_key(code: KeyCode) -> Option<RepeatKey> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(RepeatKey::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(RepeatKey::Right),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(RepeatKey::Down),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(RepeatKey::Rotate),
        _ => None,
    }
}

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if let Some(k) = repeat_key(key.code) {
        return Some(k.action());
    }
    match key.code {
        KeyCode::Char(' ') => Some(GameAction::HardDrop),
        KeyCode::Char('c') | KeyCode::Char('C')
            if !key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(GameAction::Hold)
        }
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),
        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_movement_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(GameAction::MoveLeft)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('D'))),
            Some(GameAction::MoveRight)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Down)),
            Some(GameAction::SoftDrop)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('w'))),
            Some(GameAction::Rotate)
        );
        assert_eq!(repeat_key(KeyCode::Up), Some(RepeatKey::Rotate));
        assert_eq!(repeat_key(KeyCode::Char(' ')), None);
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(' '))),
            Some(GameAction::HardDrop)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('c'))),
            Some(GameAction::Hold)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('R'))),
            Some(GameAction::Restart)
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('p'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(should_quit(ctrl_c));
        assert_eq!(handle_key_event(ctrl_c), None);
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
