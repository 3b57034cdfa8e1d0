//! Key and mouse bindings.

use crate::model::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

/// Rows moved per mouse wheel notch.
pub const WHEEL_ROWS: usize = 3;

/// Map a key press to an action.
pub fn action_for_key(key: KeyEvent) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(KeyAction::Quit),
            KeyCode::Char('d') => Some(KeyAction::PageDown),
            KeyCode::Char('u') => Some(KeyAction::PageUp),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('j') | KeyCode::Down => Some(KeyAction::ScrollDown),
        KeyCode::Char('k') | KeyCode::Up => Some(KeyAction::ScrollUp),
        KeyCode::PageDown | KeyCode::Char(' ') => Some(KeyAction::PageDown),
        KeyCode::PageUp => Some(KeyAction::PageUp),
        KeyCode::Char('g') | KeyCode::Home => Some(KeyAction::ScrollToTop),
        KeyCode::Char('G') | KeyCode::End => Some(KeyAction::ScrollToBottom),
        _ => None,
    }
}

/// Map a wheel event to a one-row action; other mouse events are ignored.
pub fn action_for_mouse(mouse: MouseEvent) -> Option<KeyAction> {
    match mouse.kind {
        MouseEventKind::ScrollDown => Some(KeyAction::ScrollDown),
        MouseEventKind::ScrollUp => Some(KeyAction::ScrollUp),
        _ => None,
    }
}
