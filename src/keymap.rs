//! Maps crossterm key events onto the opaque key identifiers the engine uses.
//!
//! Terminals with the kitty keyboard protocol report presses and releases
//! separately, including bare modifier keys. Everywhere else a key event is a
//! single press carrying its modifiers, so the down/up sequence is synthesised.

use crate::recorder::character_name;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Down(String),
    Up(String),
}

/// Modifier identifiers in the order they are pressed when synthesising
const MODIFIERS: [(KeyModifiers, &str); 4] = [
    (KeyModifiers::CONTROL, "Ctrl"),
    (KeyModifiers::SHIFT, "Shift"),
    (KeyModifiers::ALT, "Alt"),
    (KeyModifiers::SUPER, "Super"),
];

fn modifier_id(code: ModifierKeyCode) -> Option<&'static str> {
    use ModifierKeyCode::*;
    match code {
        LeftControl | RightControl => Some("Ctrl"),
        LeftShift | RightShift => Some("Shift"),
        LeftAlt | RightAlt => Some("Alt"),
        LeftSuper | RightSuper | LeftMeta | RightMeta => Some("Super"),
        _ => None,
    }
}

/// Identifier for a key code. Letters are upper case; characters that are part
/// of the solution grammar get names.
pub fn key_id(code: KeyCode) -> Option<String> {
    let id = match code {
        KeyCode::Char(c) => match character_name(c) {
            Some(name) => name.to_string(),
            None if c.is_alphabetic() => c.to_uppercase().to_string(),
            None => c.to_string(),
        },
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab | KeyCode::BackTab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Modifier(m) => modifier_id(m)?.to_string(),
        _ => return None,
    };
    Some(id)
}

/// Translates one terminal key event into engine key actions.
///
/// `enhanced` tells whether the terminal reports releases.
pub fn translate(event: &KeyEvent, enhanced: bool) -> Vec<KeyAction> {
    let Some(id) = key_id(event.code) else {
        return Vec::new();
    };

    if enhanced {
        return match event.kind {
            KeyEventKind::Press => vec![KeyAction::Down(id)],
            KeyEventKind::Release => vec![KeyAction::Up(id)],
            KeyEventKind::Repeat => Vec::new(),
        };
    }

    if event.kind != KeyEventKind::Press {
        return Vec::new();
    }

    // Shift on a printable character is already part of the character
    let printable = matches!(event.code, KeyCode::Char(_));
    let held: Vec<&str> = MODIFIERS
        .iter()
        .filter(|(flag, _)| event.modifiers.contains(*flag))
        .filter(|(flag, _)| !(printable && *flag == KeyModifiers::SHIFT && event.modifiers == KeyModifiers::SHIFT))
        .map(|(_, name)| *name)
        .filter(|name| *name != id)
        .collect();

    let mut actions: Vec<KeyAction> = held.iter().map(|m| KeyAction::Down(m.to_string())).collect();
    actions.push(KeyAction::Down(id.clone()));
    actions.push(KeyAction::Up(id));
    actions.extend(held.iter().rev().map(|m| KeyAction::Up(m.to_string())));
    actions
}
