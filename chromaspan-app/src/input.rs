use winit::keyboard::KeyCode;

/// What a key means, independent of which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Space: start, play again, or the n-back match key.
    Space,
    Up,
    Down,
    PageUp,
    PageDown,
    Confirm,
    Restart,
    Back,
    /// A menu shortcut, `0` meaning the tenth entry.
    Digit(usize),
}

pub fn key_action(key: KeyCode) -> Option<KeyAction> {
    use KeyCode::*;
    let action = match key {
        Space => KeyAction::Space,
        ArrowUp => KeyAction::Up,
        ArrowDown => KeyAction::Down,
        PageUp => KeyAction::PageUp,
        PageDown => KeyAction::PageDown,
        Enter | NumpadEnter => KeyAction::Confirm,
        KeyR => KeyAction::Restart,
        Escape => KeyAction::Back,
        Digit1 | Numpad1 => KeyAction::Digit(1),
        Digit2 | Numpad2 => KeyAction::Digit(2),
        Digit3 | Numpad3 => KeyAction::Digit(3),
        Digit4 | Numpad4 => KeyAction::Digit(4),
        Digit5 | Numpad5 => KeyAction::Digit(5),
        Digit6 | Numpad6 => KeyAction::Digit(6),
        Digit7 | Numpad7 => KeyAction::Digit(7),
        Digit8 | Numpad8 => KeyAction::Digit(8),
        Digit9 | Numpad9 => KeyAction::Digit(9),
        Digit0 | Numpad0 => KeyAction::Digit(0),
        _ => return None,
    };
    Some(action)
}

/// Menu index selected by a digit key, if the menu has that many entries.
pub fn digit_entry(digit: usize, entries: usize) -> Option<usize> {
    let index = if digit == 0 { 9 } else { digit - 1 };
    (index < entries).then_some(index)
}
