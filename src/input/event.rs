use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A physical keystroke, reduced to the keys the interface reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Up,
    Down,
    Return,
    Escape,
    Backspace,
    Space,
    Char(char),
    /// Ctrl+C. Handled by the input thread before it reaches any handler table.
    Interrupt,
    Other,
}

impl KeyInput {
    /// Classify a crossterm key event. Release/repeat reports are dropped.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        let key = match event.code {
            KeyCode::Char('c') | KeyCode::Char('C') if ctrl => KeyInput::Interrupt,
            KeyCode::Char(_) if ctrl => KeyInput::Other,
            KeyCode::Up => KeyInput::Up,
            KeyCode::Down => KeyInput::Down,
            KeyCode::Enter => KeyInput::Return,
            KeyCode::Esc => KeyInput::Escape,
            KeyCode::Backspace => KeyInput::Backspace,
            KeyCode::Char(' ') => KeyInput::Space,
            KeyCode::Char(ch) if !ch.is_control() => KeyInput::Char(ch),
            _ => KeyInput::Other,
        };
        Some(key)
    }

    /// The navigation-mode name for this key, if it has one.
    ///
    /// Space resolves to exactly one logical event even though it is also a
    /// printable character.
    pub fn logical(self) -> Option<LogicalKey> {
        match self {
            KeyInput::Up => Some(LogicalKey::Up),
            KeyInput::Down => Some(LogicalKey::Down),
            KeyInput::Return => Some(LogicalKey::Return),
            KeyInput::Escape => Some(LogicalKey::Escape),
            KeyInput::Backspace => Some(LogicalKey::Backspace),
            KeyInput::Space => Some(LogicalKey::Space),
            KeyInput::Char(ch) => Some(LogicalKey::Letter(ch)),
            KeyInput::Interrupt | KeyInput::Other => None,
        }
    }
}

/// Keys a handler table can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    Up,
    Down,
    Space,
    Return,
    Escape,
    Backspace,
    Letter(char),
}
