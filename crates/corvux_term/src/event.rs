use bitflags::bitflags;

/// Something read from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),

    /// A sequence we recognised the shape of but don't handle.
    Unknown,
}

impl From<KeyEvent> for Event {
    fn from(key: KeyEvent) -> Self {
        Event::Key(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key_code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key_code: KeyCode) -> Self {
        Self::new_with_mods(key_code, Modifiers::empty())
    }

    pub fn new_with_mods(key_code: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key_code,
            modifiers,
        }
    }

    /// A control chord. Letters are stored uppercase, as the terminal
    /// reports them (`^Q` is `Char('Q')` with `CTRL`).
    pub fn ctrl(ch: char) -> Self {
        Self::new_with_mods(KeyCode::Char(ch.to_ascii_uppercase()), Modifiers::CTRL)
    }

    /// The character this key types, if it is a character with no modifier
    /// other than shift.
    pub fn typed_char(&self) -> Option<char> {
        match self.key_code {
            KeyCode::Char(ch) if (self.modifiers - Modifiers::SHIFT).is_empty() => Some(ch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Tab,
    Return,
    Escape,
    Backspace,

    // editing keypad
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    Up,
    Down,
    Left,
    Right,
}

bitflags! {
    /// Modifier bits, laid out like the xterm `CSI 1;<1 + bits>` parameter.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyCode, KeyEvent, Modifiers};

    #[test]
    fn typed_chars_allow_shift_only() {
        assert_eq!(KeyEvent::new(KeyCode::Char('a')).typed_char(), Some('a'));
        assert_eq!(
            KeyEvent::new_with_mods(KeyCode::Char('A'), Modifiers::SHIFT).typed_char(),
            Some('A')
        );
        assert_eq!(KeyEvent::ctrl('a').typed_char(), None);
        assert_eq!(KeyEvent::new(KeyCode::Tab).typed_char(), None);
    }

    #[test]
    fn ctrl_chords_are_uppercase() {
        assert_eq!(KeyEvent::ctrl('q'), KeyEvent::ctrl('Q'));
        assert_eq!(KeyEvent::ctrl('q').key_code, KeyCode::Char('Q'));
    }
}
