use std::collections::HashMap;

use corvux_term::event::{KeyCode, KeyEvent};
use maplit::hashmap;

use crate::editor::Mode;
use crate::view::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    PageUp,
    PageDown,
    MoveHome,
    MoveEnd,

    InsertChar(char),
    InsertNewline,
    Backspace,
    Delete,
    DeleteUnderCursor,

    SetMode(Mode),
    AppendAfterCursor,

    CommandPrompt,
    Save,

    // gated behind the unsaved-changes warning
    Open,
    NewDocument,
    Quit,
}

impl Action {
    /// Whether the action throws away the document, and so needs repeated
    /// presses while there are unsaved changes.
    pub fn discards_document(self) -> bool {
        matches!(self, Action::Open | Action::NewDocument | Action::Quit)
    }
}

pub struct KeyMap {
    pub all: HashMap<KeyEvent, Action>,
    pub normal: HashMap<KeyEvent, Action>,
    pub insert: HashMap<KeyEvent, Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::basic()
    }
}

impl KeyMap {
    pub fn basic() -> Self {
        let all = hashmap! {
            KeyEvent::new(KeyCode::Left) => Action::Move(Direction::Left),
            KeyEvent::new(KeyCode::Right) => Action::Move(Direction::Right),
            KeyEvent::new(KeyCode::Up) => Action::Move(Direction::Up),
            KeyEvent::new(KeyCode::Down) => Action::Move(Direction::Down),

            KeyEvent::new(KeyCode::PageUp) => Action::PageUp,
            KeyEvent::new(KeyCode::PageDown) => Action::PageDown,

            KeyEvent::new(KeyCode::Home) => Action::MoveHome,
            KeyEvent::new(KeyCode::End) => Action::MoveEnd,

            KeyEvent::new(KeyCode::Escape) => Action::SetMode(Mode::Normal),
            KeyEvent::ctrl('c') => Action::SetMode(Mode::Normal),
        };

        let normal = hashmap! {
            KeyEvent::new(KeyCode::Char('h')) => Action::Move(Direction::Left),
            KeyEvent::new(KeyCode::Char('j')) => Action::Move(Direction::Down),
            KeyEvent::new(KeyCode::Char('k')) => Action::Move(Direction::Up),
            KeyEvent::new(KeyCode::Char('l')) => Action::Move(Direction::Right),

            KeyEvent::new(KeyCode::Char('x')) => Action::DeleteUnderCursor,

            KeyEvent::new(KeyCode::Char('i')) => Action::SetMode(Mode::Insert),
            KeyEvent::new(KeyCode::Char('a')) => Action::AppendAfterCursor,

            KeyEvent::new(KeyCode::Char(':')) => Action::CommandPrompt,

            KeyEvent::ctrl('s') => Action::Save,
            KeyEvent::ctrl('o') => Action::Open,
            KeyEvent::ctrl('n') => Action::NewDocument,
            KeyEvent::ctrl('q') => Action::Quit,
        };

        let insert = hashmap! {
            KeyEvent::new(KeyCode::Return) => Action::InsertNewline,
            KeyEvent::new(KeyCode::Tab) => Action::InsertChar('\t'),

            KeyEvent::new(KeyCode::Backspace) => Action::Backspace,
            KeyEvent::ctrl('h') => Action::Backspace,
            KeyEvent::new(KeyCode::Delete) => Action::Delete,
        };

        Self {
            all,
            normal,
            insert,
        }
    }

    pub fn get_action(&self, mode: Mode, key: KeyEvent) -> Option<Action> {
        if let Some(&action) = self.all.get(&key) {
            return Some(action);
        }

        match mode {
            Mode::Normal => self.normal.get(&key).copied(),

            Mode::Insert => match key.typed_char() {
                Some(ch) => Some(Action::InsertChar(ch)),
                None => self.insert.get(&key).copied(),
            },
        }
    }
}
