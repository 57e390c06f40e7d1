use std::ops::ControlFlow;

use anyhow::Result;
use corvux_term::event::{KeyCode, KeyEvent};

use crate::action::{Action, KeyMap};
use crate::document::Document;
use crate::session::Session;
use crate::view::{Cursor, Direction};

/// How many times a document-discarding key must be refused while there are
/// unsaved changes before it goes through.
pub const QUIT_TIMES: u8 = 3;

/// Shown when a file had invalid UTF-8 replaced on load.
pub const LOSSY_WARNING: &str = "Invalid UTF-8 replaced, save with a new name";

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Insert => "INSERT",
        }
    }
}

/// What the editor runs on: somewhere to read keys from and show frames on.
pub trait Host {
    /// The next key, or `None` if none arrived within the frame time.
    fn read_key(&mut self) -> Result<Option<KeyEvent>>;

    /// Draws the session. Implementations call [`Session::prepare_frame`]
    /// first.
    fn present(&mut self, session: &mut Session) -> Result<()>;
}

/// Turns keys into edits, one key at a time.
pub struct Editor {
    session: Session,
    keymap: KeyMap,
    quit_times: u8,
}

impl Editor {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            keymap: KeyMap::default(),
            quit_times: QUIT_TIMES,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn run(&mut self, host: &mut impl Host) -> Result<()> {
        loop {
            host.present(&mut self.session)?;

            let Some(key) = host.read_key()? else {
                continue;
            };

            if self.handle_key(key, host)?.is_break() {
                log::info!("quitting");
                return Ok(());
            }
        }
    }

    /// Handles one key. Breaks when the editor should quit.
    pub fn handle_key(&mut self, key: KeyEvent, host: &mut impl Host) -> Result<ControlFlow<()>> {
        let Some(action) = self.keymap.get_action(self.session.mode, key) else {
            return Ok(ControlFlow::Continue(()));
        };

        if action.discards_document() && self.session.document.is_dirty() && self.quit_times > 0 {
            let (chord, what) = match action {
                Action::Open => ("Ctrl-O", "open another file"),
                Action::NewDocument => ("Ctrl-N", "start a new document"),
                _ => ("Ctrl-Q", "quit"),
            };

            self.session.set_status(format!(
                "WARNING!!! File has unsaved changes. Press {chord} {} more times to {what}.",
                self.quit_times
            ));
            self.quit_times -= 1;

            return Ok(ControlFlow::Continue(()));
        }

        self.quit_times = QUIT_TIMES;
        self.apply(action, host)
    }

    fn apply(&mut self, action: Action, host: &mut impl Host) -> Result<ControlFlow<()>> {
        let session = &mut self.session;

        match action {
            Action::Move(direction) => session.cursor.move_in(direction, &session.document),

            Action::PageUp => {
                session.cursor.row = session.viewport.row_offset;
                self.repeat_move(Direction::Up);
            }

            Action::PageDown => {
                let bottom = (session.viewport.row_offset + session.viewport.screen_rows)
                    .saturating_sub(1);
                session.cursor.row = bottom.min(session.document.num_rows());
                self.repeat_move(Direction::Down);
            }

            Action::MoveHome => session.cursor.col = 0,
            Action::MoveEnd => session.cursor.col = session.document.row_len(session.cursor.row),

            Action::InsertChar(ch) => {
                session.document.insert_char(session.cursor, ch);
                session.cursor.col += 1;
            }

            Action::InsertNewline => {
                session.document.split_row(session.cursor);
                session.cursor = Cursor::new(session.cursor.row + 1, 0);
            }

            Action::Backspace => {
                session.cursor = session.document.delete_char(session.cursor);
            }

            Action::Delete => {
                let before = session.cursor;
                session.cursor.move_in(Direction::Right, &session.document);

                if session.cursor != before {
                    session.cursor = session.document.delete_char(session.cursor);
                }
            }

            Action::DeleteUnderCursor => {
                let Cursor { row, col } = session.cursor;

                if col < session.document.row_len(row) {
                    session.document.delete_char(Cursor::new(row, col + 1));
                }
            }

            Action::SetMode(mode) => {
                log::debug!("mode: {mode:?}");
                session.mode = mode;
            }

            Action::AppendAfterCursor => {
                if session.cursor.col < session.document.row_len(session.cursor.row) {
                    session.cursor.col += 1;
                }
                session.mode = Mode::Insert;
            }

            Action::CommandPrompt => return self.run_command(host),

            Action::Save => {
                self.save(host)?;
            }

            Action::Open => self.open(host)?,

            Action::NewDocument => {
                session.replace_document(Document::new());
                session.set_status("New document");
            }

            Action::Quit => return Ok(ControlFlow::Break(())),
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Moves a screen's worth of rows, for paging.
    fn repeat_move(&mut self, direction: Direction) {
        let session = &mut self.session;
        session.cursor.clamp(&session.document);

        for _ in 0..session.viewport.screen_rows {
            session.cursor.move_in(direction, &session.document);
        }
    }

    /// Reads a line of input in the message bar. `template` is shown with
    /// `{}` replaced by what has been typed so far.
    ///
    /// Returns `None` if the prompt was cancelled with escape. `callback`, if
    /// given, sees the input after every key.
    pub fn prompt(
        &mut self,
        host: &mut impl Host,
        template: &str,
        mut callback: Option<&mut dyn FnMut(&mut Session, &str, KeyEvent)>,
    ) -> Result<Option<String>> {
        let mut input = String::new();

        loop {
            self.session.set_status(template.replace("{}", &input));
            host.present(&mut self.session)?;

            let Some(key) = host.read_key()? else {
                continue;
            };

            let done = match key.key_code {
                KeyCode::Escape => Some(None),
                KeyCode::Return if !input.is_empty() => Some(Some(input.clone())),

                KeyCode::Backspace | KeyCode::Delete => {
                    input.pop();
                    None
                }
                _ if key == KeyEvent::ctrl('h') => {
                    input.pop();
                    None
                }

                _ => {
                    let printable = key
                        .typed_char()
                        .filter(|ch| ch.is_ascii() && !ch.is_ascii_control());

                    if let Some(ch) = printable {
                        input.push(ch);
                    }
                    None
                }
            };

            if let Some(callback) = callback.as_mut() {
                callback(&mut self.session, &input, key);
            }

            if let Some(result) = done {
                self.session.clear_status();
                return Ok(result);
            }
        }
    }

    /// Handles a `:` command line. Any command containing `w` saves, and
    /// one containing `q` quits, refusing with unsaved changes unless it also
    /// contains `!`.
    fn run_command(&mut self, host: &mut impl Host) -> Result<ControlFlow<()>> {
        let Some(command) = self.prompt(host, ":{}", None)? else {
            return Ok(ControlFlow::Continue(()));
        };

        let command = command.trim();
        let write = command.contains('w');
        let quit = command.contains('q');
        let force = command.contains('!');

        if !write && !quit {
            self.session
                .set_status(format!("Not an editor command: {command}"));
            return Ok(ControlFlow::Continue(()));
        }

        if write {
            self.save(host)?;
        }

        if quit {
            if force || !self.session.document.is_dirty() {
                return Ok(ControlFlow::Break(()));
            }

            self.session
                .set_status("No write since last change (add ! to override)");
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Saves the document, asking for a file name if it has none. Returns
    /// whether anything was written.
    fn save(&mut self, host: &mut impl Host) -> Result<bool> {
        let result = if !self.session.document.needs_new_path() {
            self.session.document.save()
        } else {
            let Some(name) = self.prompt(host, "Save as: {} (ESC to cancel)", None)? else {
                self.session.set_status("Save aborted");
                return Ok(false);
            };

            self.session.document.save_as(name)
        };

        match result {
            Ok(len) => {
                self.session.set_status(format!("{len} bytes written to disk"));
                Ok(true)
            }

            Err(err) => {
                log::error!("{err}");
                self.session.set_status(format!("Can't save! {err}"));
                Ok(false)
            }
        }
    }

    fn open(&mut self, host: &mut impl Host) -> Result<()> {
        let Some(name) = self.prompt(host, "Open file: {} (ESC to cancel)", None)? else {
            self.session.set_status("Open aborted");
            return Ok(());
        };

        match Document::open(&name) {
            Ok(document) => {
                let lossy = document.is_lossy();
                self.session.replace_document(document);

                if lossy {
                    self.session.set_status(format!("{LOSSY_WARNING} in {name}"));
                } else {
                    self.session.set_status(format!("Opened {name}"));
                }
            }

            Err(err) => {
                log::error!("{err}");
                self.session.set_status(format!("Can't open! {err}"));
            }
        }

        Ok(())
    }
}
