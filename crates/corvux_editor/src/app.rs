use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use corvux_term::char_buffer::CharBuffer;
use corvux_term::draw_char_buffer::draw_diff;
use corvux_term::event::{Event, KeyEvent};
use corvux_term::platform::{Events, PlatformTerminal, Terminal, Writer};
use corvux_term::units::{OffsetU16, OffsetUsize};

use crate::document::Document;
use crate::editor::{Editor, Host, LOSSY_WARNING};
use crate::render::render;
use crate::session::Session;

/// How long to wait for a key before redrawing anyway.
const FRAME_RATE: Duration = Duration::from_millis(100);

const HELP: &str = "HELP: i = insert | : = command | Ctrl-S = save | Ctrl-Q = quit";

/// Reads keys from a real terminal and draws to it, only sending the cells
/// that changed since the previous frame.
pub struct TerminalHost<T: Terminal> {
    terminal: T,

    char_buf_prev: CharBuffer,
    char_buf: CharBuffer,
}

impl<T: Terminal> TerminalHost<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            char_buf_prev: CharBuffer::new(OffsetU16::ZERO),
            char_buf: CharBuffer::new(OffsetU16::ZERO),
        }
    }

    pub fn size(&self) -> Result<OffsetUsize> {
        let size = self
            .terminal
            .size()
            .context("couldn't get terminal size")?;

        Ok(size.into())
    }
}

impl<T: Terminal> Host for TerminalHost<T> {
    fn read_key(&mut self) -> Result<Option<KeyEvent>> {
        let deadline = Instant::now() + FRAME_RATE;

        let event = self
            .terminal
            .events()
            .read_with_deadline(deadline)
            .context("couldn't read from terminal")?;

        match event {
            Some(Event::Key(key)) => {
                log::debug!("key: {key:?}");
                Ok(Some(key))
            }

            Some(Event::Unknown) | None => Ok(None),
        }
    }

    fn present(&mut self, session: &mut Session) -> Result<()> {
        let size = self
            .terminal
            .size()
            .context("couldn't get terminal size")?;

        session.prepare_frame(size.into());

        self.char_buf.resize_and_clear(size);
        render(session, &mut self.char_buf, Instant::now());

        draw_diff(&self.char_buf_prev, &self.char_buf, self.terminal.writer());
        self.terminal
            .writer()
            .flush()
            .context("couldn't write to terminal")?;

        self.char_buf_prev.clone_from(&self.char_buf);

        Ok(())
    }
}

/// Opens `path` (or an empty document), takes over the terminal and edits
/// until the user quits.
pub fn run(path: Option<PathBuf>, syntax: Option<String>) -> Result<()> {
    // Open first so a bad path is reported on a normal terminal.
    let document = match path {
        Some(path) => Document::open(path)?,
        None => Document::new(),
    };

    let terminal = PlatformTerminal::init().context("couldn't enter raw mode")?;
    let mut host = TerminalHost::new(terminal);

    let mut session = Session::new(document, host.size()?);

    if let Some(extension) = syntax {
        if !session.set_syntax(&extension) {
            log::warn!("no syntax for {extension:?}");
        }
    }

    if session.document.is_lossy() {
        session.set_status(LOSSY_WARNING);
    } else {
        session.set_status(HELP);
    }

    Editor::new(session).run(&mut host)
}
