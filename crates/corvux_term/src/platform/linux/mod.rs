use std::io;

use self::raw_term::{RawStdin, RawTerm};
use super::ansi::AnsiWriter;
use super::ansi_event::AnsiEvents;
use super::{Terminal, Writer};
use crate::style::{CursorShape, Style};
use crate::units::OffsetU16;

mod raw_term;

/// The controlling terminal, driven through ANSI escape sequences on
/// stdout and read from stdin with `poll`.
pub struct LinuxTerminal {
    output: AnsiWriter<RawTerm>,
    input: AnsiEvents<RawStdin>,
}

impl LinuxTerminal {
    /// Puts the screen back the way a shell expects it.
    fn reset_screen(&mut self) -> io::Result<()> {
        let w = &mut self.output;

        w.write_style(Style::default());
        w.clear_all();
        w.set_cursor_home();
        w.set_cursor_shape(CursorShape::Block);
        w.set_cursor_vis(true);

        w.flush()
    }
}

impl Terminal for LinuxTerminal {
    type Writer = AnsiWriter<RawTerm>;
    type Events = AnsiEvents<RawStdin>;

    fn init() -> io::Result<Self> {
        let mut term = Self {
            output: AnsiWriter::new(RawTerm::new()?),
            input: AnsiEvents::new(RawStdin),
        };

        term.output.clear_all();
        term.output.flush()?;

        log::debug!("entered raw mode at {:?}", term.size()?);

        Ok(term)
    }

    fn size(&self) -> io::Result<OffsetU16> {
        self.output.inner().size()
    }

    #[inline]
    fn writer(&mut self) -> &mut Self::Writer {
        &mut self.output
    }

    #[inline]
    fn events(&mut self) -> &mut Self::Events {
        &mut self.input
    }
}

impl Drop for LinuxTerminal {
    fn drop(&mut self) {
        if let Err(err) = self.reset_screen() {
            log::error!("couldn't reset the screen: {err}");
        }

        // the termios settings are restored when `RawTerm` drops, after this
        log::debug!("leaving raw mode");
    }
}
