use std::fmt::Write as _;
use std::io::{self, Write};

use super::Writer;
use crate::style::{Color, CursorShape, Weight};
use crate::units::OffsetU16;

const CSI: &str = "\x1b[";

/// Buffers escape sequences and text, handing everything to the inner
/// writer in one `write_all` on flush.
pub struct AnsiWriter<W: Write> {
    buf: String,
    writer: W,
}

impl<W: Write> AnsiWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            buf: String::new(),
            writer,
        }
    }

    pub fn inner(&self) -> &W {
        &self.writer
    }

    /// What has been queued since the last flush.
    pub fn pending(&self) -> &str {
        &self.buf
    }

    fn csi(&mut self, seq: std::fmt::Arguments) {
        // writing to a `String` can't fail
        write!(self.buf, "{CSI}{seq}").unwrap();
    }
}

impl<W: Write> Writer for AnsiWriter<W> {
    fn flush(&mut self) -> io::Result<()> {
        self.writer.write_all(self.buf.as_bytes())?;
        self.buf.clear();

        self.writer.flush()
    }

    #[inline]
    fn clear_all(&mut self) {
        // visible screen, then scrollback
        self.csi(format_args!("2J"));
        self.csi(format_args!("3J"));
    }

    #[inline]
    fn set_cursor_home(&mut self) {
        self.csi(format_args!("H"));
    }

    #[inline]
    fn set_cursor_pos(&mut self, pos: impl Into<OffsetU16>) {
        let pos = pos.into();

        // one-based, row first
        let row = pos.y.saturating_add(1);
        let col = pos.x.saturating_add(1);

        self.csi(format_args!("{row};{col}H"));
    }

    #[inline]
    fn set_cursor_vis(&mut self, vis: bool) {
        let flag = if vis { 'h' } else { 'l' };
        self.csi(format_args!("?25{flag}"));
    }

    #[inline]
    fn set_cursor_shape(&mut self, shape: CursorShape) {
        let code = match shape {
            CursorShape::Block => 2,
            CursorShape::Bar => 6,
        };
        self.csi(format_args!("{code} q"));
    }

    #[inline]
    fn set_fg_color(&mut self, c: Color) {
        self.csi(format_args!("3{}m", c as u8));
    }

    #[inline]
    fn set_bg_color(&mut self, c: Color) {
        self.csi(format_args!("4{}m", c as u8));
    }

    #[inline]
    fn set_weight(&mut self, weight: Weight) {
        let code = match weight {
            Weight::Normal => 22,
            Weight::Dim => 2,
        };
        self.csi(format_args!("{code}m"));
    }

    #[inline]
    fn write_char(&mut self, c: char) {
        // control characters would move the real cursor behind our back
        if !c.is_control() {
            self.buf.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnsiWriter;
    use crate::platform::Writer;
    use crate::style::{Color, CursorShape, Style};

    #[test]
    fn sequences() {
        let mut ansi = AnsiWriter::new(Vec::new());
        ansi.set_cursor_vis(false);
        ansi.set_cursor_home();
        ansi.write_style(Style::fg(Color::Magenta).dim());
        ansi.write_char('h');
        ansi.write_char('\n');
        ansi.write_char('i');
        ansi.set_cursor_pos([4, 2]);
        ansi.set_cursor_shape(CursorShape::Bar);

        let expected = "\x1b[?25l\x1b[H\x1b[35m\x1b[49m\x1b[2mhi\x1b[3;5H\x1b[6 q";
        assert_eq!(ansi.pending(), expected);

        ansi.flush().unwrap();
        assert_eq!(ansi.pending(), "");
        assert_eq!(ansi.inner().as_slice(), expected.as_bytes());
    }
}
