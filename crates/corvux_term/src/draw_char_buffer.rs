use crate::char_buffer::{Cell, CharBuffer};
use crate::platform::Writer;
use crate::style::Style;
use crate::units::OffsetU16;

/// Queues the escape sequences that turn the screen showing `old` into one
/// showing `new`. Nothing is flushed.
///
/// Only cells that differ are written, unless the size changed, in which
/// case the whole screen is cleared and redrawn.
pub fn draw_diff(old: &CharBuffer, new: &CharBuffer, w: &mut impl Writer) {
    let full = old.size() != new.size();
    if full {
        log::debug!("redrawing at {:?}", new.size());
    }

    w.set_cursor_vis(false);
    if full {
        w.clear_all();
    }
    w.set_cursor_home();

    let mut painter = Painter::new(w);

    for y in 0..new.size().y {
        for x in 0..new.size().x {
            let pos = OffsetU16::new(x, y);
            let cell = &new[pos];

            // printed along with the wide character before it
            if cell.is_wide_tail() {
                continue;
            }

            if full || old[pos] != *cell {
                painter.paint(pos, cell);
            }
        }
    }

    w.write_style(Style::default());

    if let Some(pos) = new.cursor {
        if full || old.cursor_shape != new.cursor_shape {
            w.set_cursor_shape(new.cursor_shape);
        }

        w.set_cursor_pos(pos);
        w.set_cursor_vis(true);
    }
}

/// Writes cells, only moving the cursor or changing style when the next
/// cell needs it.
struct Painter<'a, W: Writer> {
    w: &'a mut W,
    style: Style,
    cursor: OffsetU16,
}

impl<'a, W: Writer> Painter<'a, W> {
    fn new(w: &'a mut W) -> Self {
        w.write_style(Style::default());

        Self {
            w,
            style: Style::default(),
            cursor: OffsetU16::ZERO,
        }
    }

    fn paint(&mut self, pos: OffsetU16, cell: &Cell) {
        if pos != self.cursor {
            self.w.set_cursor_pos(pos);
        }

        let (old, new) = (self.style, cell.style);
        if new.fg != old.fg {
            self.w.set_fg_color(new.fg);
        }
        if new.bg != old.bg {
            self.w.set_bg_color(new.bg);
        }
        if new.weight != old.weight {
            self.w.set_weight(new.weight);
        }

        self.w.write_char(cell.c);

        self.style = new;
        self.cursor = OffsetU16::new(pos.x.saturating_add(cell.width()), pos.y);
    }
}

#[cfg(test)]
mod tests {
    use super::draw_diff;
    use crate::char_buffer::CharBuffer;
    use crate::platform::AnsiWriter;
    use crate::style::{Color, CursorShape, Style};

    #[test]
    fn only_changed_cells_are_written() {
        let mut old = CharBuffer::new([4, 2]);
        old.set_str([0, 0], "abcd", Style::default());
        old.set_str([0, 1], "efgh", Style::default());

        let mut new = old.clone();
        new.set_str([2, 1], "X", Style::default());
        new.cursor = Some([3, 1].into());

        let mut w = AnsiWriter::new(Vec::new());
        draw_diff(&old, &new, &mut w);

        let out = w.pending();
        assert!(out.starts_with("\x1b[?25l\x1b[H"));
        assert!(out.contains("\x1b[2;3HX"));
        assert!(!out.contains('a'));
        assert!(out.ends_with("\x1b[2;4H\x1b[?25h"));
    }

    #[test]
    fn wide_characters_advance_two_columns() {
        let old = CharBuffer::new([5, 1]);
        let mut new = old.clone();
        new.set_str([0, 0], "日ab", Style::default());

        let mut w = AnsiWriter::new(Vec::new());
        draw_diff(&old, &new, &mut w);

        // no cursor move between the wide character and the next cell
        let out = w.pending();
        assert!(out.contains("日ab"), "{out:?}");
        assert!(!out.contains('\0'));

        let mut newer = new.clone();
        newer.set_str([3, 0], "c", Style::default());

        let mut w = AnsiWriter::new(Vec::new());
        draw_diff(&new, &newer, &mut w);
        assert!(w.pending().contains("\x1b[1;4Hc"));
    }

    #[test]
    fn size_change_redraws_everything() {
        let old = CharBuffer::new([0, 0]);
        let mut new = CharBuffer::new([3, 1]);
        new.set_str([0, 0], "hi", Style::fg(Color::Green));

        let mut w = AnsiWriter::new(Vec::new());
        draw_diff(&old, &new, &mut w);

        let out = w.pending();
        assert!(out.contains("\x1b[2J"));
        assert!(out.contains("\x1b[32mhi"));
        // no cursor requested, so it stays hidden
        assert!(!out.contains("\x1b[?25h"));
    }

    #[test]
    fn cursor_shape_is_sent_when_it_changes() {
        let mut old = CharBuffer::new([2, 1]);
        old.cursor = Some([0, 0].into());

        let mut new = old.clone();
        new.cursor_shape = CursorShape::Bar;

        let mut w = AnsiWriter::new(Vec::new());
        draw_diff(&old, &new, &mut w);
        assert!(w.pending().contains("\x1b[6 q"));

        let mut w = AnsiWriter::new(Vec::new());
        draw_diff(&new, &new, &mut w);
        assert!(!w.pending().contains(" q"));
    }
}
