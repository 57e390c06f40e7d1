use std::ops::{Index, IndexMut};

use unicode_width::UnicodeWidthChar;

use crate::style::{CursorShape, Style};
use crate::units::OffsetU16;

/// Fills the cell covered by the right half of a double-width character.
const WIDE_TAIL: char = '\0';

/// Cells `c` takes up on screen. Characters with no width of their own, such
/// as controls and combining marks, are drawn as a one-cell `?`.
pub fn cell_width(c: char) -> u16 {
    match c.width() {
        Some(0) | None => 1,
        Some(width) => width as u16,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub c: char,
    pub style: Style,
}

impl Cell {
    pub fn new(c: char, style: Style) -> Self {
        Self { c, style }
    }

    /// Whether this cell is covered by the double-width character before it.
    pub fn is_wide_tail(&self) -> bool {
        self.c == WIDE_TAIL
    }

    /// How far the terminal cursor moves when this cell is printed.
    pub fn width(&self) -> u16 {
        if self.is_wide_tail() {
            0
        } else {
            cell_width(self.c)
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(' ', Style::default())
    }
}

/// An off-screen grid of cells, one frame's worth of terminal output.
#[derive(Debug, Default)]
pub struct CharBuffer {
    data: Vec<Cell>,
    size: OffsetU16,

    pub cursor: Option<OffsetU16>,
    pub cursor_shape: CursorShape,
}

impl Clone for CharBuffer {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            size: self.size,
            cursor: self.cursor,
            cursor_shape: self.cursor_shape,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.data.clone_from(&source.data);
        self.size = source.size;
        self.cursor = source.cursor;
        self.cursor_shape = source.cursor_shape;
    }
}

impl CharBuffer {
    pub fn new(size: impl Into<OffsetU16>) -> Self {
        let size = size.into();
        let data = vec![Cell::default(); size.area()];

        Self {
            data,
            size,
            cursor: None,
            cursor_shape: CursorShape::default(),
        }
    }

    pub fn resize_and_clear(&mut self, size: impl Into<OffsetU16>) {
        let size: OffsetU16 = size.into();

        if size != self.size {
            self.data.clear();
            self.data.resize(size.area(), Cell::default());
            self.size = size;
        } else {
            self.data.fill(Cell::default());
        }

        self.cursor = None;
    }

    pub fn size(&self) -> OffsetU16 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: impl Into<OffsetU16>) -> Option<&Cell> {
        let index = self.index(index)?;
        self.data.get(index)
    }

    pub fn get_mut(&mut self, index: impl Into<OffsetU16>) -> Option<&mut Cell> {
        let index = self.index(index)?;
        self.data.get_mut(index)
    }

    /// Writes `c` at `pos`, taking two cells if it is double width. Returns
    /// the number of cells used, zero if `c` doesn't fit on the row.
    pub fn set_char(&mut self, pos: impl Into<OffsetU16>, c: char, style: Style) -> u16 {
        let pos = pos.into();
        let width = cell_width(c);

        if pos.y >= self.size.y || pos.x.saturating_add(width) > self.size.x {
            return 0;
        }

        let c = if c.width().unwrap_or(0) == 0 { '?' } else { c };

        // Don't leave half of a wide character behind.
        if self[pos].is_wide_tail() && pos.x > 0 {
            self[[pos.x - 1, pos.y]].c = ' ';
        }
        if let Some(after) = self.get_mut([pos.x + width, pos.y]) {
            if after.is_wide_tail() {
                after.c = ' ';
            }
        }

        self[pos] = Cell::new(c, style);
        if width == 2 {
            self[[pos.x + 1, pos.y]] = Cell::new(WIDE_TAIL, style);
        }

        width
    }

    /// Writes `s` starting at `pos`, clipped to the row. Returns the column
    /// after the last cell written.
    pub fn set_str(&mut self, pos: impl Into<OffsetU16>, s: &str, style: Style) -> u16 {
        let mut pos = pos.into();

        for c in s.chars() {
            match self.set_char(pos, c, style) {
                0 => break,
                width => pos.x += width,
            }
        }

        pos.x
    }

    /// Applies `style` to every cell of row `y`.
    pub fn style_row(&mut self, y: u16, style: Style) {
        for x in 0..self.size.x {
            if let Some(cell) = self.get_mut([x, y]) {
                cell.style = style;
            }
        }
    }

    /// The characters of row `y`, trailing blanks included.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.size.x)
            .filter_map(|x| self.get([x, y]))
            .filter(|cell| !cell.is_wide_tail())
            .map(|cell| cell.c)
            .collect()
    }

    fn index(&self, pos: impl Into<OffsetU16>) -> Option<usize> {
        let pos = pos.into();

        if pos.ge(self.size).either() {
            return None;
        }

        let index = pos.y as usize * self.size.x as usize + pos.x as usize;

        Some(index)
    }
}

impl<Idx: Into<OffsetU16>> Index<Idx> for CharBuffer {
    type Output = Cell;

    fn index(&self, index: Idx) -> &Self::Output {
        self.get(index).expect("indices out of bounds")
    }
}

impl<Idx: Into<OffsetU16>> IndexMut<Idx> for CharBuffer {
    fn index_mut(&mut self, index: Idx) -> &mut Self::Output {
        self.get_mut(index).expect("indices out of bounds")
    }
}

#[cfg(test)]
mod tests {
    use super::{cell_width, Cell, CharBuffer};
    use crate::style::{Color, Style};

    #[test]
    #[cfg_attr(miri, ignore)]
    fn simple() {
        let b = Cell::new('b', Style::default());
        let c = Cell::new('c', Style::default());

        let mut arr = CharBuffer::new([10, 10]);
        assert_eq!(arr.len(), 10 * 10);

        arr[[0, 0]] = b;
        arr[[9, 9]] = c;

        assert_eq!(arr[[0, 0]].c, 'b');
        assert_eq!(arr[[9, 9]].c, 'c');
        assert!(arr.get([10, 10]).is_none());
    }

    #[test]
    fn set_str_clips_to_row() {
        let mut arr = CharBuffer::new([4, 2]);
        let end = arr.set_str([1, 0], "hello", Style::fg(Color::Red));

        assert_eq!(end, 4);
        assert_eq!(arr.row_text(0), " hel");
        assert_eq!(arr.row_text(1), "    ");
        assert_eq!(arr[[1, 0]].style.fg, Color::Red);
    }

    #[test]
    fn wide_characters_take_two_cells() {
        let mut arr = CharBuffer::new([6, 1]);
        let end = arr.set_str([0, 0], "日本x", Style::default());

        assert_eq!(end, 5);
        assert_eq!(arr[[0, 0]].c, '日');
        assert!(arr[[1, 0]].is_wide_tail());
        assert_eq!(arr[[2, 0]].c, '本');
        assert_eq!(arr[[4, 0]].c, 'x');
        assert_eq!(arr.row_text(0), "日本x ");

        // no room for the right half
        assert_eq!(arr.set_char([5, 0], '語', Style::default()), 0);
        assert_eq!(arr[[5, 0]].c, ' ');
    }

    #[test]
    fn overwriting_half_a_wide_character_blanks_the_rest() {
        let mut arr = CharBuffer::new([4, 1]);
        arr.set_str([0, 0], "日本", Style::default());

        arr.set_char([1, 0], 'a', Style::default());
        assert_eq!(arr.row_text(0), " a本");

        arr.set_char([2, 0], 'b', Style::default());
        assert_eq!(arr.row_text(0), " ab ");
        assert!(!arr[[3, 0]].is_wide_tail());
    }

    #[test]
    fn zero_width_characters_become_placeholders() {
        let mut arr = CharBuffer::new([3, 1]);
        let end = arr.set_str([0, 0], "\u{1}e\u{301}", Style::default());

        assert_eq!(end, 3);
        assert_eq!(arr.row_text(0), "?e?");
        assert_eq!(cell_width('\u{301}'), 1);
    }

    #[test]
    fn resize_clears_cursor_and_cells() {
        let mut arr = CharBuffer::new([3, 1]);
        arr.set_str([0, 0], "abc", Style::default());
        arr.cursor = Some([1, 0].into());

        arr.resize_and_clear([3, 1]);
        assert_eq!(arr.row_text(0), "   ");
        assert_eq!(arr.cursor, None);

        arr.resize_and_clear([5, 2]);
        assert_eq!(arr.len(), 10);
    }
}
