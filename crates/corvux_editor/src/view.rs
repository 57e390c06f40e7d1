use corvux_term::char_buffer::cell_width;
use corvux_term::units::OffsetUsize;

use crate::document::{Document, Row, TAB_STOP};

/// Columns reserved on the left for line numbers.
pub const GUTTER_WIDTH: usize = 6;

/// Rows taken by the status and message bars.
pub const BAR_ROWS: usize = 2;

/// A position in the document. `col` counts characters of the raw row, not
/// screen columns.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Cursor {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Moves one step, wrapping across line ends horizontally and staying
    /// within `[0, num_rows]` vertically.
    pub fn move_in(&mut self, direction: Direction, document: &Document) {
        let num_rows = document.num_rows();

        match direction {
            Direction::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = document.row_len(self.row);
                }
            }

            Direction::Right => {
                if self.row < num_rows {
                    if self.col < document.row_len(self.row) {
                        self.col += 1;
                    } else {
                        self.row += 1;
                        self.col = 0;
                    }
                }
            }

            Direction::Up => self.row = self.row.saturating_sub(1),

            Direction::Down => {
                if self.row < num_rows {
                    self.row += 1;
                }
            }
        }

        self.clamp(document);
    }

    /// Pulls the cursor back inside the document.
    pub fn clamp(&mut self, document: &Document) {
        self.row = self.row.min(document.num_rows());
        self.col = self.col.min(document.row_len(self.row));
    }
}

/// Screen column of character `col` of `row`, gutter included.
pub fn char_col_to_render_col(row: &Row, col: usize) -> usize {
    let text_col = row.raw().chars().take(col).fold(0, |render_col, ch| {
        render_col + char_width(ch, render_col)
    });

    GUTTER_WIDTH + text_col
}

/// The character of `row` under screen column `render_col`, or the row
/// length if the column is past the end of the row.
pub fn render_col_to_char_col(row: &Row, render_col: usize) -> usize {
    let mut current = 0;

    for (col, ch) in row.raw().chars().enumerate() {
        current += char_width(ch, current);

        if GUTTER_WIDTH + current > render_col {
            return col;
        }
    }

    row.len()
}

fn char_width(ch: char, render_col: usize) -> usize {
    match ch {
        '\t' => TAB_STOP - render_col % TAB_STOP,
        _ => cell_width(ch) as usize,
    }
}

/// The visible window into the document.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub row_offset: usize,
    pub col_offset: usize,

    /// Rows available for text.
    pub screen_rows: usize,
    pub screen_cols: usize,

    /// Where the cursor lands on screen, before subtracting `col_offset`.
    pub render_col: usize,
}

impl Viewport {
    pub fn new(size: OffsetUsize) -> Self {
        let mut viewport = Self::default();
        viewport.resize(size);
        viewport
    }

    /// Adapts to a terminal of `size` cells, keeping room for the bars.
    pub fn resize(&mut self, size: OffsetUsize) {
        let text_area = size.saturating_sub(OffsetUsize::new(0, BAR_ROWS));
        self.screen_rows = text_area.y;
        self.screen_cols = text_area.x;
    }

    /// Width of the text area to the right of the gutter.
    pub fn text_cols(&self) -> usize {
        self.screen_cols.saturating_sub(GUTTER_WIDTH)
    }

    /// Scrolls just enough to bring `cursor` into view. Applying it twice
    /// changes nothing.
    pub fn scroll(&mut self, cursor: Cursor, document: &Document) {
        self.render_col = match document.row(cursor.row) {
            Some(row) => char_col_to_render_col(row, cursor.col),
            None => GUTTER_WIDTH,
        };

        if cursor.row < self.row_offset {
            self.row_offset = cursor.row;
        }
        if cursor.row >= self.row_offset + self.screen_rows {
            self.row_offset = (cursor.row + 1).saturating_sub(self.screen_rows);
        }

        let text_col = self.render_col - GUTTER_WIDTH;
        let text_cols = self.text_cols().max(1);

        if text_col < self.col_offset {
            self.col_offset = text_col;
        }
        if text_col >= self.col_offset + text_cols {
            self.col_offset = text_col + 1 - text_cols;
        }
    }

    /// Cursor position on screen, if it falls inside the text area.
    pub fn cursor_screen_pos(&self, cursor: Cursor) -> Option<OffsetUsize> {
        let y = cursor.row.checked_sub(self.row_offset)?;
        let x = self.render_col.checked_sub(self.col_offset)?;

        (y < self.screen_rows && x < self.screen_cols).then_some(OffsetUsize::new(x, y))
    }
}
