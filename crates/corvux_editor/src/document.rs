use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::view::Cursor;

/// Tabs expand to the next multiple of this many columns.
pub const TAB_STOP: usize = 3;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("couldn't open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("couldn't write {}: {source}", path.display())]
    Save { path: PathBuf, source: io::Error },

    #[error("no file name")]
    NoPath,

    #[error("{} isn't valid UTF-8, save it under a new name", path.display())]
    Lossy { path: PathBuf },
}

pub type DocumentResult<T> = Result<T, DocumentError>;

/// One line of text and its display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    index: usize,
    raw: String,
    render: String,
}

impl Row {
    fn new(index: usize, raw: String) -> Self {
        let mut row = Self {
            index,
            raw,
            render: String::new(),
        };
        row.update_render();
        row
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The text as displayed, tabs expanded.
    pub fn render(&self) -> &str {
        &self.render
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.raw.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn byte_index(&self, col: usize) -> usize {
        self.raw
            .char_indices()
            .nth(col)
            .map_or(self.raw.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, col: usize, ch: char) {
        let at = self.byte_index(col);
        self.raw.insert(at, ch);
        self.update_render();
    }

    fn remove_char(&mut self, col: usize) -> Option<char> {
        if col >= self.len() {
            return None;
        }

        let ch = self.raw.remove(self.byte_index(col));
        self.update_render();
        Some(ch)
    }

    fn push_str(&mut self, s: &str) {
        self.raw.push_str(s);
        self.update_render();
    }

    fn split_off(&mut self, col: usize) -> String {
        let tail = self.raw.split_off(self.byte_index(col));
        self.update_render();
        tail
    }

    fn update_render(&mut self) {
        self.render.clear();
        let mut col = 0;

        for ch in self.raw.chars() {
            if ch == '\t' {
                let width = TAB_STOP - col % TAB_STOP;
                self.render.extend(std::iter::repeat(' ').take(width));
                col += width;
            } else {
                self.render.push(ch);
                col += 1;
            }
        }
    }
}

/// The text being edited, as a list of rows.
///
/// Positions outside the document are ignored by every edit rather than
/// reported, so callers never have to handle an error from a stale cursor.
#[derive(Debug, Default)]
pub struct Document {
    rows: Vec<Row>,
    path: Option<PathBuf>,

    /// The file at `path` had invalid UTF-8 replaced on load.
    lossy: bool,

    /// Number of edits since the last load or save.
    dirty: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path` line by line. Line terminators (`\n` or `\r\n`) are
    /// stripped and invalid UTF-8 is replaced, after which [`Document::save`]
    /// refuses to write back over `path`.
    pub fn open(path: impl Into<PathBuf>) -> DocumentResult<Self> {
        let path = path.into();

        let file = File::open(&path).map_err(|source| DocumentError::Open {
            path: path.clone(),
            source,
        })?;

        let mut document = Self::read_rows(BufReader::new(file)).map_err(|source| {
            DocumentError::Open {
                path: path.clone(),
                source,
            }
        })?;

        log::info!("opened {} ({} rows)", path.display(), document.num_rows());

        if document.lossy {
            log::warn!("{} has invalid UTF-8", path.display());
        }

        document.path = Some(path);
        Ok(document)
    }

    fn read_rows(mut reader: impl BufRead) -> io::Result<Self> {
        let mut document = Self::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }

            if line.ends_with(b"\n") {
                line.pop();
                if line.ends_with(b"\r") {
                    line.pop();
                }
            }

            let text = match String::from_utf8_lossy(&line) {
                Cow::Borrowed(text) => text.to_owned(),
                Cow::Owned(text) => {
                    document.lossy = true;
                    text
                }
            };
            document.insert_row(document.num_rows(), text);
        }

        document.dirty = 0;
        Ok(document)
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut document = Self::new();
        for line in lines {
            document.insert_row(document.num_rows(), line);
        }
        document.dirty = 0;
        document
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = Some(path.into());
    }

    /// Whether invalid UTF-8 was replaced when the file was read. Cleared
    /// by saving under a different name.
    pub fn is_lossy(&self) -> bool {
        self.lossy
    }

    /// Whether [`Document::save`] needs [`Document::save_as`] first.
    pub fn needs_new_path(&self) -> bool {
        self.path.is_none() || self.lossy
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// Length of row `at` in characters, zero past the end.
    pub fn row_len(&self, at: usize) -> usize {
        self.row(at).map_or(0, Row::len)
    }

    pub fn insert_row(&mut self, at: usize, text: impl Into<String>) {
        if at > self.rows.len() {
            return;
        }

        self.rows.insert(at, Row::new(at, text.into()));
        self.reindex_from(at + 1);
        self.dirty += 1;
    }

    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }

        self.rows.remove(at);
        self.reindex_from(at);
        self.dirty += 1;
    }

    /// Inserts `ch` at `pos`, appending a row first if `pos` is on the
    /// virtual row past the end.
    pub fn insert_char(&mut self, pos: Cursor, ch: char) {
        if pos.row == self.rows.len() {
            self.insert_row(self.rows.len(), "");
        }

        let Some(row) = self.rows.get_mut(pos.row) else {
            return;
        };

        let col = pos.col.min(row.len());
        row.insert_char(col, ch);
        self.dirty += 1;
    }

    /// Deletes the character left of `pos`, joining the row onto the
    /// previous one at the start of a line. Returns where the cursor ends up.
    pub fn delete_char(&mut self, pos: Cursor) -> Cursor {
        if pos.row > self.rows.len() || (pos.row == 0 && pos.col == 0) {
            return pos;
        }

        if pos.row == self.rows.len() {
            // nothing to join, just step back onto the last line
            return match pos.row.checked_sub(1) {
                Some(row) => Cursor::new(row, self.row_len(row)),
                None => pos,
            };
        }

        if pos.col > 0 {
            let col = pos.col.min(self.row_len(pos.row));
            if col == 0 {
                return Cursor::new(pos.row, 0);
            }

            self.rows[pos.row].remove_char(col - 1);
            self.dirty += 1;
            return Cursor::new(pos.row, col - 1);
        }

        let prev = pos.row - 1;
        let prev_len = self.row_len(prev);

        let moved = std::mem::take(&mut self.rows[pos.row].raw);
        self.rows[prev].push_str(&moved);
        self.delete_row(pos.row);

        Cursor::new(prev, prev_len)
    }

    /// Breaks the row at `pos`, moving the tail onto a new row after it.
    pub fn split_row(&mut self, pos: Cursor) {
        if pos.row == self.rows.len() {
            self.insert_row(pos.row, "");
            return;
        }

        let Some(row) = self.rows.get_mut(pos.row) else {
            return;
        };

        let col = pos.col.min(row.len());
        let tail = row.split_off(col);
        self.insert_row(pos.row + 1, tail);
    }

    /// The whole document, each row followed by a newline.
    pub fn serialize(&self) -> String {
        let len = self.rows.iter().map(|row| row.raw.len() + 1).sum();
        let mut out = String::with_capacity(len);

        for row in &self.rows {
            out.push_str(&row.raw);
            out.push('\n');
        }

        out
    }

    /// Writes the document to its path. Returns the number of bytes written.
    pub fn save(&mut self) -> DocumentResult<usize> {
        let path = self.path.clone().ok_or(DocumentError::NoPath)?;

        if self.lossy {
            return Err(DocumentError::Lossy { path });
        }

        let contents = self.serialize();
        write_truncated(&path, contents.as_bytes())
            .map_err(|source| DocumentError::Save { path: path.clone(), source })?;

        log::info!("wrote {} bytes to {}", contents.len(), path.display());

        self.dirty = 0;
        Ok(contents.len())
    }

    /// Sets the path and saves there.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> DocumentResult<usize> {
        let path = path.into();
        if self.path.as_ref() != Some(&path) {
            self.lossy = false;
        }

        self.path = Some(path);
        self.save()
    }

    fn reindex_from(&mut self, start: usize) {
        for (index, row) in self.rows.iter_mut().enumerate().skip(start) {
            row.index = index;
        }
    }
}

fn write_truncated(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;

    // Resize first, then overwrite in place.
    file.set_len(contents.len() as u64)?;
    file.write_all(contents)?;
    file.flush()
}
