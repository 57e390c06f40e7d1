//! Draws a [`Session`] into a [`CharBuffer`]: the text rows with their line
//! numbers, then the status bar and the message bar underneath.

use std::time::Instant;

use corvux_term::char_buffer::{cell_width, CharBuffer};
use corvux_term::style::{Color, CursorShape, Style};
use unicode_width::UnicodeWidthChar;

use crate::document::Row;
use crate::editor::Mode;
use crate::session::Session;
use crate::syntax::{TokenKind, Tokenizer};
use crate::view::GUTTER_WIDTH;

const WELCOME: &str = concat!("Corvux editor -- version ", env!("CARGO_PKG_VERSION"));

/// Longest file name shown in the status bar, in cells.
const FILENAME_WIDTH: usize = 20;

const GUTTER_STYLE: Style = Style::EMPTY.dim();
const FILLER_STYLE: Style = Style::fg(Color::Blue);

fn token_style(kind: TokenKind) -> Style {
    match kind {
        TokenKind::Keyword => Style::fg(Color::Yellow),
        TokenKind::DataType => Style::fg(Color::Green),
        TokenKind::Number => Style::fg(Color::Red),
        TokenKind::String => Style::fg(Color::Magenta),
        TokenKind::Constant => Style::fg(Color::Cyan),
        kind if kind.is_comment() => Style::fg(Color::Blue),
        _ => Style::EMPTY,
    }
}

/// Draws one frame. `buf` should already be cleared to the terminal size and
/// the session prepared with [`Session::prepare_frame`].
pub fn render(session: &Session, buf: &mut CharBuffer, now: Instant) {
    let viewport = &session.viewport;
    let document = &session.document;

    let mut tokenizer = Tokenizer::new(session.syntax());

    // Rows above the screen may open a block comment.
    if session
        .syntax()
        .is_some_and(|ruleset| ruleset.multi_line_comment.is_some())
    {
        for row in document.rows().iter().take(viewport.row_offset) {
            tokenizer.set_input(row.render());
            tokenizer.by_ref().for_each(drop);
        }
    }

    for y in 0..viewport.screen_rows {
        let screen_y = y as u16;

        match document.row(viewport.row_offset + y) {
            Some(row) => {
                let gutter = format!("{:>1$} ", row.index() + 1, GUTTER_WIDTH - 1);
                buf.set_str([0, screen_y], &gutter, GUTTER_STYLE);

                draw_row(buf, screen_y, row, &mut tokenizer, session);
            }

            None => {
                buf.set_str([0, screen_y], "~", FILLER_STYLE);

                if document.num_rows() == 0 && y == viewport.screen_rows / 3 {
                    draw_welcome(buf, screen_y, viewport.screen_cols);
                }
            }
        }
    }

    let status_y = viewport.screen_rows as u16;
    draw_status_bar(buf, status_y, session);

    if let Some(message) = session.status(now) {
        buf.set_str([0, status_y + 1], message, Style::EMPTY);
    }

    buf.cursor = viewport
        .cursor_screen_pos(session.cursor)
        .map(|pos| pos.saturating_into_u16());

    buf.cursor_shape = match session.mode {
        Mode::Insert => CursorShape::Bar,
        Mode::Normal => CursorShape::Block,
    };
}

/// Writes the visible part of `row`, coloured by token.
fn draw_row<'a>(
    buf: &mut CharBuffer,
    y: u16,
    row: &'a Row,
    tokenizer: &mut Tokenizer<'a>,
    session: &Session,
) {
    let viewport = &session.viewport;
    let text = row.render();

    tokenizer.set_input(text);
    let mut token = tokenizer.next_token();

    let visible = viewport.col_offset..viewport.col_offset + viewport.text_cols();
    let mut col = 0;

    for (byte, ch) in text.char_indices() {
        while token.kind != TokenKind::EndOfInput && token.end() <= byte {
            token = tokenizer.next_token();
        }

        let start = col;
        col += cell_width(ch) as usize;

        if col > visible.end {
            break;
        }
        // a wide character cut by the left edge is left blank
        if start < visible.start {
            continue;
        }

        let style = if token.kind != TokenKind::EndOfInput && token.offset <= byte {
            token_style(token.kind)
        } else {
            Style::EMPTY
        };

        let x = GUTTER_WIDTH + start - visible.start;
        buf.set_char([x as u16, y], ch, style);
    }

    // Keep block comment state right for the rows below.
    tokenizer.by_ref().for_each(drop);
}

fn draw_welcome(buf: &mut CharBuffer, y: u16, cols: usize) {
    let welcome: String = WELCOME.chars().take(cols).collect();
    let padding = (cols - welcome.chars().count()) / 2;

    buf.set_str([padding as u16, y], &welcome, Style::EMPTY);
    buf.set_str([0, y], "~", FILLER_STYLE);
}

fn draw_status_bar(buf: &mut CharBuffer, y: u16, session: &Session) {
    let document = &session.document;
    let cols = session.viewport.screen_cols;

    buf.style_row(y, Style::INVERTED);

    let filename = match document.path() {
        Some(path) => truncate_to_width(&path.to_string_lossy(), FILENAME_WIDTH),
        None => "[No Name]".to_owned(),
    };

    let modified = if document.is_dirty() { " (modified)" } else { "" };

    let left = format!(
        " {} | {} - {} lines{}",
        session.mode.label(),
        filename,
        document.num_rows(),
        modified
    );

    let right = format!(
        "{} | {}/{} ",
        session.syntax().map_or("no ft", |ruleset| ruleset.name),
        session.cursor.row + 1,
        document.num_rows()
    );

    let left_len = buf.set_str([0, y], &left, Style::INVERTED) as usize;
    let right_len = right.chars().count();

    if left_len + right_len <= cols {
        buf.set_str([(cols - right_len) as u16, y], &right, Style::INVERTED);
    }
}

/// The longest prefix of `s` that fits in `width` cells.
fn truncate_to_width(s: &str, width: usize) -> String {
    let mut used = 0;

    s.chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use corvux_term::char_buffer::CharBuffer;
    use corvux_term::style::{Color, CursorShape, Style};
    use corvux_term::units::{OffsetU16, OffsetUsize};

    use super::{render, truncate_to_width, WELCOME};
    use crate::document::Document;
    use crate::editor::Mode;
    use crate::session::Session;
    use crate::view::{Cursor, GUTTER_WIDTH};

    const COLS: usize = 80;
    const ROWS: usize = 8;

    fn draw(session: &mut Session) -> CharBuffer {
        session.prepare_frame(OffsetUsize::new(COLS, ROWS));

        let mut buf = CharBuffer::new(OffsetU16::new(COLS as u16, ROWS as u16));
        render(session, &mut buf, Instant::now());
        buf
    }

    fn session(lines: &[&str]) -> Session {
        Session::new(
            Document::from_lines(lines.iter().copied()),
            OffsetUsize::new(COLS, ROWS),
        )
    }

    #[test]
    fn rows_have_line_numbers() {
        let mut session = session(&["hello", "world"]);
        let buf = draw(&mut session);

        assert!(buf.row_text(0).starts_with("    1 hello"));
        assert!(buf.row_text(1).starts_with("    2 world"));
        assert!(buf.row_text(2).starts_with('~'));
        assert_eq!(buf[[0, 0]].style, super::GUTTER_STYLE);
    }

    #[test]
    fn empty_document_shows_welcome() {
        let mut session = session(&[]);
        let buf = draw(&mut session);

        // six text rows, the banner sits on the third
        let banner = buf.row_text(2);
        assert!(banner.starts_with('~'));
        assert!(banner.contains(WELCOME), "{banner:?}");
        assert!(!buf.row_text(1).contains("Corvux"));
    }

    #[test]
    fn highlights_tokens() {
        let mut session = session(&["int x = 5;"]);
        session.set_syntax("c");
        let buf = draw(&mut session);

        let at = |x: usize| buf[[(GUTTER_WIDTH + x) as u16, 0]].style;

        assert_eq!(at(0), Style::fg(Color::Green));
        assert_eq!(at(2), Style::fg(Color::Green));
        assert_eq!(at(3), Style::EMPTY);
        assert_eq!(at(4), Style::EMPTY);
        assert_eq!(at(8), Style::fg(Color::Red));
        assert_eq!(at(9), Style::EMPTY);
    }

    #[test]
    fn block_comment_spans_rows_above_screen() {
        let mut lines = vec!["/* start"];
        lines.extend(["inside"; 10]);
        lines.push("end */ int");

        let mut session = session(&lines);
        session.set_syntax("c");
        session.cursor = Cursor::new(11, 0);
        let buf = draw(&mut session);

        assert!(session.viewport.row_offset > 0);

        let comment = Style::fg(Color::Blue);
        let last = 11 - session.viewport.row_offset as u16;

        assert_eq!(buf[[GUTTER_WIDTH as u16, 0]].style, comment);
        assert_eq!(buf[[GUTTER_WIDTH as u16, last]].style, comment);
        assert_eq!(
            buf[[(GUTTER_WIDTH + 7) as u16, last]].style,
            Style::fg(Color::Green)
        );
    }

    #[test]
    fn long_rows_are_clipped_to_the_viewport() {
        let line: String = ('a'..='z').cycle().take(100).collect();
        let mut session = session(&[line.as_str()]);
        session.cursor = Cursor::new(0, 90);
        let buf = draw(&mut session);

        let text_cols = COLS - GUTTER_WIDTH;
        let col_offset = session.viewport.col_offset;
        assert_eq!(col_offset, 90 + 1 - text_cols);

        let expected: String = line.chars().skip(col_offset).take(text_cols).collect();
        assert_eq!(&buf.row_text(0)[GUTTER_WIDTH..], expected);

        let cursor = buf.cursor.unwrap();
        assert_eq!(cursor, OffsetU16::new((COLS - 1) as u16, 0));
    }

    #[test]
    fn wide_characters_stay_aligned_with_the_cursor() {
        let mut session = session(&["日本x", "a"]);
        session.cursor = Cursor::new(0, 2);
        let buf = draw(&mut session);

        assert!(buf.row_text(0).starts_with("    1 日本x "));
        assert_eq!(buf[[(GUTTER_WIDTH + 4) as u16, 0]].c, 'x');
        assert_eq!(buf.cursor, Some(OffsetU16::new((GUTTER_WIDTH + 4) as u16, 0)));
    }

    #[test]
    fn wide_character_cut_by_the_right_edge_is_dropped() {
        let line = format!("{}日", "a".repeat(COLS - GUTTER_WIDTH - 1));
        let mut session = session(&[line.as_str()]);
        let buf = draw(&mut session);

        assert_eq!(session.viewport.col_offset, 0);
        assert_eq!(buf[[(COLS - 1) as u16, 0]].c, ' ');
        assert!(!buf.row_text(0).contains('日'));
    }

    #[test]
    fn status_bar_and_message() {
        let mut session = session(&["a", "b", "c"]);
        session.document.set_path("a/rather/long/path/to/some/file.c");
        session.set_syntax("c");
        session.cursor = Cursor::new(1, 0);
        session.document.insert_char(Cursor::new(0, 0), 'z');
        session.set_status("hi there");

        let buf = draw(&mut session);
        let bar = buf.row_text(6);

        assert!(
            bar.starts_with(" NORMAL | a/rather/long/path/t - 3 lines (modified)"),
            "{bar:?}"
        );
        assert!(bar.ends_with("c | 2/3 "), "{bar:?}");
        assert_eq!(buf[[0, 6]].style, Style::INVERTED);
        assert_eq!(buf[[(COLS - 1) as u16, 6]].style, Style::INVERTED);

        assert!(buf.row_text(7).starts_with("hi there"));
    }

    #[test]
    fn cursor_shape_follows_mode() {
        let mut session = session(&["abc"]);
        session.cursor = Cursor::new(0, 2);

        let buf = draw(&mut session);
        assert_eq!(buf.cursor_shape, CursorShape::Block);
        assert_eq!(buf.cursor, Some(OffsetU16::new((GUTTER_WIDTH + 2) as u16, 0)));

        session.mode = Mode::Insert;
        let buf = draw(&mut session);
        assert_eq!(buf.cursor_shape, CursorShape::Bar);
        assert!(buf.row_text(6).starts_with(" INSERT"));
    }

    #[test]
    fn truncates_by_width() {
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
        assert_eq!(truncate_to_width("ab", 3), "ab");
        assert_eq!(truncate_to_width("日本語", 5), "日本");
    }
}
