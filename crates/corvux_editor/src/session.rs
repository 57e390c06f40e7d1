use std::time::{Duration, Instant};

use corvux_term::units::OffsetUsize;

use crate::document::Document;
use crate::editor::Mode;
use crate::syntax::{self, Ruleset};
use crate::view::{Cursor, Viewport};

/// How long a status message stays on screen.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct StatusMessage {
    text: String,
    time: Instant,
}

/// The state of one editing session: the open document, where the cursor
/// is, what part of the document is on screen and which mode we're in.
#[derive(Debug)]
pub struct Session {
    pub document: Document,
    pub cursor: Cursor,
    pub viewport: Viewport,
    pub mode: Mode,

    syntax: Option<&'static Ruleset>,
    status: Option<StatusMessage>,
}

impl Session {
    pub fn new(document: Document, size: OffsetUsize) -> Self {
        Self {
            document,
            cursor: Cursor::default(),
            viewport: Viewport::new(size),
            mode: Mode::Normal,
            syntax: None,
            status: None,
        }
    }

    /// Binds the highlighting ruleset for `extension`. Highlighting is off
    /// until this is called, and stays off if no ruleset matches.
    pub fn set_syntax(&mut self, extension: &str) -> bool {
        self.syntax = syntax::find_ruleset(extension);
        log::debug!("syntax for {extension:?}: {:?}", self.syntax.map(|s| s.name));
        self.syntax.is_some()
    }

    pub fn syntax(&self) -> Option<&'static Ruleset> {
        self.syntax
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("status: {text}");

        self.status = Some(StatusMessage {
            text,
            time: Instant::now(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// The status message, if it was set less than [`MESSAGE_TIMEOUT`]
    /// before `now`.
    pub fn status(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|status| now.saturating_duration_since(status.time) < MESSAGE_TIMEOUT)
            .map(|status| status.text.as_str())
    }

    /// Swaps in a different document, starting again from the top.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.cursor = Cursor::default();
        self.viewport.row_offset = 0;
        self.viewport.col_offset = 0;
        self.mode = Mode::Normal;
    }

    /// Fits the viewport to a terminal of `size` cells and scrolls the
    /// cursor into view. Called once before drawing each frame.
    pub fn prepare_frame(&mut self, size: OffsetUsize) {
        self.viewport.resize(size);
        self.cursor.clamp(&self.document);
        self.viewport.scroll(self.cursor, &self.document);
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use corvux_term::units::OffsetUsize;

    use super::{Session, MESSAGE_TIMEOUT};
    use crate::document::Document;
    use crate::view::Cursor;

    #[test]
    fn status_expires() {
        let mut session = Session::new(Document::new(), OffsetUsize::new(80, 24));
        session.set_status("hello");

        let now = Instant::now();
        assert_eq!(session.status(now), Some("hello"));
        assert_eq!(
            session.status(now + MESSAGE_TIMEOUT + Duration::from_millis(1)),
            None
        );

        session.clear_status();
        assert_eq!(session.status(now), None);
    }

    #[test]
    fn syntax_is_off_until_bound() {
        let mut session = Session::new(Document::new(), OffsetUsize::new(80, 24));
        assert!(session.syntax().is_none());

        assert!(session.set_syntax("c"));
        assert_eq!(session.syntax().map(|s| s.name), Some("c"));

        assert!(!session.set_syntax("md"));
        assert!(session.syntax().is_none());
    }

    #[test]
    fn prepare_frame_scrolls_and_clamps() {
        let lines = vec!["line"; 30];
        let mut session = Session::new(Document::from_lines(lines), OffsetUsize::new(80, 12));
        session.cursor = Cursor::new(15, 99);

        session.prepare_frame(OffsetUsize::new(80, 12));
        assert_eq!(session.cursor, Cursor::new(15, 4));
        assert_eq!(session.viewport.row_offset, 6);

        session.replace_document(Document::new());
        assert_eq!(session.cursor, Cursor::default());
        assert_eq!(session.viewport.row_offset, 0);
    }
}
