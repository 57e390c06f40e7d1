use std::io;
use std::time::Instant;

use crate::event::Event;
use crate::style::{Color, CursorShape, Style, Weight};
use crate::units::OffsetU16;

mod ansi;
mod ansi_event;
pub mod linux;

pub use self::ansi::AnsiWriter;
pub use self::ansi_event::{AnsiEvents, PollRead};

#[cfg(target_os = "linux")]
pub type PlatformTerminal = linux::LinuxTerminal;

/// A terminal in raw mode. Initialising one enters raw mode, dropping it
/// restores the terminal to how it was found.
pub trait Terminal: Sized {
    type Writer: Writer;
    type Events: Events;

    fn init() -> io::Result<Self>;

    /// The window size, `x` being columns and `y` rows.
    fn size(&self) -> io::Result<OffsetU16>;

    fn writer(&mut self) -> &mut Self::Writer;
    fn events(&mut self) -> &mut Self::Events;
}

/// Queues output for the terminal. Nothing reaches the screen until
/// [`Writer::flush`].
pub trait Writer {
    fn flush(&mut self) -> io::Result<()>;

    fn clear_all(&mut self);

    fn set_cursor_home(&mut self);
    fn set_cursor_pos(&mut self, pos: impl Into<OffsetU16>);
    fn set_cursor_vis(&mut self, vis: bool);
    fn set_cursor_shape(&mut self, shape: CursorShape);

    fn set_fg_color(&mut self, c: Color);
    fn set_bg_color(&mut self, c: Color);
    fn set_weight(&mut self, weight: Weight);

    /// Writes one printable character at the cursor, advancing it.
    fn write_char(&mut self, c: char);

    fn write_style(&mut self, style: Style) {
        self.set_fg_color(style.fg);
        self.set_bg_color(style.bg);
        self.set_weight(style.weight);
    }
}

pub trait Events {
    /// Waits for the next event until `deadline`, returning `None` if none
    /// arrived in time.
    fn read_with_deadline(&mut self, deadline: Instant) -> io::Result<Option<Event>>;
}
