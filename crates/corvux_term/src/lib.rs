pub mod char_buffer;
pub mod draw_char_buffer;
pub mod event;
pub mod platform;
pub mod style;
pub mod units;
