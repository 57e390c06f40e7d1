use std::io;
use std::time::{Duration, Instant};

use super::Events;
use crate::event::{Event, KeyCode, KeyEvent, Modifiers};

/// How long to wait for the rest of an escape sequence before treating a
/// lone `ESC` as the escape key.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

const ESC: u8 = 0x1b;

/// A byte source that can wait for input with a timeout.
pub trait PollRead {
    /// Reads whatever is available into `buf`, waiting at most `timeout`.
    /// Returns `Ok(0)` if nothing arrived in time.
    fn poll_read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;
}

/// Decodes key events from the byte stream of a terminal in raw mode.
pub struct AnsiEvents<R: PollRead> {
    reader: R,
    pending: Vec<u8>,
}

impl<R: PollRead> AnsiEvents<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
        }
    }

    fn fill(&mut self, timeout: Duration) -> io::Result<bool> {
        let mut buf = [0; 1024];
        let n = self.reader.poll_read(&mut buf, timeout)?;
        self.pending.extend_from_slice(&buf[..n]);
        Ok(n > 0)
    }
}

impl<R: PollRead> Events for AnsiEvents<R> {
    fn read_with_deadline(&mut self, deadline: Instant) -> io::Result<Option<Event>> {
        loop {
            match parse_event(&self.pending) {
                Parsed::Event(event, len) => {
                    self.pending.drain(..len);
                    return Ok(Some(event));
                }

                Parsed::Incomplete => {
                    let lone_escape = self.pending == [ESC];

                    if self.fill(ESCAPE_TIMEOUT)? {
                        // Alt chords arrive in one read, so whatever follows
                        // a lone escape later is a new key.
                        if lone_escape && !matches!(self.pending[1], b'[' | b'O') {
                            self.pending.drain(..1);
                            return Ok(Some(Event::from(KeyEvent::new(KeyCode::Escape))));
                        }
                    } else {
                        // Nothing more is coming, so take what we have.
                        let event = if self.pending[0] == ESC {
                            self.pending.drain(..1);
                            Event::from(KeyEvent::new(KeyCode::Escape))
                        } else {
                            self.pending.clear();
                            Event::Unknown
                        };
                        return Ok(Some(event));
                    }
                }

                Parsed::Empty => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    if !self.fill(timeout)? {
                        return Ok(None);
                    }
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Parsed {
    Event(Event, usize),
    Incomplete,
    Empty,
}

pub(crate) fn parse_event(bytes: &[u8]) -> Parsed {
    let Some(&first) = bytes.first() else {
        return Parsed::Empty;
    };

    match first {
        ESC => parse_escape(bytes),

        b'\r' => key(KeyCode::Return, 1),
        b'\t' => key(KeyCode::Tab, 1),
        0x7f => key(KeyCode::Backspace, 1),

        // ^A through ^Z, minus the ones handled above
        1..=26 => Parsed::Event(
            Event::Key(KeyEvent::ctrl((b'@' + first) as char)),
            1,
        ),

        0x20..=0x7e => key(KeyCode::Char(first as char), 1),

        0x80..=0xff => parse_utf8(bytes),

        _ => Parsed::Event(Event::Unknown, 1),
    }
}

fn parse_escape(bytes: &[u8]) -> Parsed {
    match bytes.get(1) {
        None => Parsed::Incomplete,

        Some(b'[') => parse_csi(bytes),

        Some(b'O') => match bytes.get(2) {
            None => Parsed::Incomplete,
            Some(b'A') => key(KeyCode::Up, 3),
            Some(b'B') => key(KeyCode::Down, 3),
            Some(b'C') => key(KeyCode::Right, 3),
            Some(b'D') => key(KeyCode::Left, 3),
            Some(b'H') => key(KeyCode::Home, 3),
            Some(b'F') => key(KeyCode::End, 3),
            Some(_) => Parsed::Event(Event::Unknown, 3),
        },

        Some(&ch) if (0x20..=0x7e).contains(&ch) => Parsed::Event(
            Event::Key(KeyEvent::new_with_mods(
                KeyCode::Char(ch as char),
                Modifiers::ALT,
            )),
            2,
        ),

        Some(_) => key(KeyCode::Escape, 1),
    }
}

/// `ESC [ params final`, where params are bytes in `0x30..=0x3f` and the
/// final byte is in `0x40..=0x7e`.
fn parse_csi(bytes: &[u8]) -> Parsed {
    let params_start = 2;

    let Some(final_index) = bytes[params_start..]
        .iter()
        .position(|b| !(0x30..=0x3f).contains(b))
        .map(|i| i + params_start)
    else {
        return Parsed::Incomplete;
    };

    let len = final_index + 1;
    let params = &bytes[params_start..final_index];

    let key_code = match bytes[final_index] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,

        b'~' => {
            let first_param = params.split(|&b| b == b';').next().unwrap_or_default();
            match first_param {
                b"1" | b"7" => KeyCode::Home,
                b"2" => KeyCode::Insert,
                b"3" => KeyCode::Delete,
                b"4" | b"8" => KeyCode::End,
                b"5" => KeyCode::PageUp,
                b"6" => KeyCode::PageDown,
                _ => return Parsed::Event(Event::Unknown, len),
            }
        }

        0x40..=0x7e => return Parsed::Event(Event::Unknown, len),

        // not a valid final byte, drop the introducer only
        _ => return Parsed::Event(Event::Unknown, params_start),
    };

    Parsed::Event(
        Event::Key(KeyEvent::new_with_mods(key_code, csi_modifiers(params))),
        len,
    )
}

/// The xterm modifier parameter (`ESC [ 1 ; 5 A` is ctrl-up).
fn csi_modifiers(params: &[u8]) -> Modifiers {
    let Some(param) = params.split(|&b| b == b';').nth(1) else {
        return Modifiers::empty();
    };

    let value = std::str::from_utf8(param)
        .ok()
        .and_then(|s| s.parse::<u8>().ok())
        .unwrap_or(1);

    Modifiers::from_bits_truncate(value.saturating_sub(1))
}

fn parse_utf8(bytes: &[u8]) -> Parsed {
    let width = match bytes[0] {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Parsed::Event(Event::Unknown, 1),
    };

    let Some(encoded) = bytes.get(..width) else {
        return Parsed::Incomplete;
    };

    match std::str::from_utf8(encoded).ok().and_then(|s| s.chars().next()) {
        Some(ch) => key(KeyCode::Char(ch), width),
        None => Parsed::Event(Event::Unknown, 1),
    }
}

fn key(key_code: KeyCode, len: usize) -> Parsed {
    Parsed::Event(Event::from(KeyEvent::new(key_code)), len)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::time::{Duration, Instant};

    use super::{parse_event, AnsiEvents, Parsed, PollRead};
    use crate::event::{Event, KeyCode, KeyEvent, Modifiers};
    use crate::platform::Events;

    fn parsed_key(bytes: &[u8]) -> (KeyEvent, usize) {
        match parse_event(bytes) {
            Parsed::Event(Event::Key(key), len) => (key, len),
            other => panic!("expected a key from {bytes:?}, got {other:?}"),
        }
    }

    #[test]
    fn plain_and_control_keys() {
        assert_eq!(parsed_key(b"a"), (KeyEvent::new(KeyCode::Char('a')), 1));
        assert_eq!(parsed_key(b"\r"), (KeyEvent::new(KeyCode::Return), 1));
        assert_eq!(parsed_key(b"\t"), (KeyEvent::new(KeyCode::Tab), 1));
        assert_eq!(parsed_key(b"\x7f"), (KeyEvent::new(KeyCode::Backspace), 1));
        assert_eq!(parsed_key(b"\x11"), (KeyEvent::ctrl('q'), 1));
        assert_eq!(parsed_key(b"\x08"), (KeyEvent::ctrl('h'), 1));
    }

    #[test]
    fn escape_sequences() {
        assert_eq!(parsed_key(b"\x1b[A"), (KeyEvent::new(KeyCode::Up), 3));
        assert_eq!(parsed_key(b"\x1b[D"), (KeyEvent::new(KeyCode::Left), 3));
        assert_eq!(parsed_key(b"\x1bOH"), (KeyEvent::new(KeyCode::Home), 3));
        assert_eq!(parsed_key(b"\x1b[3~"), (KeyEvent::new(KeyCode::Delete), 4));
        assert_eq!(parsed_key(b"\x1b[5~x"), (KeyEvent::new(KeyCode::PageUp), 4));
        assert_eq!(parsed_key(b"\x1b[8~"), (KeyEvent::new(KeyCode::End), 4));
        assert_eq!(
            parsed_key(b"\x1b[1;5C"),
            (KeyEvent::new_with_mods(KeyCode::Right, Modifiers::CTRL), 6)
        );
        assert_eq!(
            parsed_key(b"\x1bx"),
            (KeyEvent::new_with_mods(KeyCode::Char('x'), Modifiers::ALT), 2)
        );
    }

    #[test]
    fn incomplete_input_waits() {
        assert_eq!(parse_event(b""), Parsed::Empty);
        assert_eq!(parse_event(b"\x1b"), Parsed::Incomplete);
        assert_eq!(parse_event(b"\x1b[1"), Parsed::Incomplete);
        assert_eq!(parse_event(&"é".as_bytes()[..1]), Parsed::Incomplete);
    }

    #[test]
    fn utf8_characters() {
        assert_eq!(parsed_key("é".as_bytes()), (KeyEvent::new(KeyCode::Char('é')), 2));
        assert_eq!(parse_event(b"\xff"), Parsed::Event(Event::Unknown, 1));
    }

    struct Script(VecDeque<Vec<u8>>);

    impl PollRead for Script {
        fn poll_read(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
            let Some(chunk) = self.0.pop_front() else {
                return Ok(0);
            };
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn reads_events_across_chunks() {
        let script = Script(VecDeque::from([b"ab\x1b".to_vec(), b"[B".to_vec()]));
        let mut events = AnsiEvents::new(script);
        let deadline = Instant::now();

        let mut next = || events.read_with_deadline(deadline).unwrap();

        assert_eq!(next(), Some(Event::from(KeyEvent::new(KeyCode::Char('a')))));
        assert_eq!(next(), Some(Event::from(KeyEvent::new(KeyCode::Char('b')))));
        assert_eq!(next(), Some(Event::from(KeyEvent::new(KeyCode::Down))));
        assert_eq!(next(), None);
    }

    #[test]
    fn escape_then_key_in_separate_reads_is_two_keys() {
        let script = Script(VecDeque::from([b"\x1b".to_vec(), b"j".to_vec()]));
        let mut events = AnsiEvents::new(script);
        let deadline = Instant::now();

        let mut next = || events.read_with_deadline(deadline).unwrap();

        assert_eq!(next(), Some(Event::from(KeyEvent::new(KeyCode::Escape))));
        assert_eq!(next(), Some(Event::from(KeyEvent::new(KeyCode::Char('j')))));
        assert_eq!(next(), None);
    }

    #[test]
    fn escape_and_key_in_one_read_is_alt() {
        let script = Script(VecDeque::from([
            b"\x1bx".to_vec(),
            b"\x1b".to_vec(),
            b"OA".to_vec(),
        ]));
        let mut events = AnsiEvents::new(script);
        let deadline = Instant::now();

        let mut next = || events.read_with_deadline(deadline).unwrap();

        assert_eq!(
            next(),
            Some(Event::from(KeyEvent::new_with_mods(
                KeyCode::Char('x'),
                Modifiers::ALT
            )))
        );
        // sequences may still be split between reads
        assert_eq!(next(), Some(Event::from(KeyEvent::new(KeyCode::Up))));
        assert_eq!(next(), None);
    }

    #[test]
    fn lone_escape_times_out_into_escape_key() {
        let script = Script(VecDeque::from([b"\x1b".to_vec()]));
        let mut events = AnsiEvents::new(script);

        assert_eq!(
            events.read_with_deadline(Instant::now()).unwrap(),
            Some(Event::from(KeyEvent::new(KeyCode::Escape)))
        );
    }
}
