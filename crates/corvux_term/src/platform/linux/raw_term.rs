use std::fs::File;
use std::io::{self, Write};
use std::mem::ManuallyDrop;
use std::os::fd::{FromRawFd, RawFd};
use std::time::Duration;

use libc::{termios as Termios, winsize as Winsize, STDIN_FILENO, STDOUT_FILENO};

use crate::platform::PollRead;
use crate::units::OffsetU16;

macro_rules! cvt {
    ($res:expr) => {{
        match $res {
            -1 => Err(io::Error::last_os_error()),
            res => Ok(res),
        }
    }};
}

unsafe fn get_termios(fd: RawFd) -> io::Result<Termios> {
    unsafe {
        let mut termios: Termios = std::mem::zeroed();
        cvt!(libc::tcgetattr(fd, &mut termios))?;
        Ok(termios)
    }
}

unsafe fn set_termios(fd: RawFd, termios: &Termios) -> io::Result<()> {
    cvt!(unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) })?;
    Ok(())
}

unsafe fn get_size(fd: RawFd) -> io::Result<OffsetU16> {
    let mut size: Winsize = unsafe { std::mem::zeroed() };
    cvt!(unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) })?;

    if size.ws_col == 0 || size.ws_row == 0 {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            "terminal reported a zero window size",
        ));
    }

    Ok(OffsetU16::new(size.ws_col, size.ws_row))
}

/// Holds the terminal in raw mode for as long as it lives.
pub struct RawTerm {
    termios_prev: Termios,
}

impl RawTerm {
    pub fn new() -> io::Result<Self> {
        unsafe {
            let mut termios = get_termios(STDIN_FILENO)?;
            let termios_prev = termios;

            libc::cfmakeraw(&mut termios);

            // reads are driven by `poll`, so let `read` return whatever is there
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 0;

            set_termios(STDIN_FILENO, &termios)?;

            Ok(Self { termios_prev })
        }
    }

    pub fn size(&self) -> io::Result<OffsetU16> {
        unsafe { get_size(STDOUT_FILENO) }
    }
}

impl Drop for RawTerm {
    fn drop(&mut self) {
        let _ = unsafe { set_termios(STDIN_FILENO, &self.termios_prev) };
    }
}

impl Write for RawTerm {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        get_stdout().write(buf)
    }

    fn write_vectored(&mut self, bufs: &[io::IoSlice]) -> io::Result<usize> {
        get_stdout().write_vectored(bufs)
    }

    fn flush(&mut self) -> io::Result<()> {
        get_stdout().flush()
    }
}

fn get_stdout() -> ManuallyDrop<File> {
    ManuallyDrop::new(unsafe { File::from_raw_fd(STDOUT_FILENO) })
}

/// Standard input, read without blocking past a timeout.
pub struct RawStdin;

impl PollRead for RawStdin {
    fn poll_read(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let mut fds = libc::pollfd {
            fd: STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };

        let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

        let ready = loop {
            match cvt!(unsafe { libc::poll(&mut fds, 1, timeout_ms) }) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                res => break res?,
            }
        };

        if ready == 0 {
            return Ok(0);
        }

        let n = cvt!(unsafe { libc::read(STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) })?;

        Ok(n as usize)
    }
}
