//! Character-at-a-time terminal mode for the line editor.
//!
//! The editor needs every keystroke unechoed, but keeps signal generation
//! enabled so that the interrupt key still raises `SIGINT` and a blocking
//! read returns `EINTR` (surfaced as [`Error::Interrupted`](crate::Error)).
//!
//! # Safety
//! This module uses unsafe code for FFI calls to libc termios functions.

#![allow(unsafe_code)]
#![allow(clippy::borrow_as_ptr)]

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// Saved terminal state, restored on drop.
#[derive(Debug)]
pub struct RawModeGuard {
    fd: RawFd,
    original: libc::termios,
}

impl RawModeGuard {
    /// Switch the given descriptor to character mode.
    pub fn new<F: AsRawFd>(fd: &F) -> io::Result<Self> {
        let fd = fd.as_raw_fd();
        let original = get_termios(fd)?;

        let mut raw = original;

        // Input: keep CR as typed, no flow control, no stripping.
        raw.c_iflag &= !(libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);

        // Output: the editor always emits explicit CR LF.
        raw.c_oflag &= !libc::OPOST;

        raw.c_cflag |= libc::CS8;

        // No echo, no line discipline; ISIG stays on.
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN);

        // Blocking reads of at least one byte.
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        set_termios(fd, &raw)?;

        Ok(Self { fd, original })
    }

    /// Restore the original terminal state.
    fn restore(&self) -> io::Result<()> {
        set_termios(self.fd, &self.original)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Enter character mode on stdin.
pub fn enable_raw_mode() -> io::Result<RawModeGuard> {
    RawModeGuard::new(&io::stdin())
}

/// Check if the given file descriptor is a TTY.
#[must_use]
pub fn is_tty<F: AsRawFd>(fd: &F) -> bool {
    // SAFETY: isatty is safe to call with any fd
    unsafe { libc::isatty(fd.as_raw_fd()) == 1 }
}

/// Query the window size of stdout as `(columns, lines)`.
///
/// Zero dimensions are reported as an error since every column computation
/// in the editor divides by the width.
pub fn terminal_size() -> io::Result<(usize, usize)> {
    let mut size: libc::winsize = unsafe { std::mem::zeroed() };

    // SAFETY: ioctl with TIOCGWINSZ is safe when passed a valid winsize struct
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else if size.ws_col == 0 || size.ws_row == 0 {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "terminal reported zero dimensions",
        ))
    } else {
        Ok((usize::from(size.ws_col), usize::from(size.ws_row)))
    }
}

fn get_termios(fd: RawFd) -> io::Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };

    // SAFETY: tcgetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(termios)
    }
}

fn set_termios(fd: RawFd, termios: &libc::termios) -> io::Result<()> {
    // SAFETY: tcsetattr is safe when passed a valid termios struct
    let result = unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) };

    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_is_tty_file_returns_false() {
        let file = tempfile::tempfile().expect("tempfile");
        assert!(!is_tty(&file));
    }

    #[test]
    fn test_raw_mode_on_regular_file_fails() {
        let file: File = tempfile::tempfile().expect("tempfile");
        assert!(RawModeGuard::new(&file).is_err());
    }

    #[test]
    fn test_terminal_size_does_not_panic() {
        // Under CI stdout is usually not a terminal; either outcome is fine.
        if let Ok((cols, lines)) = terminal_size() {
            assert!(cols > 0 && lines > 0);
        }
    }
}
