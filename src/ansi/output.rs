//! Buffered ANSI output writer implementing the terminal output primitives.

use crate::ansi::{self, sequences};
use crate::terminal::TerminalOutput;
use std::env;
use std::io::{self, Write};

/// Largest leftward move emitted as plain backspaces instead of a CSI sequence.
const MAX_BACKSPACE_MOVE: usize = 4;

/// Buffered writer that turns cursor requests into ANSI sequences.
///
/// Output accumulates in an internal buffer and reaches the wrapped writer
/// only on [`flush`](TerminalOutput::flush), so one input event produces one
/// write.
pub struct AnsiWriter<W: Write> {
    writer: W,
    buffer: Vec<u8>,
    cols: usize,
    lines: usize,
    cursor_motion: bool,
}

impl<W: Write> AnsiWriter<W> {
    /// Create a writer for a terminal of the given size.
    pub fn new(writer: W, cols: usize, lines: usize) -> Self {
        Self {
            writer,
            buffer: Vec::with_capacity(4096),
            cols: cols.max(2),
            lines: lines.max(1),
            cursor_motion: true,
        }
    }

    /// Create a writer, disabling cursor motion when `TERM` names a dumb
    /// terminal or is unset.
    pub fn detect(writer: W, cols: usize, lines: usize) -> Self {
        let term = env::var("TERM").unwrap_or_default();
        let mut out = Self::new(writer, cols, lines);
        out.cursor_motion = !(term.is_empty() || term == "dumb");
        out
    }

    /// Enable or disable cursor motion sequences.
    pub fn set_cursor_motion(&mut self, enabled: bool) {
        self.cursor_motion = enabled;
    }

    /// Record a new terminal size.
    pub fn set_size(&mut self, cols: usize, lines: usize) {
        self.cols = cols.max(2);
        self.lines = lines.max(1);
    }

    /// Bytes written since the last flush.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Access the wrapped writer.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Access the wrapped writer mutably.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Unwrap, discarding anything not yet flushed.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TerminalOutput for AnsiWriter<W> {
    fn size(&self) -> (usize, usize) {
        (self.cols, self.lines)
    }

    fn supports_cursor_motion(&self) -> bool {
        self.cursor_motion
    }

    fn goto(&mut self, col: usize, row: usize) {
        if !self.cursor_motion {
            return;
        }
        let _ = ansi::write_cursor_position(&mut self.buffer, row as u32, col as u32);
    }

    fn move_horizontal(&mut self, from_col: usize, to_col: usize) {
        if !self.cursor_motion || from_col == to_col {
            return;
        }
        if to_col == 0 {
            self.buffer.push(b'\r');
        } else if to_col < from_col && from_col - to_col <= MAX_BACKSPACE_MOVE {
            self.buffer
                .extend(std::iter::repeat_n(sequences::BACKSPACE, from_col - to_col));
        } else {
            let dx = to_col as i32 - from_col as i32;
            let _ = ansi::write_cursor_horizontal(&mut self.buffer, dx);
        }
    }

    fn clear_to_eol(&mut self) {
        if self.cursor_motion {
            self.buffer
                .extend_from_slice(sequences::CLEAR_LINE_RIGHT.as_bytes());
        }
    }

    fn clear_to_eos(&mut self) {
        if self.cursor_motion {
            self.buffer
                .extend_from_slice(sequences::CLEAR_SCREEN_BELOW.as_bytes());
        }
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        self.writer.flush()
    }
}
