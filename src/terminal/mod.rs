//! Terminal output primitives and process-level terminal plumbing.
//!
//! The editor draws exclusively through [`TerminalOutput`]. Raw mode and
//! resize notification are only needed by hosts driving a real terminal.

mod raw;
mod resize;

pub use raw::{RawModeGuard, enable_raw_mode, is_tty, terminal_size};
pub use resize::{install_resize_handler, request_resize, take_resize_pending};

use std::io;

/// The drawing primitives the redraw code relies on.
///
/// Coordinates are 0-indexed `(column, row)` screen positions. When
/// [`supports_cursor_motion`](Self::supports_cursor_motion) is false the
/// editor falls back to reprinting whole lines and never asks for motion.
pub trait TerminalOutput {
    /// Current `(columns, lines)`.
    fn size(&self) -> (usize, usize);

    /// Whether cursor positioning and clearing are available.
    fn supports_cursor_motion(&self) -> bool {
        true
    }

    /// Absolute cursor move.
    fn goto(&mut self, col: usize, row: usize);

    /// Relative move within the current row.
    fn move_horizontal(&mut self, from_col: usize, to_col: usize);

    /// Move from one known position to another with the cheapest sequence.
    fn goto_optimal(&mut self, from_col: usize, from_row: usize, to_col: usize, to_row: usize) {
        if from_row == to_row {
            if from_col != to_col {
                self.move_horizontal(from_col, to_col);
            }
        } else {
            self.goto(to_col, to_row);
        }
    }

    /// Clear from the cursor to the end of the row.
    fn clear_to_eol(&mut self);

    /// Clear from the cursor to the end of the screen.
    fn clear_to_eos(&mut self);

    /// Write bytes verbatim.
    fn write_raw(&mut self, bytes: &[u8]);

    /// Push buffered output to the device.
    fn flush(&mut self) -> io::Result<()>;
}
