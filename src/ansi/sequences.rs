//! Constant ANSI escape sequences.

/// Escape byte introducing every sequence.
pub const ESC: u8 = 0x1b;

/// Reset all attributes to default.
pub const RESET: &str = "\x1b[0m";

/// Clear from cursor to end of screen.
pub const CLEAR_SCREEN_BELOW: &str = "\x1b[J";

/// Clear from cursor to end of line.
pub const CLEAR_LINE_RIGHT: &str = "\x1b[K";

/// Carriage return plus line feed; correct with or without output
/// post-processing enabled.
pub const NEWLINE: &str = "\r\n";

/// Backspace, moves the cursor one column left.
pub const BACKSPACE: u8 = 0x08;
