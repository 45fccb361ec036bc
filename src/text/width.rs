//! Column width of byte strings that may carry ANSI escape sequences.

use crate::ansi::ESC;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Escape,
    Bracket,
}

/// Number of terminal columns `s` occupies on a screen `cols` wide.
///
/// Printable ASCII and every byte with the high bit set count one column.
/// Escape sequences (`ESC x` or `ESC [ ... alpha`) count nothing, and a
/// carriage return snaps the count back to the start of the current row.
/// An unterminated sequence at the end simply stops counting.
#[must_use]
pub fn visual_width(s: &[u8], cols: usize) -> usize {
    let cols = cols.max(1);
    let mut width = 0;
    let mut state = State::Normal;
    for &b in s {
        match state {
            State::Normal => {
                if b == ESC {
                    state = State::Escape;
                } else if b & 0x80 != 0 || b >= b' ' {
                    width += 1;
                } else if b == b'\r' {
                    width = (width / cols) * cols;
                }
            }
            State::Escape => {
                state = if b == b'[' {
                    State::Bracket
                } else {
                    State::Normal
                };
            }
            State::Bracket => {
                if b.is_ascii_alphabetic() {
                    state = State::Normal;
                }
            }
        }
    }
    width
}

/// Offset of an escape sequence left unterminated at the very end of `s`.
///
/// Scans backward: an alphabetic byte means any earlier sequence is closed,
/// an `ESC` found first is the start of an open one.
#[must_use]
pub fn find_partial_escape(s: &[u8]) -> Option<usize> {
    for (i, &b) in s.iter().enumerate().rev() {
        if b == ESC {
            return Some(i);
        }
        if b.is_ascii_alphabetic() {
            return None;
        }
    }
    None
}
