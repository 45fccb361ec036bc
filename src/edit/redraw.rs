//! Screen side of the editor.
//!
//! The input line is laid out in rows of `cols - 1` bytes starting at
//! column `col0` of row `line0`, one row break (`\r\n`) emitted per full
//! row, so the last terminal column is never written and autowrap never
//! comes into play. Buffer offset `p` therefore sits at
//!
//! ```text
//! row = line0 + (p + col0) / (cols - 1)
//! col =         (p + col0) % (cols - 1)
//! ```
//!
//! Every change to the buffer repaints only from the first changed byte,
//! then moves the cursor back with [`TerminalOutput::goto_optimal`]. When
//! the terminal cannot move the cursor, edits at the end of the line are
//! echoed and anything else reprints prompt and line on a fresh row.

use super::Editor;
use crate::ansi::NEWLINE;
use crate::error::Result;
use crate::terminal::TerminalOutput;
use crate::text::{find_partial_escape, visual_width};

const OPENERS: &[u8] = b"([{";
const CLOSERS: &[u8] = b")]}";

/// Bracket that closes with `closer`.
fn opener_for(closer: u8) -> Option<u8> {
    CLOSERS
        .iter()
        .position(|&c| c == closer)
        .map(|i| OPENERS[i])
}

pub(super) fn is_closer(b: u8) -> bool {
    CLOSERS.contains(&b)
}

impl<T: TerminalOutput> Editor<T> {
    fn cols_1(&self) -> usize {
        self.cols - 1
    }

    /// Screen row of buffer offset `p` (may be negative or off the bottom).
    pub(super) fn row_of(&self, p: isize) -> isize {
        self.line0 + (p + self.col0 as isize).div_euclid(self.cols_1() as isize)
    }

    fn col_of(&self, p: isize) -> usize {
        (p + self.col0 as isize).rem_euclid(self.cols_1() as isize) as usize
    }

    fn screen_row(&self, row: isize) -> usize {
        row.clamp(0, self.lines as isize - 1) as usize
    }

    pub(super) fn has_motion(&self) -> bool {
        self.out.supports_cursor_motion()
    }

    /// Move the terminal cursor between two buffer offsets.
    pub(super) fn move_between(&mut self, from: isize, to: isize) {
        if !self.has_motion() || from == to {
            return;
        }
        let (from_col, from_row) = (self.col_of(from), self.screen_row(self.row_of(from)));
        let (to_col, to_row) = (self.col_of(to), self.screen_row(self.row_of(to)));
        self.out.goto_optimal(from_col, from_row, to_col, to_row);
    }

    /// Write `line[from..to]`, breaking rows. The terminal cursor must be
    /// at offset `from` and ends at offset `to`.
    pub(super) fn emit_span(&mut self, from: usize, to: usize) {
        let cols_1 = self.cols_1();
        let mut start = from;
        for o in from..to {
            if (o + 1 + self.col0) % cols_1 == 0 {
                self.out.write_raw(&self.line.as_bytes()[start..=o]);
                self.out.write_raw(NEWLINE.as_bytes());
                start = o + 1;
            }
        }
        if start < to {
            self.out.write_raw(&self.line.as_bytes()[start..to]);
        }
    }

    /// Pull `line0` up after output ending at offset `end` scrolled the
    /// screen.
    fn follow_scroll(&mut self, end: usize) {
        let bottom = self.lines as isize - 1;
        let row = self.row_of(end as isize);
        if row > bottom {
            self.line0 -= row - bottom;
        }
    }

    /// Erase the stale text after offset `end` that used to reach `old_end`.
    /// The terminal cursor must be at `end`.
    fn clear_after(&mut self, end: usize, old_end: usize) {
        let style = self.config.input_style;
        self.out.write_raw(style.end_sequence());
        if self.row_of(old_end as isize) > self.row_of(end as isize) {
            self.out.clear_to_eos();
        } else {
            self.out.clear_to_eol();
        }
        if !style.is_none() {
            self.out.write_raw(&style.begin_sequence());
        }
    }

    /// Reprint prompt and line on a fresh row. Used without cursor motion.
    pub(super) fn linear_redraw(&mut self) {
        self.out.write_raw(self.config.input_style.end_sequence());
        self.out.write_raw(NEWLINE.as_bytes());
        self.prompt_drawn = false;
        self.line_drawn = false;
        self.draw_prompt();
        self.draw_input_line();
    }

    /// Draw the prompt if it is not on screen. The cursor must be at the
    /// start of a row.
    ///
    /// An escape sequence left open at the very end of the prompt is held
    /// back, since the input that follows would otherwise be swallowed by
    /// it.
    pub fn draw_prompt(&mut self) {
        if self.prompt_drawn {
            return;
        }
        self.prompt_drawn = true;
        if self.prompt.is_empty() {
            self.col0 = 0;
            return;
        }
        let shown = match find_partial_escape(&self.prompt) {
            Some(at) => &self.prompt[..at],
            None => &self.prompt[..],
        };
        self.out.write_raw(shown);
        let width = visual_width(shown, self.cols);
        if width >= self.cols_1() {
            // Too wide to share a row with input.
            self.out.write_raw(NEWLINE.as_bytes());
            let rows = 1 + width / self.cols;
            self.line0 = (self.line0 + rows as isize).min(self.lines as isize - 1);
            self.col0 = 0;
        } else {
            self.col0 = width;
        }
    }

    /// Remove the input line, and the prompt too if `delete_prompt`, from
    /// the screen.
    ///
    /// Works out where the terminal cursor really is from what is still
    /// drawn rather than trusting the buffer cursor, so calling it on an
    /// already erased line emits nothing beyond the attribute reset. The
    /// cursor is left where the erased part began.
    pub fn clear_input_line(&mut self, delete_prompt: bool) {
        let line_on = !self.line.is_empty() && self.line_drawn;
        let prompt_on = !self.prompt.is_empty() && self.prompt_drawn && delete_prompt;
        let end = self.config.input_style.end_sequence();

        if (line_on || prompt_on) && self.has_motion() {
            let new_col = if delete_prompt { 0 } else { self.col0 };
            let real_pos: isize = if self.line_drawn {
                self.flash.unwrap_or(self.line.cursor()) as isize
            } else if self.prompt_drawn {
                0
            } else {
                -(self.col0 as isize)
            };
            let (from_col, from_row) = (
                self.col_of(real_pos),
                self.screen_row(self.row_of(real_pos)),
            );
            let to_row = self.screen_row(self.line0);
            self.out.goto_optimal(from_col, from_row, new_col, to_row);
            self.out.write_raw(end);
            if self.line0 < self.lines as isize - 1 {
                self.out.clear_to_eos();
            } else {
                self.out.clear_to_eol();
            }
            self.col0 = new_col;
        } else if line_on || prompt_on {
            // Nothing can be erased; start over on a fresh row.
            self.out.write_raw(end);
            self.out.write_raw(NEWLINE.as_bytes());
            self.prompt_drawn = false;
        } else {
            self.out.write_raw(end);
        }

        self.flash = None;
        self.line_drawn = false;
        if delete_prompt {
            self.prompt_drawn = false;
        }
    }

    /// Draw the input line if it is not on screen. The cursor must be
    /// right after the prompt.
    ///
    /// Afterwards `line0` is adjusted for any scrolling the output caused
    /// and so that the row holding the cursor is on screen.
    pub fn draw_input_line(&mut self) {
        if self.line_drawn || !self.config.echo {
            return;
        }
        let style = self.config.input_style;
        if !style.is_none() {
            self.out.write_raw(&style.begin_sequence());
        }

        let len = self.line.len();
        if len > 0 {
            let old_line0 = self.line0;
            self.emit_span(0, len);

            let rows = ((len + self.col0) / self.cols_1()) as isize;
            self.line0 = (self.lines as isize - rows - 1).min(old_line0);
            let row = self.row_of(self.line.cursor() as isize);
            if row < 0 {
                self.line0 -= row;
            } else if row > self.lines as isize - 1 {
                self.line0 -= row - (self.lines as isize - 1);
            }
            self.move_between(len as isize, self.line.cursor() as isize);
        }
        self.line_drawn = true;
    }

    /// Put the cursor back after showing a matching bracket.
    pub(super) fn restore_flash(&mut self) {
        if let Some(at) = self.flash.take() {
            if self.line_drawn {
                self.move_between(at as isize, self.line.cursor() as isize);
            }
        }
    }

    /// Briefly show the bracket matching the `closer` just typed.
    pub(super) fn flash_paren(&mut self, closer: u8) {
        if !self.line_drawn || !self.has_motion() {
            return;
        }
        let Some(wanted) = opener_for(closer) else {
            return;
        };
        let text = self.line.as_bytes();
        let mut level = 0usize;
        let mut found = None;
        for i in (0..self.line.cursor()).rev() {
            let b = text[i];
            if CLOSERS.contains(&b) {
                level += 1;
            } else if OPENERS.contains(&b) {
                level = level.saturating_sub(1);
                if level == 0 {
                    if b == wanted {
                        found = Some(i);
                    }
                    break;
                }
            }
        }
        if let Some(i) = found {
            self.move_between(self.line.cursor() as isize, i as isize);
            self.flash = Some(i);
        }
    }

    /// Move the cursor to `pos`, which must be within `0..=len`.
    pub fn move_to(&mut self, pos: usize) {
        self.restore_flash();
        let from = self.line.cursor();
        self.line.set_cursor(pos);
        if self.line_drawn {
            self.move_between(from as isize, self.line.cursor() as isize);
        }
    }

    /// Insert at the cursor and repaint the tail. `Ok(false)` when the line
    /// would overflow.
    pub fn insert_bytes(&mut self, bytes: &[u8]) -> Result<bool> {
        if bytes.is_empty() || !self.line.fits(bytes.len()) {
            return Ok(false);
        }
        let at = self.line.cursor();
        let old_len = self.line.len();
        self.line
            .insert(bytes)
            .inspect_err(|e| self.note_error(e))?;

        if self.line_drawn {
            let len = self.line.len();
            if self.has_motion() {
                self.emit_span(at, len);
                self.follow_scroll(len);
                self.move_between(len as isize, self.line.cursor() as isize);
            } else if at == old_len {
                self.emit_span(at, len);
            } else {
                self.linear_redraw();
            }
        }
        Ok(true)
    }

    /// Overwrite from the cursor, extending the line past its end if
    /// needed, and advance.
    pub fn overtype_bytes(&mut self, bytes: &[u8]) -> Result<bool> {
        let at = self.line.cursor();
        let old_len = self.line.len();
        let applied = self
            .line
            .overtype(bytes)
            .inspect_err(|e| self.note_error(e))?;
        if !applied {
            return Ok(false);
        }

        if self.line_drawn {
            let end = self.line.cursor();
            if self.has_motion() {
                self.emit_span(at, end);
                self.follow_scroll(end);
            } else if at == old_len {
                self.emit_span(at, end);
            } else {
                self.linear_redraw();
            }
        }
        Ok(true)
    }

    /// Delete up to `n` bytes right of the cursor; the cursor stays.
    pub fn delete_bytes(&mut self, n: usize) -> usize {
        let old_len = self.line.len();
        let n = self.line.delete(n);
        if n == 0 || !self.line_drawn {
            return n;
        }
        if self.has_motion() {
            let (at, len) = (self.line.cursor(), self.line.len());
            self.emit_span(at, len);
            self.clear_after(len, old_len);
            self.move_between(len as isize, at as isize);
        } else {
            self.linear_redraw();
        }
        n
    }

    /// Drop everything right of the cursor.
    pub(super) fn truncate_at_cursor(&mut self) {
        let old_len = self.line.len();
        self.line.truncate_at_cursor();
        if old_len == self.line.len() || !self.line_drawn {
            return;
        }
        if self.has_motion() {
            self.clear_after(self.line.cursor(), old_len);
        } else {
            self.linear_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ansi::AnsiWriter;
    use crate::edit::{Editor, EditorConfig};
    use crate::terminal::TerminalOutput;

    fn editor(cols: usize, lines: usize) -> Editor<AnsiWriter<Vec<u8>>> {
        Editor::new(AnsiWriter::new(Vec::new(), cols, lines), EditorConfig::default())
    }

    fn take_output(ed: &mut Editor<AnsiWriter<Vec<u8>>>) -> String {
        let out = String::from_utf8_lossy(ed.output().pending()).into_owned();
        ed.output_mut().flush().unwrap();
        out
    }

    #[test]
    fn test_prompt_with_open_escape_is_truncated() {
        let mut ed = editor(80, 24);
        ed.set_prompt(b"hp> \x1b[1;3");
        ed.refresh();
        assert_eq!(take_output(&mut ed), "hp> ");
        assert_eq!(ed.origin(), (23, 4));
    }

    #[test]
    fn test_wide_prompt_moves_input_to_next_row() {
        let mut ed = editor(10, 5);
        ed.set_prompt(b"0123456789");
        ed.refresh();
        assert_eq!(ed.origin(), (4, 0));
    }

    #[test]
    fn test_append_emits_only_new_bytes() {
        let mut ed = editor(80, 24);
        ed.refresh();
        take_output(&mut ed);
        ed.insert_bytes(b"abc").unwrap();
        assert_eq!(take_output(&mut ed), "abc");
    }

    #[test]
    fn test_clear_when_not_drawn_is_silent() {
        let mut ed = editor(80, 24);
        ed.insert_bytes(b"abc").unwrap();
        ed.clear_input_line(true);
        assert_eq!(take_output(&mut ed), "");
    }

    #[test]
    fn test_row_breaks_at_width_minus_one() {
        let mut ed = editor(5, 10);
        ed.refresh();
        ed.insert_bytes(b"abcdefghij").unwrap();
        assert_eq!(take_output(&mut ed), "abcd\r\nefgh\r\nij");
        assert_eq!(ed.row_of(10), ed.origin().0 + 2);
    }

    #[test]
    fn test_echo_off_draws_nothing() {
        let mut ed = Editor::new(
            AnsiWriter::new(Vec::new(), 80, 24),
            EditorConfig::default().with_echo(false),
        );
        ed.refresh();
        ed.insert_bytes(b"secret").unwrap();
        ed.refresh();
        assert_eq!(take_output(&mut ed), "");
        assert_eq!(ed.text(), b"secret");
    }
}
