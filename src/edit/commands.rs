//! Edit commands and their dispatch.

use std::fmt;
use std::str::FromStr;

use super::history::{Recall, SearchHit};
use super::redraw::is_closer;
use super::{Editor, Outcome, WordCompletion};
use crate::ansi::NEWLINE;
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_event, emit_log};
use crate::terminal::TerminalOutput;
use crate::text::unescape;

/// A named editing operation that can be bound to a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    EnterLine,
    CompleteWord,
    CompleteLine,
    DelCharLeft,
    DelCharRight,
    PrevChar,
    PrevLine,
    NextChar,
    NextLine,
    ToHistory,
    ClearLine,
    RedrawLine,
    RedrawLineNoPrompt,
    BeginOfLine,
    EndOfLine,
    KillToEol,
    Transpose,
    TransposeWords,
    Suspend,
    DelWordLeft,
    DelWordRight,
    PrevWord,
    UpcaseWord,
    DowncaseWord,
    NextWord,
    InsertString,
}

impl Command {
    /// Every command with its external name.
    pub const ALL: [(Self, &'static str); 26] = [
        (Self::EnterLine, "&enter-line"),
        (Self::CompleteWord, "&complete-word"),
        (Self::CompleteLine, "&complete-line"),
        (Self::DelCharLeft, "&del-char-left"),
        (Self::DelCharRight, "&del-char-right"),
        (Self::PrevChar, "&prev-char"),
        (Self::PrevLine, "&prev-line"),
        (Self::NextChar, "&next-char"),
        (Self::NextLine, "&next-line"),
        (Self::ToHistory, "&to-history"),
        (Self::ClearLine, "&clear-line"),
        (Self::RedrawLine, "&redraw-line"),
        (Self::RedrawLineNoPrompt, "&redraw-line-noprompt"),
        (Self::BeginOfLine, "&begin-of-line"),
        (Self::EndOfLine, "&end-of-line"),
        (Self::KillToEol, "&kill-to-eol"),
        (Self::Transpose, "&transpose"),
        (Self::TransposeWords, "&transpose-words"),
        (Self::Suspend, "&suspend"),
        (Self::DelWordLeft, "&del-word-left"),
        (Self::DelWordRight, "&del-word-right"),
        (Self::PrevWord, "&prev-word"),
        (Self::UpcaseWord, "&upcase-word"),
        (Self::DowncaseWord, "&downcase-word"),
        (Self::NextWord, "&next-word"),
        (Self::InsertString, "&insert-string"),
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(c, _)| *c == self)
            .map_or("", |(_, name)| name)
    }

    /// Split `"&name [argument]"` into the command and its argument.
    ///
    /// ```
    /// use termline::edit::Command;
    ///
    /// assert_eq!(
    ///     Command::lookup("&insert-string (\\)"),
    ///     Some((Command::InsertString, Some("(\\)")))
    /// );
    /// assert_eq!(Command::lookup("&prev-line"), Some((Command::PrevLine, None)));
    /// assert_eq!(Command::lookup("&nope"), None);
    /// ```
    #[must_use]
    pub fn lookup(text: &str) -> Option<(Self, Option<&str>)> {
        let (name, rest) = match text.find(' ') {
            Some(at) => (&text[..at], Some(&text[at + 1..])),
            None => (text, None),
        };
        let (command, _) = Self::ALL.iter().find(|(_, n)| *n == name)?;
        Some((*command, rest.filter(|r| !r.is_empty())))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match Self::lookup(s) {
            Some((command, None)) => Ok(command),
            _ => Err(Error::UnknownCommand(s.to_string())),
        }
    }
}

impl<T: TerminalOutput> Editor<T> {
    /// Run one command. `arg` is only used by [`Command::InsertString`].
    ///
    /// Out-of-memory failures are also kept as [`last_error`](Self::last_error).
    pub fn dispatch(&mut self, command: Command, arg: Option<&[u8]>) -> Result<Outcome> {
        self.restore_flash();
        let result = self.run(command, arg);
        self.last_command = Some(command);
        if let Err(err) = &result {
            self.note_error(err);
        }
        result
    }

    fn run(&mut self, command: Command, arg: Option<&[u8]>) -> Result<Outcome> {
        match command {
            Command::EnterLine => return self.enter_line(),
            Command::Suspend => return Ok(Outcome::Suspend),
            Command::CompleteWord => self.complete_word()?,
            Command::CompleteLine => self.complete_line()?,
            Command::DelCharLeft => self.del_char_left(),
            Command::DelCharRight => {
                self.delete_bytes(1);
            }
            Command::PrevChar => {
                if self.cursor() > 0 {
                    self.move_to(self.cursor() - 1);
                }
            }
            Command::NextChar => {
                if self.cursor() < self.line.len() {
                    self.move_to(self.cursor() + 1);
                }
            }
            Command::PrevLine => self.recall(Recall::Older)?,
            Command::NextLine => self.recall(Recall::Newer)?,
            Command::ToHistory => self.to_history()?,
            Command::ClearLine => self.clear_line(),
            Command::RedrawLine => self.clear_input_line(true),
            Command::RedrawLineNoPrompt => self.redraw_line_noprompt(),
            Command::BeginOfLine => self.move_to(0),
            Command::EndOfLine => self.move_to(self.line.len()),
            Command::KillToEol => self.truncate_at_cursor(),
            Command::Transpose => self.transpose_chars(),
            Command::TransposeWords => self.transpose_words()?,
            Command::DelWordLeft => {
                let start = self.line.prev_word_start(self.cursor());
                let n = self.cursor() - start;
                self.move_to(start);
                self.delete_bytes(n);
            }
            Command::DelWordRight => {
                let end = self.line.next_word_end(self.cursor());
                self.delete_bytes(end - self.cursor());
            }
            Command::PrevWord => self.move_to(self.line.prev_word_start(self.cursor())),
            Command::NextWord => self.move_to(self.line.next_word_end(self.cursor())),
            Command::UpcaseWord => self.change_case(command, true)?,
            Command::DowncaseWord => self.change_case(command, false)?,
            Command::InsertString => self.insert_string(arg.unwrap_or_default())?,
        }
        Ok(Outcome::Continue)
    }

    /// Insert one typed byte. Only printable ASCII and bytes with the high
    /// bit set are accepted. A closing bracket briefly shows its partner.
    pub fn insert_char(&mut self, b: u8) -> Result<bool> {
        self.last_command = None;
        self.insert_typed(b)
    }

    fn insert_typed(&mut self, b: u8) -> Result<bool> {
        if b & 0x80 == 0 && !(b' '..=b'~').contains(&b) {
            return Ok(false);
        }
        self.restore_flash();
        let inserted = self.insert_bytes(&[b])?;
        if inserted && is_closer(b) {
            self.flash_paren(b);
        }
        Ok(inserted)
    }

    /// Insert escaped text as if typed.
    fn insert_string(&mut self, arg: &[u8]) -> Result<()> {
        let text = unescape(arg);
        match text.len() {
            0 => {}
            1 => {
                self.insert_typed(text[0])?;
            }
            _ => {
                self.insert_bytes(&text)?;
            }
        }
        Ok(())
    }

    fn del_char_left(&mut self) {
        if self.cursor() > 0 {
            self.move_to(self.cursor() - 1);
            self.delete_bytes(1);
        }
    }

    /// Submit the line.
    ///
    /// The line is handed back in [`Outcome::Submitted`], stored in history
    /// unless it is empty or repeats the newest entry, and the next buffer
    /// starts from the one-shot inserted text or the prefix.
    fn enter_line(&mut self) -> Result<Outcome> {
        if self.line_drawn {
            self.move_to(self.line.len());
        } else {
            if !self.prompt_drawn {
                self.col0 = 0;
            }
            self.draw_input_line();
        }
        self.out.write_raw(self.config.input_style.end_sequence());
        self.out.write_raw(NEWLINE.as_bytes());

        let bottom = self.lines as isize - 1;
        let row = self.row_of(self.line.len() as isize);
        self.line0 = if row < bottom { row + 1 } else { bottom };
        self.col0 = 0;
        self.flash = None;
        self.line_drawn = false;
        self.prompt_drawn = false;
        self.last_error = None;

        let text = self.line.take();
        emit_event("line-submitted", &text.len().to_string());

        if !text.is_empty() && self.history.newest() != Some(text.as_slice()) {
            if let Err(err) = self.put_history(&text) {
                self.note_error(&err);
            }
        }
        self.history.reset_pick();

        let next = if self.inserted_next.is_empty() {
            self.prefix.clone()
        } else {
            std::mem::take(&mut self.inserted_next)
        };
        // The submitted line is gone from the buffer; it has to reach the
        // caller even if the next one cannot be installed.
        if !next.is_empty() {
            if let Err(err) = self.line.set_text(&next) {
                self.note_error(&err);
            }
        }
        Ok(Outcome::Submitted(text))
    }

    /// Cycle through completion candidates for the token left of the
    /// cursor.
    ///
    /// The first call takes the token as root; repeats replace the previous
    /// candidate with the next one. Candidates match the root as a
    /// case-insensitive prefix and must be longer than it. When no candidate
    /// matches at all the root is left as typed.
    fn complete_word(&mut self) -> Result<()> {
        let repeat =
            self.last_command == Some(Command::CompleteWord) && self.completion.suffix_len > 0;
        let pending;
        if repeat {
            pending = self.completion.suffix_len;
            self.move_to(self.cursor() - pending);
        } else {
            let start = self.line.token_start(self.cursor(), &self.delims);
            pending = 0;
            self.completion = WordCompletion {
                cursor: self.words.start(),
                suffix_len: 0,
                root_len: self.cursor() - start,
            };
        }
        let root_len = self.completion.root_len;
        let start = self.cursor() - root_len;
        let root = self.line.as_bytes()[start..self.cursor()].to_vec();
        self.completion.suffix_len = 0;

        let mut cursor = self.completion.cursor;
        let mut found = None;
        for _ in 0..=self.words.cycle_len() {
            cursor = self.words.next(cursor);
            let Some(word) = self.words.get(cursor) else {
                continue;
            };
            if word.len() > root_len
                && word[..root_len].eq_ignore_ascii_case(&root)
                && self.line.fits((word.len() - root_len).saturating_sub(pending))
            {
                found = Some(word[root_len..].to_vec());
                break;
            }
        }

        let Some(suffix) = found else {
            self.completion.cursor = self.words.start();
            self.delete_bytes(pending);
            return Ok(());
        };

        self.completion.cursor = cursor;
        self.completion.suffix_len = suffix.len();
        let shared = pending.min(suffix.len());
        self.overtype_bytes(&suffix[..shared])?;
        if suffix.len() > shared {
            self.insert_bytes(&suffix[shared..])?;
        }
        if pending > shared {
            self.delete_bytes(pending - shared);
        }

        let removed = self.words.remove_duplicates(cursor);
        if removed > 0 {
            emit_log(
                LogLevel::Debug,
                &format!("dropped {removed} duplicate completion words"),
            );
        }
        Ok(())
    }

    /// Replace the line with the nearest older history entry that starts
    /// with the text typed before the first of a run of calls.
    fn complete_line(&mut self) -> Result<()> {
        if self.last_command != Some(Command::CompleteLine) {
            self.line_search = self.history.start_search(self.line.len());
        }
        let root_len = self.line_search.root_len().min(self.line.len());
        let root = self.line.as_bytes()[..root_len].to_vec();

        match self.history.search_back(&mut self.line_search, &root) {
            Some(SearchHit::Entry(slot)) => {
                let text = self.history.get(slot).map(<[u8]>::to_vec).unwrap_or_default();
                self.clear_input_line(false);
                self.line.set_text(&text)?;
            }
            Some(SearchHit::Root) => {
                self.clear_input_line(false);
                self.line.set_cursor(root_len);
                self.line.truncate_at_cursor();
            }
            None => {}
        }
        Ok(())
    }

    fn recall(&mut self, direction: Recall) -> Result<()> {
        if let Some(text) = self.history.recall(direction, self.line.as_bytes())? {
            self.clear_input_line(false);
            self.line.set_text(&text)?;
        }
        Ok(())
    }

    fn to_history(&mut self) -> Result<()> {
        if self.line.is_empty() {
            return Ok(());
        }
        self.clear_input_line(false);
        let text = self.line.take();
        self.put_history(&text)?;
        self.history.reset_pick();
        Ok(())
    }

    fn clear_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        self.clear_input_line(false);
        self.history.reset_pick();
        self.line.clear();
    }

    /// Redraw the line one row down, leaving the prompt where it is.
    fn redraw_line_noprompt(&mut self) {
        self.clear_input_line(false);
        if self.has_motion() {
            // A bare line feed keeps the column, so the input stays aligned
            // under its old position.
            self.out.write_raw(b"\n");
            if self.line0 < self.lines as isize - 1 {
                self.line0 += 1;
            }
        } else {
            self.out.write_raw(NEWLINE.as_bytes());
            self.prompt_drawn = false;
        }
    }

    fn transpose_chars(&mut self) {
        let pos = self.cursor();
        let len = self.line.len();
        if !(pos > 1 || (pos > 0 && pos < len)) {
            return;
        }
        let (i, j) = if pos < len { (pos - 1, pos) } else { (pos - 2, pos - 1) };
        self.line.swap(i, j);
        self.line.set_cursor(j + 1);
        if self.line_drawn {
            if self.has_motion() {
                self.move_between(pos as isize, i as isize);
                self.emit_span(i, j + 1);
            } else {
                self.linear_redraw();
            }
        }
    }

    fn transpose_words(&mut self) -> Result<()> {
        if let Some((start, swapped)) = self.line.transposed_words(&self.delims) {
            self.move_to(start);
            self.overtype_bytes(&swapped)?;
            self.move_to(start);
        }
        Ok(())
    }

    /// Change the case of the current word, or on a repeat of everything
    /// from the cursor to the end of the line. The cursor does not move.
    fn change_case(&mut self, command: Command, upper: bool) -> Result<()> {
        let original = self.cursor();
        let (start, end) = if self.last_command == Some(command) {
            (original, self.line.len())
        } else {
            self.line.current_word(original, &self.delims)
        };
        if start >= end {
            return Ok(());
        }
        let mut bytes = self.line.as_bytes()[start..end].to_vec();
        if upper {
            bytes.make_ascii_uppercase();
        } else {
            bytes.make_ascii_lowercase();
        }
        self.move_to(start);
        self.overtype_bytes(&bytes)?;
        self.move_to(original);
        Ok(())
    }
}
