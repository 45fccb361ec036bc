//! The input line buffer and cursor, independent of any screen.

use crate::error::Result;
use crate::text::Delimiters;

/// Editable byte buffer with a cursor.
///
/// The usable length is `max_line - 2`. Growing mutators return `Ok(false)`
/// and leave the buffer untouched when that limit would be exceeded, and
/// `Err(Error::OutOfMemory)` when the allocation itself fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditLine {
    buf: Vec<u8>,
    cursor: usize,
    max_line: usize,
}

impl EditLine {
    /// Create an empty line with room for `max_line` bytes including the
    /// two reserved guard bytes.
    #[must_use]
    pub fn new(max_line: usize) -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
            max_line: max_line.max(3),
        }
    }

    /// Longest text the line accepts.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_line - 2
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Byte at `i`, or `None` at and past the end.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<u8> {
        self.buf.get(i).copied()
    }

    /// Whether `n` more bytes fit.
    #[must_use]
    pub fn fits(&self, n: usize) -> bool {
        self.buf.len().saturating_add(n) <= self.max_len()
    }

    /// Move the cursor. Callers keep `pos` within `0..=len`.
    pub fn set_cursor(&mut self, pos: usize) {
        debug_assert!(pos <= self.buf.len(), "cursor past end of line");
        self.cursor = pos.min(self.buf.len());
    }

    /// Insert at the cursor and advance past the inserted bytes.
    pub fn insert(&mut self, bytes: &[u8]) -> Result<bool> {
        if !self.fits(bytes.len()) {
            return Ok(false);
        }
        self.buf.try_reserve(bytes.len())?;
        let at = self.cursor;
        self.buf.splice(at..at, bytes.iter().copied());
        self.cursor += bytes.len();
        Ok(true)
    }

    /// Replace the bytes under the cursor, extending the line when the
    /// cursor runs past the end, and advance.
    pub fn overtype(&mut self, bytes: &[u8]) -> Result<bool> {
        let end = self.cursor + bytes.len();
        let grow = end.saturating_sub(self.buf.len());
        if !self.fits(grow) {
            return Ok(false);
        }
        self.buf.try_reserve(grow)?;
        if grow > 0 {
            self.buf.resize(end, 0);
        }
        self.buf[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        Ok(true)
    }

    /// Delete up to `n` bytes right of the cursor. Returns how many went.
    pub fn delete(&mut self, n: usize) -> usize {
        let n = n.min(self.buf.len() - self.cursor);
        self.buf.drain(self.cursor..self.cursor + n);
        n
    }

    /// Drop everything right of the cursor.
    pub fn truncate_at_cursor(&mut self) {
        self.buf.truncate(self.cursor);
    }

    /// Replace the whole text and put the cursor at its end.
    pub fn set_text(&mut self, text: &[u8]) -> Result<bool> {
        if text.len() > self.max_len() {
            return Ok(false);
        }
        if text.len() > self.buf.len() {
            self.buf.try_reserve(text.len() - self.buf.len())?;
        }
        self.buf.clear();
        self.buf.extend_from_slice(text);
        self.cursor = self.buf.len();
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.cursor = 0;
    }

    /// Take the text out, leaving the line empty.
    pub fn take(&mut self) -> Vec<u8> {
        self.cursor = 0;
        std::mem::take(&mut self.buf)
    }

    /// Swap two bytes in place.
    pub fn swap(&mut self, i: usize, j: usize) {
        self.buf.swap(i, j);
    }

    fn is_alnum_at(&self, i: usize) -> bool {
        self.get(i).is_some_and(|b| b.is_ascii_alphanumeric())
    }

    /// Past-the-end counts as a delimiter.
    fn is_delim_at(&self, i: usize, delims: &Delimiters) -> bool {
        self.get(i).is_none_or(|b| delims.contains(b))
    }

    /// End of the next alphanumeric word at or right of `from`.
    #[must_use]
    pub fn next_word_end(&self, from: usize) -> usize {
        let mut i = from;
        while i < self.len() && !self.is_alnum_at(i) {
            i += 1;
        }
        while self.is_alnum_at(i) {
            i += 1;
        }
        i
    }

    /// Start of the alphanumeric word left of `from`.
    #[must_use]
    pub fn prev_word_start(&self, from: usize) -> usize {
        let mut i = from;
        while i > 0 && !self.is_alnum_at(i - 1) {
            i -= 1;
        }
        while i > 0 && self.is_alnum_at(i - 1) {
            i -= 1;
        }
        i
    }

    /// Start of the delimiter-bounded token ending at `from`.
    #[must_use]
    pub fn token_start(&self, from: usize, delims: &Delimiters) -> usize {
        let mut i = from;
        while i > 0 && !self.is_delim_at(i - 1, delims) {
            i -= 1;
        }
        i
    }

    /// Range of the word under or just left of `from`, bounded by delimiters.
    #[must_use]
    pub fn current_word(&self, from: usize, delims: &Delimiters) -> (usize, usize) {
        let mut start = from;
        while start > 0 && self.is_delim_at(start, delims) {
            start -= 1;
        }
        while start > 0 && !self.is_delim_at(start - 1, delims) {
            start -= 1;
        }
        let mut end = start;
        while !self.is_delim_at(end, delims) {
            end += 1;
        }
        (start, end)
    }

    /// Where the two words left of the cursor begin, and the text that
    /// swaps them.
    ///
    /// The result covers the span from the start of the earlier word to the
    /// end of the current one, with the two words exchanged and the gap
    /// between them kept. `None` when fewer than two words are available.
    #[must_use]
    pub fn transposed_words(&self, delims: &Delimiters) -> Option<(usize, Vec<u8>)> {
        let pos = self.cursor;
        if pos <= 2 {
            return None;
        }

        let mut this_so = pos;
        while this_so > 0 && self.is_delim_at(this_so, delims) {
            this_so -= 1;
        }
        let mut this_eo = pos;
        while this_eo < self.len() && !self.is_delim_at(this_eo, delims) {
            this_eo += 1;
        }
        while this_so > 0 && !self.is_delim_at(this_so - 1, delims) {
            this_so -= 1;
        }
        if this_so < 2 {
            return None;
        }

        // Last byte of the previous word.
        let mut other = this_so - 1;
        while self.is_delim_at(other, delims) {
            if other == 0 {
                return None;
            }
            other -= 1;
        }
        let other_eo = other + 1;
        let mut other_so = other;
        while other_so > 0 && !self.is_delim_at(other_so - 1, delims) {
            other_so -= 1;
        }

        let mut swapped = Vec::with_capacity(this_eo - other_so);
        swapped.extend_from_slice(&self.buf[this_so..this_eo]);
        swapped.extend_from_slice(&self.buf[other_eo..this_so]);
        swapped.extend_from_slice(&self.buf[other_so..other_eo]);
        Some((other_so, swapped))
    }
}
