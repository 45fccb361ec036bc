//! Terminal line editor.
//!
//! [`Editor`] bundles everything one interactive input line needs: the
//! buffer and cursor, the screen origin of the prompt and line, history,
//! completion words, and the last command run (for repeatable commands).
//! All drawing goes through a [`TerminalOutput`].
//!
//! # Examples
//!
//! ```
//! use termline::ansi::AnsiWriter;
//! use termline::edit::{Command, Editor, EditorConfig, Outcome};
//!
//! let out = AnsiWriter::new(Vec::new(), 80, 24);
//! let mut editor = Editor::new(out, EditorConfig::default());
//! editor.set_prompt(b"> ");
//! editor.insert_char(b'h').unwrap();
//! editor.insert_char(b'i').unwrap();
//! let outcome = editor.dispatch(Command::EnterLine, None).unwrap();
//! assert_eq!(outcome, Outcome::Submitted(b"hi".to_vec()));
//! assert_eq!(editor.history().newest(), Some(&b"hi"[..]));
//! ```

mod commands;
mod history;
mod line;
mod redraw;
mod words;

pub use commands::Command;
pub use history::{HistoryRing, LineSearch, Recall, SearchHit};
pub use line::EditLine;
pub use words::{WordCursor, WordRing};

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_event, emit_log};
use crate::style::MarkStyle;
use crate::terminal::TerminalOutput;
use crate::text::Delimiters;

/// Line capacity including two reserved bytes.
pub const DEFAULT_MAX_LINE: usize = 4096;
/// Number of history slots.
pub const DEFAULT_HISTORY_SIZE: usize = 128;
/// Number of dynamic completion words.
pub const DEFAULT_WORD_RING_SIZE: usize = 512;
/// Shortest history token fed to completion.
pub const DEFAULT_MIN_WORD_LEN: usize = 3;

/// Editor configuration.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    /// Line capacity; the usable length is two less.
    pub max_line: usize,
    /// Number of history slots.
    pub history_size: usize,
    /// Number of dynamic completion words.
    pub word_ring_size: usize,
    /// Shortest token that history feeds into completion.
    pub min_word_len: usize,
    /// Leading byte of interpreter commands; such tokens are not completion
    /// words and static words are stored with it as prefix.
    pub command_char: u8,
    /// Style wrapped around the input line.
    pub input_style: MarkStyle,
    /// Show typed text. Off for password entry.
    pub echo: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_line: DEFAULT_MAX_LINE,
            history_size: DEFAULT_HISTORY_SIZE,
            word_ring_size: DEFAULT_WORD_RING_SIZE,
            min_word_len: DEFAULT_MIN_WORD_LEN,
            command_char: b'#',
            input_style: MarkStyle::NONE,
            echo: true,
        }
    }
}

impl EditorConfig {
    #[must_use]
    pub fn with_max_line(mut self, max_line: usize) -> Self {
        self.max_line = max_line;
        self
    }

    #[must_use]
    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    #[must_use]
    pub fn with_word_ring_size(mut self, size: usize) -> Self {
        self.word_ring_size = size;
        self
    }

    #[must_use]
    pub fn with_min_word_len(mut self, len: usize) -> Self {
        self.min_word_len = len;
        self
    }

    #[must_use]
    pub fn with_command_char(mut self, ch: u8) -> Self {
        self.command_char = ch;
        self
    }

    #[must_use]
    pub fn with_input_style(mut self, style: MarkStyle) -> Self {
        self.input_style = style;
        self
    }

    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }
}

/// What a dispatched command asks of the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing beyond the edit itself.
    Continue,
    /// A line was entered.
    Submitted(Vec<u8>),
    /// The user asked to suspend the process.
    Suspend,
}

/// Progress of a repeated word completion.
#[derive(Clone, Copy, Debug)]
struct WordCompletion {
    cursor: WordCursor,
    /// Bytes of the current candidate after the root.
    suffix_len: usize,
    root_len: usize,
}

/// One interactive input line on a terminal.
pub struct Editor<T: TerminalOutput> {
    out: T,
    config: EditorConfig,
    line: EditLine,
    /// Prompt as displayed, marks already applied.
    prompt: Vec<u8>,

    cols: usize,
    lines: usize,
    /// Screen row of the prompt; negative once scrolled off the top.
    line0: isize,
    /// Screen column where the input starts.
    col0: usize,
    line_drawn: bool,
    prompt_drawn: bool,
    /// Where the cursor sits while showing a matching bracket.
    flash: Option<usize>,

    history: HistoryRing,
    line_search: LineSearch,
    words: WordRing,
    completion: WordCompletion,
    delims: Delimiters,
    last_command: Option<Command>,

    /// Loaded into the buffer after the next submit, then forgotten.
    inserted_next: Vec<u8>,
    /// Loaded into the buffer after every submit.
    prefix: Vec<u8>,
    last_error: Option<Error>,
}

impl<T: TerminalOutput> Editor<T> {
    /// Create an editor drawing to `out`, starting on its bottom row.
    pub fn new(out: T, config: EditorConfig) -> Self {
        let (cols, lines) = out.size();
        let words = WordRing::new(config.word_ring_size);
        let history = HistoryRing::new(config.history_size);
        Self {
            line: EditLine::new(config.max_line),
            prompt: Vec::new(),
            cols: cols.max(2),
            lines: lines.max(1),
            line0: lines.max(1) as isize - 1,
            col0: 0,
            line_drawn: false,
            prompt_drawn: false,
            flash: None,
            line_search: history.start_search(0),
            completion: WordCompletion {
                cursor: words.start(),
                suffix_len: 0,
                root_len: 0,
            },
            history,
            words,
            delims: Delimiters::default(),
            last_command: None,
            inserted_next: Vec::new(),
            prefix: Vec::new(),
            last_error: None,
            out,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Current input text.
    #[must_use]
    pub fn text(&self) -> &[u8] {
        self.line.as_bytes()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.line.cursor()
    }

    #[must_use]
    pub fn line(&self) -> &EditLine {
        &self.line
    }

    #[must_use]
    pub fn prompt(&self) -> &[u8] {
        &self.prompt
    }

    #[must_use]
    pub fn history(&self) -> &HistoryRing {
        &self.history
    }

    /// History without the word feeding done by
    /// [`put_history`](Self::put_history).
    pub fn history_mut(&mut self) -> &mut HistoryRing {
        &mut self.history
    }

    #[must_use]
    pub fn words(&self) -> &WordRing {
        &self.words
    }

    #[must_use]
    pub fn delimiters(&self) -> &Delimiters {
        &self.delims
    }

    pub fn delimiters_mut(&mut self) -> &mut Delimiters {
        &mut self.delims
    }

    #[must_use]
    pub fn output(&self) -> &T {
        &self.out
    }

    pub fn output_mut(&mut self) -> &mut T {
        &mut self.out
    }

    /// Screen `(row, column)` where the prompt starts and the input begins.
    #[must_use]
    pub fn origin(&self) -> (isize, usize) {
        (self.line0, self.col0)
    }

    /// Whether the input line is currently on screen.
    #[must_use]
    pub fn is_line_drawn(&self) -> bool {
        self.line_drawn
    }

    #[must_use]
    pub fn last_command(&self) -> Option<Command> {
        self.last_command
    }

    /// The sticky error from the last failed operation. Cleared when the
    /// next line is submitted.
    #[must_use]
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Show or hide typed text.
    pub fn set_echo(&mut self, echo: bool) {
        if echo == self.config.echo {
            return;
        }
        self.clear_input_line(false);
        self.config.echo = echo;
    }

    /// Text placed in the buffer after the next submit only.
    pub fn set_inserted_next(&mut self, text: &[u8]) {
        self.inserted_next = text.to_vec();
    }

    /// Text placed in the buffer after every submit.
    pub fn set_prefix(&mut self, text: &[u8]) {
        self.prefix = text.to_vec();
    }

    #[must_use]
    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    /// Replace the prompt. `display` is shown verbatim.
    pub fn set_prompt(&mut self, display: &[u8]) {
        if display == self.prompt.as_slice() {
            return;
        }
        self.clear_input_line(true);
        self.prompt = display.to_vec();
    }

    /// Replace the whole input text, cursor at the end. Ends any run of
    /// repeated completion or case commands.
    pub fn set_text(&mut self, text: &[u8]) -> Result<bool> {
        self.clear_input_line(false);
        let ok = self.line.set_text(text).inspect_err(|e| self.note_error(e))?;
        self.history.reset_pick();
        self.last_command = None;
        Ok(ok)
    }

    /// Register an interpreter command name as a static completion word.
    pub fn add_command_name(&mut self, name: &str) -> Result<()> {
        let mut word = Vec::with_capacity(name.len() + 1);
        word.push(self.config.command_char);
        word.extend_from_slice(name.as_bytes());
        self.words.add_static(&word)
    }

    /// Add a word to the completion ring directly.
    pub fn put_word(&mut self, word: &[u8]) -> Result<()> {
        if let Some(evicted) = self.words.put(word)? {
            emit_log(
                LogLevel::Debug,
                &format!("word ring evicted '{}'", String::from_utf8_lossy(&evicted)),
            );
        }
        Ok(())
    }

    /// Store a line in history and feed its words to completion.
    pub fn put_history(&mut self, text: &[u8]) -> Result<()> {
        if self.history.put(text)?.is_some() {
            emit_log(LogLevel::Debug, "history slot reused");
        }
        let min_len = self.config.min_word_len;
        let command_char = self.config.command_char;
        let delims = self.delims.clone();
        for word in delims.words(text) {
            if word.len() >= min_len && word[0] != command_char {
                self.put_word(word)?;
            }
        }
        Ok(())
    }

    /// Print a line of other output above the input, then let the next
    /// [`refresh`](Self::refresh) bring the prompt and input back.
    pub fn print_above(&mut self, text: &[u8]) {
        self.clear_input_line(true);
        self.out.write_raw(text);
        self.out.write_raw(crate::ansi::NEWLINE.as_bytes());
        let width = crate::text::visual_width(text, self.cols);
        let rows = if width == 0 { 1 } else { (width - 1) / self.cols + 1 };
        self.line0 = (self.line0 + rows as isize).min(self.lines as isize - 1);
        self.col0 = 0;
    }

    /// Adopt a new terminal size.
    ///
    /// Must only be called between events. The terminal has already
    /// reflowed whatever was on screen, so the prompt and line are erased
    /// from the top of their old area and redrawn by the next refresh.
    pub fn resize(&mut self, cols: usize, lines: usize) {
        let cols = cols.max(2);
        let lines = lines.max(1);
        if (cols, lines) == (self.cols, self.lines) {
            return;
        }
        self.line0 = self.line0.clamp(0, lines as isize - 1);
        if self.out.supports_cursor_motion() && (self.line_drawn || self.prompt_drawn) {
            self.out.goto(0, self.line0 as usize);
            self.out.write_raw(self.config.input_style.end_sequence());
            self.out.clear_to_eos();
        }
        self.cols = cols;
        self.lines = lines;
        self.col0 = 0;
        self.flash = None;
        self.prompt_drawn = false;
        self.line_drawn = false;
        emit_log(LogLevel::Debug, &format!("resized to {cols}x{lines}"));
        emit_event("resize", &format!("{cols}x{lines}"));
    }

    /// Terminal size the editor is laid out for.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.lines)
    }

    /// Redraw whatever is not on screen.
    pub fn refresh(&mut self) {
        self.draw_prompt();
        self.draw_input_line();
    }

    /// Refresh and push output to the terminal.
    pub fn flush(&mut self) -> Result<()> {
        self.refresh();
        self.out.flush()?;
        Ok(())
    }

    fn note_error(&mut self, err: &Error) {
        if matches!(err, Error::OutOfMemory) {
            emit_log(LogLevel::Error, "out of memory while editing");
            self.last_error = Some(Error::OutOfMemory);
        }
    }
}
