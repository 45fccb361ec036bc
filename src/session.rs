//! Event loop glue.
//!
//! A [`Session`] ties an [`Editor`] to a [`KeyMap`] and a [`PatternSet`].
//! Each entry point processes one event to completion: input is resolved
//! and dispatched, a pending resize is applied, the screen is brought up to
//! date and output is flushed. Resizes are only recorded when they arrive
//! so that they never interrupt a redraw.
//!
//! ```
//! use termline::ansi::AnsiWriter;
//! use termline::edit::EditorConfig;
//! use termline::session::{Session, SessionEvent};
//!
//! let mut session = Session::new(AnsiWriter::new(Vec::new(), 80, 24), EditorConfig::default());
//! let events = session.handle_input(b"look\r").unwrap();
//! assert_eq!(events, vec![SessionEvent::Submitted(b"look".to_vec())]);
//! ```

use crate::edit::{Editor, EditorConfig, Outcome};
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::input::{KeyAction, KeyMap, KeyResult};
use crate::pattern::PatternSet;
use crate::persist;
use crate::terminal::TerminalOutput;
use std::io::{BufRead, Read, Write};

/// Bytes taken from the terminal per read.
const READ_CHUNK: usize = 256;

/// Something the host has to act on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A finished input line.
    Submitted(Vec<u8>),
    /// A key bound to an interpreter command was pressed.
    RunCommand(String),
    /// The user asked to suspend.
    Suspend,
}

/// Editor, key bindings and display patterns for one terminal.
pub struct Session<T: TerminalOutput> {
    editor: Editor<T>,
    patterns: PatternSet,
    keys: KeyMap,
    pending: Vec<u8>,
    resize: Option<(usize, usize)>,
}

impl<T: TerminalOutput> Session<T> {
    /// Session with the default key bindings and no patterns.
    pub fn new(out: T, config: EditorConfig) -> Self {
        Self {
            editor: Editor::new(out, config),
            patterns: PatternSet::new(),
            keys: KeyMap::default(),
            pending: Vec::new(),
            resize: None,
        }
    }

    #[must_use]
    pub fn editor(&self) -> &Editor<T> {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor<T> {
        &mut self.editor
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut PatternSet {
        &mut self.patterns
    }

    #[must_use]
    pub fn keys(&self) -> &KeyMap {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeyMap {
        &mut self.keys
    }

    /// Bytes of an unfinished key sequence held for the next call.
    #[must_use]
    pub fn pending_input(&self) -> &[u8] {
        &self.pending
    }

    /// Process bytes read from the terminal.
    ///
    pub fn handle_input(&mut self, bytes: &[u8]) -> Result<Vec<SessionEvent>> {
        self.pending.try_reserve(bytes.len())?;
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut used = 0;
        while used < self.pending.len() {
            let step = match self.keys.resolve(&self.pending[used..]) {
                KeyResult::Incomplete => break,
                KeyResult::Ignored(n) => {
                    used += n;
                    continue;
                }
                KeyResult::Unbound(b) => {
                    used += 1;
                    self.editor.insert_char(b).map(|_| None)
                }
                KeyResult::Bound(binding, n) => {
                    used += n;
                    match &binding.action {
                        KeyAction::Run(text) => Ok(Some(SessionEvent::RunCommand(text.clone()))),
                        KeyAction::Edit(command, arg) => self
                            .editor
                            .dispatch(*command, arg.as_deref().map(str::as_bytes))
                            .map(|outcome| match outcome {
                                Outcome::Continue => None,
                                Outcome::Submitted(line) => Some(SessionEvent::Submitted(line)),
                                Outcome::Suspend => Some(SessionEvent::Suspend),
                            }),
                    }
                }
            };
            match step {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(Error::OutOfMemory) => self.report(&Error::OutOfMemory),
                Err(e) => {
                    self.pending.drain(..used);
                    return Err(e);
                }
            }
        }
        self.pending.drain(..used);

        self.finish_event()?;
        Ok(events)
    }

    /// Read one chunk from `input` and process it.
    ///
    /// Returns `None` at end of input. A read interrupted by a signal drops
    /// any unfinished key sequence, brings the screen up to date and returns
    /// [`Error::Interrupted`]; edits already applied stay applied.
    pub fn read_input(&mut self, input: &mut impl Read) -> Result<Option<Vec<SessionEvent>>> {
        let mut buf = [0u8; READ_CHUNK];
        match input.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(n) => self.handle_input(&buf[..n]).map(Some),
            Err(e) => {
                let err = Error::from(e);
                if err.is_interrupt() {
                    self.pending.clear();
                    self.finish_event()?;
                }
                Err(err)
            }
        }
    }

    /// Show a line received from the remote side above the input line,
    /// transformed by the marks and substitutions.
    pub fn handle_remote_line(&mut self, line: &[u8]) -> Result<()> {
        match self.patterns.transform(line, self.editor.delimiters().as_bytes()) {
            Ok(shown) => self.editor.print_above(&shown),
            Err(e) => {
                self.report(&e);
                self.editor.print_above(line);
            }
        }
        self.finish_event()
    }

    /// Install a prompt, transformed like remote text.
    pub fn set_prompt(&mut self, prompt: &[u8]) -> Result<()> {
        let shown = self.patterns.transform(prompt, self.editor.delimiters().as_bytes())?;
        self.editor.set_prompt(&shown);
        self.finish_event()
    }

    /// Record a new terminal size, applied when the current event ends.
    pub fn notify_resize(&mut self, cols: usize, lines: usize) {
        self.resize = Some((cols, lines));
    }

    /// End an event that came from outside the session, such as a resize
    /// or a timer.
    pub fn poll(&mut self) -> Result<()> {
        self.finish_event()
    }

    /// Write the editor state, key bindings and patterns.
    pub fn save(&self, w: &mut impl Write) -> Result<()> {
        persist::save_state(w, &self.editor, &self.patterns, &self.keys)
    }

    /// Apply saved directives. Returns how many were applied.
    pub fn load(&mut self, r: &mut impl BufRead) -> Result<usize> {
        persist::load_state(r, &mut self.editor, &mut self.patterns, &mut self.keys)
    }

    /// Put an error on the status line above the input.
    fn report(&mut self, err: &Error) {
        emit_log(LogLevel::Error, &err.to_string());
        let message = format!("#{err}");
        self.editor.print_above(message.as_bytes());
    }

    fn finish_event(&mut self) -> Result<()> {
        if let Some((cols, lines)) = self.resize.take() {
            emit_log(LogLevel::Debug, "applying deferred resize");
            self.editor.resize(cols, lines);
        }
        self.editor.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::AnsiWriter;
    use crate::pattern::PatternEntry;
    use crate::style::{Color, MarkStyle};

    type TestSession = Session<AnsiWriter<Vec<u8>>>;

    fn session() -> TestSession {
        Session::new(AnsiWriter::new(Vec::new(), 80, 24), EditorConfig::default())
    }

    fn output(s: &mut TestSession) -> String {
        let bytes = std::mem::take(s.editor_mut().output_mut().get_mut());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_typing_and_submit() {
        let mut s = session();
        assert!(s.handle_input(b"say hi").unwrap().is_empty());
        assert_eq!(s.editor().text(), b"say hi");
        let events = s.handle_input(b"\r").unwrap();
        assert_eq!(events, vec![SessionEvent::Submitted(b"say hi".to_vec())]);
        assert_eq!(s.editor().text(), b"");
    }

    #[test]
    fn test_split_escape_sequence() {
        let mut s = session();
        s.handle_input(b"abc\x1b").unwrap();
        assert_eq!(s.pending_input(), b"\x1b");
        s.handle_input(b"[").unwrap();
        s.handle_input(b"D").unwrap();
        assert!(s.pending_input().is_empty());
        assert_eq!(s.editor().cursor(), 2);
    }

    #[test]
    fn test_unknown_escape_is_dropped() {
        let mut s = session();
        s.handle_input(b"a\x1b[15~b").unwrap();
        assert_eq!(s.editor().text(), b"ab");
    }

    #[test]
    fn test_run_binding_and_suspend() {
        let mut s = session();
        s.keys_mut()
            .bind("F1", b"\x1bOP", KeyAction::Run("help".into()))
            .unwrap();
        let events = s.handle_input(b"\x1bOP\x1a").unwrap();
        assert_eq!(
            events,
            vec![SessionEvent::RunCommand("help".into()), SessionEvent::Suspend]
        );
    }

    /// Reader that hands out queued results in order.
    struct Script(Vec<std::io::Result<Vec<u8>>>);

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() {
                return Ok(0);
            }
            let bytes = self.0.remove(0)?;
            buf[..bytes.len()].copy_from_slice(&bytes);
            Ok(bytes.len())
        }
    }

    #[test]
    fn test_interrupted_read_cancels_pending_sequence() {
        use std::io::{Error as IoError, ErrorKind};

        let mut s = session();
        let mut input = Script(vec![
            Ok(b"north\x1b[".to_vec()),
            Err(IoError::from(ErrorKind::Interrupted)),
            Ok(b"D\r".to_vec()),
        ]);
        assert_eq!(s.read_input(&mut input).unwrap(), Some(Vec::new()));
        assert_eq!(s.pending_input(), b"\x1b[");

        let err = s.read_input(&mut input).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
        assert!(s.pending_input().is_empty());
        assert_eq!(s.editor().text(), b"north");
        assert_eq!(s.editor().cursor(), 5);

        // The half-read arrow key is gone, so its tail is plain text.
        let events = s.read_input(&mut input).unwrap().unwrap();
        assert_eq!(events, vec![SessionEvent::Submitted(b"northD".to_vec())]);
        assert_eq!(s.read_input(&mut input).unwrap(), None);
    }

    #[test]
    fn test_read_error_is_returned() {
        use std::io::{Error as IoError, ErrorKind};

        let mut s = session();
        let mut input = Script(vec![Err(IoError::from(ErrorKind::BrokenPipe))]);
        let err = s.read_input(&mut input).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_resize_is_deferred() {
        let mut s = session();
        s.notify_resize(40, 10);
        assert_eq!(s.editor().size(), (80, 24));
        s.handle_input(b"x").unwrap();
        assert_eq!(s.editor().size(), (40, 10));
        s.notify_resize(60, 20);
        s.poll().unwrap();
        assert_eq!(s.editor().size(), (60, 20));
    }

    #[test]
    fn test_remote_line_is_transformed() {
        let mut s = session();
        s.patterns_mut()
            .add(PatternEntry::mark(b"&ERROR&", false, MarkStyle::fg(Color::Red)).unwrap());
        output(&mut s);
        s.handle_remote_line(b"fatal ERROR occurred").unwrap();
        let out = output(&mut s);
        assert!(out.contains("fatal \x1b[31mERROR\x1b[0m occurred"));
    }

    #[test]
    fn test_prompt_is_transformed() {
        let mut s = session();
        s.patterns_mut()
            .add(PatternEntry::substitute(b"HP", false, b"hp").unwrap());
        s.set_prompt(b"HP:10> ").unwrap();
        assert_eq!(s.editor().prompt(), b"hp:10> ");
    }

    #[test]
    fn test_save_and_load() {
        let mut s = session();
        s.handle_input(b"kill goblin\r").unwrap();
        s.patterns_mut()
            .add(PatternEntry::substitute(b"gc", true, b"gold coins").unwrap());
        let mut saved = Vec::new();
        s.save(&mut saved).unwrap();

        let mut fresh = session();
        let applied = fresh.load(&mut saved.as_slice()).unwrap();
        assert!(applied > 0);
        assert_eq!(fresh.editor().history().newest(), Some(&b"kill goblin"[..]));
        assert_eq!(fresh.patterns().substitutions().len(), 1);
        assert!(fresh.patterns().substitutions()[0].anchored());
        assert_eq!(fresh.keys().len(), s.keys().len());
    }
}
