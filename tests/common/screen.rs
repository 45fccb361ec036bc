//! Virtual terminal for checking what the editor really puts on screen.
//!
//! Output of a [`Session`] is fed through a `vt100` parser so tests can
//! assert on rows and cursor position instead of raw escape sequences.

use termline::ansi::AnsiWriter;
use termline::edit::EditorConfig;
use termline::{Session, SessionEvent};

pub type TestSession = Session<AnsiWriter<Vec<u8>>>;

/// A session wired to an emulated terminal of fixed size.
pub struct VirtualScreen {
    pub session: TestSession,
    parser: vt100::Parser,
    cols: u16,
    rows: u16,
}

impl VirtualScreen {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_config(cols, rows, EditorConfig::default())
    }

    pub fn with_config(cols: u16, rows: u16, config: EditorConfig) -> Self {
        let out = AnsiWriter::new(Vec::new(), usize::from(cols), usize::from(rows));
        let mut parser = vt100::Parser::new(rows, cols, 0);
        // The editor starts out on the bottom row, like a shell prompt.
        parser.process(format!("\x1b[{rows};1H").as_bytes());
        Self {
            session: Session::new(out, config),
            parser,
            cols,
            rows,
        }
    }

    /// Move everything the session flushed into the emulator.
    pub fn sync(&mut self) {
        let bytes = std::mem::take(self.session.editor_mut().output_mut().get_mut());
        self.parser.process(&bytes);
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.session.set_prompt(prompt.as_bytes()).unwrap();
        self.sync();
    }

    pub fn type_bytes(&mut self, bytes: &[u8]) -> Vec<SessionEvent> {
        let events = self.session.handle_input(bytes).unwrap();
        self.sync();
        events
    }

    pub fn remote(&mut self, line: &str) {
        self.session.handle_remote_line(line.as_bytes()).unwrap();
        self.sync();
    }

    /// Resize both the emulator and the session, then let the session
    /// catch up.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.parser.set_size(rows, cols);
        self.session
            .editor_mut()
            .output_mut()
            .set_size(usize::from(cols), usize::from(rows));
        self.session.notify_resize(usize::from(cols), usize::from(rows));
        self.session.poll().unwrap();
        self.sync();
    }

    /// Text of one row, trailing blanks trimmed.
    pub fn row(&self, row: u16) -> String {
        self.parser
            .screen()
            .rows(0, self.cols)
            .nth(usize::from(row))
            .map(|r| r.trim_end().to_string())
            .unwrap_or_default()
    }

    /// Every row, top to bottom.
    pub fn rows(&self) -> Vec<String> {
        self.parser
            .screen()
            .rows(0, self.cols)
            .map(|r| r.trim_end().to_string())
            .collect()
    }

    /// Last row of the screen.
    pub fn bottom(&self) -> u16 {
        self.rows - 1
    }

    /// `(row, col)` of the terminal cursor.
    pub fn cursor(&self) -> (u16, u16) {
        self.parser.screen().cursor_position()
    }

    pub fn fg_at(&self, row: u16, col: u16) -> vt100::Color {
        self.parser
            .screen()
            .cell(row, col)
            .map_or(vt100::Color::Default, vt100::Cell::fgcolor)
    }

    pub fn bold_at(&self, row: u16, col: u16) -> bool {
        self.parser
            .screen()
            .cell(row, col)
            .is_some_and(vt100::Cell::bold)
    }
}
