//! Fuzz target for keystroke handling.
//!
//! Feeds chunked input through a session on a small screen so key
//! resolution, editing commands and wrapped redraws all get exercised.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use termline::ansi::AnsiWriter;
use termline::edit::EditorConfig;
use termline::Session;

/// Structured input for session fuzzing.
#[derive(Arbitrary, Debug)]
struct SessionInput {
    /// Terminal width, kept small so lines wrap.
    cols: u8,
    /// Terminal height.
    lines: u8,
    /// Usable line length is two less.
    max_line: u8,
    /// Whether the terminal can move the cursor.
    cursor_motion: bool,
    /// Input as it arrives, one read per chunk.
    chunks: Vec<Vec<u8>>,
    /// Optional resize applied between chunks.
    resize: Option<(u8, u8)>,
}

fuzz_target!(|input: SessionInput| {
    let mut out = AnsiWriter::new(Vec::new(), usize::from(input.cols % 40), usize::from(input.lines % 10));
    out.set_cursor_motion(input.cursor_motion);
    let config = EditorConfig::default().with_max_line(usize::from(input.max_line).max(3));
    let mut session = Session::new(out, config);

    for (i, chunk) in input.chunks.iter().take(64).enumerate() {
        let _ = session.handle_input(chunk);
        if i == 1 {
            if let Some((cols, lines)) = input.resize {
                session.notify_resize(usize::from(cols % 40), usize::from(lines % 10));
            }
        }
        session.editor_mut().output_mut().get_mut().clear();
    }

    let editor = session.editor();
    assert!(editor.cursor() <= editor.text().len());
    assert!(editor.text().len() <= editor.line().max_len());
});
