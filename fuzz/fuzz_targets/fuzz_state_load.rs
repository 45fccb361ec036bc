//! Fuzz target for state file parsing.
//!
//! Anything that loads must save again, and the saved form must load back
//! to the same state.

#![no_main]

use libfuzzer_sys::fuzz_target;
use termline::ansi::AnsiWriter;
use termline::edit::EditorConfig;
use termline::Session;

fuzz_target!(|data: &[u8]| {
    let new_session = || Session::new(AnsiWriter::new(Vec::new(), 80, 24), EditorConfig::default());

    let mut first = new_session();
    if first.load(&mut &data[..]).is_err() {
        return;
    }
    let mut saved = Vec::new();
    first.save(&mut saved).expect("saving to memory");

    let mut second = new_session();
    second.load(&mut saved.as_slice()).expect("reloading saved state");
    assert_eq!(first.patterns(), second.patterns());
});
