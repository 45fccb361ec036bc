//! Fuzz target for the wildcard pattern engine.
//!
//! Compiles arbitrary patterns and runs marks and substitutions over
//! arbitrary lines. Marks must never change the visible text.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use termline::pattern::{PatternEntry, PatternSet};
use termline::style::{Color, MarkStyle};

#[derive(Arbitrary, Debug)]
struct PatternInput {
    marks: Vec<(Vec<u8>, bool)>,
    substitutions: Vec<(Vec<u8>, bool, Vec<u8>)>,
    delims: Vec<u8>,
    line: Vec<u8>,
}

fuzz_target!(|input: PatternInput| {
    let mut marks_only = PatternSet::new();
    let mut full = PatternSet::new();
    for (pattern, anchored) in input.marks.iter().take(16) {
        if let Ok(entry) = PatternEntry::mark(pattern, *anchored, MarkStyle::fg(Color::Red)) {
            marks_only.add(entry.clone());
            full.add(entry);
        }
    }
    for (pattern, anchored, replacement) in input.substitutions.iter().take(16) {
        if let Ok(entry) = PatternEntry::substitute(pattern, *anchored, replacement) {
            full.add(entry);
        }
    }
    let line: Vec<u8> = input.line.into_iter().filter(|&b| b != 0x1b).take(512).collect();

    if let Ok(shown) = marks_only.apply_marks(&line, &input.delims) {
        let plain: Vec<u8> = strip_marks(&shown);
        assert_eq!(plain, line);
    }
    let _ = full.transform(&line, &input.delims);
});

/// Remove the `ESC [ ... m` sequences added by marking.
fn strip_marks(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s[i] == 0x1b {
            while i < s.len() && s[i] != b'm' {
                i += 1;
            }
        } else {
            out.push(s[i]);
        }
        i += 1;
    }
    out
}
