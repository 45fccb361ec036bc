//! End-to-end workflows through a [`Session`], the way a client drives it.

mod common;

use std::fs::File;
use std::io::{BufReader, BufWriter};

use common::screen::VirtualScreen;
use termline::ansi::AnsiWriter;
use termline::edit::{Command, Editor, EditorConfig};
use termline::pattern::{PatternEntry, PatternSet};
use termline::style::{Color, MarkStyle, TextAttributes};
use termline::{DelimMode, KeyAction, Session, SessionEvent};

type TestSession = Session<AnsiWriter<Vec<u8>>>;

fn session() -> TestSession {
    Session::new(AnsiWriter::new(Vec::new(), 80, 24), EditorConfig::default())
}

fn bold() -> MarkStyle {
    MarkStyle::NONE.with_attributes(TextAttributes::BOLD)
}

// ============================================================================
// Completion
// ============================================================================

#[test]
fn test_completion_cycles_through_matching_words() {
    let mut ed = Editor::new(AnsiWriter::new(Vec::new(), 80, 24), EditorConfig::default());
    // Newest first the ring reads: 走, quit, query.
    for word in ["query", "quit", "走"] {
        ed.put_word(word.as_bytes()).unwrap();
    }
    ed.refresh();
    ed.insert_bytes(b"qu").unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        ed.dispatch(Command::CompleteWord, None).unwrap();
        seen.push(String::from_utf8_lossy(ed.text()).into_owned());
    }
    assert_eq!(seen, ["quit", "query", "quit"]);
}

#[test]
fn test_completion_learns_from_submitted_lines() {
    let mut s = session();
    s.handle_input(b"kill the hobgoblin\r").unwrap();
    s.handle_input(b"look hob\t").unwrap();
    assert_eq!(s.editor().text(), b"look hobgoblin");
}

#[test]
fn test_command_names_complete_after_learned_words() {
    let mut s = session();
    s.editor_mut().add_command_name("quit").unwrap();
    s.handle_input(b"quietly leave\r").unwrap();
    s.handle_input(b"#qu\t").unwrap();
    assert_eq!(s.editor().text(), b"#quit");
    s.handle_input(b"\x11qu\t").unwrap();
    assert_eq!(s.editor().text(), b"quietly");
}

#[test]
fn test_line_completion_from_history() {
    let mut s = session();
    s.handle_input(b"tell bob hi\rtell alice bye\rwho\r").unwrap();
    s.handle_input(b"tell\x1b\t").unwrap();
    assert_eq!(s.editor().text(), b"tell alice bye");
    s.handle_input(b"\x1b\t").unwrap();
    assert_eq!(s.editor().text(), b"tell bob hi");
}

// ============================================================================
// Patterns on remote text
// ============================================================================

#[test]
fn test_edge_wildcards_mark_only_the_literal() {
    let mut set = PatternSet::new();
    set.add(PatternEntry::mark(b"&ERROR&", false, MarkStyle::fg(Color::Red)).unwrap());
    let out = set.transform(b"fatal ERROR occurred", b" ;").unwrap();
    assert_eq!(out, b"fatal \x1b[31mERROR\x1b[0m occurred".to_vec());
}

#[test]
fn test_anchored_word_pattern() {
    let mut set = PatternSet::new();
    set.add(PatternEntry::mark(b"$foo", true, bold()).unwrap());
    assert_eq!(
        set.transform(b"foo bar", b" ;").unwrap(),
        b"\x1b[1mfoo\x1b[0m bar".to_vec()
    );
    assert_eq!(set.transform(b"xfoo bar", b" ;").unwrap(), b"xfoo bar".to_vec());
    assert_eq!(set.transform(b"bar foo", b" ;").unwrap(), b"bar foo".to_vec());
}

#[test]
fn test_substitution_feeds_marks() {
    let mut s = session();
    s.patterns_mut()
        .add(PatternEntry::substitute(b"gc", false, b"gold coins").unwrap());
    s.patterns_mut()
        .add(PatternEntry::mark(b"gold", false, MarkStyle::fg(Color::Yellow)).unwrap());
    let shown = s
        .patterns()
        .transform(b"You get 12 gc.", s.editor().delimiters().as_bytes())
        .unwrap();
    assert_eq!(shown, b"You get 12 \x1b[33mgold\x1b[0m coins.".to_vec());
}

#[test]
fn test_program_delimiters_change_word_wildcards() {
    let mut s = session();
    s.patterns_mut()
        .add(PatternEntry::mark(b"$=", false, bold()).unwrap());
    let normal = s
        .patterns()
        .transform(b"a+x=1", s.editor().delimiters().as_bytes())
        .unwrap();
    assert_eq!(normal, b"\x1b[1ma+x=\x1b[0m1".to_vec());

    s.editor_mut().delimiters_mut().set_mode(DelimMode::Program);
    let program = s
        .patterns()
        .transform(b"a+x=1", s.editor().delimiters().as_bytes())
        .unwrap();
    assert_eq!(program, b"a+\x1b[1mx=\x1b[0m1".to_vec());
}

// ============================================================================
// Key bindings
// ============================================================================

#[test]
fn test_rebound_key_inserts_string() {
    let mut s = session();
    let action: KeyAction = "&insert-string (\\)".parse().unwrap();
    s.keys_mut().bind("F2", b"\x1bOQ", action).unwrap();
    s.handle_input(b"say \x1bOQ").unwrap();
    assert_eq!(s.editor().text(), b"say ()");
}

#[test]
fn test_bound_interpreter_command_is_reported() {
    let mut s = session();
    s.keys_mut()
        .bind("F5", b"\x1b[15~", KeyAction::Run("#save".into()))
        .unwrap();
    let events = s.handle_input(b"abc\x1b[15~def").unwrap();
    assert_eq!(events, vec![SessionEvent::RunCommand("#save".into())]);
    assert_eq!(s.editor().text(), b"abcdef");
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_state_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("termline.state");

    let mut s = session();
    s.handle_input(b"cast fireball at goblin\rsay \"hello there\"\r")
        .unwrap();
    s.patterns_mut()
        .add(PatternEntry::mark(b"$ tells you", true, bold()).unwrap());
    s.patterns_mut()
        .add(PatternEntry::substitute(b"gc", false, b"gold=coins").unwrap());
    s.keys_mut()
        .bind("F1", b"\x1bOP", KeyAction::Run("help".into()))
        .unwrap();
    s.editor_mut().delimiters_mut().set_custom(b" .,");
    {
        let mut w = BufWriter::new(File::create(&path).unwrap());
        s.save(&mut w).unwrap();
    }

    let mut fresh = session();
    let applied = fresh
        .load(&mut BufReader::new(File::open(&path).unwrap()))
        .unwrap();
    assert!(applied > 0);

    assert_eq!(fresh.editor().delimiters().mode(), DelimMode::Custom);
    assert_eq!(fresh.editor().delimiters().custom(), b" .,");
    assert_eq!(
        fresh.editor().history().iter_oldest_first().collect::<Vec<_>>(),
        s.editor().history().iter_oldest_first().collect::<Vec<_>>()
    );
    assert_eq!(
        fresh.editor().words().iter_oldest_first().collect::<Vec<_>>(),
        s.editor().words().iter_oldest_first().collect::<Vec<_>>()
    );
    assert_eq!(fresh.patterns(), s.patterns());
    assert_eq!(
        fresh.keys().get("F1").map(|b| b.sequence.clone()),
        Some(b"\x1bOP".to_vec())
    );

    // Saving what was loaded gives the same file.
    let mut again = Vec::new();
    fresh.save(&mut again).unwrap();
    assert_eq!(again, std::fs::read(&path).unwrap());
}

#[test]
fn test_malformed_state_line_reports_position() {
    let mut s = session();
    let text = b"#put fine\n#mark =bold\n";
    let err = s.load(&mut &text[..]).unwrap_err();
    assert!(matches!(err, termline::Error::Parse { line: 2, .. }));
    assert_eq!(s.editor().history().newest(), Some(&b"fine"[..]));
}

// ============================================================================
// Screen
// ============================================================================

#[test]
fn test_marked_remote_text_on_screen() {
    let mut vt = VirtualScreen::new(40, 4);
    vt.session
        .patterns_mut()
        .add(PatternEntry::mark(b"$ tells you", false, bold()).unwrap());
    vt.set_prompt("> ");
    vt.remote("Then Bob tells you hi");
    assert_eq!(vt.row(2), "Then Bob tells you hi");
    assert!(!vt.bold_at(2, 0));
    assert!(vt.bold_at(2, 5));
    assert!(vt.bold_at(2, 17));
    assert!(!vt.bold_at(2, 19));
}
