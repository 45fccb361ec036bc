//! Saved editor state.
//!
//! State is a text file of directives, one per line, in the same form the
//! interpreter accepts them:
//!
//! ```text
//! #delim program
//! #bind Up ^[[A=&prev-line
//! #mark ^$ tells you=bold
//! #substitute gold coins=gc
//! #add north south
//! #put say hello
//! ```
//!
//! Text fields go through [`escape`](crate::text::escape()), so any byte
//! survives the round trip. Loading skips directives it does not know.

use crate::edit::Editor;
use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::input::{KeyAction, KeyMap, parse_sequence, sequence_name};
use crate::pattern::{ANCHOR, PatternAction, PatternEntry, PatternSet, split_anchor};
use crate::style::MarkStyle;
use crate::terminal::TerminalOutput;
use crate::text::{DelimMode, escape, split_unescaped, unescape};
use std::io::{BufRead, Write};

/// Lines of `#add` are wrapped before this width.
const ADD_WIDTH: usize = 80;

/// One persisted setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// A history line.
    Put(Vec<u8>),
    /// Completion words, oldest first.
    Add(Vec<Vec<u8>>),
    Mark {
        anchored: bool,
        pattern: Vec<u8>,
        style: MarkStyle,
    },
    Substitute {
        anchored: bool,
        pattern: Vec<u8>,
        replacement: Vec<u8>,
    },
    /// Select a delimiter set, replacing the custom set if one is given.
    Delim {
        mode: DelimMode,
        custom: Option<Vec<u8>>,
    },
    Bind {
        name: String,
        sequence: Vec<u8>,
        action: KeyAction,
    },
}

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

/// `[^]pattern=value`, with both halves still escaped.
fn split_pattern(rest: &[u8], line: usize) -> Result<(bool, Vec<u8>, &[u8])> {
    let (anchored, rest) = split_anchor(rest);
    let (pattern, value) = split_unescaped(rest, b'=').ok_or_else(|| parse_error(line, "missing '='"))?;
    if pattern.is_empty() {
        return Err(parse_error(line, "empty pattern"));
    }
    Ok((anchored, unescape(pattern), value))
}

/// Split `sequence=action` at the first `=` outside a quoted byte.
fn split_binding(rest: &str) -> Option<(&str, &str)> {
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'^' | b'\\' => i += 2,
            b'=' => return Some((&rest[..i], &rest[i + 1..])),
            _ => i += 1,
        }
    }
    None
}

impl Directive {
    /// Parse one line. Blank lines and unknown directives give `None`.
    pub fn parse(text: &[u8], line: usize) -> Result<Option<Self>> {
        if text.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let (name, rest) = match text.iter().position(|&b| b == b' ') {
            Some(at) => (&text[..at], &text[at + 1..]),
            None => (text, &[][..]),
        };
        let directive = match name {
            b"#put" => Self::Put(unescape(rest)),
            b"#add" => Self::Add(
                rest.split(|&b| b == b' ')
                    .filter(|w| !w.is_empty())
                    .map(unescape)
                    .collect(),
            ),
            b"#mark" => {
                let (anchored, pattern, attr) = split_pattern(rest, line)?;
                let style = String::from_utf8_lossy(attr)
                    .parse()
                    .map_err(|e: Error| parse_error(line, e.to_string()))?;
                Self::Mark {
                    anchored,
                    pattern,
                    style,
                }
            }
            b"#substitute" => {
                let (anchored, pattern, replacement) = split_pattern(rest, line)?;
                Self::Substitute {
                    anchored,
                    pattern,
                    replacement: unescape(replacement),
                }
            }
            b"#delim" => {
                let (mode, set) = match rest.iter().position(|&b| b == b' ') {
                    Some(at) => (&rest[..at], Some(unescape(&rest[at + 1..]))),
                    None => (rest, None),
                };
                let mode: DelimMode = String::from_utf8_lossy(mode)
                    .parse()
                    .map_err(|_| parse_error(line, "unknown delimiter mode"))?;
                if set.is_some() && mode != DelimMode::Custom {
                    return Err(parse_error(line, "only the custom set takes characters"));
                }
                Self::Delim { mode, custom: set }
            }
            b"#bind" => {
                let rest = std::str::from_utf8(rest).map_err(|_| parse_error(line, "binding is not UTF-8"))?;
                let (name, binding) = rest
                    .split_once(' ')
                    .ok_or_else(|| parse_error(line, "missing key sequence"))?;
                let (sequence, action) =
                    split_binding(binding).ok_or_else(|| parse_error(line, "missing '='"))?;
                Self::Bind {
                    name: name.to_string(),
                    sequence: parse_sequence(sequence).map_err(|e| parse_error(line, e.to_string()))?,
                    action: action.parse().map_err(|e: Error| parse_error(line, e.to_string()))?,
                }
            }
            _ => {
                emit_log(
                    LogLevel::Debug,
                    &format!("line {line}: skipping '{}'", String::from_utf8_lossy(name)),
                );
                return Ok(None);
            }
        };
        Ok(Some(directive))
    }

    /// Write the directive and its newline.
    pub fn write_to(&self, w: &mut impl Write) -> Result<()> {
        match self {
            Self::Put(text) => {
                w.write_all(b"#put ")?;
                w.write_all(&escape(text)?)?;
            }
            Self::Add(words) => {
                w.write_all(b"#add")?;
                for word in words {
                    w.write_all(b" ")?;
                    w.write_all(&escape(word)?)?;
                }
            }
            Self::Mark {
                anchored,
                pattern,
                style,
            } => {
                w.write_all(b"#mark ")?;
                write_pattern(w, *anchored, pattern)?;
                write!(w, "={style}")?;
            }
            Self::Substitute {
                anchored,
                pattern,
                replacement,
            } => {
                w.write_all(b"#substitute ")?;
                write_pattern(w, *anchored, pattern)?;
                w.write_all(b"=")?;
                w.write_all(&escape(replacement)?)?;
            }
            Self::Delim { mode, custom } => {
                write!(w, "#delim {mode}")?;
                if let Some(set) = custom {
                    w.write_all(b" ")?;
                    w.write_all(&escape(set)?)?;
                }
            }
            Self::Bind {
                name,
                sequence,
                action,
            } => {
                write!(w, "#bind {name} {}={action}", sequence_name(sequence))?;
            }
        }
        w.write_all(b"\n")?;
        Ok(())
    }
}

fn write_pattern(w: &mut impl Write, anchored: bool, pattern: &[u8]) -> Result<()> {
    if anchored {
        w.write_all(&[ANCHOR])?;
    } else if pattern.first() == Some(&ANCHOR) {
        w.write_all(b"\\")?;
    }
    w.write_all(&escape(pattern)?)?;
    Ok(())
}

/// Directives that recreate the current state.
///
/// Words holding a space cannot be written on an `#add` line and are left
/// out.
pub fn directives<T: TerminalOutput>(
    editor: &Editor<T>,
    patterns: &PatternSet,
    keys: &KeyMap,
) -> Result<Vec<Directive>> {
    let mut out = Vec::new();

    let delims = editor.delimiters();
    if !delims.custom().is_empty() {
        out.push(Directive::Delim {
            mode: DelimMode::Custom,
            custom: Some(delims.custom().to_vec()),
        });
    }
    if delims.mode() != DelimMode::Custom || delims.custom().is_empty() {
        out.push(Directive::Delim {
            mode: delims.mode(),
            custom: None,
        });
    }

    out.extend(keys.iter().map(|b| Directive::Bind {
        name: b.name.clone(),
        sequence: b.sequence.clone(),
        action: b.action.clone(),
    }));

    for entry in patterns.marks().iter().chain(patterns.substitutions()) {
        let anchored = entry.anchored();
        let pattern = entry.pattern().source().to_vec();
        out.push(match entry.action() {
            PatternAction::Mark(style) => Directive::Mark {
                anchored,
                pattern,
                style: *style,
            },
            PatternAction::Substitute(replacement) => Directive::Substitute {
                anchored,
                pattern,
                replacement: replacement.clone(),
            },
        });
    }

    let mut group: Vec<Vec<u8>> = Vec::new();
    let mut width = "#add".len();
    for word in editor.words().iter_oldest_first() {
        if word.contains(&b' ') {
            continue;
        }
        let w = escape(word)?.len() + 1;
        if !group.is_empty() && width + w >= ADD_WIDTH {
            out.push(Directive::Add(std::mem::take(&mut group)));
            width = "#add".len();
        }
        group.push(word.to_vec());
        width += w;
    }
    if !group.is_empty() {
        out.push(Directive::Add(group));
    }

    out.extend(
        editor
            .history()
            .iter_oldest_first()
            .map(|line| Directive::Put(line.to_vec())),
    );
    Ok(out)
}

/// Write the current state.
pub fn save_state<W: Write, T: TerminalOutput>(
    w: &mut W,
    editor: &Editor<T>,
    patterns: &PatternSet,
    keys: &KeyMap,
) -> Result<()> {
    for directive in directives(editor, patterns, keys)? {
        directive.write_to(w)?;
    }
    w.flush()?;
    Ok(())
}

/// Read directives and apply them. Returns how many were applied.
pub fn load_state<R: BufRead, T: TerminalOutput>(
    r: &mut R,
    editor: &mut Editor<T>,
    patterns: &mut PatternSet,
    keys: &mut KeyMap,
) -> Result<usize> {
    let mut applied = 0;
    let mut buf = Vec::new();
    let mut line = 0;
    loop {
        buf.clear();
        if r.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line += 1;
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        let Some(directive) = Directive::parse(&buf, line)? else {
            continue;
        };
        apply(directive, editor, patterns, keys)?;
        applied += 1;
    }
    Ok(applied)
}

fn apply<T: TerminalOutput>(
    directive: Directive,
    editor: &mut Editor<T>,
    patterns: &mut PatternSet,
    keys: &mut KeyMap,
) -> Result<()> {
    match directive {
        Directive::Put(text) => {
            editor.history_mut().put(&text)?;
            editor.history_mut().reset_pick();
        }
        Directive::Add(words) => {
            for word in words {
                editor.put_word(&word)?;
            }
        }
        Directive::Mark {
            anchored,
            pattern,
            style,
        } => {
            patterns.add(PatternEntry::mark(&pattern, anchored, style)?);
        }
        Directive::Substitute {
            anchored,
            pattern,
            replacement,
        } => {
            patterns.add(PatternEntry::substitute(&pattern, anchored, &replacement)?);
        }
        Directive::Delim { mode, custom } => match custom {
            Some(set) => editor.delimiters_mut().set_custom(&set),
            None => editor.delimiters_mut().set_mode(mode),
        },
        Directive::Bind {
            name,
            sequence,
            action,
        } => {
            keys.bind(&name, &sequence, action)?;
        }
    }
    Ok(())
}
