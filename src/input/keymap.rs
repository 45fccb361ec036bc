//! Byte-sequence key bindings.
//!
//! A [`KeyMap`] maps raw terminal input sequences to actions. Resolution
//! works on whatever bytes are buffered: a complete bound sequence yields
//! its action, a strict prefix of one asks for more input, and anything
//! else falls through as a single byte to insert (or an unknown escape
//! sequence to drop).
//!
//! Sequences have a printable name form: `^A` for control bytes, `^?` for
//! DEL, `\` to quote the next byte, `\NNN` for an octal byte, everything
//! else as itself. The left arrow is `^[[D`.

use crate::edit::Command;
use crate::error::{Error, Result, try_to_vec};
use std::fmt;
use std::str::FromStr;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// What a key sequence does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Run an edit command, with an optional argument.
    Edit(Command, Option<String>),
    /// Hand a command line to the interpreter.
    Run(String),
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit(command, None) => f.write_str(command.name()),
            Self::Edit(command, Some(arg)) => write!(f, "{} {arg}", command.name()),
            Self::Run(text) => f.write_str(text),
        }
    }
}

impl FromStr for KeyAction {
    type Err = Error;

    /// `&name [arg]` is an edit command; other text runs as is.
    fn from_str(s: &str) -> Result<Self> {
        if !s.starts_with('&') {
            return Ok(Self::Run(s.to_string()));
        }
        let (command, arg) = Command::lookup(s).ok_or_else(|| Error::UnknownCommand(s.to_string()))?;
        Ok(Self::Edit(command, arg.map(str::to_string)))
    }
}

/// A named binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    pub name: String,
    pub sequence: Vec<u8>,
    pub action: KeyAction,
}

/// Outcome of resolving buffered input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyResult<'a> {
    /// A bound sequence and the number of bytes it used.
    Bound(&'a KeyBinding, usize),
    /// An unbound byte.
    Unbound(u8),
    /// An unbound escape sequence of this many bytes.
    Ignored(usize),
    /// The input is an unfinished sequence; wait for more bytes.
    Incomplete,
}

/// Ordered set of key bindings.
#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::emacs()
    }
}

const EMACS: &[(&str, &[u8], Command)] = &[
    ("C-a", b"\x01", Command::BeginOfLine),
    ("C-e", b"\x05", Command::EndOfLine),
    ("C-b", b"\x02", Command::PrevChar),
    ("C-f", b"\x06", Command::NextChar),
    ("C-p", b"\x10", Command::PrevLine),
    ("C-n", b"\x0e", Command::NextLine),
    ("C-d", b"\x04", Command::DelCharRight),
    ("C-h", b"\x08", Command::DelCharLeft),
    ("Backspace", b"\x7f", Command::DelCharLeft),
    ("C-k", b"\x0b", Command::KillToEol),
    ("C-t", b"\x14", Command::Transpose),
    ("C-l", b"\x0c", Command::RedrawLine),
    ("C-q", b"\x11", Command::ClearLine),
    ("C-w", b"\x17", Command::ToHistory),
    ("Tab", b"\t", Command::CompleteWord),
    ("M-Tab", b"\x1b\t", Command::CompleteLine),
    ("M-b", b"\x1bb", Command::PrevWord),
    ("M-f", b"\x1bf", Command::NextWord),
    ("M-d", b"\x1bd", Command::DelWordRight),
    ("M-Backspace", b"\x1b\x7f", Command::DelWordLeft),
    ("M-u", b"\x1bu", Command::UpcaseWord),
    ("M-l", b"\x1bl", Command::DowncaseWord),
    ("M-t", b"\x1bt", Command::TransposeWords),
    ("M-k", b"\x1bk", Command::RedrawLineNoPrompt),
    ("Return", b"\r", Command::EnterLine),
    ("C-j", b"\n", Command::EnterLine),
    ("C-z", b"\x1a", Command::Suspend),
    ("Up", b"\x1b[A", Command::PrevLine),
    ("Down", b"\x1b[B", Command::NextLine),
    ("Right", b"\x1b[C", Command::NextChar),
    ("Left", b"\x1b[D", Command::PrevChar),
    ("Up-app", b"\x1bOA", Command::PrevLine),
    ("Down-app", b"\x1bOB", Command::NextLine),
    ("Right-app", b"\x1bOC", Command::NextChar),
    ("Left-app", b"\x1bOD", Command::PrevChar),
];

impl KeyMap {
    /// A map with no bindings.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Emacs-style default bindings.
    #[must_use]
    pub fn emacs() -> Self {
        let bindings = EMACS
            .iter()
            .map(|(name, seq, command)| KeyBinding {
                name: (*name).to_string(),
                sequence: seq.to_vec(),
                action: KeyAction::Edit(*command, None),
            })
            .collect();
        Self { bindings }
    }

    /// Bind `sequence` under `name`. A binding with the same name or the
    /// same sequence is replaced and returned.
    pub fn bind(&mut self, name: &str, sequence: &[u8], action: KeyAction) -> Result<Option<KeyBinding>> {
        if sequence.is_empty() {
            return Err(Error::InvalidKeySequence(name.to_string()));
        }
        let binding = KeyBinding {
            name: name.to_string(),
            sequence: try_to_vec(sequence)?,
            action,
        };
        let existing = self
            .bindings
            .iter()
            .position(|b| b.name == name || b.sequence == sequence);
        match existing {
            Some(i) => Ok(Some(std::mem::replace(&mut self.bindings[i], binding))),
            None => {
                self.bindings.try_reserve(1)?;
                self.bindings.push(binding);
                Ok(None)
            }
        }
    }

    /// Remove the binding called `name`.
    pub fn unbind(&mut self, name: &str) -> Option<KeyBinding> {
        let i = self.bindings.iter().position(|b| b.name == name)?;
        Some(self.bindings.remove(i))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&KeyBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve the start of `input`.
    ///
    /// A longer sequence that `input` is still a prefix of wins over a
    /// shorter complete one, so `^[` alone waits for the next byte when
    /// `^[b` is also bound.
    #[must_use]
    pub fn resolve(&self, input: &[u8]) -> KeyResult<'_> {
        let Some(&first) = input.first() else {
            return KeyResult::Incomplete;
        };
        if self
            .bindings
            .iter()
            .any(|b| b.sequence.len() > input.len() && b.sequence.starts_with(input))
        {
            return KeyResult::Incomplete;
        }
        let longest = self
            .bindings
            .iter()
            .filter(|b| input.starts_with(&b.sequence))
            .max_by_key(|b| b.sequence.len());
        if let Some(binding) = longest {
            return KeyResult::Bound(binding, binding.sequence.len());
        }
        if first != ESC {
            return KeyResult::Unbound(first);
        }
        match input.get(1) {
            None => KeyResult::Incomplete,
            Some(b'[') => match input[2..].iter().position(|b| (0x40..=0x7e).contains(b)) {
                Some(i) => KeyResult::Ignored(i + 3),
                None => KeyResult::Incomplete,
            },
            Some(b'O') if input.len() < 3 => KeyResult::Incomplete,
            Some(b'O') => KeyResult::Ignored(3),
            Some(_) => KeyResult::Ignored(2),
        }
    }
}

/// Decode a sequence from its printable name.
///
/// ```
/// use termline::input::parse_sequence;
///
/// assert_eq!(parse_sequence("^[[A").unwrap(), b"\x1b[A".to_vec());
/// assert_eq!(parse_sequence("^?").unwrap(), vec![0x7f]);
/// ```
pub fn parse_sequence(name: &str) -> Result<Vec<u8>> {
    let invalid = || Error::InvalidKeySequence(name.to_string());
    let bytes = name.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = match bytes[i] {
            b'^' => {
                let c = *bytes.get(i + 1).ok_or_else(invalid)?;
                i += 2;
                match c {
                    b'?' => DEL,
                    b'@'..=b'_' => c ^ 0x40,
                    b'a'..=b'z' => c.to_ascii_uppercase() ^ 0x40,
                    _ => return Err(invalid()),
                }
            }
            b'\\' => {
                let rest = &bytes[i + 1..];
                let octal = rest.len() >= 3 && rest[..3].iter().all(|d| (b'0'..=b'7').contains(d));
                if octal {
                    i += 4;
                    let value = rest[..3]
                        .iter()
                        .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                    u8::try_from(value).map_err(|_| invalid())?
                } else {
                    let c = *rest.first().ok_or_else(invalid)?;
                    i += 2;
                    c
                }
            }
            c => {
                i += 1;
                c
            }
        };
        out.push(b);
    }
    if out.is_empty() {
        return Err(invalid());
    }
    Ok(out)
}

/// Printable name of a sequence, accepted by [`parse_sequence`].
#[must_use]
pub fn sequence_name(sequence: &[u8]) -> String {
    let mut out = String::new();
    for &b in sequence {
        match b {
            0..=0x1f => {
                out.push('^');
                out.push(char::from(b ^ 0x40));
            }
            DEL => out.push_str("^?"),
            b'^' | b'\\' | b'=' | b' ' => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x21..=0x7e => out.push(char::from(b)),
            _ => out.push_str(&format!("\\{b:03o}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_command(map: &KeyMap, input: &[u8]) -> Option<(Command, usize)> {
        match map.resolve(input) {
            KeyResult::Bound(
                KeyBinding {
                    action: KeyAction::Edit(command, _),
                    ..
                },
                n,
            ) => Some((*command, n)),
            _ => None,
        }
    }

    #[test]
    fn test_defaults_resolve() {
        let map = KeyMap::default();
        assert_eq!(bound_command(&map, b"\x01"), Some((Command::BeginOfLine, 1)));
        assert_eq!(bound_command(&map, b"\x1b[Dxyz"), Some((Command::PrevChar, 3)));
        assert_eq!(bound_command(&map, b"\x1bOA"), Some((Command::PrevLine, 3)));
        assert_eq!(bound_command(&map, b"\x1b\t"), Some((Command::CompleteLine, 2)));
        assert_eq!(bound_command(&map, b"\r"), Some((Command::EnterLine, 1)));
    }

    #[test]
    fn test_prefix_waits() {
        let map = KeyMap::default();
        assert_eq!(map.resolve(b"\x1b"), KeyResult::Incomplete);
        assert_eq!(map.resolve(b"\x1b["), KeyResult::Incomplete);
        assert_eq!(map.resolve(b""), KeyResult::Incomplete);
    }

    #[test]
    fn test_unbound_bytes() {
        let map = KeyMap::default();
        assert_eq!(map.resolve(b"abc"), KeyResult::Unbound(b'a'));
        assert_eq!(map.resolve(&[0xe8, 0xb5]), KeyResult::Unbound(0xe8));
    }

    #[test]
    fn test_unknown_escapes_are_dropped() {
        let map = KeyMap::default();
        assert_eq!(map.resolve(b"\x1b[15~x"), KeyResult::Ignored(5));
        assert_eq!(map.resolve(b"\x1b[1;5"), KeyResult::Incomplete);
        assert_eq!(map.resolve(b"\x1bOP"), KeyResult::Ignored(3));
        assert_eq!(map.resolve(b"\x1bz"), KeyResult::Ignored(2));
    }

    #[test]
    fn test_bind_replaces_by_name_or_sequence() {
        let mut map = KeyMap::empty();
        assert!(map.is_empty());
        map.bind("F1", b"\x1bOP", "look".parse().unwrap()).unwrap();
        assert_eq!(map.len(), 1);
        let old = map
            .bind("help", b"\x1bOP", KeyAction::Run("help".into()))
            .unwrap()
            .unwrap();
        assert_eq!(old.name, "F1");
        assert_eq!(map.len(), 1);
        match map.resolve(b"\x1bOP") {
            KeyResult::Bound(b, 3) => assert_eq!(b.action, KeyAction::Run("help".into())),
            other => panic!("unexpected {other:?}"),
        }
        assert!(map.unbind("help").is_some());
        assert!(map.get("help").is_none());
        assert!(map.bind("x", b"", KeyAction::Run(String::new())).is_err());
    }

    #[test]
    fn test_action_parse_and_display() {
        let action: KeyAction = "&insert-string north".parse().unwrap();
        assert_eq!(
            action,
            KeyAction::Edit(Command::InsertString, Some("north".to_string()))
        );
        assert_eq!(action.to_string(), "&insert-string north");
        assert_eq!("say hi".parse::<KeyAction>().unwrap(), KeyAction::Run("say hi".into()));
        assert!(matches!(
            "&no-such-thing".parse::<KeyAction>(),
            Err(Error::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_sequence_names() {
        assert_eq!(parse_sequence("^A").unwrap(), vec![1]);
        assert_eq!(parse_sequence("^a").unwrap(), vec![1]);
        assert_eq!(parse_sequence(r"\^x").unwrap(), b"^x".to_vec());
        assert_eq!(parse_sequence(r"\033[A").unwrap(), b"\x1b[A".to_vec());
        assert!(parse_sequence("^").is_err());
        assert!(parse_sequence("^1").is_err());
        assert!(parse_sequence("").is_err());
        assert!(parse_sequence(r"\777").is_err());

        assert_eq!(sequence_name(b"\x1b[A"), "^[[A");
        assert_eq!(sequence_name(&[0x7f, b' ', b'=', 0xe9]), r"^?\ \=\351");
        for (_, seq, _) in EMACS {
            assert_eq!(parse_sequence(&sequence_name(seq)).unwrap(), seq.to_vec());
        }
    }
}
