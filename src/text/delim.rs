//! Word delimiter sets.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Delimiters used when typing ordinary commands and text.
pub const NORMAL_DELIMITERS: &[u8] = b" ;";
/// Delimiters suited to editing program-like text.
pub const PROGRAM_DELIMITERS: &[u8] = b" <>!=(),;\"'{}[]+-/*%";

/// Which delimiter set is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DelimMode {
    #[default]
    Normal,
    Program,
    Custom,
}

impl DelimMode {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Program => "program",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for DelimMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DelimMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "program" => Ok(Self::Program),
            "custom" => Ok(Self::Custom),
            _ => Err(Error::Parse {
                line: 0,
                message: format!("unknown delimiter mode '{s}'"),
            }),
        }
    }
}

/// The active delimiter set plus the user-defined custom set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delimiters {
    mode: DelimMode,
    custom: Vec<u8>,
}

impl Delimiters {
    #[must_use]
    pub fn new(mode: DelimMode) -> Self {
        Self {
            mode,
            custom: Vec::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> DelimMode {
        self.mode
    }

    /// Switch sets. The custom set survives switching away and back.
    pub fn set_mode(&mut self, mode: DelimMode) {
        self.mode = mode;
    }

    /// Replace the custom set and make it active.
    pub fn set_custom(&mut self, set: &[u8]) {
        self.custom = set.to_vec();
        self.mode = DelimMode::Custom;
    }

    #[must_use]
    pub fn custom(&self) -> &[u8] {
        &self.custom
    }

    /// Bytes of the active set.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self.mode {
            DelimMode::Normal => NORMAL_DELIMITERS,
            DelimMode::Program => PROGRAM_DELIMITERS,
            DelimMode::Custom => &self.custom,
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, b: u8) -> bool {
        self.as_bytes().contains(&b)
    }

    /// Offset of the first delimiter in `s`.
    #[must_use]
    pub fn find_in(&self, s: &[u8]) -> Option<usize> {
        s.iter().position(|&b| self.contains(b))
    }

    /// Offset of the last delimiter in `s`.
    #[must_use]
    pub fn rfind_in(&self, s: &[u8]) -> Option<usize> {
        s.iter().rposition(|&b| self.contains(b))
    }

    /// Iterate over the non-empty words of `s`.
    pub fn words<'a>(&'a self, s: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        s.split(move |&b| self.contains(b)).filter(|w| !w.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes() {
        let mut d = Delimiters::default();
        assert!(d.contains(b' '));
        assert!(!d.contains(b'('));
        d.set_mode(DelimMode::Program);
        assert!(d.contains(b'('));
        d.set_custom(b",");
        assert_eq!(d.mode(), DelimMode::Custom);
        assert!(d.contains(b','));
        assert!(!d.contains(b' '));
        d.set_mode(DelimMode::Normal);
        d.set_mode(DelimMode::Custom);
        assert_eq!(d.as_bytes(), b",");
    }

    #[test]
    fn test_search_helpers() {
        let d = Delimiters::default();
        assert_eq!(d.find_in(b"ab cd;e"), Some(2));
        assert_eq!(d.rfind_in(b"ab cd;e"), Some(5));
        assert_eq!(d.find_in(b"abc"), None);
        let words: Vec<&[u8]> = d.words(b"  say hi;;bye ").collect();
        assert_eq!(words, vec![&b"say"[..], b"hi", b"bye"]);
    }

    #[test]
    fn test_mode_names() {
        for mode in [DelimMode::Normal, DelimMode::Program, DelimMode::Custom] {
            assert_eq!(mode.to_string().parse::<DelimMode>().unwrap(), mode);
        }
        assert!("weird".parse::<DelimMode>().is_err());
    }
}
