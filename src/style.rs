//! Display attributes for marks and the input line.
//!
//! - [`TextAttributes`]: bitflags for bold, blink, underline, inverse
//! - [`Color`]: the sixteen ANSI palette colours
//! - [`MarkStyle`]: attributes plus optional foreground/background colour
//!
//! Styles have a textual name form used by configuration commands and the
//! persisted state, e.g. `bold yellow on blue` or `RED` (uppercase selects
//! the bright variant).
//!
//! ```
//! use termline::style::{Color, MarkStyle, TextAttributes};
//!
//! let style: MarkStyle = "bold yellow on blue".parse().unwrap();
//! assert_eq!(style.fg, Some(Color::Yellow));
//! assert!(style.attributes.contains(TextAttributes::BOLD));
//! assert_eq!(style.to_string(), "bold yellow on blue");
//! ```

use crate::ansi;
use crate::error::Error;
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Text rendering attributes.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct TextAttributes: u8 {
        /// Bold/increased intensity.
        const BOLD      = 0x01;
        /// Blinking text.
        const BLINK     = 0x02;
        /// Underlined text.
        const UNDERLINE = 0x04;
        /// Swapped foreground/background.
        const INVERSE   = 0x08;
    }
}

impl TextAttributes {
    const NAMES: [(Self, &'static str); 4] = [
        (Self::BOLD, "bold"),
        (Self::BLINK, "blink"),
        (Self::UNDERLINE, "underline"),
        (Self::INVERSE, "inverse"),
    ];

    fn attr_from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }
}

/// ANSI palette colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

const COLOR_NAMES: [&str; 8] = [
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white",
];

impl Color {
    /// Palette index, 0-15.
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Colour for a palette index; indices above 15 are rejected.
    #[must_use]
    pub const fn from_index(idx: u8) -> Option<Self> {
        Some(match idx {
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            7 => Self::White,
            8 => Self::BrightBlack,
            9 => Self::BrightRed,
            10 => Self::BrightGreen,
            11 => Self::BrightYellow,
            12 => Self::BrightBlue,
            13 => Self::BrightMagenta,
            14 => Self::BrightCyan,
            15 => Self::BrightWhite,
            _ => return None,
        })
    }

    /// Whether this is one of the bright variants.
    #[must_use]
    pub const fn is_bright(self) -> bool {
        self.index() >= 8
    }

    /// Parse a colour name. Lowercase names are the normal colours,
    /// all-uppercase names the bright ones.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(i) = COLOR_NAMES.iter().position(|n| *n == name) {
            return Self::from_index(i as u8);
        }
        let lower = name.to_ascii_lowercase();
        if name.bytes().all(|b| b.is_ascii_uppercase()) {
            if let Some(i) = COLOR_NAMES.iter().position(|n| *n == lower) {
                return Self::from_index(i as u8 + 8);
            }
        }
        None
    }

    /// Name in the form accepted by [`Color::from_name`].
    #[must_use]
    pub fn name(self) -> String {
        let base = COLOR_NAMES[(self.index() % 8) as usize];
        if self.is_bright() {
            base.to_ascii_uppercase()
        } else {
            base.to_string()
        }
    }
}

/// Style applied to a marked span or to the input line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MarkStyle {
    /// Foreground colour (None = unchanged).
    pub fg: Option<Color>,
    /// Background colour (None = unchanged).
    pub bg: Option<Color>,
    /// Rendering attributes.
    pub attributes: TextAttributes,
}

impl MarkStyle {
    /// Style that changes nothing.
    pub const NONE: Self = Self {
        fg: None,
        bg: None,
        attributes: TextAttributes::empty(),
    };

    /// Style with only a foreground colour.
    #[must_use]
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bg: None,
            attributes: TextAttributes::empty(),
        }
    }

    /// Return a copy with the given attributes added.
    #[must_use]
    pub const fn with_attributes(mut self, attrs: TextAttributes) -> Self {
        self.attributes = self.attributes.union(attrs);
        self
    }

    /// Return a copy with a background colour.
    #[must_use]
    pub const fn with_bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Escape sequence that starts this style. Empty for [`MarkStyle::NONE`].
    #[must_use]
    pub fn begin_sequence(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if !self.is_none() {
            // Writing into a Vec cannot fail.
            let _ = ansi::write_style(&mut buf, self);
        }
        buf
    }

    /// Escape sequence that ends this style. Empty for [`MarkStyle::NONE`].
    #[must_use]
    pub fn end_sequence(&self) -> &'static [u8] {
        if self.is_none() {
            b""
        } else {
            ansi::RESET.as_bytes()
        }
    }
}

impl fmt::Display for MarkStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("none");
        }
        let mut words: Vec<String> = TextAttributes::NAMES
            .iter()
            .filter(|(flag, _)| self.attributes.contains(*flag))
            .map(|(_, name)| (*name).to_string())
            .collect();
        if let Some(fg) = self.fg {
            words.push(fg.name());
        }
        if let Some(bg) = self.bg {
            words.push("on".to_string());
            words.push(bg.name());
        }
        f.write_str(&words.join(" "))
    }
}

impl FromStr for MarkStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut style = Self::NONE;
        let mut words = s.split_whitespace();
        let mut seen_any = false;
        while let Some(word) = words.next() {
            seen_any = true;
            if word == "none" {
                continue;
            }
            if word == "on" {
                let name = words
                    .next()
                    .ok_or_else(|| Error::InvalidAttribute(s.to_string()))?;
                let color =
                    Color::from_name(name).ok_or_else(|| Error::InvalidAttribute(name.into()))?;
                style.bg = Some(color);
            } else if let Some(flag) = TextAttributes::attr_from_name(word) {
                style.attributes |= flag;
            } else if let Some(color) = Color::from_name(word) {
                style.fg = Some(color);
            } else {
                return Err(Error::InvalidAttribute(word.to_string()));
            }
        }
        if seen_any {
            Ok(style)
        } else {
            Err(Error::InvalidAttribute(s.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_names() {
        assert_eq!(Color::from_name("red"), Some(Color::Red));
        assert_eq!(Color::from_name("RED"), Some(Color::BrightRed));
        assert_eq!(Color::from_name("Red"), None);
        assert_eq!(Color::BrightCyan.name(), "CYAN");
        for i in 0..16 {
            let c = Color::from_index(i).unwrap();
            assert_eq!(Color::from_name(&c.name()), Some(c));
        }
        assert!(Color::from_index(16).is_none());
    }

    #[test]
    fn test_parse_full_style() {
        let style: MarkStyle = "underline bold RED on black".parse().unwrap();
        assert_eq!(style.fg, Some(Color::BrightRed));
        assert_eq!(style.bg, Some(Color::Black));
        assert!(style.attributes.contains(TextAttributes::BOLD | TextAttributes::UNDERLINE));
        // Display order is canonical, not input order.
        assert_eq!(style.to_string(), "bold underline RED on black");
    }

    #[test]
    fn test_attribute_names_are_lowercase() {
        for (flag, name) in TextAttributes::NAMES {
            let style: MarkStyle = name.parse().unwrap();
            assert_eq!(style.attributes, flag);
            assert!(name.to_uppercase().parse::<MarkStyle>().is_err());
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<MarkStyle>().is_err());
        assert!("sparkly".parse::<MarkStyle>().is_err());
        assert!("red on".parse::<MarkStyle>().is_err());
        assert!("red on mauve".parse::<MarkStyle>().is_err());
    }

    #[test]
    fn test_none_style() {
        let style: MarkStyle = "none".parse().unwrap();
        assert!(style.is_none());
        assert!(style.begin_sequence().is_empty());
        assert!(style.end_sequence().is_empty());
        assert_eq!(style.to_string(), "none");
    }

    #[test]
    fn test_sequences() {
        let style = MarkStyle::fg(Color::Red).with_attributes(TextAttributes::BOLD);
        assert_eq!(style.begin_sequence(), b"\x1b[1;31m".to_vec());
        assert_eq!(style.end_sequence(), b"\x1b[0m");
    }
}
