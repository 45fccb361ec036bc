//! Marks and substitutions over remote text.
//!
//! A [`PatternSet`] holds two ordered lists of [`PatternEntry`]: marks,
//! which wrap their match in display attributes, and substitutions, which
//! replace it. [`PatternSet::transform`] runs the substitutions first and
//! then the marks over the result.
//!
//! ```
//! use termline::pattern::{PatternEntry, PatternSet};
//! use termline::style::{Color, MarkStyle};
//!
//! let mut set = PatternSet::new();
//! set.add(PatternEntry::mark(b"&ERROR&", false, MarkStyle::fg(Color::Red)).unwrap());
//! let shown = set.transform(b"fatal ERROR occurred", b" ;").unwrap();
//! assert_eq!(shown, b"fatal \x1b[31mERROR\x1b[0m occurred".to_vec());
//! ```

mod scan;
mod wildcard;

pub use wildcard::{ANY, Pattern, WORD};

use crate::error::{Result, try_to_vec};
use crate::style::MarkStyle;
use scan::{extend, scan};

/// Marker that anchors a pattern to the line start in its textual form.
pub const ANCHOR: u8 = b'^';

/// Split a leading anchor marker off a pattern's textual form.
#[must_use]
pub fn split_anchor(text: &[u8]) -> (bool, &[u8]) {
    match text.split_first() {
        Some((&ANCHOR, rest)) => (true, rest),
        _ => (false, text),
    }
}

/// What happens to a matched span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternAction {
    /// Wrap the span in the style's begin and end sequences.
    Mark(MarkStyle),
    /// Replace the span with this text.
    Substitute(Vec<u8>),
}

/// Which list of a [`PatternSet`] an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Mark,
    Substitution,
}

/// A registered pattern and its action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternEntry {
    pattern: Pattern,
    anchored: bool,
    action: PatternAction,
}

impl PatternEntry {
    pub fn new(pattern: &[u8], anchored: bool, action: PatternAction) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::new(pattern)?,
            anchored,
            action,
        })
    }

    pub fn mark(pattern: &[u8], anchored: bool, style: MarkStyle) -> Result<Self> {
        Self::new(pattern, anchored, PatternAction::Mark(style))
    }

    pub fn substitute(pattern: &[u8], anchored: bool, replacement: &[u8]) -> Result<Self> {
        Self::new(
            pattern,
            anchored,
            PatternAction::Substitute(try_to_vec(replacement)?),
        )
    }

    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Whether the entry only matches at the start of a line.
    #[must_use]
    pub fn anchored(&self) -> bool {
        self.anchored
    }

    #[must_use]
    pub fn action(&self) -> &PatternAction {
        &self.action
    }

    #[must_use]
    pub fn kind(&self) -> PatternKind {
        match self.action {
            PatternAction::Mark(_) => PatternKind::Mark,
            PatternAction::Substitute(_) => PatternKind::Substitution,
        }
    }

    fn same_key(&self, source: &[u8], anchored: bool) -> bool {
        self.anchored == anchored && self.pattern.source() == source
    }
}

/// Ordered marks and substitutions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternSet {
    marks: Vec<PatternEntry>,
    substitutions: Vec<PatternEntry>,
}

impl PatternSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, kind: PatternKind) -> &mut Vec<PatternEntry> {
        match kind {
            PatternKind::Mark => &mut self.marks,
            PatternKind::Substitution => &mut self.substitutions,
        }
    }

    /// Add an entry at the end of its list. An entry with the same pattern
    /// and anchoring is replaced in place and returned.
    pub fn add(&mut self, entry: PatternEntry) -> Option<PatternEntry> {
        let list = self.list_mut(entry.kind());
        let source = entry.pattern.source().to_vec();
        match list.iter_mut().find(|e| e.same_key(&source, entry.anchored)) {
            Some(slot) => Some(std::mem::replace(slot, entry)),
            None => {
                list.push(entry);
                None
            }
        }
    }

    /// Remove the entry with this pattern and anchoring.
    pub fn remove(&mut self, kind: PatternKind, pattern: &[u8], anchored: bool) -> Option<PatternEntry> {
        let list = self.list_mut(kind);
        let i = list.iter().position(|e| e.same_key(pattern, anchored))?;
        Some(list.remove(i))
    }

    #[must_use]
    pub fn marks(&self) -> &[PatternEntry] {
        &self.marks
    }

    #[must_use]
    pub fn substitutions(&self) -> &[PatternEntry] {
        &self.substitutions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty() && self.substitutions.is_empty()
    }

    /// Wrap every mark match in its style.
    pub fn apply_marks(&self, line: &[u8], delims: &[u8]) -> Result<Vec<u8>> {
        scan(&self.marks, line, delims, |out, entry, span| {
            if let PatternAction::Mark(style) = entry.action() {
                extend(out, &style.begin_sequence())?;
                extend(out, span)?;
                extend(out, style.end_sequence())
            } else {
                extend(out, span)
            }
        })
    }

    /// Replace every substitution match.
    pub fn apply_substitutions(&self, line: &[u8], delims: &[u8]) -> Result<Vec<u8>> {
        scan(&self.substitutions, line, delims, |out, entry, span| {
            if let PatternAction::Substitute(text) = entry.action() {
                extend(out, text)
            } else {
                extend(out, span)
            }
        })
    }

    /// Substitutions, then marks.
    pub fn transform(&self, line: &[u8], delims: &[u8]) -> Result<Vec<u8>> {
        if self.substitutions.is_empty() {
            return self.apply_marks(line, delims);
        }
        let replaced = self.apply_substitutions(line, delims)?;
        if self.marks.is_empty() {
            return Ok(replaced);
        }
        self.apply_marks(&replaced, delims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, TextAttributes};

    const DELIMS: &[u8] = b" ;";

    fn red() -> MarkStyle {
        MarkStyle::fg(Color::Red)
    }

    #[test]
    fn test_split_anchor() {
        assert_eq!(split_anchor(b"^$foo"), (true, &b"$foo"[..]));
        assert_eq!(split_anchor(b"foo"), (false, &b"foo"[..]));
        assert_eq!(split_anchor(b""), (false, &b""[..]));
    }

    #[test]
    fn test_mark_exact_span() {
        let mut set = PatternSet::new();
        set.add(PatternEntry::mark(b"&ERROR&", false, red()).unwrap());
        let out = set.apply_marks(b"fatal ERROR occurred", DELIMS).unwrap();
        assert_eq!(out, b"fatal \x1b[31mERROR\x1b[0m occurred".to_vec());
    }

    #[test]
    fn test_anchored_word_mark() {
        let mut set = PatternSet::new();
        let bold = MarkStyle::NONE.with_attributes(TextAttributes::BOLD);
        set.add(PatternEntry::mark(b"$foo", true, bold).unwrap());
        assert_eq!(
            set.apply_marks(b"foo bar", DELIMS).unwrap(),
            b"\x1b[1mfoo\x1b[0m bar".to_vec()
        );
        assert_eq!(set.apply_marks(b"xfoo bar", DELIMS).unwrap(), b"xfoo bar".to_vec());
        assert_eq!(set.apply_marks(b"bar foo", DELIMS).unwrap(), b"bar foo".to_vec());
    }

    #[test]
    fn test_substitution_not_rescanned() {
        let mut set = PatternSet::new();
        set.add(PatternEntry::substitute(b"cat", false, b"catcat").unwrap());
        assert_eq!(
            set.apply_substitutions(b"a cat, a cat", DELIMS).unwrap(),
            b"a catcat, a catcat".to_vec()
        );
    }

    #[test]
    fn test_transform_substitutes_then_marks() {
        let mut set = PatternSet::new();
        set.add(PatternEntry::mark(b"gold", false, red()).unwrap());
        set.add(PatternEntry::substitute(b"coins", false, b"gold").unwrap());
        assert_eq!(
            set.transform(b"5 coins", DELIMS).unwrap(),
            b"5 \x1b[31mgold\x1b[0m".to_vec()
        );
    }

    #[test]
    fn test_transform_without_entries() {
        let set = PatternSet::new();
        assert!(set.is_empty());
        assert_eq!(set.transform(b"as is", DELIMS).unwrap(), b"as is".to_vec());
    }

    #[test]
    fn test_add_replaces_same_pattern() {
        let mut set = PatternSet::new();
        assert!(set.add(PatternEntry::mark(b"x", false, red()).unwrap()).is_none());
        set.add(PatternEntry::mark(b"y", false, red()).unwrap());
        let old = set.add(PatternEntry::mark(b"x", false, MarkStyle::NONE).unwrap());
        assert_eq!(old.unwrap().action(), &PatternAction::Mark(red()));
        assert_eq!(set.marks().len(), 2);
        assert_eq!(set.marks()[0].action(), &PatternAction::Mark(MarkStyle::NONE));
        // Anchoring is part of the key.
        set.add(PatternEntry::mark(b"x", true, red()).unwrap());
        assert_eq!(set.marks().len(), 3);
    }

    #[test]
    fn test_remove() {
        let mut set = PatternSet::new();
        set.add(PatternEntry::substitute(b"a", false, b"b").unwrap());
        assert!(set.remove(PatternKind::Mark, b"a", false).is_none());
        assert!(set.remove(PatternKind::Substitution, b"a", true).is_none());
        assert!(set.remove(PatternKind::Substitution, b"a", false).is_some());
        assert!(set.is_empty());
    }

    #[test]
    fn test_none_style_mark_copies_span() {
        let mut set = PatternSet::new();
        set.add(PatternEntry::mark(b"plain", false, MarkStyle::NONE).unwrap());
        assert_eq!(set.apply_marks(b"a plain b", DELIMS).unwrap(), b"a plain b".to_vec());
    }
}
