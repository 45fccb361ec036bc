//! Wildcard patterns.
//!
//! A pattern is literal text with two wildcards: `&` matches any run of
//! text and `$` matches a single word. `\&` and `\$` stand for the literal
//! characters. Adjacent wildcards collapse into one: a run of `$` stays a
//! word, any run containing `&` becomes `&`.

use crate::error::{Result, try_to_vec};
use crate::text::escape::ESCAPE;

/// Wildcard marker for arbitrary text.
pub const ANY: u8 = b'&';
/// Wildcard marker for a single word.
pub const WORD: u8 = b'$';

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(Vec<u8>),
    Any,
    Word,
}

impl Segment {
    fn is_wildcard(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }
}

/// Compiled wildcard pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    source: Vec<u8>,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compile `source`.
    pub fn new(source: &[u8]) -> Result<Self> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut literal = Vec::new();
        let mut i = 0;
        while i < source.len() {
            let b = source[i];
            if b == ESCAPE && matches!(source.get(i + 1), Some(&(ANY | WORD))) {
                literal.try_reserve(1)?;
                literal.push(source[i + 1]);
                i += 2;
                continue;
            }
            if b == ANY || b == WORD {
                if !literal.is_empty() {
                    segments.try_reserve(1)?;
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let wild = if b == ANY { Segment::Any } else { Segment::Word };
                match segments.last_mut() {
                    Some(last) if last.is_wildcard() => {
                        if wild == Segment::Any {
                            *last = Segment::Any;
                        }
                    }
                    _ => {
                        segments.try_reserve(1)?;
                        segments.push(wild);
                    }
                }
            } else {
                literal.try_reserve(1)?;
                literal.push(b);
            }
            i += 1;
        }
        if !literal.is_empty() {
            segments.try_reserve(1)?;
            segments.push(Segment::Literal(literal));
        }
        Ok(Self {
            source: try_to_vec(source)?,
            segments,
        })
    }

    /// Text the pattern was compiled from.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    #[must_use]
    pub fn has_wildcards(&self) -> bool {
        self.segments.iter().any(Segment::is_wildcard)
    }

    /// Find the first match in `text`, returning the matched span.
    ///
    /// With `anchored` set, the first literal must occur at offset 0. A
    /// leading `&` is part of the span only when anchored; a trailing `&`
    /// never is. A `$` in the middle rejects any capture holding a
    /// delimiter; a leading `$` takes the last word before the following
    /// literal; a trailing `$` ends at the first delimiter; a lone `$` takes
    /// the first word.
    #[must_use]
    pub fn find(&self, text: &[u8], anchored: bool, delims: &[u8]) -> Option<(usize, usize)> {
        let is_delim = |b: &u8| delims.contains(b);
        let segs = &self.segments;

        let mut start: Option<usize> = None;
        let mut end = 0;
        let mut src = 0;
        let mut i = 0;
        let mut first = true;

        while i < segs.len() {
            let wildcard = if segs[i].is_wildcard() {
                i += 1;
                Some(&segs[i - 1])
            } else {
                None
            };
            let literal = match segs.get(i) {
                Some(Segment::Literal(lit)) => {
                    i += 1;
                    Some(lit.as_slice())
                }
                _ => None,
            };
            let prm = src;
            let context_only = first && !anchored && wildcard == Some(&Segment::Any);

            let endprm = match literal {
                Some(lit) => {
                    let at = src + find_bytes(&text[src..], lit)?;
                    if first && anchored && at != src {
                        return None;
                    }
                    if start.is_none() {
                        start = Some(if wildcard.is_some() && !context_only {
                            src
                        } else {
                            at
                        });
                    }
                    end = at + lit.len();
                    src = end;
                    at
                }
                None => {
                    src = text.len();
                    match wildcard {
                        Some(Segment::Any) if start.is_some() => {}
                        _ => {
                            start.get_or_insert(prm);
                            end = text.len();
                        }
                    }
                    text.len()
                }
            };

            if wildcard == Some(&Segment::Word) {
                let capture = &text[prm..endprm];
                if first && !anchored {
                    if literal.is_none() {
                        let from = prm + capture.iter().position(|b| !is_delim(b))?;
                        let len = text[from..]
                            .iter()
                            .position(is_delim)
                            .unwrap_or(text.len() - from);
                        start = Some(from);
                        end = from + len;
                    } else {
                        // Delimiters right before the literal belong to no word.
                        let word_end = capture.iter().rposition(|b| !is_delim(b))? + 1;
                        let from = capture[..word_end]
                            .iter()
                            .rposition(is_delim)
                            .map_or(prm, |p| prm + p + 1);
                        start = Some(from);
                    }
                } else if literal.is_none() {
                    if let Some(p) = capture.iter().position(is_delim) {
                        end = prm + p;
                    }
                } else if capture.iter().any(is_delim) {
                    return None;
                }
            }
            first = false;
        }
        start.map(|s| (s, end))
    }
}

/// Offset of the first occurrence of `needle` in `hay`.
pub(crate) fn find_bytes(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    hay.windows(needle.len()).position(|w| w == needle)
}
