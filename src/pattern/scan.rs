//! Leftmost-first scan over an ordered entry list.

use super::PatternEntry;
use crate::error::Result;

/// Per-entry match state for one scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scratch {
    Untried,
    Found(usize, usize),
    Failed,
}

pub(crate) fn extend(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    out.try_reserve(bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Transform `line` in one left-to-right pass.
///
/// Each round picks the entry whose match starts earliest at or after the
/// scan position (list order breaks ties), copies the text before it, lets
/// `splice` write the match, and resumes after the matched span. A match
/// found in an earlier round is reused while it still lies ahead of the
/// scan position; a failed entry stays failed for the rest of the line.
/// Anchored entries are only tried before the first match is applied.
pub(crate) fn scan<F>(entries: &[PatternEntry], line: &[u8], delims: &[u8], mut splice: F) -> Result<Vec<u8>>
where
    F: FnMut(&mut Vec<u8>, &PatternEntry, &[u8]) -> Result<()>,
{
    let mut out = Vec::new();
    out.try_reserve(line.len())?;

    let mut scratch = vec![Scratch::Untried; entries.len()];
    let mut pos = 0;
    let mut at_line_start = true;

    while pos < line.len() {
        let mut best: Option<(usize, usize, usize)> = None;
        for (k, entry) in entries.iter().enumerate() {
            let found = match scratch[k] {
                Scratch::Found(s, e) if s >= pos => Some((s, e)),
                Scratch::Failed => None,
                _ => {
                    let hit = if entry.anchored() && !at_line_start {
                        None
                    } else {
                        entry
                            .pattern()
                            .find(&line[pos..], entry.anchored(), delims)
                            .map(|(s, e)| (pos + s, pos + e))
                            .filter(|(s, e)| e > s)
                    };
                    scratch[k] = hit.map_or(Scratch::Failed, |(s, e)| Scratch::Found(s, e));
                    hit
                }
            };
            if let Some((s, e)) = found {
                if s < line.len() && best.is_none_or(|(_, bs, _)| s < bs) {
                    best = Some((k, s, e));
                }
            }
        }

        let Some((k, s, e)) = best else {
            break;
        };
        extend(&mut out, &line[pos..s])?;
        splice(&mut out, &entries[k], &line[s..e])?;
        pos = e;
        at_line_start = false;
    }

    extend(&mut out, &line[pos..])?;
    Ok(out)
}
