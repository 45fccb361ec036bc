//! Reversible backslash escaping for patterns, words and history text.
//!
//! `\` escapes the next byte. A run of backslashes that must stay literal is
//! closed by a backtick. Bytes outside printable ASCII become `\NNN` octal.
//! Bytes in [`SPECIAL_CHARS`] are always escaped since they carry meaning in
//! the command language.

use crate::error::Result;

/// Escape introducer.
pub const ESCAPE: u8 = b'\\';
/// Terminates a literal run of escape introducers.
pub const ESCAPE_END: u8 = b'`';
/// Printable bytes that are escaped anyway.
pub const SPECIAL_CHARS: &[u8] = b"{}();\"=";

#[inline]
const fn is_octal(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

fn put(out: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    out.try_reserve(bytes.len())?;
    out.extend_from_slice(bytes);
    Ok(())
}

/// Escape `src` so that [`unescape`] restores it exactly.
///
/// Fails with [`Error::OutOfMemory`](crate::Error::OutOfMemory) if the
/// output cannot grow.
pub fn escape(src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve(src.len() + src.len() / 2)?;
    let mut i = 0;
    while i < src.len() {
        let mut after_run = false;
        if src[i] == ESCAPE {
            while i < src.len() && src[i] == ESCAPE {
                put(&mut out, &[ESCAPE])?;
                i += 1;
            }
            if i == src.len() || src[i] == ESCAPE_END {
                put(&mut out, &[ESCAPE_END])?;
            } else {
                after_run = true;
            }
        }
        let Some(&b) = src.get(i) else { break };

        if !(b' '..=b'~').contains(&b) {
            if after_run {
                // An octal escape is only decoded straight after a single
                // introducer, so the run has to be closed first.
                put(&mut out, &[ESCAPE_END])?;
            }
            put(
                &mut out,
                &[
                    ESCAPE,
                    b'0' + (b >> 6),
                    b'0' + ((b >> 3) & 7),
                    b'0' + (b & 7),
                ],
            )?;
        } else {
            if after_run || SPECIAL_CHARS.contains(&b) {
                put(&mut out, &[ESCAPE])?;
            }
            put(&mut out, &[b])?;
        }
        i += 1;
    }
    Ok(out)
}

/// Remove one level of escaping from `buf` in place.
///
/// Works over the full length of `buf`, so escapes that decode to NUL are
/// preserved. The result is never longer than the input.
pub fn unescape_in_place(buf: &mut Vec<u8>) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Normal,
        Single,
        Run,
    }

    let len = buf.len();
    let mut r = 0;
    let mut w = 0;
    let mut state = State::Normal;
    while r < len {
        let b = buf[r];
        if state == State::Normal {
            if b == ESCAPE {
                state = State::Single;
            } else {
                buf[w] = b;
                w += 1;
            }
            r += 1;
            continue;
        }
        if b == ESCAPE {
            state = State::Run;
            buf[w] = b;
            r += 1;
        } else if b == ESCAPE_END {
            state = State::Normal;
            buf[w] = ESCAPE;
            r += 1;
        } else {
            if state == State::Single
                && r + 3 <= len
                && is_octal(buf[r])
                && is_octal(buf[r + 1])
                && is_octal(buf[r + 2])
            {
                buf[w] = ((buf[r] - b'0') << 6) | ((buf[r + 1] - b'0') << 3) | (buf[r + 2] - b'0');
                r += 3;
            } else {
                buf[w] = b;
                r += 1;
            }
            state = State::Normal;
        }
        w += 1;
    }
    buf.truncate(w);
}

/// Copying form of [`unescape_in_place`].
#[must_use]
pub fn unescape(src: &[u8]) -> Vec<u8> {
    let mut buf = src.to_vec();
    unescape_in_place(&mut buf);
    buf
}

/// Offset of the first `ch` not preceded by an escape introducer, or
/// `s.len()` if there is none. A `ch` in first position always counts.
#[must_use]
pub fn find_unescaped(s: &[u8], ch: u8) -> usize {
    if s.is_empty() || s[0] == ch {
        return 0;
    }
    (1..s.len())
        .find(|&i| s[i] == ch && s[i - 1] != ESCAPE)
        .unwrap_or(s.len())
}

/// Split `s` at the first unescaped `ch`, dropping the separator.
#[must_use]
pub fn split_unescaped(s: &[u8], ch: u8) -> Option<(&[u8], &[u8])> {
    let at = find_unescaped(s, ch);
    (at < s.len()).then(|| (&s[..at], &s[at + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esc(s: &[u8]) -> String {
        String::from_utf8(escape(s).unwrap()).unwrap()
    }

    #[test]
    fn test_escape_specials_and_controls() {
        assert_eq!(esc(b"plain text"), "plain text");
        assert_eq!(esc(b"a=b;c"), "a\\=b\\;c");
        assert_eq!(esc(b"(x)"), "\\(x\\)");
        assert_eq!(esc(b"bell\x07"), "bell\\007");
        assert_eq!(esc(&[0xe9]), "\\351");
    }

    #[test]
    fn test_escape_backslash_runs() {
        assert_eq!(esc(b"a\\b"), "a\\\\b");
        assert_eq!(esc(b"tail\\"), "tail\\`");
        assert_eq!(esc(b"\\\\"), "\\\\`");
        assert_eq!(esc(b"\\`"), "\\``");
        assert_eq!(esc(b"\\\x01"), "\\`\\001");
    }

    #[test]
    fn test_escape_grows_past_initial_reservation() {
        let src = vec![0xffu8; 5000];
        let out = escape(&src).unwrap();
        assert_eq!(out.len(), 4 * src.len());
        assert!(out.chunks(4).all(|c| c == b"\\377"));
        assert_eq!(unescape(&out), src);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(b"a\\=b"), b"a=b");
        assert_eq!(unescape(b"\\101\\102"), b"AB");
        assert_eq!(unescape(b"x\\000y"), b"x\0y");
        assert_eq!(unescape(b"\\\\101"), b"\\101");
        assert_eq!(unescape(b"end\\`"), b"end\\");
        assert_eq!(unescape(b"dangling\\"), b"dangling");
        assert_eq!(unescape(b"\\12"), b"12");
    }

    #[test]
    fn test_round_trip_tricky_inputs() {
        let inputs: [&[u8]; 7] = [
            b"",
            b"\\",
            b"\\\\`\\",
            b"{\"q\"}",
            b"\\777",
            b"\x1b[31m\\\x1b",
            &[0, 1, 255, b'\\', 0],
        ];
        for input in inputs {
            assert_eq!(unescape(&escape(input).unwrap()), input, "input {input:?}");
        }
    }

    #[test]
    fn test_find_unescaped() {
        assert_eq!(find_unescaped(b"abc=def", b'='), 3);
        assert_eq!(find_unescaped(b"ab\\=c=d", b'='), 5);
        assert_eq!(find_unescaped(b"=x", b'='), 0);
        assert_eq!(find_unescaped(b"none", b'='), 4);
        assert_eq!(split_unescaped(b"k\\=v=w", b'='), Some((&b"k\\=v"[..], &b"w"[..])));
        assert_eq!(split_unescaped(b"kv", b'='), None);
    }
}
