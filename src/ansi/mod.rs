//! ANSI escape sequence generation.
//!
//! Only CSI sequences are produced: cursor positioning, relative motion,
//! clears, and SGR attributes. No terminal database is consulted.

pub mod output;
pub mod sequences;

pub use output::AnsiWriter;
pub use sequences::*;

use crate::style::{MarkStyle, TextAttributes};
use std::io::{self, Write};

/// Write a u32 as decimal digits to a writer without formatting overhead.
///
/// Stack buffer is sized for max u32 digits (10) to avoid heap allocation.
#[inline]
fn write_u32_decimal(w: &mut impl Write, n: u32) -> io::Result<()> {
    if n < 10 {
        return w.write_all(&[b'0' + n as u8]);
    }
    if n < 100 {
        return w.write_all(&[b'0' + (n / 10) as u8, b'0' + (n % 10) as u8]);
    }

    let mut buf = [0u8; 10];
    let mut i = buf.len();
    let mut val = n;
    while val > 0 {
        i -= 1;
        buf[i] = b'0' + (val % 10) as u8;
        val /= 10;
    }
    w.write_all(&buf[i..])
}

/// Write the SGR sequence that starts `style`.
///
/// Attribute codes come first, then foreground, then background, all in a
/// single CSI sequence.
pub fn write_style(w: &mut impl Write, style: &MarkStyle) -> io::Result<()> {
    // At most four attributes and two colours.
    let mut codes: [u8; 6] = [0; 6];
    let mut count = 0;

    for (flag, code) in [
        (TextAttributes::BOLD, 1),
        (TextAttributes::UNDERLINE, 4),
        (TextAttributes::BLINK, 5),
        (TextAttributes::INVERSE, 7),
    ] {
        if style.attributes.contains(flag) {
            codes[count] = code;
            count += 1;
        }
    }
    if let Some(fg) = style.fg {
        let idx = fg.index();
        // 30-37 for normal, 90-97 for bright
        codes[count] = if idx < 8 { 30 + idx } else { 90 + idx - 8 };
        count += 1;
    }
    if let Some(bg) = style.bg {
        let idx = bg.index();
        // 40-47 for normal, 100-107 for bright
        codes[count] = if idx < 8 { 40 + idx } else { 100 + idx - 8 };
        count += 1;
    }

    if count == 0 {
        return Ok(());
    }
    w.write_all(b"\x1b[")?;
    for (i, code) in codes[..count].iter().enumerate() {
        if i > 0 {
            w.write_all(b";")?;
        }
        write_u32_decimal(w, u32::from(*code))?;
    }
    w.write_all(b"m")
}

/// Generate cursor position sequence (0-indexed input, 1-indexed output).
#[must_use]
pub fn cursor_position(row: u32, col: u32) -> String {
    let mut buf = Vec::new();
    let _ = write_cursor_position(&mut buf, row, col);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write cursor position sequence to a writer.
pub fn write_cursor_position(w: &mut impl Write, row: u32, col: u32) -> io::Result<()> {
    w.write_all(b"\x1b[")?;
    write_u32_decimal(w, row + 1)?;
    w.write_all(b";")?;
    write_u32_decimal(w, col + 1)?;
    w.write_all(b"H")
}

/// Write a horizontal cursor movement (`dx > 0` moves right).
pub fn write_cursor_horizontal(w: &mut impl Write, dx: i32) -> io::Result<()> {
    if dx > 0 {
        w.write_all(b"\x1b[")?;
        write_u32_decimal(w, dx.unsigned_abs())?;
        w.write_all(b"C")
    } else if dx < 0 {
        w.write_all(b"\x1b[")?;
        write_u32_decimal(w, dx.unsigned_abs())?;
        w.write_all(b"D")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn readable(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).replace('\x1b', "ESC")
    }

    #[test]
    fn snapshot_cursor_sequences() {
        let mut buf = Vec::new();
        write_cursor_position(&mut buf, 0, 0).unwrap();
        write_cursor_position(&mut buf, 23, 79).unwrap();
        write_cursor_horizontal(&mut buf, 3).unwrap();
        write_cursor_horizontal(&mut buf, -120).unwrap();
        write_cursor_horizontal(&mut buf, 0).unwrap();
        insta::assert_snapshot!(readable(&buf), @"ESC[1;1HESC[24;80HESC[3CESC[120D");
    }

    #[test]
    fn snapshot_style_sequences() {
        let styles = [
            MarkStyle::fg(Color::Red),
            MarkStyle::fg(Color::BrightGreen).with_bg(Color::Blue),
            MarkStyle::NONE.with_attributes(TextAttributes::INVERSE | TextAttributes::BOLD),
            MarkStyle::NONE.with_bg(Color::BrightWhite),
        ];
        let rendered: Vec<String> = styles
            .iter()
            .map(|s| readable(&s.begin_sequence()))
            .collect();
        insta::assert_json_snapshot!(rendered, @r#"
        [
          "ESC[31m",
          "ESC[92;44m",
          "ESC[1;7m",
          "ESC[107m"
        ]
        "#);
    }

    #[test]
    fn test_decimal_widths() {
        for n in [0u32, 9, 10, 99, 100, 4096, u32::MAX] {
            let mut buf = Vec::new();
            write_u32_decimal(&mut buf, n).unwrap();
            assert_eq!(String::from_utf8(buf).unwrap(), n.to_string());
        }
    }

    #[test]
    fn test_cursor_position_string() {
        assert_eq!(cursor_position(4, 9), "\x1b[5;10H");
    }
}
