use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Display width of a string in terminal columns.
///
/// Node names routinely carry flag emoji and CJK region names, which take
/// two columns per glyph.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to at most `max_width` columns, appending "..." when cut.
///
/// Widths of 3 or less have no room for an ellipsis and just keep the
/// characters that fit. Returns `Cow::Borrowed` when nothing is cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width <= ELLIPSIS_WIDTH {
        return Cow::Owned(s[..prefix_end(s, max_width)].to_string());
    }

    let cut = prefix_end(s, max_width - ELLIPSIS_WIDTH);
    Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
}

/// Byte index ending the longest prefix of `s` that fits in `width` columns.
fn prefix_end(s: &str, width: usize) -> usize {
    let mut used = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            return idx;
        }
        used += w;
    }
    s.len()
}

/// Strip terminal control characters and escape sequences.
///
/// Subscription documents are untrusted input; a node name containing
/// `ESC [` or an OSC sequence must not reach the terminal. CSI sequences are
/// dropped up to their final byte, OSC sequences up to BEL or ST, and any
/// other C0 control or DEL is removed. Tab and newline survive.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(is_stripped) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\x1b' {
            if !is_stripped(c) {
                out.push(c);
            }
            continue;
        }

        match chars.peek() {
            Some('[') => {
                chars.next();
                // Parameter and intermediate bytes, then one final byte in 0x40..=0x7e
                for c in chars.by_ref() {
                    if ('\x40'..='\x7e').contains(&c) {
                        break;
                    }
                }
            }
            Some(']') => {
                chars.next();
                while let Some(c) = chars.next() {
                    if c == '\x07' {
                        break;
                    }
                    if c == '\x1b' && chars.peek() == Some(&'\\') {
                        chars.next();
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    Cow::Owned(out)
}

fn is_stripped(c: char) -> bool {
    c == '\x7f' || (c.is_ascii_control() && c != '\t' && c != '\n')
}
