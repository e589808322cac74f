//! `{key}` placeholder substitution against the state bag.
//!
//! A placeholder is a `{` … `}` span. A `{` preceded by an odd run of
//! backslashes is literal. Backslashes are kept in the output as written.

use crate::bag::StateBag;

/// A placeholder span found by [`scan_for_template`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    /// Byte offset of the opening `{`.
    pub start: usize,
    /// Byte offset one past the closing `}`.
    pub end: usize,
    /// The text between the braces.
    pub key: String,
}

fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    let run = bytes[..idx].iter().rev().take_while(|&&b| b == b'\\').count();
    run % 2 == 1
}

/// Find the first well-formed, unescaped placeholder in `text`.
///
/// An unterminated `{` is not a match.
pub fn scan_for_template(text: &str) -> Option<TemplateMatch> {
    let bytes = text.as_bytes();
    let mut open: Option<usize> = None;

    for (idx, &b) in bytes.iter().enumerate() {
        match b {
            b'{' if !is_escaped(bytes, idx) => open = Some(idx),
            b'}' => {
                if let Some(start) = open {
                    return Some(TemplateMatch {
                        start,
                        end: idx + 1,
                        key: text[start + 1..idx].to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    None
}

/// Replace every placeholder in `text` with its value from `bag`.
///
/// Only the unprocessed remainder is scanned after each substitution, so a
/// value that itself looks like `{other}` is emitted verbatim. Missing keys
/// render as `<<ERROR: key not in state bag>>`.
pub fn statify(text: &str, bag: &StateBag) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(m) = scan_for_template(rest) {
        out.push_str(&rest[..m.start]);
        match bag.get(&m.key) {
            Some(value) => out.push_str(&value.to_string()),
            None => {
                out.push_str("<<ERROR: ");
                out.push_str(&m.key);
                out.push_str(" not in state bag>>");
            }
        }
        rest = &rest[m.end..];
    }
    out.push_str(rest);
    out
}
