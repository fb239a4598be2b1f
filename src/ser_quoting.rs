//! Quoting decisions and quoted-scalar writers for the emitter.

use std::fmt::{self, Write};

use crate::node::ScalarKind;
use crate::parse_scalars::infer_kind;

/// Returns true if `s` can be emitted as a plain scalar without changing the document
/// structure. This says nothing about the kind the text would be read back as; see
/// [`plain_reads_as`].
///
/// `flow` additionally rejects the flow indicators `,[]{}`.
#[inline]
pub(crate) fn is_plain_safe(s: &str, flow: bool) -> bool {
    if s.is_empty() {
        return false;
    }
    let bytes = s.as_bytes();
    if bytes[0].is_ascii_whitespace()
        || bytes[bytes.len() - 1].is_ascii_whitespace()
        || matches!(
            bytes[0],
            b'['
                | b']'
                | b'{'
                | b'}'
                | b'#'
                | b'&'
                | b'*'
                | b'!'
                | b'|'
                | b'>'
                | b'\''
                | b'"'
                | b'%'
                | b'@'
                | b'`'
                | b','
        )
    {
        return false;
    }
    // `-`, `?` and `:` are indicators only when followed by a space or ending the text,
    // so `-5` and `-.inf` stay plain.
    if matches!(bytes[0], b'-' | b'?' | b':') && bytes.get(1).is_none_or(|b| *b == b' ') {
        return false;
    }
    if s.starts_with("...") || s.starts_with("---") {
        return false;
    }
    if s.chars().any(|c| c.is_control()) {
        return false;
    }
    // A colon is fine inside a value, but not before a space or at the end. `#` starts a
    // comment only after whitespace; the leading case is handled above.
    if s.contains(": ") || s.ends_with(':') || s.contains(" #") {
        return false;
    }
    if flow && contains_any(s, &[',', '[', ']', '{', '}']) {
        return false;
    }
    true
}

/// Mapping keys are always strings in the node model, so reserved words such as `true`
/// stay plain; only structure matters.
#[inline]
pub(crate) fn is_plain_key_safe(s: &str, flow: bool) -> bool {
    is_plain_safe(s, flow) && !s.contains(':')
}

/// Whether the text written plain reads back with the given kind.
#[inline]
pub(crate) fn plain_reads_as(s: &str, kind: ScalarKind) -> bool {
    infer_kind(s) == kind
}

fn contains_any(string: &str, values: &[char]) -> bool {
    string.chars().any(|x| values.contains(&x))
}

/// Whether a single-quoted scalar can hold `s` on one line.
pub(crate) fn single_quote_compatible(s: &str) -> bool {
    !s.chars().any(|c| c.is_control())
}

pub(crate) fn write_single_quoted<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('\'')?;
    for c in s.chars() {
        if c == '\'' {
            out.write_str("''")?;
        } else {
            out.write_char(c)?;
        }
    }
    out.write_char('\'')
}

pub(crate) fn write_double_quoted<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            '\r' => out.write_str("\\r")?,
            '\0' => out.write_str("\\0")?,
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xFF {
                    write!(out, "\\x{code:02X}")?;
                } else {
                    write!(out, "\\u{code:04X}")?;
                }
            }
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_characters_need_quotes() {
        assert!(is_plain_safe("hello world", false));
        assert!(is_plain_safe("http://example.com", false));
        assert!(!is_plain_safe("a: b", false));
        assert!(!is_plain_safe("trailing:", false));
        assert!(!is_plain_safe("x # y", false));
        assert!(!is_plain_safe("#tag", false));
        assert!(is_plain_safe("C#", false));
        assert!(is_plain_safe("a#b", true));
        assert!(!is_plain_safe("- item", false));
        assert!(!is_plain_safe("-", false));
        assert!(is_plain_safe("-5", false));
        assert!(is_plain_safe("-.inf", false));
        assert!(!is_plain_safe("---", false));
        assert!(!is_plain_safe(" padded", false));
        assert!(!is_plain_safe("", false));
        assert!(is_plain_safe("a,b", false));
        assert!(!is_plain_safe("a,b", true));
    }

    #[test]
    fn reserved_words_are_not_strings() {
        assert!(!plain_reads_as("true", ScalarKind::Str));
        assert!(!plain_reads_as("null", ScalarKind::Str));
        assert!(!plain_reads_as("12", ScalarKind::Str));
        assert!(plain_reads_as("12", ScalarKind::Int));
        assert!(plain_reads_as("twelve", ScalarKind::Str));
    }

    #[test]
    fn escapes() {
        let mut out = String::new();
        write_double_quoted(&mut out, "a\"b\\c\nd\u{1}").unwrap();
        assert_eq!(out, r#""a\"b\\c\nd\x01""#);

        let mut out = String::new();
        write_single_quoted(&mut out, "it's").unwrap();
        assert_eq!(out, "'it''s'");
    }
}
