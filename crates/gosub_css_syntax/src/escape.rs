//! CSS escape codec
//!
//! Encodes and decodes [CSS escapes](https://www.w3.org/TR/css-syntax-3/#escaping). The same
//! rules are used by the tokenizer when it reads identifiers and strings, and by the
//! serializers when they write names and strings back to text.

use crate::unicode::{code_point_to_char, is_ident_char, UnicodeChar};
use gosub_css_shared::char_stream::Location;
use gosub_css_shared::errors::{CssError, CssErrorKind, CssResult};

/// Options that define how a text is escaped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscapeOptions {
    /// Apply identifier rules: anything that is not an ident code point is escaped, and a
    /// leading digit (or `-` followed by a digit) is written as a hex escape
    pub identifier: bool,
    /// Quote character of the string the text is written into
    pub quote: Option<char>,
}

impl Default for EscapeOptions {
    fn default() -> Self {
        Self {
            identifier: true,
            quote: None,
        }
    }
}

fn is_css_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{000C}')
}

/// Decodes the escape that starts after a backslash. `peek(n)` returns the n-th character after
/// the backslash. Returns the decoded character and the number of characters the escape uses
/// (the backslash not included), or `None` when nothing follows the backslash.
///
/// A hex escape takes at most 6 digits and swallows one whitespace character, where CR LF
/// counts as one.
pub fn decode_escape(peek: impl Fn(usize) -> Option<char>) -> Option<(char, usize)> {
    let first = peek(0)?;
    if !first.is_ascii_hexdigit() {
        return Some((first, 1));
    }

    let mut code_point: u32 = 0;
    let mut len = 0;
    while len < 6 {
        match peek(len).and_then(|c| c.to_digit(16)) {
            Some(d) => {
                code_point = code_point * 16 + d;
                len += 1;
            }
            None => break,
        }
    }

    match peek(len) {
        Some('\r') if peek(len + 1) == Some('\n') => len += 2,
        Some(c) if is_css_whitespace(c) => len += 1,
        _ => {}
    }

    Some((code_point_to_char(code_point), len))
}

/// Decodes all escape sequences in the given text
pub fn unescape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;

        if c != '\\' {
            result.push(c);
            continue;
        }

        // A backslash at the end of the input is dropped
        let Some((decoded, len)) = decode_escape(|n| chars.get(i + n).copied()) else {
            break;
        };
        result.push(decoded);
        i += len;
    }

    result
}

/// Escapes the given text so it can be written back as CSS
pub fn escape(text: &str, options: EscapeOptions) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let next = chars.get(i + 1).copied();

        let hex_escape = c == UnicodeChar::NULL
            || ('\u{0001}'..='\u{001F}').contains(&c)
            || c == UnicodeChar::DELETE
            || (options.identifier
                && c.is_ascii_digit()
                && (i == 0 || (i == 1 && chars[0] == '-')));

        if hex_escape {
            let code_point = if c == UnicodeChar::NULL {
                UnicodeChar::REPLACEMENT_CHARACTER as u32
            } else {
                c as u32
            };
            result.push_str(&format!("\\{code_point:x}"));
            if matches!(next, Some(n) if n.is_ascii_hexdigit() || n == ' ') {
                result.push(' ');
            }
            continue;
        }

        let needs_backslash = if options.identifier {
            c.is_ascii() && !is_ident_char(c) || (c == '-' && i == 0 && chars.len() == 1)
        } else {
            c == '\\' || Some(c) == options.quote
        };

        if needs_backslash {
            result.push('\\');
        }
        result.push(c);
    }

    result
}

/// Escapes the given text as an identifier
pub fn escape_identifier(text: &str) -> String {
    escape(text, EscapeOptions::default())
}

/// Escapes the given text so it can be placed inside a string quoted with `quote`
pub fn escape_string(text: &str, quote: char) -> String {
    escape(
        text,
        EscapeOptions {
            identifier: false,
            quote: Some(quote),
        },
    )
}

/// Returns true when the buffer ends inside an escape sequence, or ends with a character that
/// belongs to an escape sequence (an escaped character, or the whitespace that terminates a
/// hex escape). Trimming such a buffer would change its meaning.
pub fn buffer_ends_with_escaped_char_or_whitespace(buffer: &str) -> bool {
    let chars: Vec<char> = buffer.chars().collect();
    let Some(&last) = chars.last() else {
        return false;
    };

    let odd_backslashes_before = |end: usize| -> bool {
        let count = chars[..end].iter().rev().take_while(|c| **c == '\\').count();
        count % 2 == 1
    };

    // Unterminated escape: odd backslash run followed by at most 6 hex digits
    let hex_tail = chars.iter().rev().take_while(|c| c.is_ascii_hexdigit()).count();
    if hex_tail <= 6 && odd_backslashes_before(chars.len() - hex_tail) {
        return true;
    }

    if is_css_whitespace(last) {
        let mut end = chars.len() - 1;
        if last == '\n' && end > 0 && chars[end - 1] == '\r' {
            end -= 1;
        }

        // Escaped whitespace
        if odd_backslashes_before(end) {
            return true;
        }

        // Whitespace terminating a hex escape
        let hex_run = chars[..end]
            .iter()
            .rev()
            .take_while(|c| c.is_ascii_hexdigit())
            .count();
        return (1..=6).contains(&hex_run) && odd_backslashes_before(end - hex_run);
    }

    odd_backslashes_before(chars.len() - 1)
}

/// Trims surrounding whitespace from raw CSS text, but keeps trailing whitespace that belongs to
/// an escape (`a\ ` or the space ending `\41 `)
pub fn trim_unescaped(text: &str) -> &str {
    let mut trimmed = text.trim_start_matches(is_css_whitespace);
    while let Some(rest) = trimmed.strip_suffix(is_css_whitespace) {
        if buffer_ends_with_escaped_char_or_whitespace(trimmed) {
            break;
        }
        trimmed = rest;
    }
    trimmed
}

/// Validates and decodes a standalone identifier
pub fn parse_ident(text: &str) -> CssResult<String> {
    log::trace!("parse_ident");

    let chars: Vec<char> = text.chars().collect();
    let location = |i: usize| Location::new(1, i + 1, i);

    if chars.is_empty() {
        return Err(CssError::with_kind(
            CssErrorKind::Syntax,
            "Empty identifier",
            location(0),
        ));
    }

    if chars[0].is_ascii_digit() {
        return Err(CssError::with_kind(
            CssErrorKind::InvalidCharacter,
            "Identifier cannot start with a digit",
            location(0),
        ));
    }

    if chars[0] == '-' {
        match chars.get(1) {
            Some(c) if c.is_ascii_digit() => {
                return Err(CssError::with_kind(
                    CssErrorKind::Syntax,
                    "Identifier cannot start with '-' followed by a digit",
                    location(1),
                ));
            }
            None => {
                return Err(CssError::with_kind(
                    CssErrorKind::Syntax,
                    "A single '-' is not an identifier",
                    location(0),
                ));
            }
            _ => {}
        }
    }

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];

        if c == '\\' {
            match chars.get(i + 1) {
                None => {
                    return Err(CssError::with_kind(
                        CssErrorKind::Syntax,
                        "Incomplete escape sequence",
                        location(i),
                    ));
                }
                Some(n) if n.is_ascii_hexdigit() => {
                    i += 1;
                    let mut digits = 0;
                    while digits < 6 && chars.get(i).is_some_and(|c| c.is_ascii_hexdigit()) {
                        i += 1;
                        digits += 1;
                    }
                    if chars.get(i).is_some_and(|c| is_css_whitespace(*c)) {
                        i += 1;
                    }
                }
                Some('\n' | '\r' | '\u{000C}') => {
                    return Err(CssError::with_kind(
                        CssErrorKind::InvalidCharacter,
                        "Newline cannot be escaped in an identifier",
                        location(i + 1),
                    ));
                }
                Some(_) => i += 2,
            }
            continue;
        }

        if !is_ident_char(c) {
            return Err(CssError::with_kind(
                CssErrorKind::InvalidCharacter,
                &format!("Invalid character '{}' in identifier", c.escape_default()),
                location(i),
            ));
        }

        i += 1;
    }

    Ok(unescape(text))
}
