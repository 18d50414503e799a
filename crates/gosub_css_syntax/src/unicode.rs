#[allow(clippy::module_name_repetitions)]
pub struct UnicodeChar;

impl UnicodeChar {
    pub const NULL: char = '\u{0000}';
    pub const BACKSPACE: char = '\u{0008}';
    pub const LINE_TABULATION: char = '\u{000B}';
    pub const SHIFT_OUT: char = '\u{000E}';
    pub const INFORMATION_SEPARATOR_ONE: char = '\u{001F}';
    pub const DELETE: char = '\u{007F}';
    pub const MAX_ALLOWED: u32 = 0x10FFFF;
    pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';
}

/// Converts an escaped code point into a char. NUL, surrogates and code points beyond the
/// unicode range are replaced by U+FFFD.
pub fn code_point_to_char(code_point: u32) -> char {
    if code_point == 0 || code_point > UnicodeChar::MAX_ALLOWED {
        return UnicodeChar::REPLACEMENT_CHARACTER;
    }

    char::from_u32(code_point).unwrap_or(UnicodeChar::REPLACEMENT_CHARACTER)
}

/// [non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
pub fn is_non_printable(c: char) -> bool {
    (UnicodeChar::NULL..=UnicodeChar::BACKSPACE).contains(&c)
        || c == UnicodeChar::LINE_TABULATION
        || (UnicodeChar::SHIFT_OUT..=UnicodeChar::INFORMATION_SEPARATOR_ONE).contains(&c)
        || c == UnicodeChar::DELETE
}

/// [ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || !c.is_ascii() || c == '_'
}

/// [ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
pub fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_invalid_code_points() {
        assert_eq!(code_point_to_char(0), '\u{FFFD}');
        assert_eq!(code_point_to_char(0xD800), '\u{FFFD}');
        assert_eq!(code_point_to_char(0x110000), '\u{FFFD}');
        assert_eq!(code_point_to_char(0x10FFFF), '\u{10FFFF}');
        assert_eq!(code_point_to_char(0x1F47D), '👽');
    }

    #[test]
    fn ident_code_points() {
        assert!(is_ident_start('a'));
        assert!(is_ident_start('é'));
        assert!(!is_ident_start('1'));
        assert!(is_ident_char('1'));
        assert!(is_ident_char('-'));
        assert!(!is_ident_char(' '));
        assert!(is_non_printable('\u{0001}'));
        assert!(!is_non_printable('\t'));
    }
}
