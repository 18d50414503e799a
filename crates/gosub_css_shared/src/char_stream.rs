use std::fmt;
use std::fmt::{Debug, Formatter};

pub const CHAR_LF: char = '\u{000A}';
pub const CHAR_CR: char = '\u{000D}';
pub const CHAR_FF: char = '\u{000C}';
pub const CHAR_NULL: char = '\u{0000}';

/// Defines a single character/element in the stream.
///
/// The end of the stream is denoted as a separate element, so is Empty to indicate that the
/// buffer is empty but not yet closed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Character {
    /// Standard UTF character
    Ch(char),
    /// Stream buffer empty and closed
    StreamEnd,
    /// Stream buffer empty (but not closed)
    StreamEmpty,
}

use Character::*;

/// Converts the given character to a char. End of stream markers are converted to 0x0000
impl From<&Character> for char {
    fn from(c: &Character) -> Self {
        match c {
            Ch(c) => *c,
            StreamEmpty | StreamEnd => CHAR_NULL,
        }
    }
}

impl From<Character> for char {
    fn from(c: Character) -> Self {
        char::from(&c)
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ch(ch) => write!(f, "{ch}"),
            StreamEnd => write!(f, "StreamEnd"),
            StreamEmpty => write!(f, "StreamEmpty"),
        }
    }
}

impl Character {
    /// Returns true when the character is CSS whitespace (space, tab or newline)
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Ch(' ' | '\t' | CHAR_LF))
    }

    /// Returns true when the character is an ASCII digit
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_digit())
    }

    /// Returns true when the character is an ASCII hex digit
    pub fn is_hex_digit(&self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_hexdigit())
    }

    /// Converts a slice of characters into a string
    pub fn slice_to_string(v: &[Character]) -> String {
        v.iter().map(char::from).collect()
    }
}

/// A stream of unicode characters with preprocessed newlines.
///
/// CSS requires the input stream to be filtered before tokenization: CR, FF and CR LF pairs
/// are all read as a single LF and NUL characters are read as U+FFFD. Offsets in this stream
/// are character offsets, not byte offsets.
#[derive(Default)]
pub struct CharStream {
    /// Actual buffer of (preprocessed) characters
    buffer: Vec<char>,
    /// Current position in the stream
    position: usize,
    /// True when no more data can be added to the stream
    closed: bool,
    /// True when the last read chunk ended in a CR, so a LF at the start of the next chunk
    /// must be dropped
    pending_cr: bool,
}

impl CharStream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the given string to the stream
    pub fn read_from_str(&mut self, data: &str) {
        self.buffer.reserve(data.len());

        for c in data.chars() {
            if self.pending_cr {
                self.pending_cr = false;
                if c == CHAR_LF {
                    continue;
                }
            }

            match c {
                CHAR_CR => {
                    self.pending_cr = true;
                    self.buffer.push(CHAR_LF);
                }
                CHAR_FF => self.buffer.push(CHAR_LF),
                CHAR_NULL => self.buffer.push(char::REPLACEMENT_CHARACTER),
                _ => self.buffer.push(c),
            }
        }
    }

    /// Closes the stream (no more data can be added)
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Returns true when the stream is closed
    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Returns true when the stream is empty (but still open)
    pub fn exhausted(&self) -> bool {
        self.position >= self.buffer.len() && !self.closed
    }

    /// Returns true when the stream is closed and empty
    pub fn eof(&self) -> bool {
        self.position >= self.buffer.len() && self.closed
    }

    /// Read current character
    pub fn read(&self) -> Character {
        self.look_ahead(0)
    }

    /// Read current character and advance to next
    pub fn read_and_next(&mut self) -> Character {
        let c = self.read();
        self.next();
        c
    }

    /// Looks ahead in the stream without moving the position
    pub fn look_ahead(&self, offset: usize) -> Character {
        match self.buffer.get(self.position + offset) {
            Some(c) => Ch(*c),
            None if self.closed => StreamEnd,
            None => StreamEmpty,
        }
    }

    /// Advance with 1 character
    pub fn next(&mut self) {
        self.next_n(1);
    }

    /// Advance with offset characters
    pub fn next_n(&mut self, offset: usize) {
        self.position = (self.position + offset).min(self.buffer.len());
    }

    /// Unread n characters
    pub fn prev_n(&mut self, n: usize) {
        self.position = self.position.saturating_sub(n);
    }

    /// Seek to a specific character position
    pub fn seek(&mut self, offset: usize) {
        self.position = offset.min(self.buffer.len());
    }

    /// Tell the current character position
    pub fn tell(&self) -> usize {
        self.position
    }

    /// Number of characters that are not yet read
    pub fn chars_left(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Retrieves the characters between the start and end character positions
    pub fn get_slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.buffer.len());
        if start >= end {
            return String::new();
        }

        self.buffer[start..end].iter().collect()
    }

    /// Resets the stream back to the start position
    pub fn reset_stream(&mut self) {
        self.position = 0;
    }
}

/// Location holds the start position of the given element in the data source
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Character offset, starting with 0
    pub offset: usize,
}

impl Default for Location {
    /// Default to line 1, column 1
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Location {
    /// Create a new Location
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Translates a location that is relative to a stream starting at 1:1 into a location
    /// relative to `start`. Only the first line is shifted by the start column.
    #[must_use]
    pub fn relative_to(&self, start: &Location) -> Location {
        let column = if self.line == 1 {
            start.column + self.column - 1
        } else {
            self.column
        };

        Location::new(
            start.line + self.line - 1,
            column,
            start.offset + self.offset,
        )
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stream() {
        let mut stream = CharStream::new();
        assert!(stream.exhausted());
        assert!(!stream.eof());

        stream.read_from_str("f👽f");
        stream.close();
        assert!(!stream.eof());
        assert_eq!(stream.chars_left(), 3);
        assert_eq!(stream.read_and_next(), Ch('f'));
        assert_eq!(stream.read_and_next(), Ch('👽'));
        assert_eq!(stream.read_and_next(), Ch('f'));
        assert!(stream.eof());
        assert_eq!(stream.read_and_next(), StreamEnd);

        stream.prev_n(2);
        assert_eq!(stream.read_and_next(), Ch('👽'));
        stream.reset_stream();
        assert_eq!(stream.read(), Ch('f'));
    }

    #[test]
    fn test_empty_but_open() {
        let mut stream = CharStream::new();
        stream.read_from_str("a");
        assert_eq!(stream.read_and_next(), Ch('a'));
        assert_eq!(stream.read(), StreamEmpty);
        stream.close();
        assert_eq!(stream.read(), StreamEnd);
    }

    #[test]
    fn test_newline_preprocessing() {
        let mut stream = CharStream::new();
        stream.read_from_str("a\r\nb\rc\u{000C}d\0");
        stream.close();

        assert_eq!(stream.get_slice(0, 9), "a\nb\nc\nd\u{FFFD}");
    }

    #[test]
    fn test_crlf_split_over_chunks() {
        let mut stream = CharStream::new();
        stream.read_from_str("a\r");
        stream.read_from_str("\nb");
        stream.close();

        assert_eq!(stream.get_slice(0, 10), "a\nb");
    }

    #[test]
    fn test_slice() {
        let mut stream = CharStream::new();
        stream.read_from_str("abc👽def");
        stream.close();

        assert_eq!(stream.get_slice(2, 5), "c👽d");
        assert_eq!(stream.get_slice(5, 2), "");
        assert_eq!(stream.get_slice(5, 100), "ef");
    }

    #[test]
    fn test_character() {
        let ch = Ch('a');
        assert_eq!(char::from(&ch), 'a');
        assert_eq!(format!("{}", ch), "a");

        assert!(Ch('0').is_numeric());
        assert!(!Ch('٣').is_numeric());
        assert!(Ch('F').is_hex_digit());
        assert!(Ch(' ').is_whitespace());
        assert!(Ch('\n').is_whitespace());
        assert!(Ch('\t').is_whitespace());
        assert!(!Ch('\u{00A0}').is_whitespace());
    }

    #[test]
    fn test_relative_location() {
        let start = Location::new(3, 10, 40);

        let first_line = Location::new(1, 5, 4).relative_to(&start);
        assert_eq!(first_line, Location::new(3, 14, 44));

        let second_line = Location::new(2, 5, 12).relative_to(&start);
        assert_eq!(second_line, Location::new(4, 5, 52));
    }
}
