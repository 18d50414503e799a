use crate::char_stream::Location;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The category of a CSS parse failure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum CssErrorKind {
    /// The input violates the grammar of the construct being parsed
    #[error("syntax error")]
    Syntax,
    /// A character is not allowed at this position
    #[error("invalid character")]
    InvalidCharacter,
    /// The input ended before the construct was complete
    #[error("unexpected end of input")]
    Eof,
    /// The construct is recognized but not supported (for instance a compatibility hack that
    /// is not enabled)
    #[error("unsupported construct")]
    UnsupportedConstruct,
}

/// Parser error that defines an error (message) on the given position
#[derive(Clone, Debug, PartialEq)]
pub struct CssError {
    /// Category of the error
    pub kind: CssErrorKind,
    /// Error message
    pub message: String,
    /// Location of the error, if available (during parsing mostly)
    pub location: Option<Location>,
}

impl CssError {
    #[must_use]
    pub fn new(message: &str) -> Self {
        CssError {
            kind: CssErrorKind::Syntax,
            message: message.to_string(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(message: &str, location: Location) -> Self {
        Self::with_kind(CssErrorKind::Syntax, message, location)
    }

    #[must_use]
    pub fn with_kind(kind: CssErrorKind, message: &str, location: Location) -> Self {
        CssError {
            kind,
            message: message.to_string(),
            location: Some(location),
        }
    }

    /// 1-based line of the error, or 0 when the error has no location
    pub fn line(&self) -> usize {
        self.location.map_or(0, |l| l.line)
    }

    /// 1-based column of the error, or 0 when the error has no location
    pub fn column(&self) -> usize {
        self.location.map_or(0, |l| l.column)
    }
}

impl Display for CssError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.location {
            Some(location) => write!(f, "{}: {} at {:?}", self.kind, self.message, location),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for CssError {}

pub type CssResult<T> = Result<T, CssError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_location() {
        let err = CssError::with_location("Expected ')'", Location::new(1, 15, 14));
        assert_eq!(err.to_string(), "syntax error: Expected ')' at (1:15)");
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 15);
    }

    #[test]
    fn display_without_location() {
        let err = CssError::new("Empty input");
        assert_eq!(err.to_string(), "syntax error: Empty input");
        assert_eq!(err.column(), 0);
    }

    #[test]
    fn kind_is_kept() {
        let err = CssError::with_kind(
            CssErrorKind::Eof,
            "Unterminated string",
            Location::default(),
        );
        assert_eq!(err.kind, CssErrorKind::Eof);
        assert_eq!(
            err.to_string(),
            "unexpected end of input: Unterminated string at (1:1)"
        );
    }
}
