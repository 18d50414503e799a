use crate::tokenizer::{Token, TokenType, Tokenizer, TokenizerOptions};
use crate::{stream_from_str, CssParser};
use gosub_css_shared::char_stream::Location;
use gosub_css_shared::errors::{CssError, CssErrorKind, CssResult};

mod anplusb;
mod calc;
mod color;
mod combinator;
mod condition;
mod declaration;
mod function;
mod media;
mod pseudo;
mod rule;
mod selector;
mod selector_list;
mod supports;
mod syntax_descriptor;
mod unicode_range;
mod value;

pub use anplusb::AnPlusB;
pub(crate) use value::ValueContext;

/// A piece of the input between two top level commas, reparsed on its own so a failure does not
/// affect its siblings
#[derive(Clone, Debug)]
pub(crate) struct Segment {
    pub text: String,
    pub location: Location,
}

/// Returns true when the raw text of a string or url token ends with an unescaped `closing`
pub(crate) fn is_terminated(raw: &str, closing: char) -> bool {
    let chars: Vec<char> = raw.chars().collect();
    match chars.split_last() {
        Some((last, rest)) if *last == closing && !rest.is_empty() => {
            rest.iter().rev().take_while(|c| **c == '\\').count() % 2 == 0
        }
        _ => false,
    }
}

/// Offset right after the given token
pub(crate) fn end_offset(token: &Token) -> usize {
    token.location.offset + token.raw.chars().count()
}

impl CssParser<'_> {
    /// Builds the error for a token that is not allowed at this position. Running into the end
    /// of the input is reported as such.
    pub(crate) fn unexpected(&self, token: &Token, message: &str) -> CssError {
        match &token.token_type {
            TokenType::Eof => CssError::with_kind(
                CssErrorKind::Eof,
                &format!("{message}, found end of input"),
                token.location,
            ),
            TokenType::BadString(_) => {
                CssError::with_location("Unterminated string", token.location)
            }
            TokenType::BadUrl(_) => CssError::with_location("Invalid url", token.location),
            _ => CssError::with_location(
                &format!("{message}, found '{}'", token.raw.trim()),
                token.location,
            ),
        }
    }

    /// Consumes a specific token
    pub(crate) fn consume(&mut self, token_type: TokenType) -> CssResult<Token> {
        let t = self.tokenizer.consume();
        if t.token_type != token_type {
            let expected = Token::new(token_type, t.location);
            return Err(self.unexpected(&t, &format!("Expected '{expected}'")));
        }

        Ok(t)
    }

    pub(crate) fn consume_delim(&mut self, delimiter: char) -> CssResult<Token> {
        let t = self.tokenizer.consume();
        if !t.is_delim(delimiter) {
            return Err(self.unexpected(&t, &format!("Expected '{delimiter}'")));
        }

        Ok(t)
    }

    pub(crate) fn consume_any_ident(&mut self) -> CssResult<String> {
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::Ident(s) => Ok(s),
            _ => Err(self.unexpected(&t, "Expected identifier")),
        }
    }

    /// Skips whitespace and comments. Returns true when whitespace was found.
    pub(crate) fn consume_whitespace_comments(&mut self) -> bool {
        let mut whitespace = false;

        loop {
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Whitespace => whitespace = true,
                TokenType::Comment(_) => {}
                _ => {
                    self.tokenizer.reconsume();
                    break;
                }
            }
        }

        whitespace
    }

    /// Consumes the `)` that closes a function or block, after optional whitespace
    pub(crate) fn consume_closing_paren(&mut self) -> CssResult<Token> {
        self.consume_whitespace_comments();
        self.consume(TokenType::RParen)
    }

    /// Fails unless only whitespace and comments are left
    pub(crate) fn expect_eof(&mut self) -> CssResult<()> {
        self.consume_whitespace_comments();

        let t = self.tokenizer.consume();
        if !t.is_eof() {
            return Err(self.unexpected(&t, "Expected end of input"));
        }

        Ok(())
    }

    /// Runs `parse` one nesting level deeper, failing when the configured maximum is reached
    pub(crate) fn nested<T>(
        &mut self,
        location: Location,
        parse: impl FnOnce(&mut Self) -> CssResult<T>,
    ) -> CssResult<T> {
        if self.nesting >= self.config.max_nesting {
            return Err(CssError::with_location(
                "Maximum nesting depth exceeded",
                location,
            ));
        }

        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;

        result
    }

    /// Consumes everything up to and including the `)` that matches an already consumed `(` or
    /// function token, and returns the source text from `start` up to that `)`.
    pub(crate) fn consume_balanced_raw(&mut self, start: usize) -> CssResult<String> {
        let mut depth = 1usize;

        loop {
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Function(_) | TokenType::LParen => depth += 1,
                TokenType::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.tokenizer.slice(start, end_offset(&t)));
                    }
                }
                TokenType::Eof => return Err(self.unexpected(&t, "Expected ')'")),
                _ => {}
            }
        }
    }

    /// Splits the rest of the input at top level commas. With `stop_at_block` the split ends in
    /// front of the first top level `{`. Input without any content yields no segments.
    pub(crate) fn split_top_level(&mut self, stop_at_block: bool) -> Vec<Segment> {
        log::trace!("split_top_level");

        let mut segments = Vec::new();
        let mut depth = 0usize;
        let mut content = false;
        let mut start = self.tokenizer.lookahead(0).location;

        loop {
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Eof => {
                    segments.push(self.segment(start, t.location.offset));
                    break;
                }
                TokenType::LCurly if depth == 0 && stop_at_block => {
                    self.tokenizer.reconsume();
                    segments.push(self.segment(start, t.location.offset));
                    break;
                }
                TokenType::Comma if depth == 0 => {
                    segments.push(self.segment(start, t.location.offset));
                    start = self.tokenizer.lookahead(0).location;
                }
                TokenType::Function(_)
                | TokenType::LParen
                | TokenType::LBracket
                | TokenType::LCurly => depth += 1,
                TokenType::RParen | TokenType::RBracket | TokenType::RCurly => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }

            if !t.is_whitespace() && !t.is_comment() {
                content = true;
            }
        }

        if !content {
            return Vec::new();
        }

        segments
    }

    fn segment(&self, start: Location, end: usize) -> Segment {
        Segment {
            text: self.tokenizer.slice(start.offset, end),
            location: start,
        }
    }

    /// Parses a segment with a fresh parser that shares this parser's configuration. The
    /// segment must be consumed completely.
    pub(crate) fn parse_segment<T>(
        &self,
        segment: &Segment,
        options: TokenizerOptions,
        parse: impl FnOnce(&mut CssParser<'_>) -> CssResult<T>,
    ) -> CssResult<T> {
        let mut stream = stream_from_str(&segment.text);
        let mut parser = CssParser {
            tokenizer: Tokenizer::with_options(&mut stream, segment.location, options),
            config: self.config,
            namespaces: self.namespaces,
            nesting: self.nesting,
        };

        let value = parse(&mut parser)?;
        parser.expect_eof()?;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::namespace::NoNamespaces;

    #[test]
    fn terminated_tokens() {
        assert!(is_terminated("\"abc\"", '"'));
        assert!(is_terminated("\"a\\\\\"", '"'));
        assert!(!is_terminated("\"abc\\\"", '"'));
        assert!(!is_terminated("\"", '"'));
        assert!(is_terminated("url(a.png)", ')'));
        assert!(!is_terminated("url(a.png", ')'));
    }

    #[test]
    fn split_segments() {
        let config = ParserConfig::default();
        let mut stream = stream_from_str("a, b(c, d) , e");
        let mut parser = CssParser::new(
            &mut stream,
            &config,
            &NoNamespaces,
            TokenizerOptions::default(),
        );

        let segments = parser.split_top_level(false);
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", " b(c, d) ", " e"]);
        assert_eq!(segments[1].location.column, 3);
        assert_eq!(segments[2].location.column, 13);
    }

    #[test]
    fn split_stops_at_block() {
        let config = ParserConfig::default();
        let mut stream = stream_from_str("a, b { color: red }");
        let mut parser = CssParser::new(
            &mut stream,
            &config,
            &NoNamespaces,
            TokenizerOptions::default(),
        );

        let segments = parser.split_top_level(true);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, " b ");
        assert_eq!(parser.tokenizer.lookahead(0).token_type, TokenType::LCurly);
    }

    #[test]
    fn empty_input_has_no_segments() {
        let config = ParserConfig::default();
        let mut stream = stream_from_str("  /* nothing */ ");
        let mut parser = CssParser::new(
            &mut stream,
            &config,
            &NoNamespaces,
            TokenizerOptions::default(),
        );

        assert!(parser.split_top_level(false).is_empty());
    }

    #[test]
    fn nesting_is_bounded() {
        let config = ParserConfig {
            max_nesting: 3,
            ..Default::default()
        };

        assert!(CssParser::parse_value_str("a(b(c(d)))", &config).is_ok());
        let err = CssParser::parse_value_str("a(b(c(d(e))))", &config).unwrap_err();
        assert_eq!(err.message, "Maximum nesting depth exceeded");
        assert_eq!(err.column(), 7);
    }
}
