use crate::selector::Combinator;
use crate::tokenizer::TokenType;
use crate::CssParser;

impl CssParser<'_> {
    /// Reads the combinator between two compound selectors. Returns `None` when the complex
    /// selector ends here. Whitespace around the combinator is consumed.
    pub(crate) fn parse_combinator(&mut self) -> Option<Combinator> {
        log::trace!("parse_combinator");

        let whitespace = self.consume_whitespace_comments();

        let t = self.tokenizer.lookahead(0);
        let kind = match t.token_type {
            TokenType::Delim('>') => Combinator::Child,
            TokenType::Delim('+') => Combinator::NextSibling,
            TokenType::Delim('~') => Combinator::SubsequentSibling,
            TokenType::Delim('|') if self.tokenizer.lookahead(1).is_delim('|') => {
                self.tokenizer.consume();
                Combinator::Column
            }
            TokenType::Comma | TokenType::RParen | TokenType::LCurly | TokenType::Eof => {
                return None
            }
            _ if whitespace => return Some(Combinator::Descendant),
            _ => return None,
        };

        self.tokenizer.consume();
        self.consume_whitespace_comments();

        Some(kind)
    }
}
