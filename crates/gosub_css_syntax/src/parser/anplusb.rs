use crate::selector::PositionalKeyword;
use crate::tokenizer::{Token, TokenType};
use crate::CssParser;
use gosub_css_shared::errors::{CssError, CssResult};

/// Parsed `An+B` expression
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnPlusB {
    pub step: i32,
    pub offset: i32,
    /// Set when the expression was written as `odd` or `even`
    pub keyword: Option<PositionalKeyword>,
}

impl AnPlusB {
    fn new(step: i32, offset: i32) -> Self {
        Self {
            step,
            offset,
            keyword: None,
        }
    }
}

/// Splits the unit of an `n`-dimension (or an ident) into the sign of A and the B that was glued
/// onto it: `n` gives no B, `n-` asks for a separate B, `n-3` carries B.
enum NPart {
    Plain,
    DashThenB,
    WithB(i32),
}

fn split_n(text: &str) -> Option<NPart> {
    let mut chars = text.chars();
    if !matches!(chars.next(), Some('n' | 'N')) {
        return None;
    }

    let rest = chars.as_str();
    if rest.is_empty() {
        return Some(NPart::Plain);
    }
    if rest == "-" {
        return Some(NPart::DashThenB);
    }

    let digits = rest.strip_prefix('-')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse::<i32>().ok().map(|b| NPart::WithB(-b))
}

impl CssParser<'_> {
    /// Parses an `An+B` expression. Leading whitespace must already be consumed; whatever
    /// follows the expression is left in the stream.
    pub(crate) fn parse_anplusb(&mut self) -> CssResult<AnPlusB> {
        log::trace!("parse_anplusb");

        let t = self.tokenizer.consume();

        match &t.token_type {
            TokenType::Ident(value) if value.eq_ignore_ascii_case("odd") => Ok(AnPlusB {
                keyword: Some(PositionalKeyword::Odd),
                ..AnPlusB::new(2, 1)
            }),
            TokenType::Ident(value) if value.eq_ignore_ascii_case("even") => Ok(AnPlusB {
                keyword: Some(PositionalKeyword::Even),
                ..AnPlusB::new(2, 0)
            }),
            TokenType::Number(_) => match t.integer_value() {
                Some(b) => Ok(AnPlusB::new(0, b)),
                None => Err(CssError::with_location("Expected integer", t.location)),
            },
            TokenType::Dimension { unit, .. } => {
                let Some(a) = t.integer_value() else {
                    return Err(CssError::with_location("Expected integer", t.location));
                };
                let part = split_n(unit)
                    .ok_or_else(|| CssError::with_location("Expected 'n'", t.location))?;
                self.parse_anplusb_b(a, part)
            }
            TokenType::Ident(value) => {
                let (a, rest) = match value.strip_prefix('-') {
                    Some(rest) => (-1, rest),
                    None => (1, value.as_str()),
                };
                let part = split_n(rest)
                    .ok_or_else(|| CssError::with_location("Expected 'n'", t.location))?;
                self.parse_anplusb_b(a, part)
            }
            TokenType::Delim('+') => {
                // the sign must be glued to the n that follows it
                let next = self.tokenizer.consume();
                match &next.token_type {
                    TokenType::Ident(value) if !value.starts_with('-') => {
                        let part = split_n(value).ok_or_else(|| {
                            CssError::with_location("Expected 'n'", next.location)
                        })?;
                        self.parse_anplusb_b(1, part)
                    }
                    _ => Err(self.unexpected(&next, "Expected 'n' directly after '+'")),
                }
            }
            _ => Err(self.unexpected(&t, "Expected An+B expression")),
        }
    }

    fn parse_anplusb_b(&mut self, a: i32, part: NPart) -> CssResult<AnPlusB> {
        log::trace!("parse_anplusb_b");

        match part {
            NPart::WithB(b) => Ok(AnPlusB::new(a, b)),
            NPart::DashThenB => {
                self.consume_whitespace_comments();
                let t = self.tokenizer.consume();
                let b = self.signless_integer(&t)?;
                Ok(AnPlusB::new(a, -b))
            }
            NPart::Plain => {
                let position = self.tokenizer.tell();
                self.consume_whitespace_comments();

                let t = self.tokenizer.consume();
                match &t.token_type {
                    TokenType::Number(_) if t.has_sign() => match t.integer_value() {
                        Some(b) => Ok(AnPlusB::new(a, b)),
                        None => Err(CssError::with_location("Expected integer", t.location)),
                    },
                    TokenType::Delim(sign @ ('+' | '-')) => {
                        let sign = if *sign == '-' { -1 } else { 1 };
                        self.consume_whitespace_comments();
                        let t = self.tokenizer.consume();
                        let b = self.signless_integer(&t)?;
                        Ok(AnPlusB::new(a, sign * b))
                    }
                    _ => {
                        // no B part, leave the token for the caller
                        self.tokenizer.rewind(position);
                        Ok(AnPlusB::new(a, 0))
                    }
                }
            }
        }
    }

    fn signless_integer(&self, t: &Token) -> CssResult<i32> {
        match t.token_type {
            TokenType::Number(_) if !t.has_sign() => t
                .integer_value()
                .ok_or_else(|| CssError::with_location("Expected integer", t.location)),
            _ => Err(self.unexpected(t, "Expected unsigned integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::CssParser;
    use test_case::test_case;

    #[test_case("odd", 2, 1)]
    #[test_case("EVEN", 2, 0)]
    #[test_case("5", 0, 5)]
    #[test_case("-5", 0, -5)]
    #[test_case("+5", 0, 5)]
    #[test_case("n", 1, 0)]
    #[test_case("-n", -1, 0)]
    #[test_case("+n", 1, 0)]
    #[test_case("2n", 2, 0)]
    #[test_case("2n+1", 2, 1)]
    #[test_case("2n-1", 2, -1)]
    #[test_case("-2n+3", -2, 3)]
    #[test_case("2n + 0", 2, 0)]
    #[test_case("2n - 3", 2, -3)]
    #[test_case("n- 3", 1, -3)]
    #[test_case("-n-3", -1, -3)]
    #[test_case(" 3n+1 ", 3, 1)]
    #[test_case("+n+7", 1, 7)]
    fn parses(input: &str, step: i32, offset: i32) {
        assert_eq!(CssParser::parse_anb_str(input).unwrap(), (step, offset));
    }

    #[test_case("++n" ; "double plus")]
    #[test_case("--n" ; "double minus")]
    #[test_case("+ 2n" ; "detached sign before n")]
    #[test_case("+ 2" ; "detached sign before number")]
    #[test_case("2 n" ; "space before n")]
    #[test_case("n 2" ; "unsigned b")]
    #[test_case("0-n" ; "negative n after number")]
    #[test_case("0 + 2" ; "b without n")]
    #[test_case("0n+-1" ; "double sign")]
    #[test_case("2.5n" ; "fractional a")]
    #[test_case("n+1.5" ; "fractional b")]
    #[test_case("2n+1 x" ; "trailing garbage")]
    #[test_case("" ; "empty")]
    fn rejects(input: &str) {
        assert!(CssParser::parse_anb_str(input).is_err());
    }
}
