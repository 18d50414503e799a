use crate::condition::{BooleanCondition, SupportsCondition, SupportsPredicate};
use crate::parser::ValueContext;
use crate::tokenizer::{Token, TokenType};
use crate::value::LexicalValue;
use crate::CssParser;
use cow_utils::CowUtils;
use gosub_css_shared::errors::CssResult;

impl CssParser<'_> {
    pub(crate) fn parse_supports_condition(&mut self) -> CssResult<SupportsCondition> {
        log::trace!("parse_supports_condition");

        self.parse_boolean_condition(true, |parser| parser.parse_supports_in_parens())
    }

    /// `( condition )`, `( declaration )`, `selector( ... )`, or any other block or function
    /// which is kept as unknown
    fn parse_supports_in_parens(&mut self) -> CssResult<SupportsCondition> {
        log::trace!("parse_supports_in_parens");

        let t = self.tokenizer.consume();
        match &t.token_type {
            TokenType::LParen => self.nested(t.location, |parser| parser.parse_supports_block(&t)),
            TokenType::Function(name) if name.eq_ignore_ascii_case("selector") => {
                self.nested(t.location, |parser| {
                    let list = parser.parse_selector_list(false)?;
                    parser.consume_closing_paren()?;
                    let predicate = SupportsPredicate::Selector(list);
                    Ok(BooleanCondition::Predicate(predicate))
                })
            }
            TokenType::Function(_) => {
                let raw = self.consume_balanced_raw(t.location.offset)?;
                Ok(BooleanCondition::Predicate(SupportsPredicate::Unknown(raw)))
            }
            _ => Err(self.unexpected(&t, "Expected '(' or 'selector('")),
        }
    }

    /// Parses the inside of a parenthesized block, after the `(`
    fn parse_supports_block(&mut self, open: &Token) -> CssResult<SupportsCondition> {
        log::trace!("parse_supports_block");

        self.consume_whitespace_comments();

        let t = self.tokenizer.lookahead(0);
        let is_selector_function = matches!(
            &t.token_type,
            TokenType::Function(name) if name.eq_ignore_ascii_case("selector")
        );
        if t.token_type == TokenType::LParen || t.is_ident_value("not") || is_selector_function {
            let condition = self.parse_supports_condition()?;
            self.consume_closing_paren()?;
            return Ok(condition);
        }

        if let TokenType::Ident(name) = &t.token_type {
            if self.tokenizer.lookahead_sc(1).is_colon() {
                self.tokenizer.consume();
                return self.parse_supports_declaration(name);
            }
        }

        let raw = self.consume_balanced_raw(open.location.offset)?;
        Ok(BooleanCondition::Predicate(SupportsPredicate::Unknown(raw)))
    }

    /// `property: value)`, after the property name
    fn parse_supports_declaration(&mut self, name: &str) -> CssResult<SupportsCondition> {
        log::trace!("parse_supports_declaration");

        let property = if name.starts_with("--") {
            name.to_string()
        } else {
            name.cow_to_ascii_lowercase().into_owned()
        };

        self.consume_whitespace_comments();
        self.consume(TokenType::Colon)?;

        let mut value = LexicalValue::new();
        let units = self.parse_value_sequence(&mut value, ValueContext::TopLevel)?;
        if units.is_empty() && !property.starts_with("--") {
            let t = self.tokenizer.lookahead_sc(0);
            return Err(self.unexpected(&t, "Expected value"));
        }
        value.set_top_level(&units);

        self.consume(TokenType::RParen)?;

        Ok(BooleanCondition::Predicate(SupportsPredicate::Declaration {
            property,
            value,
        }))
    }
}
