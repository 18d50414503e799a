use crate::condition::BooleanCondition;
use crate::CssParser;
use gosub_css_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    /// Parses `not X`, `X and Y and ...` or `X or Y or ...`, where every operand is read by
    /// `parse_in_parens`. Mixing `and` with `or` on one level needs parentheses.
    pub(crate) fn parse_boolean_condition<P>(
        &mut self,
        allow_or: bool,
        mut parse_in_parens: impl FnMut(&mut Self) -> CssResult<BooleanCondition<P>>,
    ) -> CssResult<BooleanCondition<P>> {
        log::trace!("parse_boolean_condition");

        self.consume_whitespace_comments();

        if self.tokenizer.lookahead(0).is_ident_value("not") {
            self.tokenizer.consume();
            self.consume_whitespace_comments();
            let operand = parse_in_parens(self)?;
            return Ok(BooleanCondition::Not(Box::new(operand)));
        }

        let mut operands = vec![parse_in_parens(self)?];
        let mut or: Option<bool> = None;

        loop {
            self.consume_whitespace_comments();

            let t = self.tokenizer.lookahead(0);
            let is_or = if t.is_ident_value("and") {
                false
            } else if t.is_ident_value("or") {
                true
            } else {
                break;
            };

            if is_or && !allow_or {
                return Err(CssError::with_location(
                    "'or' is not allowed here",
                    t.location,
                ));
            }
            if or.is_some_and(|or| or != is_or) {
                return Err(CssError::with_location(
                    "Cannot mix 'and' and 'or' without parentheses",
                    t.location,
                ));
            }
            or = Some(is_or);

            self.tokenizer.consume();
            self.consume_whitespace_comments();
            operands.push(parse_in_parens(self)?);
        }

        Ok(BooleanCondition::combine(operands, or.unwrap_or(false)))
    }
}
