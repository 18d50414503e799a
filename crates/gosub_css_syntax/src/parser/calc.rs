use crate::parser::value::number_kind;
use crate::tokenizer::{Token, TokenType};
use crate::value::{calc_like_function, LexicalValue, OperatorKind, UnitId, UnitKind};
use crate::CssParser;
use cow_utils::CowUtils;
use gosub_css_shared::errors::{CssError, CssResult};

/// Identifiers that are numeric constants inside calc expressions
const CALC_CONSTANTS: [&str; 5] = ["e", "pi", "infinity", "-infinity", "nan"];

impl CssParser<'_> {
    /// Parses the body of `calc()`, after the function token
    pub(crate) fn parse_calc(&mut self, value: &mut LexicalValue, t: &Token) -> CssResult<UnitId> {
        log::trace!("parse_calc");

        let calc = value.push_unit(UnitKind::Calc);

        let sum = self.parse_calc_sum(value)?;
        if sum.is_empty() {
            return Err(CssError::with_location(
                "Empty calc() expression",
                t.location,
            ));
        }
        self.consume_closing_paren()?;

        value.set_parameters(calc, &sum);
        Ok(calc)
    }

    /// Parses operands joined by operators. The result stays flat in source order: operator
    /// precedence is only validated, the units are not regrouped. An empty result means the
    /// sum ended before its first operand.
    pub(crate) fn parse_calc_sum(&mut self, value: &mut LexicalValue) -> CssResult<Vec<UnitId>> {
        log::trace!("parse_calc_sum");

        let mut units = Vec::new();

        self.consume_whitespace_comments();
        if self.at_calc_end() {
            return Ok(units);
        }
        units.push(self.parse_calc_operand(value)?);

        loop {
            let whitespace_before = self.consume_whitespace_comments();
            if self.at_calc_end() {
                break;
            }

            let t = self.tokenizer.consume();
            let op = match t.token_type {
                TokenType::Delim(c @ ('+' | '-')) => {
                    let whitespace_after = self.tokenizer.lookahead(0).is_whitespace();
                    if !whitespace_before || !whitespace_after {
                        return Err(CssError::with_location(
                            &format!("'{c}' must be surrounded by whitespace"),
                            t.location,
                        ));
                    }
                    if c == '+' {
                        OperatorKind::Plus
                    } else {
                        OperatorKind::Minus
                    }
                }
                TokenType::Delim('*') => OperatorKind::Multiply,
                TokenType::Delim('/') => OperatorKind::Slash,
                TokenType::Number(_) | TokenType::Dimension { .. } | TokenType::Percentage(_)
                    if t.has_sign() =>
                {
                    return Err(CssError::with_location(
                        "Expected whitespace around the sign of a calc() operator",
                        t.location,
                    ));
                }
                _ => return Err(self.unexpected(&t, "Expected operator")),
            };
            units.push(value.push_unit(UnitKind::Operator(op)));

            self.consume_whitespace_comments();
            if self.at_calc_end() {
                let t = self.tokenizer.lookahead(0);
                return Err(self.unexpected(&t, "Expected operand after operator"));
            }
            units.push(self.parse_calc_operand(value)?);
        }

        Ok(units)
    }

    fn at_calc_end(&mut self) -> bool {
        matches!(
            self.tokenizer.lookahead(0).token_type,
            TokenType::RParen | TokenType::Comma | TokenType::Eof
        )
    }

    fn parse_calc_operand(&mut self, value: &mut LexicalValue) -> CssResult<UnitId> {
        log::trace!("parse_calc_operand");

        let t = self.tokenizer.consume();

        match &t.token_type {
            TokenType::Number(n) => Ok(value.push_unit(number_kind(&t, *n))),
            TokenType::Percentage(n) => Ok(value.push_unit(UnitKind::Percentage(*n))),
            TokenType::Dimension { value: n, unit } => Ok(value.push_unit(UnitKind::Dimension {
                value: *n,
                unit: unit.clone(),
            })),
            TokenType::Ident(name)
                if CALC_CONSTANTS.contains(&name.cow_to_ascii_lowercase().as_ref()) =>
            {
                Ok(value.push_unit(UnitKind::Ident(name.clone())))
            }
            TokenType::LParen => self.nested(t.location, |parser| {
                let sub = value.push_unit(UnitKind::SubExpression);
                let sum = parser.parse_calc_sum(value)?;
                if sum.is_empty() {
                    return Err(CssError::with_location("Empty sub-expression", t.location));
                }
                parser.consume_closing_paren()?;
                value.set_parameters(sub, &sum);
                Ok(sub)
            }),
            TokenType::Function(name) => {
                let lower = name.cow_to_ascii_lowercase();
                let allowed = matches!(lower.as_ref(), "calc" | "var" | "attr" | "env")
                    || calc_like_function(&lower);
                if !allowed {
                    return Err(CssError::with_location(
                        &format!("Function {name}() is not allowed in calc()"),
                        t.location,
                    ));
                }
                self.parse_function(value, name, &t)
            }
            _ => Err(self.unexpected(&t, "Expected calc() operand")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::value::UnitKind;
    use crate::CssParser;
    use test_case::test_case;

    fn parse(data: &str) -> String {
        CssParser::parse_value_str(data, &ParserConfig::default())
            .unwrap()
            .to_string()
    }

    #[test_case("calc(2 * (3 + 2))", "calc(2*(3 + 2))")]
    #[test_case("calc(100% - 2em)", "calc(100% - 2em)")]
    #[test_case("calc(100%/3 - 2*1em - 2*1px)", "calc(100%/3 - 2*1em - 2*1px)")]
    #[test_case("calc(-2px * 3)", "calc(-2px*3)")]
    #[test_case("calc(2 * pi)", "calc(2*pi)")]
    #[test_case("calc(var(--a) + 1px)", "calc(var(--a) + 1px)")]
    #[test_case("calc(1px + calc(2px * 3))", "calc(1px + calc(2px*3))")]
    #[test_case("calc(min(1px, 2px) * 2)", "calc(min(1px,2px)*2)")]
    fn serializes(input: &str, expected: &str) {
        assert_eq!(parse(input), expected);
    }

    #[test_case("calc(100%-2em)" ; "glued minus")]
    #[test_case("calc(100% -2em)" ; "signed operand")]
    #[test_case("calc(100%+)" ; "dangling glued plus")]
    #[test_case("calc(100% + )" ; "dangling plus")]
    #[test_case("calc(100% +2em)" ; "plus without trailing space")]
    #[test_case("calc()" ; "empty")]
    #[test_case("calc(1px 2px)" ; "missing operator")]
    #[test_case("calc(foo)" ; "unknown identifier")]
    #[test_case("calc(rgb(1 2 3))" ; "function not allowed")]
    #[test_case("calc(1px + 2px" ; "unterminated")]
    fn rejects(input: &str) {
        let result = CssParser::parse_value_str(input, &ParserConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn operator_column() {
        let config = ParserConfig::default();
        let err = CssParser::parse_value_str("calc(100%+)", &config).unwrap_err();
        assert_eq!(err.column(), 10);
    }

    #[test]
    fn sub_expression_structure() {
        let config = ParserConfig::default();
        let value = CssParser::parse_value_str("calc(2 * (3 + 2))", &config).unwrap();
        let calc = value.head().unwrap();
        assert_eq!(value.kind(calc), &UnitKind::Calc);

        let params: Vec<_> = value.parameters(calc).collect();
        assert_eq!(params.len(), 3);
        assert_eq!(value.kind(params[2]), &UnitKind::SubExpression);
        assert_eq!(value.parameters(params[2]).count(), 3);
        assert_eq!(value.unit(params[2]).owner(), Some(calc));
    }
}
