use crate::parser::ValueContext;
use crate::tokenizer::{Token, TokenType};
use crate::value::{
    calc_like_function, ColorFunctionKind, LexicalValue, OperatorKind, UnitId, UnitKind,
};
use crate::CssParser;
use cow_utils::CowUtils;
use gosub_css_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    /// Parses the arguments of a function whose name token was just consumed
    pub(crate) fn parse_function(
        &mut self,
        value: &mut LexicalValue,
        name: &str,
        t: &Token,
    ) -> CssResult<UnitId> {
        log::trace!("parse_function");

        let lower = name.cow_to_ascii_lowercase();

        self.nested(t.location, |parser| match lower.as_ref() {
            "calc" => parser.parse_calc(value, t),
            "var" => parser.parse_var(value),
            "attr" => parser.parse_attr(value),
            "counter" => parser.parse_counter(value, false),
            "counters" => parser.parse_counter(value, true),
            "element" => parser.parse_element(value),
            "url" => parser.parse_url_function(value),
            "expression" => parser.parse_expression_hack(value, t),
            other => {
                if let Some(kind) = ColorFunctionKind::from_name(other) {
                    return parser.parse_color_function(value, kind);
                }
                if calc_like_function(other) {
                    return parser.parse_math_function(value, name);
                }
                parser.parse_generic_function(value, name)
            }
        })
    }

    fn parse_generic_function(
        &mut self,
        value: &mut LexicalValue,
        name: &str,
    ) -> CssResult<UnitId> {
        log::trace!("parse_generic_function");

        let function = value.push_unit(UnitKind::Function(name.to_string()));
        let arguments = self.parse_value_sequence(value, ValueContext::Function)?;
        self.consume_closing_paren()?;
        value.set_parameters(function, &arguments);

        Ok(function)
    }

    /// `min()`, `max()`, `clamp()` and the other math functions take comma separated calc sums
    fn parse_math_function(&mut self, value: &mut LexicalValue, name: &str) -> CssResult<UnitId> {
        log::trace!("parse_math_function");

        let function = value.push_unit(UnitKind::Function(name.to_string()));
        let mut arguments = Vec::new();

        loop {
            let sum = self.parse_calc_sum(value)?;
            if sum.is_empty() {
                let t = self.tokenizer.lookahead(0);
                let message = format!("Expected argument for {name}()");
                return Err(self.unexpected(&t, &message));
            }
            arguments.extend(sum);

            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Comma => {
                    arguments.push(value.push_unit(UnitKind::Operator(OperatorKind::Comma)))
                }
                TokenType::RParen => break,
                _ => return Err(self.unexpected(&t, "Expected ',' or ')'")),
            }
        }

        value.set_parameters(function, &arguments);
        Ok(function)
    }

    /// Reads `, fallback` or `)` after the mandatory arguments of `var()` and `attr()`
    fn parse_fallback(
        &mut self,
        value: &mut LexicalValue,
        arguments: &mut Vec<UnitId>,
    ) -> CssResult<()> {
        self.consume_whitespace_comments();

        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::RParen => Ok(()),
            TokenType::Comma => {
                arguments.push(value.push_unit(UnitKind::Operator(OperatorKind::Comma)));

                let fallback = self.parse_value_sequence(value, ValueContext::Fallback)?;
                if fallback.is_empty() {
                    arguments.push(value.push_unit(UnitKind::Empty));
                }
                arguments.extend(fallback);

                self.consume_closing_paren()?;
                Ok(())
            }
            _ => Err(self.unexpected(&t, "Expected ',' or ')'")),
        }
    }

    /// `var(--name[, fallback])`
    fn parse_var(&mut self, value: &mut LexicalValue) -> CssResult<UnitId> {
        log::trace!("parse_var");

        let var = value.push_unit(UnitKind::Var);

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let name = match t.token_type {
            TokenType::Ident(ref name) if name.starts_with("--") => name.clone(),
            _ => return Err(self.unexpected(&t, "Expected custom property name")),
        };

        let mut arguments = vec![value.push_unit(UnitKind::Ident(name))];
        self.parse_fallback(value, &mut arguments)?;
        value.set_parameters(var, &arguments);

        Ok(var)
    }

    /// `attr(name [type-or-unit]? [, fallback]?)`
    fn parse_attr(&mut self, value: &mut LexicalValue) -> CssResult<UnitId> {
        log::trace!("parse_attr");

        let attr = value.push_unit(UnitKind::Attr);

        self.consume_whitespace_comments();
        let name = self.consume_any_ident()?;
        let mut arguments = vec![value.push_unit(UnitKind::Ident(name))];

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        match &t.token_type {
            TokenType::Ident(type_or_unit) => {
                arguments.push(value.push_unit(UnitKind::Ident(type_or_unit.clone())));
            }
            TokenType::Function(name) => {
                arguments.push(self.parse_function(value, name, &t)?);
            }
            _ => self.tokenizer.reconsume(),
        }

        self.parse_fallback(value, &mut arguments)?;
        value.set_parameters(attr, &arguments);

        Ok(attr)
    }

    /// `counter(name[, style])` and `counters(name, "separator"[, style])`
    fn parse_counter(&mut self, value: &mut LexicalValue, counters: bool) -> CssResult<UnitId> {
        log::trace!("parse_counter");

        let unit = value.push_unit(if counters {
            UnitKind::Counters
        } else {
            UnitKind::Counter
        });

        self.consume_whitespace_comments();
        let name = self.consume_any_ident()?;
        let mut arguments = vec![value.push_unit(UnitKind::Ident(name))];

        if counters {
            self.consume_whitespace_comments();
            self.consume(TokenType::Comma)?;
            arguments.push(value.push_unit(UnitKind::Operator(OperatorKind::Comma)));

            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            self.check_string(&t)?;
            if let TokenType::QuotedString(separator) = t.token_type {
                arguments.push(value.push_unit(UnitKind::String(separator)));
            }
        }

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::RParen => {}
            TokenType::Comma => {
                arguments.push(value.push_unit(UnitKind::Operator(OperatorKind::Comma)));

                self.consume_whitespace_comments();
                let style = self.tokenizer.consume();
                let style = match &style.token_type {
                    TokenType::Ident(name) => value.push_unit(UnitKind::Ident(name.clone())),
                    TokenType::Function(name) if name.eq_ignore_ascii_case("symbols") => {
                        self.parse_function(value, name, &style)?
                    }
                    _ => return Err(self.unexpected(&style, "Expected counter style")),
                };
                arguments.push(style);

                self.consume_closing_paren()?;
            }
            _ => return Err(self.unexpected(&t, "Expected ',' or ')'")),
        }

        value.set_parameters(unit, &arguments);
        Ok(unit)
    }

    /// `element(#id)`
    fn parse_element(&mut self, value: &mut LexicalValue) -> CssResult<UnitId> {
        log::trace!("parse_element");

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        let id = match t.token_type {
            TokenType::IDHash(ref id) => id.clone(),
            _ => return Err(self.unexpected(&t, "Expected element id")),
        };
        self.consume_closing_paren()?;

        let element = value.push_unit(UnitKind::Element);
        value.push_parameter(element, UnitKind::Ident(id));

        Ok(element)
    }

    /// `url("...")`. Unquoted urls are read as a single url token by the tokenizer.
    fn parse_url_function(&mut self, value: &mut LexicalValue) -> CssResult<UnitId> {
        log::trace!("parse_url_function");

        self.consume_whitespace_comments();
        let t = self.tokenizer.consume();
        self.check_string(&t)?;

        let url = match t.token_type {
            TokenType::QuotedString(url) => url,
            _ => return Err(CssError::with_location("Expected url", t.location)),
        };
        self.consume_closing_paren()?;

        Ok(value.push_unit(UnitKind::Uri(url)))
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

    #[test_case("var(--main-color)", "var(--main-color)")]
    #[test_case("var( --x , 10px 2px )", "var(--x,10px 2px)")]
    #[test_case("var(--x,)", "var(--x,)")]
    #[test_case("attr(data-size px, 3px)", "attr(data-size px,3px)")]
    #[test_case("attr(title)", "attr(title)")]
    #[test_case("counter(item)", "counter(item)")]
    #[test_case("counters(item, \".\", upper-roman)", "counters(item,\".\",upper-roman)")]
    #[test_case("element(#header)", "element(#header)")]
    #[test_case("url(\"a.png\")", "url(a.png)")]
    #[test_case("min(10px, 5vw + 2px)", "min(10px,5vw + 2px)")]
    #[test_case("clamp(1rem, 2.5vw, 2rem)", "clamp(1rem,2.5vw,2rem)")]
    #[test_case("foo(a, b c)", "foo(a,b c)")]
    #[test_case("var(--x, a,,b)", "var(--x,a,,b)")]
    fn serializes(input: &str, expected: &str) {
        assert_eq!(parse(input), expected);
    }

    #[test_case("var(x)" ; "name without dashes")]
    #[test_case("var(--x y)" ; "garbage after name")]
    #[test_case("counters(item)" ; "counters without separator")]
    #[test_case("counters(item, sep)" ; "separator must be a string")]
    #[test_case("element(header)" ; "element without hash")]
    #[test_case("element(#a #b)" ; "element with two ids")]
    #[test_case("min(10px,)" ; "missing math argument")]
    #[test_case("url(\"a.png\" x)" ; "garbage after url")]
    fn rejects(input: &str) {
        let result = CssParser::parse_value_str(input, &ParserConfig::default());
        assert!(result.is_err());
    }

    #[test_case("foo(a,,b)", 7 ; "empty argument")]
    #[test_case("foo(,)", 5 ; "leading comma")]
    #[test_case("foo(a,)", 7 ; "trailing comma")]
    #[test_case("(a, , b)", 5 ; "empty argument in sub expression")]
    fn rejects_empty_arguments(input: &str, column: usize) {
        let err = CssParser::parse_value_str(input, &ParserConfig::default()).unwrap_err();
        assert_eq!(err.column(), column);
    }

    #[test]
    fn empty_var_fallback() {
        let value = CssParser::parse_value_str("var(--x,)", &ParserConfig::default()).unwrap();
        let var = value.head().unwrap();
        let last = value.parameters(var).last().unwrap();
        assert_eq!(value.kind(last), &UnitKind::Empty);
        assert!(value.unit(last).is_parameter());
    }
}
