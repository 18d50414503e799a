use crate::config::ParserFlags;
use crate::escape::trim_unescaped;
use crate::parser::is_terminated;
use crate::tokenizer::{Number, Token, TokenType};
use crate::value::{ColorFunctionKind, LexicalValue, OperatorKind, UnitId, UnitKind};
use crate::CssParser;
use gosub_css_shared::char_stream::Location;
use gosub_css_shared::errors::{CssError, CssErrorKind, CssResult};

/// Where a value sequence is parsed. This decides which tokens end it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ValueContext {
    TopLevel,
    /// Arguments of a function or sub-expression. Commas must separate two arguments.
    Function,
    /// Fallback of `var()` and `attr()`, which may hold any comma placement
    Fallback,
    /// Bound of a media feature range, which ends at a comparison operator
    MediaBound,
}

/// Kind of a plain numeric token
pub(crate) fn number_kind(token: &Token, value: Number) -> UnitKind {
    match token.integer_value() {
        Some(i) => UnitKind::Integer(i),
        None => UnitKind::Real(value),
    }
}

impl CssParser<'_> {
    /// Parses a complete value expression
    pub(crate) fn parse_value_expression(&mut self) -> CssResult<LexicalValue> {
        log::trace!("parse_value_expression");

        let mut value = LexicalValue::new();
        let units = self.parse_value_sequence(&mut value, ValueContext::TopLevel)?;

        if units.is_empty() {
            let t = self.tokenizer.lookahead_sc(0);
            return Err(self.unexpected(&t, "Expected value"));
        }

        self.expect_eof()?;
        value.set_top_level(&units);

        Ok(value)
    }

    /// Parses a chain of units into `value` and returns them in source order. The units are
    /// not linked yet. The token that ends the sequence is left in the stream.
    pub(crate) fn parse_value_sequence(
        &mut self,
        value: &mut LexicalValue,
        context: ValueContext,
    ) -> CssResult<Vec<UnitId>> {
        log::trace!("parse_value_sequence");

        let mut units = Vec::new();
        let mut pending_comma = false;

        loop {
            let t = self.tokenizer.consume();

            let unit = match t.token_type {
                TokenType::Whitespace | TokenType::Comment(_) => continue,
                TokenType::Eof
                | TokenType::RParen
                | TokenType::RBracket
                | TokenType::RCurly
                | TokenType::Semicolon
                | TokenType::Delim('!') => {
                    if pending_comma && context == ValueContext::Function {
                        return Err(CssError::with_location(
                            "Expected argument after ','",
                            t.location,
                        ));
                    }
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Delim('<' | '>' | '=') if context == ValueContext::MediaBound => {
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Comma => {
                    if context == ValueContext::Function && (units.is_empty() || pending_comma) {
                        return Err(self.unexpected(&t, "Expected argument before ','"));
                    }
                    pending_comma = true;
                    units.push(value.push_unit(UnitKind::Operator(OperatorKind::Comma)));
                    continue;
                }
                TokenType::Delim('#') => return Err(invalid_hex(&t)),
                TokenType::Delim(c) => self.parse_operator(value, c, &t, context)?,
                _ => self.parse_term(value, &t)?,
            };

            pending_comma = false;
            units.push(unit);
        }

        Ok(units)
    }

    fn parse_operator(
        &mut self,
        value: &mut LexicalValue,
        c: char,
        t: &Token,
        context: ValueContext,
    ) -> CssResult<UnitId> {
        log::trace!("parse_operator");

        let op = match c {
            '/' => OperatorKind::Slash,
            '*' => OperatorKind::Multiply,
            '+' => OperatorKind::Plus,
            '-' => OperatorKind::Minus,
            '^' => OperatorKind::Exponent,
            '=' if matches!(context, ValueContext::Function | ValueContext::Fallback) => {
                if !self.config.flags.contains(ParserFlags::IEVALUES) {
                    return Err(CssError::with_kind(
                        CssErrorKind::UnsupportedConstruct,
                        "'=' is only accepted in compatibility values",
                        t.location,
                    ));
                }
                OperatorKind::Equals
            }
            _ => return Err(self.unexpected(t, "Unexpected character in value")),
        };

        Ok(value.push_unit(UnitKind::Operator(op)))
    }

    /// Parses a single term of a value
    pub(crate) fn parse_term(&mut self, value: &mut LexicalValue, t: &Token) -> CssResult<UnitId> {
        log::trace!("parse_term");

        match &t.token_type {
            TokenType::Ident(name) => {
                if let Some(unit) = self.parse_compat_hack(value, t)? {
                    return Ok(unit);
                }
                if name.eq_ignore_ascii_case("progid") && self.tokenizer.lookahead(0).is_colon() {
                    return self.parse_progid(value, t);
                }
                Ok(value.push_unit(UnitKind::Ident(name.clone())))
            }
            TokenType::Number(n) => Ok(value.push_unit(number_kind(t, *n))),
            TokenType::Percentage(n) => Ok(value.push_unit(UnitKind::Percentage(*n))),
            TokenType::Dimension { value: n, unit } => {
                if let Some(compat) = self.parse_compat_hack(value, t)? {
                    return Ok(compat);
                }
                Ok(value.push_unit(UnitKind::Dimension {
                    value: *n,
                    unit: unit.clone(),
                }))
            }
            TokenType::QuotedString(s) => {
                self.check_string(t)?;
                Ok(value.push_unit(UnitKind::String(s.clone())))
            }
            TokenType::Url(url) => {
                if !is_terminated(&t.raw, ')') {
                    return Err(CssError::with_kind(
                        CssErrorKind::Eof,
                        "Unterminated url()",
                        t.location,
                    ));
                }
                Ok(value.push_unit(UnitKind::Uri(url.clone())))
            }
            TokenType::Hash(hex) | TokenType::IDHash(hex) => self.parse_hex_color(value, hex, t),
            TokenType::UnicodeRange(raw) => self.parse_unicode_range(value, raw, t),
            TokenType::Function(name) => self.parse_function(value, name, t),
            TokenType::LParen => self.nested(t.location, |parser| {
                let sub = value.push_unit(UnitKind::SubExpression);
                let units = parser.parse_value_sequence(value, ValueContext::Function)?;
                parser.consume_closing_paren()?;
                value.set_parameters(sub, &units);
                Ok(sub)
            }),
            _ => Err(self.unexpected(t, "Unexpected token in value")),
        }
    }

    /// Fails for strings that run into the end of the input or a newline
    pub(crate) fn check_string(&self, t: &Token) -> CssResult<()> {
        match &t.token_type {
            TokenType::QuotedString(_) => {
                let quote = t.raw.chars().next().unwrap_or('"');
                if is_terminated(&t.raw, quote) {
                    Ok(())
                } else {
                    Err(CssError::with_kind(
                        CssErrorKind::Eof,
                        "Unterminated string",
                        t.location,
                    ))
                }
            }
            _ => Err(self.unexpected(t, "Expected string")),
        }
    }

    /// Old Internet Explorer hacks like `600px\9`
    fn parse_compat_hack(&self, value: &mut LexicalValue, t: &Token) -> CssResult<Option<UnitId>> {
        // whitespace ending the `\9` escape stays, it keeps the next unit out of the escape
        let raw = trim_unescaped(&t.raw);
        if !raw.trim_end().ends_with("\\9") {
            return Ok(None);
        }

        if !self.config.flags.contains(ParserFlags::IEVALUES) {
            return Err(CssError::with_kind(
                CssErrorKind::UnsupportedConstruct,
                "Compatibility hack is not accepted",
                t.location,
            ));
        }

        let unit = value.push_unit(UnitKind::CompatIdent(raw.to_string()));
        Ok(Some(unit))
    }

    /// `progid:DXImageTransform.Microsoft.gradient(...)`
    fn parse_progid(&mut self, value: &mut LexicalValue, t: &Token) -> CssResult<UnitId> {
        log::trace!("parse_progid");

        if !self.config.flags.contains(ParserFlags::IEVALUES) {
            return Err(CssError::with_kind(
                CssErrorKind::UnsupportedConstruct,
                "progid filters are not accepted",
                t.location,
            ));
        }

        loop {
            let next = self.tokenizer.consume();
            match next.token_type {
                TokenType::Function(_) => {
                    let raw = self.consume_balanced_raw(t.location.offset)?;
                    return Ok(value.push_unit(UnitKind::CompatIdent(raw)));
                }
                TokenType::Colon | TokenType::Ident(_) | TokenType::Delim('.') => {}
                _ => return Err(self.unexpected(&next, "Expected progid filter")),
            }
        }
    }

    /// `expression(...)` is kept as raw text
    pub(crate) fn parse_expression_hack(
        &mut self,
        value: &mut LexicalValue,
        t: &Token,
    ) -> CssResult<UnitId> {
        log::trace!("parse_expression_hack");

        if !self.config.flags.contains(ParserFlags::IEVALUES) {
            return Err(CssError::with_kind(
                CssErrorKind::UnsupportedConstruct,
                "expression() is not accepted",
                t.location,
            ));
        }

        let raw = self.consume_balanced_raw(t.location.offset)?;
        Ok(value.push_unit(UnitKind::CompatIdent(raw)))
    }

    /// Decodes `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa` into an `rgb()` unit
    fn parse_hex_color(
        &mut self,
        value: &mut LexicalValue,
        hex: &str,
        t: &Token,
    ) -> CssResult<UnitId> {
        log::trace!("parse_hex_color");

        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| invalid_hex(t))?;

        let (channels, alpha) = match digits.len() {
            3 | 4 => {
                let channels: Vec<u8> = digits.iter().map(|d| d * 17).collect();
                let alpha = digits.get(3).map(|d| round(f32::from(*d) / 15.0, 100.0));
                (channels, alpha)
            }
            6 | 8 => {
                let channels: Vec<u8> = digits.chunks(2).map(|p| p[0] * 16 + p[1]).collect();
                let alpha = channels.get(3).map(|a| round(f32::from(*a) / 255.0, 1000.0));
                (channels, alpha)
            }
            _ => return Err(invalid_hex(t)),
        };

        let color = value.push_unit(UnitKind::ColorFunction(ColorFunctionKind::Rgb));
        for channel in channels.iter().take(3) {
            value.push_parameter(color, UnitKind::Integer(i32::from(*channel)));
        }
        if let Some(alpha) = alpha {
            value.push_parameter(color, UnitKind::Operator(OperatorKind::Slash));
            value.push_parameter(color, UnitKind::Real(alpha));
        }

        Ok(color)
    }
}

fn round(value: f32, precision: f32) -> f32 {
    (value * precision).round() / precision
}

/// Hex color errors point at the first character after the `#`
fn invalid_hex(t: &Token) -> CssError {
    let location = Location::new(
        t.location.line,
        t.location.column + 1,
        t.location.offset + 1,
    );
    CssError::with_location("Invalid hex color", location)
}

#[cfg(test)]
mod tests {
    use crate::config::{ParserConfig, ParserFlags};
    use crate::value::{OperatorKind, UnitKind};
    use crate::CssParser;
    use gosub_css_shared::errors::CssErrorKind;
    use test_case::test_case;

    fn parse(data: &str) -> String {
        CssParser::parse_value_str(data, &ParserConfig::default())
            .unwrap()
            .to_string()
    }

    #[test_case("Times New Roman", "Times New Roman")]
    #[test_case("  1px   solid\tred ", "1px solid red")]
    #[test_case("a, b,c", "a,b,c")]
    #[test_case("14px/1.5 serif", "14px/1.5 serif")]
    #[test_case("'quoted'", "\"quoted\"")]
    #[test_case("url(img.png)", "url(img.png)")]
    #[test_case("url( 'a b.png' )", "url(\"a b.png\")")]
    #[test_case("1.0em 50% -3", "1em 50% -3")]
    #[test_case("foo(1, 2)", "foo(1,2)")]
    #[test_case("translate(10px 20px)", "translate(10px 20px)")]
    #[test_case("inherit", "inherit")]
    #[test_case("a /* note */ b", "a b")]
    fn serializes(input: &str, expected: &str) {
        assert_eq!(parse(input), expected);
    }

    #[test]
    fn chain_structure() {
        let config = ParserConfig::default();
        let value = CssParser::parse_value_str("Times New Roman", &config).unwrap();
        assert_eq!(value.top_level().count(), 3);

        let value = CssParser::parse_value_str("a, b", &ParserConfig::default()).unwrap();
        let kinds: Vec<&UnitKind> = value.top_level().map(|id| value.kind(id)).collect();
        assert_eq!(kinds[1], &UnitKind::Operator(OperatorKind::Comma));
    }

    #[test]
    fn integers_and_reals() {
        let value = CssParser::parse_value_str("3 3.0 1e2", &ParserConfig::default()).unwrap();
        let kinds: Vec<&UnitKind> = value.top_level().map(|id| value.kind(id)).collect();
        assert_eq!(kinds[0], &UnitKind::Integer(3));
        assert_eq!(kinds[1], &UnitKind::Real(3.0));
        assert_eq!(kinds[2], &UnitKind::Real(100.0));
    }

    #[test_case("#f00", "rgb(255 0 0)")]
    #[test_case("#ff000080", "rgb(255 0 0/0.502)")]
    #[test_case("#f008", "rgb(255 0 0/0.53)")]
    #[test_case("#00FF7f", "rgb(0 255 127)")]
    fn hex_colors(input: &str, expected: &str) {
        assert_eq!(parse(input), expected);
    }

    #[test_case("#x", 2 ; "not hex")]
    #[test_case("#12345", 2 ; "five digits")]
    #[test_case("a #ggg", 4 ; "after other units")]
    fn invalid_hex_colors(input: &str, column: usize) {
        let err = CssParser::parse_value_str(input, &ParserConfig::default()).unwrap_err();
        assert_eq!(err.column(), column);
    }

    #[test]
    fn unterminated_tokens() {
        let config = ParserConfig::default();

        let err = CssParser::parse_value_str("\"abc", &config).unwrap_err();
        assert_eq!(err.kind, CssErrorKind::Eof);

        let err = CssParser::parse_value_str("url(a.png", &config).unwrap_err();
        assert_eq!(err.kind, CssErrorKind::Eof);

        let err = CssParser::parse_value_str("foo(a", &config).unwrap_err();
        assert_eq!(err.kind, CssErrorKind::Eof);
        assert_eq!(err.column(), 6);
    }

    #[test_case("" ; "empty")]
    #[test_case("a;" ; "semicolon")]
    #[test_case("a)" ; "stray paren")]
    #[test_case("a !important" ; "priority")]
    #[test_case("a = b" ; "equals outside function")]
    fn rejects(input: &str) {
        let result = CssParser::parse_value_str(input, &ParserConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn ie_compatibility_values() {
        let strict = ParserConfig::default();
        let ie = ParserConfig::with_flags(ParserFlags::IEVALUES);

        let filter =
            "progid:DXImageTransform.Microsoft.gradient(startColorstr='#1e5799', GradientType=0)";
        let err = CssParser::parse_value_str(filter, &strict).unwrap_err();
        assert_eq!(err.kind, CssErrorKind::UnsupportedConstruct);

        let value = CssParser::parse_value_str(filter, &ie).unwrap();
        let head = value.head().unwrap();
        assert_eq!(value.kind(head), &UnitKind::CompatIdent(filter.to_string()));

        let expression = "expression(document.body.clientWidth)";
        let value = CssParser::parse_value_str(expression, &ie).unwrap();
        assert_eq!(value.to_string(), expression);
        let result = CssParser::parse_value_str("expression(1)", &strict);
        assert!(result.is_err());

        let value = CssParser::parse_value_str("red\\9", &ie).unwrap();
        let head = value.head().unwrap();
        assert_eq!(value.kind(head), &UnitKind::CompatIdent("red\\9".into()));

        let value = CssParser::parse_value_str("1px\\9 2px", &ie).unwrap();
        let text = value.to_string();
        assert_eq!(text, "1px\\9  2px");
        let reparsed = CssParser::parse_value_str(&text, &ie).unwrap();
        assert_eq!(reparsed.to_string(), text);

        assert_eq!(
            CssParser::parse_value_str("alpha(opacity=50)", &ie)
                .unwrap()
                .to_string(),
            "alpha(opacity=50)"
        );
        let result = CssParser::parse_value_str("alpha(opacity=50)", &strict);
        assert!(result.is_err());
    }

    #[test]
    fn sub_expressions() {
        assert_eq!(parse("(a b)"), "(a b)");
        let result = CssParser::parse_value_str("(a b", &ParserConfig::default());
        assert!(result.is_err());
    }
}
