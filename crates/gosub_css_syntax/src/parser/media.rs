use crate::condition::BooleanCondition;
use crate::handler::ParseReport;
use crate::media::{
    MediaCondition, MediaFeature, MediaQualifier, MediaQuery, MediaQueryList, RangeOperator,
};
use crate::parser::{Segment, ValueContext};
use crate::tokenizer::{TokenType, TokenizerOptions};
use crate::value::LexicalValue;
use crate::CssParser;
use cow_utils::CowUtils;
use gosub_css_shared::errors::{CssError, CssResult};

/// Identifiers that can never be a media type
const RESERVED_MEDIA_TYPES: [&str; 5] = ["not", "only", "and", "or", "layer"];

impl CssParser<'_> {
    /// Parses every segment as a media query on its own. A query that fails to parse is kept
    /// as an invalid query so the other queries in the list still apply.
    pub(crate) fn parse_media_segments(&self, segments: &[Segment]) -> ParseReport<MediaQueryList> {
        log::trace!("parse_media_segments");

        let mut report = ParseReport::new(MediaQueryList::default());

        for segment in segments {
            let result = self.parse_segment(segment, TokenizerOptions::default(), |parser| {
                parser.parse_media_query()
            });

            match result {
                Ok(query) => report.value.queries.push(query),
                Err(err) => {
                    log::warn!("Invalid media query '{}': {}", segment.text.trim(), err);
                    report.value.queries.push(MediaQuery::invalid());
                    report.value.has_errors = true;
                    report.errors.push(err);
                }
            }
        }

        report
    }

    /// `[not | only]? type [and condition]?` or a bare condition
    fn parse_media_query(&mut self) -> CssResult<MediaQuery> {
        log::trace!("parse_media_query");

        self.consume_whitespace_comments();

        let t = self.tokenizer.lookahead(0);
        let not_followed_by_ident =
            t.is_ident_value("not") && !self.tokenizer.lookahead_sc(1).is_ident();
        if !t.is_ident() || not_followed_by_ident {
            let condition = self.parse_media_condition(true)?;
            return Ok(MediaQuery {
                condition: Some(condition),
                ..MediaQuery::all()
            });
        }

        let qualifier = if t.is_ident_value("not") {
            Some(MediaQualifier::Not)
        } else if t.is_ident_value("only") {
            Some(MediaQualifier::Only)
        } else {
            None
        };
        if qualifier.is_some() {
            self.tokenizer.consume();
            self.consume_whitespace_comments();
        }

        let t = self.tokenizer.consume();
        let media_type = match &t.token_type {
            TokenType::Ident(name) => name.cow_to_ascii_lowercase().into_owned(),
            _ => return Err(self.unexpected(&t, "Expected media type")),
        };
        if RESERVED_MEDIA_TYPES.contains(&media_type.as_str()) {
            return Err(CssError::with_location(
                &format!("'{media_type}' is not a valid media type"),
                t.location,
            ));
        }

        self.consume_whitespace_comments();

        let condition = if self.tokenizer.lookahead(0).is_ident_value("and") {
            self.tokenizer.consume();
            Some(self.parse_media_condition(false)?)
        } else {
            None
        };

        Ok(MediaQuery {
            qualifier,
            media_type,
            condition,
            valid: true,
        })
    }

    /// Parses a media condition. After a media type `or` is only allowed inside parentheses.
    fn parse_media_condition(&mut self, allow_or: bool) -> CssResult<MediaCondition> {
        log::trace!("parse_media_condition");

        self.parse_boolean_condition(allow_or, |parser| parser.parse_media_in_parens())
    }

    /// `( condition )` or `( feature )`
    fn parse_media_in_parens(&mut self) -> CssResult<MediaCondition> {
        log::trace!("parse_media_in_parens");

        let open = self.consume(TokenType::LParen)?;

        self.nested(open.location, |parser| {
            parser.consume_whitespace_comments();

            let t = parser.tokenizer.lookahead(0);
            let condition = if t.token_type == TokenType::LParen || t.is_ident_value("not") {
                parser.parse_media_condition(true)?
            } else {
                BooleanCondition::Predicate(parser.parse_media_feature()?)
            };

            parser.consume_closing_paren()?;

            Ok(condition)
        })
    }

    /// Parses the inside of a feature test, up to but not including the closing `)`
    fn parse_media_feature(&mut self) -> CssResult<MediaFeature> {
        log::trace!("parse_media_feature");

        let t = self.tokenizer.lookahead(0);
        let next = self.tokenizer.lookahead_sc(1);
        let name_first = t.is_ident()
            && (next.is_colon()
                || next.token_type == TokenType::RParen
                || next.is_eof()
                || matches!(next.token_type, TokenType::Delim('<' | '>' | '=')));

        if !name_first {
            return self.parse_media_range_value_first();
        }

        let name = self.consume_any_ident()?.cow_to_ascii_lowercase().into_owned();
        self.consume_whitespace_comments();

        let t = self.tokenizer.lookahead(0);
        match t.token_type {
            TokenType::Colon => {
                self.tokenizer.consume();
                let bound = self.parse_media_bound()?;

                if let Some(name) = name.strip_prefix("min-") {
                    Ok(MediaFeature::range(name, RangeOperator::Ge, bound))
                } else if let Some(name) = name.strip_prefix("max-") {
                    Ok(MediaFeature::range(name, RangeOperator::Le, bound))
                } else {
                    Ok(MediaFeature::range(&name, RangeOperator::Plain, bound))
                }
            }
            TokenType::Delim(_) => {
                if name.starts_with("min-") || name.starts_with("max-") {
                    return Err(CssError::with_location(
                        &format!("'{name}' cannot be used in a range"),
                        t.location,
                    ));
                }

                let operator = self.parse_range_operator()?;
                let bound = self.parse_media_bound()?;
                Ok(MediaFeature::range(&name, operator, bound))
            }
            _ => Ok(MediaFeature::boolean(&name)),
        }
    }

    /// `(v OP name)` and `(v1 OP name OP v2)`
    fn parse_media_range_value_first(&mut self) -> CssResult<MediaFeature> {
        log::trace!("parse_media_range_value_first");

        let bound = self.parse_media_bound()?;
        let first = self.parse_range_operator()?;

        self.consume_whitespace_comments();
        let name = self.consume_any_ident()?.cow_to_ascii_lowercase().into_owned();
        self.consume_whitespace_comments();

        let t = self.tokenizer.lookahead(0);
        if !matches!(t.token_type, TokenType::Delim('<' | '>' | '=')) {
            return Ok(MediaFeature::range(&name, first.flip(), bound));
        }

        let second = self.parse_range_operator()?;
        let operator = RangeOperator::combine(first, second).ok_or_else(|| {
            CssError::with_location(
                "Both comparisons of a range must point in the same direction",
                t.location,
            )
        })?;
        let bound2 = self.parse_media_bound()?;

        Ok(MediaFeature {
            bound2: Some(bound2),
            ..MediaFeature::range(&name, operator, bound)
        })
    }

    /// `<`, `<=`, `>`, `>=` or `=`. The `=` of a two character operator must follow directly.
    fn parse_range_operator(&mut self) -> CssResult<RangeOperator> {
        log::trace!("parse_range_operator");

        self.consume_whitespace_comments();

        let t = self.tokenizer.consume();
        let operator = match t.token_type {
            TokenType::Delim('=') => return Ok(RangeOperator::Eq),
            TokenType::Delim('<') => RangeOperator::Lt,
            TokenType::Delim('>') => RangeOperator::Gt,
            _ => return Err(self.unexpected(&t, "Expected comparison operator")),
        };

        if self.tokenizer.lookahead(0).is_delim('=') {
            self.tokenizer.consume();
            return Ok(match operator {
                RangeOperator::Lt => RangeOperator::Le,
                _ => RangeOperator::Ge,
            });
        }

        Ok(operator)
    }

    /// A feature value. It ends at `)` or at a comparison operator.
    fn parse_media_bound(&mut self) -> CssResult<LexicalValue> {
        log::trace!("parse_media_bound");

        let mut value = LexicalValue::new();
        let units = self.parse_value_sequence(&mut value, ValueContext::MediaBound)?;

        if units.is_empty() {
            let t = self.tokenizer.lookahead_sc(0);
            return Err(self.unexpected(&t, "Expected media feature value"));
        }
        value.set_top_level(&units);

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::condition::BooleanCondition;
    use crate::config::ParserConfig;
    use crate::media::{MediaFeature, MediaQualifier, MediaQueryList, RangeOperator};
    use crate::CssParser;
    use test_case::test_case;

    fn parse(data: &str) -> MediaQueryList {
        CssParser::parse_media_query_list_str(data, &ParserConfig::default())
    }

    fn feature(data: &str) -> MediaFeature {
        let list = parse(data);
        match &list.queries[0].condition {
            Some(BooleanCondition::Predicate(feature)) => feature.clone(),
            other => panic!("expected a single feature, got {other:?}"),
        }
    }

    #[test_case("screen", "screen")]
    #[test_case("SCREEN", "screen")]
    #[test_case("only screen", "only screen")]
    #[test_case("not print", "not print")]
    #[test_case("screen and (color)", "screen and (color)")]
    #[test_case("screen and (min-width: 600px)", "screen and (width >= 600px)")]
    #[test_case("(max-width:600px)", "(width <= 600px)")]
    #[test_case("(width >= 600px)", "(width >= 600px)")]
    #[test_case("(600px < width)", "(width > 600px)")]
    #[test_case("(400px <= width < 700px)", "(400px <= width < 700px)")]
    #[test_case("(aspect-ratio: 16/9)", "(aspect-ratio: 16/9)")]
    #[test_case("(width > calc(100px + 2em))", "(width > calc(100px + 2em))")]
    #[test_case("(color) and (hover)", "(color) and (hover)")]
    #[test_case("(color) or (hover)", "(color) or (hover)")]
    #[test_case("not (color)", "not (color)")]
    #[test_case("screen and ((color) or (hover))", "screen and ((color) or (hover))")]
    #[test_case("screen, print", "screen, print")]
    #[test_case("", "")]
    #[test_case("screen and", "not all")]
    #[test_case("screen, @foo, print", "screen, not all, print")]
    #[test_case("@foo, (", "not all")]
    fn serializes(input: &str, expected: &str) {
        assert_eq!(parse(input).to_string(), expected);
    }

    #[test]
    fn legacy_prefixes_normalize() {
        assert_eq!(feature("(min-width: 600px)"), feature("(width >= 600px)"));
        assert_eq!(feature("(max-width: 600px)"), feature("(width <= 600px)"));
        assert_eq!(feature("(600px <= width)"), feature("(width >= 600px)"));
    }

    #[test]
    fn two_sided_range() {
        let feature = feature("(400px < width <= 700px)");
        assert_eq!(feature.name, "width");
        assert_eq!(feature.operator, RangeOperator::LtLe);
        assert_eq!(feature.bound.unwrap().to_string(), "400px");
        assert_eq!(feature.bound2.unwrap().to_string(), "700px");
    }

    #[test]
    fn qualifiers() {
        let list = parse("not screen and (color), only print");
        assert_eq!(list.queries[0].qualifier, Some(MediaQualifier::Not));
        assert_eq!(list.queries[0].media_type, "screen");
        assert_eq!(list.queries[1].qualifier, Some(MediaQualifier::Only));
        assert!(!list.has_errors);

        let list = parse("(color)");
        assert_eq!(list.queries[0].qualifier, None);
        assert_eq!(list.queries[0].media_type, "all");
    }

    #[test_case("2 > color < 5" ; "mixed directions without parens")]
    #[test_case("(2 > color < 5)" ; "mixed directions")]
    #[test_case("(1 = width = 2)" ; "two equalities")]
    #[test_case("(color) and (hover) or (grid)" ; "mixed and or")]
    #[test_case("screen and (color) or (hover)" ; "or after media type")]
    #[test_case("only (color)" ; "only without type")]
    #[test_case("and" ; "reserved type")]
    #[test_case("screen print" ; "two types")]
    #[test_case("(width:)" ; "missing value")]
    #[test_case("(min-width > 10px)" ; "prefixed range")]
    #[test_case("(width >= 600px" ; "unterminated")]
    #[test_case("not (color) and (hover)" ; "not followed by and")]
    fn rejects(input: &str) {
        let report = CssParser::parse_media_query_list_recovering(input, &ParserConfig::default());
        assert!(report.value.has_errors);
        assert_eq!(report.errors.len(), 1);
        assert!(report.value.is_not_all());
    }

    #[test]
    fn matching() {
        let all = parse("all");
        let screen = parse("screen");
        let not_all = parse("not all");

        assert!(all.matches(&screen));
        assert!(!screen.matches(&all));
        assert!(!not_all.matches(&screen));
        assert!(!screen.matches(&not_all));
        assert_eq!(not_all, parse("not all"));

        let matches = |query: &str, other: &str| parse(query).matches(&parse(other));
        assert!(matches("screen", "screen and (min-width: 800px)"));
        assert!(matches("(min-width: 600px)", "(width >= 800px)"));
        assert!(!matches("(min-width: 800px)", "(min-width: 600px)"));
        assert!(parse("screen, print").matches(&parse("print")));
        assert!(parse("not print").matches(&parse("screen")));
        assert!(parse("").matches(&parse("print")));
    }
}
