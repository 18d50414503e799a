use crate::tokenizer::Token;
use crate::unicode::UnicodeChar;
use crate::value::{LexicalValue, UnitId, UnitKind};
use crate::CssParser;
use gosub_css_shared::errors::{CssError, CssResult};

/// Maximum number of hex digits (or wildcards) in one side of a range
const MAX_DIGITS: usize = 6;

fn code_point(digits: &str) -> Option<u32> {
    if digits.is_empty() || digits.len() > MAX_DIGITS {
        return None;
    }

    u32::from_str_radix(digits, 16)
        .ok()
        .filter(|cp| *cp <= UnicodeChar::MAX_ALLOWED)
}

impl CssParser<'_> {
    /// Parses `U+hhh`, `U+hh??` and `U+hh-hh`. The token holds the text after `U+`.
    pub(crate) fn parse_unicode_range(
        &mut self,
        value: &mut LexicalValue,
        raw: &str,
        t: &Token,
    ) -> CssResult<UnitId> {
        log::trace!("parse_unicode_range");

        let invalid = |message: &str| CssError::with_location(message, t.location);

        let (start, end) = match raw.split_once('-') {
            Some((start, end)) => (start, Some(end)),
            None => (raw, None),
        };

        if start.len() > MAX_DIGITS || end.is_some_and(|end| end.len() > MAX_DIGITS) {
            return Err(invalid("Unicode range has more than 6 digits"));
        }

        let digits = start.trim_end_matches('?');
        if digits.len() < start.len() {
            if digits.contains('?') {
                return Err(invalid("Unexpected hex digit after wildcard"));
            }
            if end.is_some() {
                return Err(invalid("Wildcards cannot be used in a range"));
            }
            if code_point(&start.replace('?', "0")).is_none() {
                return Err(invalid("Unicode range is out of bounds"));
            }

            let range = value.push_unit(UnitKind::UnicodeRange);
            value.push_parameter(range, UnitKind::UnicodeWildcard(start.to_string()));
            return Ok(range);
        }

        let first = code_point(start).ok_or_else(|| invalid("Invalid unicode range start"))?;
        let last = match end {
            Some(end) => {
                let last = code_point(end).ok_or_else(|| invalid("Invalid unicode range end"))?;
                if last < first {
                    return Err(invalid("Unicode range end is below its start"));
                }
                Some(last)
            }
            None => None,
        };

        let range = value.push_unit(UnitKind::UnicodeRange);
        value.push_parameter(range, UnitKind::UnicodeCharacter(first));
        if let Some(last) = last {
            value.push_parameter(range, UnitKind::UnicodeCharacter(last));
        }

        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::value::UnitKind;
    use crate::CssParser;
    use test_case::test_case;

    #[test_case("U+0025-00FF", "U+25-ff")]
    #[test_case("u+4??", "U+4??")]
    #[test_case("U+26", "U+26")]
    #[test_case("U+0-7F, U+1F600", "U+0-7f,U+1f600")]
    #[test_case("U+??????", "U+??????")]
    fn serializes(input: &str, expected: &str) {
        let value = CssParser::parse_value_str(input, &ParserConfig::default()).unwrap();
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn range_parameters() {
        let value = CssParser::parse_value_str("U+0025-00FF", &ParserConfig::default()).unwrap();
        let range = value.head().unwrap();
        assert_eq!(value.kind(range), &UnitKind::UnicodeRange);

        let kinds: Vec<&UnitKind> = value.parameters(range).map(|id| value.kind(id)).collect();
        assert_eq!(
            kinds,
            vec![
                &UnitKind::UnicodeCharacter(0x25),
                &UnitKind::UnicodeCharacter(0xff),
            ]
        );
    }

    #[test_case("U+1234567" ; "too many digits")]
    #[test_case("U+4??5" ; "hex digit after wildcard")]
    #[test_case("U+4??-50" ; "wildcard in range")]
    #[test_case("U+20-1F" ; "end below start")]
    #[test_case("U+110000" ; "above the unicode maximum")]
    #[test_case("U+0-1234567" ; "end with too many digits")]
    fn rejects(input: &str) {
        let result = CssParser::parse_value_str(input, &ParserConfig::default());
        assert!(result.is_err());
    }
}
