use crate::handler::ParseReport;
use crate::parser::Segment;
use crate::selector::SelectorList;
use crate::tokenizer::TokenizerOptions;
use crate::CssParser;
use gosub_css_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    /// Parses a comma separated list of complex selectors. Any invalid member fails the list.
    pub(crate) fn parse_selector_list(&mut self, relative: bool) -> CssResult<SelectorList> {
        log::trace!("parse_selector_list");

        let mut selectors = vec![];

        loop {
            selectors.push(self.parse_complex_selector(relative)?);

            self.consume_whitespace_comments();
            if !self.tokenizer.lookahead(0).is_comma() {
                break;
            }
            self.tokenizer.consume();
        }

        Ok(SelectorList::new(selectors))
    }

    /// Parses every segment as a selector on its own. Invalid selectors are dropped with an
    /// error, duplicates are dropped with a warning.
    pub(crate) fn parse_selector_segments(
        &self,
        segments: &[Segment],
    ) -> ParseReport<SelectorList> {
        log::trace!("parse_selector_segments");

        let mut report = ParseReport::new(SelectorList::default());

        for segment in segments {
            let result = self.parse_segment(segment, TokenizerOptions::default(), |parser| {
                parser.parse_complex_selector(false)
            });

            match result {
                Ok(selector) if report.value.selectors.contains(&selector) => {
                    report.warnings.push(CssError::with_location(
                        &format!("Duplicate selector '{selector}'"),
                        segment.location,
                    ));
                }
                Ok(selector) => report.value.selectors.push(selector),
                Err(err) => {
                    log::warn!("Dropping selector '{}': {}", segment.text.trim(), err);
                    report.errors.push(err);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::namespace::NoNamespaces;
    use crate::CssParser;

    #[test]
    fn strict_list() {
        let config = ParserConfig::default();

        let list = CssParser::parse_selectors_str("h1, h2 ,h3", &config, &NoNamespaces).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.to_string(), "h1,h2,h3");

        let result = CssParser::parse_selectors_str("h1, #1, h3", &config, &NoNamespaces);
        assert!(result.is_err());
    }

    #[test]
    fn recovering_list() {
        let config = ParserConfig::default();

        let input = "h1, #1, h3, h1, [x";
        let report = CssParser::parse_selectors_recovering(input, &config, &NoNamespaces);
        assert_eq!(report.value.to_string(), "h1,h3");
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].message, "Duplicate selector 'h1'");

        // errors point into the original input
        assert_eq!(report.errors[0].column(), 5);
        assert_eq!(report.errors[1].column(), 19);
    }

    #[test]
    fn recovering_keeps_nested_lists_whole() {
        let report = CssParser::parse_selectors_recovering(
            ":not(a, #1), b",
            &ParserConfig::default(),
            &NoNamespaces,
        );
        assert_eq!(report.value.to_string(), "b");
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn recovering_empty_input() {
        let config = ParserConfig::default();
        let report = CssParser::parse_selectors_recovering("  ", &config, &NoNamespaces);
        assert!(report.value.is_empty());
        assert!(!report.has_errors());
    }
}
