use crate::config::ParserFlags;
use crate::handler::{CssErrorHandler, DocumentHandler};
use crate::parser::ValueContext;
use crate::tokenizer::TokenType;
use crate::value::LexicalValue;
use crate::CssParser;
use cow_utils::CowUtils;
use gosub_css_shared::errors::{CssError, CssErrorKind, CssResult};

/// A single `name: value [!important]`
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Declaration {
    pub property: String,
    pub value: LexicalValue,
    pub important: bool,
}

impl CssParser<'_> {
    /// Parses declarations separated by `;` and hands the valid ones to `handler`. Inside a
    /// block the list ends in front of the closing `}`.
    pub(crate) fn parse_declaration_list(
        &mut self,
        in_block: bool,
        handler: &mut dyn DocumentHandler,
        errors: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        log::trace!("parse_declaration_list");

        loop {
            self.consume_whitespace_comments();

            let t = self.tokenizer.lookahead(0);
            match t.token_type {
                TokenType::Eof => break,
                TokenType::RCurly if in_block => break,
                TokenType::Semicolon => {
                    self.tokenizer.consume();
                    continue;
                }
                _ => {}
            }

            match self.parse_declaration(in_block) {
                Ok(declaration) => {
                    handler.property(
                        &declaration.property,
                        &declaration.value,
                        declaration.important,
                    );
                }
                Err(err) => {
                    log::warn!("Ignoring invalid declaration: {}", err);
                    errors.error(err);
                    self.parse_until_declaration_end(in_block);
                }
            }
        }

        Ok(())
    }

    pub(crate) fn parse_declaration(&mut self, in_block: bool) -> CssResult<Declaration> {
        log::trace!("parse_declaration");

        let property = self.parse_property_name()?;
        let custom_property = property.starts_with("--");

        self.consume_whitespace_comments();
        self.consume(TokenType::Colon)?;

        let mut value = LexicalValue::new();
        let units = self.parse_value_sequence(&mut value, ValueContext::TopLevel)?;
        if units.is_empty() && !custom_property {
            let t = self.tokenizer.lookahead_sc(0);
            return Err(self.unexpected(&t, "Expected value in declaration"));
        }
        value.set_top_level(&units);

        let mut important = false;
        if self.tokenizer.lookahead(0).is_delim('!') {
            self.tokenizer.consume();
            self.consume_whitespace_comments();

            let t = self.tokenizer.consume();
            if !t.is_ident_value("important") {
                return Err(self.unexpected(&t, "Expected 'important'"));
            }
            important = true;
        }

        self.consume_whitespace_comments();

        let t = self.tokenizer.lookahead(0);
        match t.token_type {
            TokenType::Semicolon | TokenType::Eof => {}
            TokenType::RCurly if in_block => {}
            _ => return Err(self.unexpected(&t, "Expected ';'")),
        }

        Ok(Declaration {
            property,
            value,
            important,
        })
    }

    /// Reads the property name. A leading `*` is only accepted with [`ParserFlags::STARHACK`]
    /// and stays part of the name.
    fn parse_property_name(&mut self) -> CssResult<String> {
        log::trace!("parse_property_name");

        let t = self.tokenizer.lookahead(0);
        let star = t.is_delim('*');
        if star {
            if !self.config.flags.contains(ParserFlags::STARHACK) {
                return Err(CssError::with_kind(
                    CssErrorKind::UnsupportedConstruct,
                    "'*' property hack is not accepted",
                    t.location,
                ));
            }
            self.tokenizer.consume();
        }

        let t = self.tokenizer.consume();
        let name = match &t.token_type {
            TokenType::Ident(name) if name.starts_with("--") && !star => return Ok(name.clone()),
            TokenType::Ident(name) => name.cow_to_ascii_lowercase().into_owned(),
            _ => return Err(self.unexpected(&t, "Expected property name")),
        };

        if star {
            return Ok(format!("*{name}"));
        }

        Ok(name)
    }

    /// Skips to the `;` or `}` that ends the current declaration, leaving it in the stream
    fn parse_until_declaration_end(&mut self, in_block: bool) {
        log::trace!("parse_until_declaration_end");

        let mut depth = 0usize;

        loop {
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Eof => {
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Semicolon if depth == 0 => {
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::RCurly if depth == 0 && in_block => {
                    self.tokenizer.reconsume();
                    break;
                }
                TokenType::Function(_)
                | TokenType::LParen
                | TokenType::LBracket
                | TokenType::LCurly => depth += 1,
                TokenType::RParen | TokenType::RBracket | TokenType::RCurly => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::config::{ParserConfig, ParserFlags};
    use crate::handler::{CollectingErrorHandler, DocumentHandler};
    use crate::selector::SelectorList;
    use crate::value::LexicalValue;
    use crate::CssParser;
    use gosub_css_shared::errors::CssErrorKind;

    /// Writes every handler call as a line of text
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub events: Vec<String>,
    }

    impl DocumentHandler for Recorder {
        fn property(&mut self, name: &str, value: &LexicalValue, important: bool) {
            let important = if important { " !important" } else { "" };
            self.events.push(format!("{name}: {value}{important}"));
        }

        fn start_selector(&mut self, selectors: &SelectorList) {
            self.events.push(format!("start {selectors}"));
        }

        fn end_selector(&mut self, selectors: &SelectorList) {
            self.events.push(format!("end {selectors}"));
        }

        fn start_at_rule(&mut self, name: &str, prelude: &str) {
            self.events.push(format!("start @{name} {prelude}"));
        }

        fn end_at_rule(&mut self) {
            self.events.push("end @".to_string());
        }
    }

    fn parse(data: &str, config: &ParserConfig) -> (Vec<String>, CollectingErrorHandler) {
        let mut recorder = Recorder::default();
        let mut errors = CollectingErrorHandler::new();
        CssParser::parse_declaration_block_str(data, config, &mut recorder, &mut errors).unwrap();
        (recorder.events, errors)
    }

    #[test]
    fn declarations() {
        let (events, errors) = parse(
            "color: red; MARGIN : 0 auto !important;; --Custom-Prop: {a} ; width:1px",
            &ParserConfig::default(),
        );
        assert_eq!(
            events,
            vec!["color: red", "margin: 0 auto !important", "width: 1px"]
        );
        // the custom property value holds a block, which is not a valid value
        assert_eq!(errors.errors.len(), 1);
    }

    #[test]
    fn custom_property_keeps_case() {
        let (events, errors) = parse("--Main-Color: #ABC", &ParserConfig::default());
        assert_eq!(events, vec!["--Main-Color: rgb(170 187 204)"]);
        assert!(!errors.has_errors());
    }

    #[test]
    fn invalid_declarations_are_skipped() {
        let (events, errors) = parse(
            "color: ; width: 1px 2px); height: calc(1px +) ; top: 0 !imp; left: 1px",
            &ParserConfig::default(),
        );
        assert_eq!(events, vec!["left: 1px"]);
        assert_eq!(errors.errors.len(), 4);
        assert_eq!(errors.errors[0].column(), 8);
    }

    #[test]
    fn star_hack() {
        let (events, errors) = parse("*zoom: 1; color: red", &ParserConfig::default());
        assert_eq!(events, vec!["color: red"]);
        assert_eq!(errors.errors[0].kind, CssErrorKind::UnsupportedConstruct);
        assert_eq!(errors.errors[0].column(), 1);

        let config = ParserConfig::with_flags(ParserFlags::STARHACK);
        let (events, errors) = parse("*zoom: 1; color: red", &config);
        assert_eq!(events, vec!["*zoom: 1", "color: red"]);
        assert!(!errors.has_errors());
    }

    #[test]
    fn empty_block() {
        let (events, errors) = parse("  ;  ", &ParserConfig::default());
        assert!(events.is_empty());
        assert!(!errors.has_errors());
    }
}
