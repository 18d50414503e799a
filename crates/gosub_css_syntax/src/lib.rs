//! Parsers for CSS micro-syntaxes: property values, selectors, media queries, `@supports`
//! conditions, the `An+B` notation and custom property syntax descriptors.
//!
//! Every entry point builds its own [`CssParser`] over a fresh character stream, so parse calls
//! share no state and can run on separate threads with the same [`ParserConfig`].
use crate::condition::SupportsCondition;
use crate::config::ParserConfig;
use crate::handler::{CssErrorHandler, DocumentHandler, ParseReport};
use crate::media::MediaQueryList;
use crate::namespace::{NamespaceMap, NoNamespaces};
use crate::selector::SelectorList;
use crate::syntax::SyntaxDescriptor;
use crate::tokenizer::{Tokenizer, TokenizerOptions};
use crate::value::LexicalValue;
use gosub_css_shared::char_stream::CharStream;
use gosub_css_shared::errors::CssResult;

pub mod condition;
pub mod config;
pub mod escape;
pub mod handler;
pub mod media;
pub mod namespace;
pub mod parser;
pub mod selector;
pub mod syntax;
pub mod tokenizer;
mod unicode;
pub mod value;

pub struct CssParser<'stream> {
    /// The tokenizer is responsible for reading the input stream
    pub tokenizer: Tokenizer<'stream>,
    /// The parser configuration as given
    config: &'stream ParserConfig,
    /// Resolves namespace prefixes in selectors
    namespaces: &'stream dyn NamespaceMap,
    /// Current depth of nested functions, blocks and selector lists
    nesting: usize,
}

/// Tokenizer options for value parsing: unicode ranges are only meaningful in values
const VALUE_OPTIONS: TokenizerOptions = TokenizerOptions {
    unicode_ranges: true,
};

pub(crate) fn stream_from_str(data: &str) -> CharStream {
    let mut stream = CharStream::new();
    stream.read_from_str(data);
    stream.close();
    stream
}

impl<'stream> CssParser<'stream> {
    /// Creates a new parser over the given stream. Token locations start at the location of the
    /// configuration.
    pub fn new(
        stream: &'stream mut CharStream,
        config: &'stream ParserConfig,
        namespaces: &'stream dyn NamespaceMap,
        options: TokenizerOptions,
    ) -> Self {
        Self {
            tokenizer: Tokenizer::with_options(stream, config.location, options),
            config,
            namespaces,
            nesting: 0,
        }
    }

    /// Parses a property value
    pub fn parse_value_str(data: &str, config: &ParserConfig) -> CssResult<LexicalValue> {
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(&mut stream, config, &NoNamespaces, VALUE_OPTIONS);
        parser.parse_value_expression()
    }

    /// Parses an `An+B` expression into its `(step, offset)` pair
    pub fn parse_anb_str(data: &str) -> CssResult<(i32, i32)> {
        let config = ParserConfig::default();
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(
            &mut stream,
            &config,
            &NoNamespaces,
            TokenizerOptions::default(),
        );

        parser.consume_whitespace_comments();
        let anb = parser.parse_anplusb()?;
        parser.expect_eof()?;

        Ok((anb.step, anb.offset))
    }

    /// Parses a selector list. The first invalid selector fails the whole list.
    pub fn parse_selectors_str(
        data: &str,
        config: &ParserConfig,
        namespaces: &dyn NamespaceMap,
    ) -> CssResult<SelectorList> {
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(
            &mut stream,
            config,
            namespaces,
            TokenizerOptions::default(),
        );

        let list = parser.parse_selector_list(false)?;
        parser.expect_eof()?;

        Ok(list)
    }

    /// Parses a selector list, dropping the selectors that fail to parse. Every dropped selector
    /// is reported as error and every duplicate as warning.
    pub fn parse_selectors_recovering(
        data: &str,
        config: &ParserConfig,
        namespaces: &dyn NamespaceMap,
    ) -> ParseReport<SelectorList> {
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(
            &mut stream,
            config,
            namespaces,
            TokenizerOptions::default(),
        );

        let segments = parser.split_top_level(false);
        parser.parse_selector_segments(&segments)
    }

    /// Parses a media query list. Queries that fail to parse are kept as `not all`.
    pub fn parse_media_query_list_str(data: &str, config: &ParserConfig) -> MediaQueryList {
        Self::parse_media_query_list_recovering(data, config).value
    }

    /// Parses a media query list and reports the errors of the queries that were dropped
    pub fn parse_media_query_list_recovering(
        data: &str,
        config: &ParserConfig,
    ) -> ParseReport<MediaQueryList> {
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(
            &mut stream,
            config,
            &NoNamespaces,
            TokenizerOptions::default(),
        );

        let segments = parser.split_top_level(false);
        parser.parse_media_segments(&segments)
    }

    /// Parses the condition of an `@supports` rule
    pub fn parse_supports_condition_str(
        data: &str,
        config: &ParserConfig,
    ) -> CssResult<SupportsCondition> {
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(
            &mut stream,
            config,
            &NoNamespaces,
            TokenizerOptions::default(),
        );

        let condition = parser.parse_supports_condition()?;
        parser.expect_eof()?;

        Ok(condition)
    }

    /// Parses the `syntax` descriptor of an `@property` rule
    pub fn parse_syntax_str(data: &str) -> CssResult<SyntaxDescriptor> {
        let config = ParserConfig::default();
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(
            &mut stream,
            &config,
            &NoNamespaces,
            TokenizerOptions::default(),
        );

        parser.parse_syntax_descriptor()
    }

    /// Parses the declarations of a style attribute or block body and hands every valid
    /// declaration to the document handler. Invalid declarations are reported and skipped.
    pub fn parse_declaration_block_str(
        data: &str,
        config: &ParserConfig,
        handler: &mut dyn DocumentHandler,
        errors: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(&mut stream, config, &NoNamespaces, VALUE_OPTIONS);

        parser.parse_declaration_list(false, handler, errors)
    }

    /// Parses one or more rules (`selectors { declarations }`, or `@media` and `@supports`
    /// blocks holding such rules) and dispatches them to the document handler
    pub fn parse_style_rule_str(
        data: &str,
        config: &ParserConfig,
        namespaces: &dyn NamespaceMap,
        handler: &mut dyn DocumentHandler,
        errors: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        let mut stream = stream_from_str(data);
        let mut parser = CssParser::new(&mut stream, config, namespaces, VALUE_OPTIONS);

        parser.parse_rule_list(false, handler, errors)
    }
}
