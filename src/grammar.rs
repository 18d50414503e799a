//! Runs one of the grammar parsers over a piece of text and renders the result as text. This
//! is what the `css-grammar` binary prints.

use gosub_css_shared::char_stream::{CharStream, Location};
use gosub_css_shared::errors::{CssError, CssResult};
use gosub_css_syntax::config::ParserConfig;
use gosub_css_syntax::handler::{CollectingErrorHandler, DocumentHandler};
use gosub_css_syntax::namespace::NoNamespaces;
use gosub_css_syntax::selector::SelectorList;
use gosub_css_syntax::tokenizer::{TokenType, Tokenizer, TokenizerOptions};
use gosub_css_syntax::value::LexicalValue;
use gosub_css_syntax::CssParser;

/// The micro-syntax the input is parsed as
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum InputKind {
    /// A property value
    Value,
    /// A selector list
    Selector,
    /// A media query list
    Media,
    /// An `@supports` condition
    Supports,
    /// An `An+B` expression
    Anb,
    /// The `syntax` descriptor of `@property`
    Syntax,
    /// Only print the tokens
    Tokens,
    /// A declaration block, as found in a style attribute
    Declarations,
    /// Style rules and `@media` / `@supports` blocks
    Rules,
}

/// Text output of a parse, with the errors the parser recovered from
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rendered {
    pub output: String,
    pub errors: Vec<CssError>,
    pub warnings: Vec<CssError>,
}

impl Rendered {
    fn new(output: String) -> Self {
        Self {
            output,
            ..Default::default()
        }
    }
}

/// Writes the handler calls one per line, indented by block depth
#[derive(Default)]
struct TextHandler {
    lines: Vec<String>,
    depth: usize,
}

impl TextHandler {
    fn push(&mut self, line: String) {
        self.lines.push(format!("{}{line}", "  ".repeat(self.depth)));
    }
}

impl DocumentHandler for TextHandler {
    fn property(&mut self, name: &str, value: &LexicalValue, important: bool) {
        let important = if important { " !important" } else { "" };
        self.push(format!("{name}: {value}{important};"));
    }

    fn start_selector(&mut self, selectors: &SelectorList) {
        self.push(format!("{selectors} {{"));
        self.depth += 1;
    }

    fn end_selector(&mut self, _selectors: &SelectorList) {
        self.depth = self.depth.saturating_sub(1);
        self.push("}".to_string());
    }

    fn start_at_rule(&mut self, name: &str, prelude: &str) {
        self.push(format!("@{name} {prelude} {{"));
        self.depth += 1;
    }

    fn end_at_rule(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.push("}".to_string());
    }
}

/// Parses `input` as the given kind. Unrecoverable errors are returned as `Err`.
pub fn render(kind: InputKind, input: &str, config: &ParserConfig) -> CssResult<Rendered> {
    log::debug!("Parsing {} characters as {:?}", input.chars().count(), kind);

    let rendered = match kind {
        InputKind::Value => Rendered::new(CssParser::parse_value_str(input, config)?.to_string()),
        InputKind::Selector => {
            let report = CssParser::parse_selectors_recovering(input, config, &NoNamespaces);
            Rendered {
                output: report.value.to_string(),
                errors: report.errors,
                warnings: report.warnings,
            }
        }
        InputKind::Media => {
            let report = CssParser::parse_media_query_list_recovering(input, config);
            Rendered {
                output: report.value.to_string(),
                errors: report.errors,
                warnings: report.warnings,
            }
        }
        InputKind::Supports => {
            let condition = CssParser::parse_supports_condition_str(input, config)?;
            Rendered::new(condition.to_string())
        }
        InputKind::Anb => {
            let (step, offset) = CssParser::parse_anb_str(input)?;
            Rendered::new(format!("step {step}, offset {offset}"))
        }
        InputKind::Syntax => Rendered::new(CssParser::parse_syntax_str(input)?.to_string()),
        InputKind::Tokens => Rendered::new(tokens(input, config.location)),
        InputKind::Declarations | InputKind::Rules => {
            let mut handler = TextHandler::default();
            let mut errors = CollectingErrorHandler::new();

            if kind == InputKind::Declarations {
                CssParser::parse_declaration_block_str(input, config, &mut handler, &mut errors)?;
            } else {
                CssParser::parse_style_rule_str(
                    input,
                    config,
                    &NoNamespaces,
                    &mut handler,
                    &mut errors,
                )?;
            }

            Rendered {
                output: handler.lines.join("\n"),
                errors: errors.errors,
                warnings: errors.warnings,
            }
        }
    };

    Ok(rendered)
}

/// Lists the tokens of the input, one per line
fn tokens(input: &str, location: Location) -> String {
    let mut stream = CharStream::new();
    stream.read_from_str(input);
    stream.close();

    let options = TokenizerOptions {
        unicode_ranges: true,
    };
    let mut tokenizer = Tokenizer::with_options(&mut stream, location, options);

    let mut lines = Vec::new();
    loop {
        let token = tokenizer.consume();
        lines.push(format!("{:?}", token));

        if token.token_type == TokenType::Eof {
            break;
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(InputKind::Value, "1px  solid red", "1px solid red")]
    #[test_case(InputKind::Selector, "a > b, c", "a>b,c")]
    #[test_case(InputKind::Media, "screen and (min-width: 600px)", "screen and (width >= 600px)")]
    #[test_case(InputKind::Supports, "not (display: grid)", "not (display: grid)")]
    #[test_case(InputKind::Anb, "odd", "step 2, offset 1")]
    #[test_case(InputKind::Syntax, "<length>+ | auto", "<length>+ | auto")]
    #[test_case(InputKind::Declarations, "color: red", "color: red;")]
    #[test_case(InputKind::Rules, "a { top: 0 }", "a {\n  top: 0;\n}")]
    fn renders(kind: InputKind, input: &str, expected: &str) {
        let rendered = render(kind, input, &ParserConfig::default()).unwrap();
        assert_eq!(rendered.output, expected);
        assert!(rendered.errors.is_empty());
    }

    #[test]
    fn recovered_errors_are_kept() {
        let rendered = render(InputKind::Selector, "a, #1, b", &ParserConfig::default()).unwrap();
        assert_eq!(rendered.output, "a,b");
        assert_eq!(rendered.errors.len(), 1);
        assert_eq!(rendered.errors[0].column(), 4);
    }

    #[test]
    fn tokens_end_with_eof() {
        let rendered = render(InputKind::Tokens, "a b", &ParserConfig::default()).unwrap();
        assert_eq!(rendered.output.lines().count(), 4);
        assert!(rendered.output.lines().last().unwrap().contains("Eof"));
    }

    #[test]
    fn fatal_errors() {
        let config = ParserConfig::default();
        let err = render(InputKind::Value, "#x", &config).unwrap_err();
        assert_eq!(err.column(), 2);
        assert!(render(InputKind::Rules, "a { top: 0", &config).is_err());
    }
}
