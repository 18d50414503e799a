use crate::escape::{parse_ident, trim_unescaped};
use crate::selector::Condition;
use crate::tokenizer::TokenType;
use crate::CssParser;
use cow_utils::CowUtils;
use gosub_css_shared::errors::{CssError, CssResult};
use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// Pseudo-elements that may still be written with a single colon
    static ref LEGACY_PSEUDO_ELEMENTS: HashSet<&'static str> =
        ["before", "after", "first-line", "first-letter"].into_iter().collect();
}

impl CssParser<'_> {
    /// Parses a pseudo-class or pseudo-element, after its first colon
    pub(crate) fn parse_pseudo(&mut self) -> CssResult<Condition> {
        log::trace!("parse_pseudo");

        let element = self.tokenizer.lookahead(0).is_colon();
        if element {
            self.tokenizer.consume();
        }

        let t = self.tokenizer.consume();
        match &t.token_type {
            TokenType::Ident(name) => {
                let name = name.cow_to_ascii_lowercase().into_owned();
                if element || LEGACY_PSEUDO_ELEMENTS.contains(name.as_str()) {
                    Ok(Condition::PseudoElement {
                        name,
                        argument: None,
                    })
                } else {
                    Ok(Condition::PseudoClass {
                        name,
                        argument: None,
                    })
                }
            }
            TokenType::Function(name) => {
                let name = name.cow_to_ascii_lowercase().into_owned();
                self.nested(t.location, |parser| {
                    parser.parse_pseudo_function(name, element)
                })
            }
            _ => Err(self.unexpected(&t, "Expected pseudo-class name")),
        }
    }

    fn parse_pseudo_function(&mut self, name: String, element: bool) -> CssResult<Condition> {
        log::trace!("parse_pseudo_function");

        if element {
            let argument = self.parse_pseudo_raw_argument()?;
            return Ok(Condition::PseudoElement {
                name,
                argument: Some(argument),
            });
        }

        match name.as_str() {
            "not" | "is" | "where" | "matches" | "-webkit-any" | "-moz-any" => {
                let list = self.parse_selector_list(false)?;
                self.consume_closing_paren()?;
                Ok(Condition::SelectorArgument { name, list })
            }
            "has" => {
                let list = self.parse_selector_list(true)?;
                self.consume_closing_paren()?;
                Ok(Condition::SelectorArgument { name, list })
            }
            "nth-child" => self.parse_pseudo_nth(false, true),
            "nth-last-child" => self.parse_pseudo_nth(false, false),
            "nth-of-type" => self.parse_pseudo_nth(true, true),
            "nth-last-of-type" => self.parse_pseudo_nth(true, false),
            "lang" => self.parse_pseudo_lang(),
            "dir" => self.parse_pseudo_dir(name),
            _ => {
                let argument = self.parse_pseudo_raw_argument()?;
                Ok(Condition::PseudoClass {
                    name,
                    argument: Some(argument),
                })
            }
        }
    }

    fn parse_pseudo_nth(&mut self, of_type: bool, forward: bool) -> CssResult<Condition> {
        log::trace!("parse_pseudo_nth");

        self.consume_whitespace_comments();
        let anb = self.parse_anplusb()?;
        self.consume_whitespace_comments();

        // `of S` is only allowed for the -child forms
        let of_list = if !of_type && self.tokenizer.lookahead(0).is_ident_value("of") {
            self.tokenizer.consume();
            Some(self.parse_selector_list(false)?)
        } else {
            None
        };

        self.consume_closing_paren()?;

        Ok(Condition::Positional {
            step: anb.step,
            offset: anb.offset,
            of_type,
            forward,
            keyword: anb.keyword,
            of_list,
        })
    }

    /// `:lang()` arguments are identifiers or strings, kept as written
    fn parse_pseudo_lang(&mut self) -> CssResult<Condition> {
        log::trace!("parse_pseudo_lang");

        let mut languages = Vec::new();

        loop {
            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            match &t.token_type {
                TokenType::Ident(_) => languages.push(t.raw.clone()),
                TokenType::QuotedString(_) => {
                    self.check_string(&t)?;
                    languages.push(t.raw.clone());
                }
                _ => return Err(self.unexpected(&t, "Expected language range")),
            }

            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Comma => continue,
                TokenType::RParen => break,
                _ => return Err(self.unexpected(&t, "Expected ',' or ')'")),
            }
        }

        Ok(Condition::Lang(languages))
    }

    /// Reads the argument of a functional pseudo-class up to the matching `)` as trimmed raw text
    fn parse_pseudo_raw_argument(&mut self) -> CssResult<String> {
        log::trace!("parse_pseudo_raw_argument");

        let start = self.tokenizer.lookahead(0).location.offset;
        let raw = self.consume_balanced_raw(start)?;
        let argument = raw.strip_suffix(')').unwrap_or(&raw);

        Ok(trim_unescaped(argument).to_string())
    }

    /// `:dir()` takes a single identifier
    fn parse_pseudo_dir(&mut self, name: String) -> CssResult<Condition> {
        log::trace!("parse_pseudo_dir");

        self.consume_whitespace_comments();
        let start = self.tokenizer.lookahead(0).location;
        let argument = self.parse_pseudo_raw_argument()?;

        if let Err(err) = parse_ident(&argument) {
            let location = err.location.map_or(start, |l| l.relative_to(&start));
            return Err(CssError::with_kind(err.kind, &err.message, location));
        }

        Ok(Condition::PseudoClass {
            name,
            argument: Some(argument),
        })
    }
}
