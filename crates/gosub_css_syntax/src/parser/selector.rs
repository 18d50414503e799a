use crate::namespace::Namespace;
use crate::selector::{Combinator, Condition, MatcherType, Selector};
use crate::tokenizer::{Token, TokenType};
use crate::CssParser;
use gosub_css_shared::errors::{CssError, CssResult};

impl CssParser<'_> {
    /// Parses compound selectors joined by combinators. A relative selector (inside `:has()`)
    /// may start with a combinator and is anchored on [`Selector::Scope`].
    pub(crate) fn parse_complex_selector(&mut self, relative: bool) -> CssResult<Selector> {
        log::trace!("parse_complex_selector");

        self.consume_whitespace_comments();

        let mut selector = if relative {
            let kind = self.parse_combinator().unwrap_or(Combinator::Descendant);
            Selector::Combinator {
                kind,
                left: Box::new(Selector::Scope),
                right: Box::new(self.parse_compound_selector()?),
            }
        } else {
            self.parse_compound_selector()?
        };

        while let Some(kind) = self.parse_combinator() {
            let right = self.parse_compound_selector()?;
            selector = Selector::Combinator {
                kind,
                left: Box::new(selector),
                right: Box::new(right),
            };
        }

        Ok(selector)
    }

    /// Parses a type selector followed by any number of conditions. Conditions without a type
    /// selector apply to an implicit universal selector.
    fn parse_compound_selector(&mut self) -> CssResult<Selector> {
        log::trace!("parse_compound_selector");

        let start = self.tokenizer.lookahead(0);
        let base = self.parse_type_selector()?;

        let mut condition: Option<Condition> = None;
        loop {
            let t = self.tokenizer.lookahead(0);
            let next = match &t.token_type {
                TokenType::IDHash(id) => {
                    self.tokenizer.consume();
                    Condition::Id(id.clone())
                }
                TokenType::Hash(_) => {
                    return Err(CssError::with_location("Invalid id selector", t.location));
                }
                TokenType::Delim('.') => {
                    self.tokenizer.consume();
                    self.parse_class_selector()?
                }
                TokenType::LBracket => {
                    self.tokenizer.consume();
                    self.parse_attribute_selector()?
                }
                TokenType::Colon => {
                    self.tokenizer.consume();
                    self.parse_pseudo()?
                }
                _ => break,
            };

            condition = Some(match condition {
                Some(condition) => Condition::and(condition, next),
                None => next,
            });
        }

        match (base, condition) {
            (Some(base), None) => Ok(base),
            (base, Some(condition)) => Ok(Selector::Conditional {
                simple: Box::new(base.unwrap_or(Selector::Universal { namespace: None })),
                condition: Box::new(condition),
            }),
            (None, None) => Err(self.unexpected(&start, "Expected selector")),
        }
    }

    fn parse_class_selector(&mut self) -> CssResult<Condition> {
        log::trace!("parse_class_selector");

        let t = self.tokenizer.consume();
        match t.token_type {
            TokenType::Ident(name) => Ok(Condition::Class(name)),
            _ => Err(self.unexpected(&t, "Expected class name")),
        }
    }

    /// Resolves an explicit namespace prefix. `*` and the empty prefix never reach the map.
    fn resolve_namespace(&self, prefix: &str, t: &Token) -> CssResult<Namespace> {
        match prefix {
            "*" => Ok(Namespace::Any),
            "" => Ok(Namespace::NoNamespace),
            prefix => match self.namespaces.lookup(prefix) {
                Some(uri) => Ok(Namespace::Uri {
                    prefix: prefix.to_string(),
                    uri,
                }),
                None => Err(CssError::with_location(
                    &format!("Unknown namespace prefix '{prefix}'"),
                    t.location,
                )),
            },
        }
    }

    /// `name`, `*`, `ns|name`, `*|name` and `|name`. Returns `None` when there is no type selector.
    fn parse_type_selector(&mut self) -> CssResult<Option<Selector>> {
        log::trace!("parse_type_selector");

        let first = self.tokenizer.lookahead(0);
        let second = self.tokenizer.lookahead(1);
        let third = self.tokenizer.lookahead(2);

        let is_name = |t: &Token| t.is_ident() || t.is_delim('*');

        let namespace = if first.is_delim('|') && is_name(&second) {
            self.tokenizer.consume();
            Some(Namespace::NoNamespace)
        } else if is_name(&first) && second.is_delim('|') && is_name(&third) {
            let prefix = match &first.token_type {
                TokenType::Ident(prefix) => prefix.as_str(),
                _ => "*",
            };
            let namespace = self.resolve_namespace(prefix, &first)?;
            self.tokenizer.consume();
            self.tokenizer.consume();
            Some(namespace)
        } else {
            None
        };

        let t = self.tokenizer.lookahead(0);
        let selector = match t.token_type {
            TokenType::Ident(name) => Selector::Element { name, namespace },
            TokenType::Delim('*') => Selector::Universal { namespace },
            _ => return Ok(None),
        };
        self.tokenizer.consume();

        Ok(Some(selector))
    }

    /// Parses the inside of `[...]`, after the opening bracket
    fn parse_attribute_selector(&mut self) -> CssResult<Condition> {
        log::trace!("parse_attribute_selector");

        self.consume_whitespace_comments();

        let t = self.tokenizer.consume();
        let (namespace, name) = match &t.token_type {
            TokenType::Delim('|') => (Some(Namespace::NoNamespace), self.consume_any_ident()?),
            TokenType::Delim('*') => {
                self.consume_delim('|')?;
                (Some(Namespace::Any), self.consume_any_ident()?)
            }
            TokenType::Ident(name) => {
                let namespaced = self.tokenizer.lookahead(0).is_delim('|')
                    && self.tokenizer.lookahead(1).is_ident();
                if namespaced {
                    let namespace = self.resolve_namespace(name, &t)?;
                    self.tokenizer.consume();
                    (Some(namespace), self.consume_any_ident()?)
                } else {
                    (None, name.clone())
                }
            }
            _ => return Err(self.unexpected(&t, "Expected attribute name")),
        };

        self.consume_whitespace_comments();

        let t = self.tokenizer.consume();
        let matcher = match t.token_type {
            TokenType::RBracket => {
                return Ok(Condition::Attribute {
                    name,
                    namespace,
                    matcher: MatcherType::None,
                    value: None,
                    case_insensitive: false,
                })
            }
            TokenType::Delim('=') => MatcherType::Equals,
            TokenType::Delim(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.consume_delim('=')?;
                match c {
                    '~' => MatcherType::Includes,
                    '|' => MatcherType::DashMatch,
                    '^' => MatcherType::PrefixMatch,
                    '$' => MatcherType::SuffixMatch,
                    _ => MatcherType::SubstringMatch,
                }
            }
            _ => return Err(self.unexpected(&t, "Expected attribute matcher or ']'")),
        };

        self.consume_whitespace_comments();

        let t = self.tokenizer.consume();
        let value = match &t.token_type {
            TokenType::Ident(value) => value.clone(),
            TokenType::QuotedString(value) => {
                self.check_string(&t)?;
                value.clone()
            }
            _ => return Err(self.unexpected(&t, "Expected attribute value")),
        };

        self.consume_whitespace_comments();

        let mut case_insensitive = false;
        let t = self.tokenizer.lookahead(0);
        if let TokenType::Ident(flag) = &t.token_type {
            match flag.as_str() {
                "i" | "I" => case_insensitive = true,
                "s" | "S" => {}
                _ => {
                    return Err(CssError::with_location(
                        &format!("Unknown attribute selector flag '{flag}'"),
                        t.location,
                    ))
                }
            }
            self.tokenizer.consume();
            self.consume_whitespace_comments();
        }

        self.consume(TokenType::RBracket)?;

        Ok(Condition::Attribute {
            name,
            namespace,
            matcher,
            value: Some(value),
            case_insensitive,
        })
    }
}
