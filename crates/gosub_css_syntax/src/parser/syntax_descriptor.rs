use crate::syntax::{Multiplier, SyntaxCategory, SyntaxComponent, SyntaxDescriptor};
use crate::tokenizer::{Token, TokenType};
use crate::value::is_css_wide_keyword;
use crate::CssParser;
use gosub_css_shared::errors::{CssError, CssResult};

fn multiplier_of(t: &Token) -> Option<Multiplier> {
    match t.token_type {
        TokenType::Delim('+') => Some(Multiplier::OneOrMore),
        TokenType::Delim('#') => Some(Multiplier::CommaList),
        _ => None,
    }
}

impl CssParser<'_> {
    /// Parses `component | component | ...` up to the end of the input
    pub(crate) fn parse_syntax_descriptor(&mut self) -> CssResult<SyntaxDescriptor> {
        log::trace!("parse_syntax_descriptor");

        let mut components = Vec::new();
        let mut universal = None;

        loop {
            self.consume_whitespace_comments();

            let t = self.tokenizer.lookahead(0);
            if t.is_delim('|') || t.is_eof() {
                return Err(CssError::with_location(
                    "Empty alternative in syntax descriptor",
                    t.location,
                ));
            }

            let component = self.parse_syntax_component()?;
            if component == SyntaxComponent::Universal {
                universal = Some(t.location);
            }
            components.push(component);

            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Eof => break,
                TokenType::Delim('|') => {}
                _ => return Err(self.unexpected(&t, "Expected '|'")),
            }
        }

        if let Some(location) = universal {
            if components.len() > 1 {
                return Err(CssError::with_location(
                    "'*' cannot be combined with other alternatives",
                    location,
                ));
            }
        }

        Ok(SyntaxDescriptor { components })
    }

    fn parse_syntax_component(&mut self) -> CssResult<SyntaxComponent> {
        log::trace!("parse_syntax_component");

        let t = self.tokenizer.consume();
        match &t.token_type {
            TokenType::Delim('*') => {
                let next = self.tokenizer.lookahead(0);
                if self.parse_syntax_multiplier()?.is_some() {
                    return Err(CssError::with_location(
                        "'*' cannot take a multiplier",
                        next.location,
                    ));
                }
                Ok(SyntaxComponent::Universal)
            }
            TokenType::Delim('<') => {
                let name_token = self.tokenizer.consume();
                let TokenType::Ident(name) = &name_token.token_type else {
                    return Err(self.unexpected(&name_token, "Expected type name"));
                };
                let category = SyntaxCategory::from_name(name).ok_or_else(|| {
                    CssError::with_location(
                        &format!("Unknown syntax type '<{name}>'"),
                        name_token.location,
                    )
                })?;

                let close = self.tokenizer.consume();
                if !close.is_delim('>') {
                    return Err(self.unexpected(&close, "Expected '>'"));
                }

                let next = self.tokenizer.lookahead(0);
                let multiplier = self.parse_syntax_multiplier()?;
                if multiplier.is_some() && !category.accepts_multiplier() {
                    return Err(CssError::with_location(
                        &format!("'<{name}>' cannot take a multiplier"),
                        next.location,
                    ));
                }

                Ok(SyntaxComponent::Component {
                    category,
                    name: name.clone(),
                    literal: false,
                    multiplier,
                })
            }
            TokenType::Ident(name) => {
                if is_css_wide_keyword(name) {
                    return Err(CssError::with_location(
                        &format!("'{name}' cannot be used in a syntax descriptor"),
                        t.location,
                    ));
                }

                Ok(SyntaxComponent::Component {
                    category: SyntaxCategory::CustomIdent,
                    name: name.clone(),
                    literal: true,
                    multiplier: self.parse_syntax_multiplier()?,
                })
            }
            _ => Err(self.unexpected(&t, "Expected '<type>', identifier or '*'")),
        }
    }

    /// A multiplier has to follow its type without whitespace or comments in between
    fn parse_syntax_multiplier(&mut self) -> CssResult<Option<Multiplier>> {
        let t = self.tokenizer.lookahead(0);
        if let Some(multiplier) = multiplier_of(&t) {
            self.tokenizer.consume();
            return Ok(Some(multiplier));
        }

        if t.is_whitespace() || t.is_comment() {
            let next = self.tokenizer.lookahead_sc(0);
            if multiplier_of(&next).is_some() {
                return Err(CssError::with_location(
                    "Multiplier must directly follow its type",
                    next.location,
                ));
            }
        }

        Ok(None)
    }
}
