use crate::handler::{CssErrorHandler, DocumentHandler};
use crate::tokenizer::{TokenType, TokenizerOptions};
use crate::CssParser;
use cow_utils::CowUtils;
use gosub_css_shared::char_stream::Location;
use gosub_css_shared::errors::{CssError, CssErrorKind, CssResult};

impl CssParser<'_> {
    /// Parses style rules and `@media` / `@supports` blocks. Nested lists end in front of the
    /// `}` of their block.
    pub(crate) fn parse_rule_list(
        &mut self,
        nested: bool,
        handler: &mut dyn DocumentHandler,
        errors: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        log::trace!("parse_rule_list");

        loop {
            self.consume_whitespace_comments();

            let t = self.tokenizer.lookahead(0);
            match &t.token_type {
                TokenType::Eof => break,
                TokenType::RCurly if nested => break,
                TokenType::RCurly | TokenType::Semicolon => {
                    self.tokenizer.consume();
                    errors.error(self.unexpected(&t, "Expected rule"));
                }
                TokenType::AtKeyword(name) => {
                    self.tokenizer.consume();
                    let name = name.cow_to_ascii_lowercase().into_owned();
                    self.parse_at_rule(&name, t.location, handler, errors)?;
                }
                _ => self.parse_style_rule(handler, errors)?,
            }
        }

        Ok(())
    }

    /// `selectors { declarations }`. Invalid selectors are dropped from the list. When none
    /// are left the whole rule is skipped.
    fn parse_style_rule(
        &mut self,
        handler: &mut dyn DocumentHandler,
        errors: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        log::trace!("parse_style_rule");

        let start = self.tokenizer.lookahead(0).location;
        let segments = self.split_top_level(true);
        let open = self.open_block(errors)?;

        let selectors = self.parse_selector_segments(&segments).forward(errors);
        if selectors.is_empty() {
            if segments.is_empty() {
                errors.error(CssError::with_location("Expected selector", start));
            }
            log::warn!("Skipping rule without valid selectors");
            return self.skip_block(open, errors);
        }

        handler.start_selector(&selectors);
        self.nested(open, |parser| {
            parser.parse_declaration_list(true, handler, errors)
        })?;
        self.close_block(open, errors)?;
        handler.end_selector(&selectors);

        Ok(())
    }

    /// Parses the rule after its at-keyword. Unknown at-rules are skipped with a warning.
    fn parse_at_rule(
        &mut self,
        name: &str,
        location: Location,
        handler: &mut dyn DocumentHandler,
        errors: &mut dyn CssErrorHandler,
    ) -> CssResult<()> {
        log::trace!("parse_at_rule");

        let prelude = match name {
            "media" => {
                let segments = self.split_top_level(true);
                self.parse_media_segments(&segments)
                    .forward(errors)
                    .to_string()
            }
            "supports" => {
                let segments = self.split_top_level(true);
                let condition = match segments.as_slice() {
                    [segment] => self.parse_segment(segment, TokenizerOptions::default(), |parser| {
                        parser.parse_supports_condition()
                    }),
                    _ => Err(CssError::with_location(
                        "Invalid @supports condition",
                        location,
                    )),
                };

                match condition {
                    Ok(condition) => condition.to_string(),
                    Err(err) => {
                        log::warn!("Skipping @supports rule: {}", err);
                        errors.error(err);
                        let open = self.open_block(errors)?;
                        return self.skip_block(open, errors);
                    }
                }
            }
            _ => {
                log::warn!("Skipping unsupported at-rule '@{name}'");
                errors.warning(CssError::with_kind(
                    CssErrorKind::UnsupportedConstruct,
                    &format!("Unsupported at-rule '@{name}'"),
                    location,
                ));
                return self.skip_at_rule(errors);
            }
        };

        let open = self.open_block(errors)?;

        handler.start_at_rule(name, &prelude);
        self.nested(open, |parser| parser.parse_rule_list(true, handler, errors))?;
        self.close_block(open, errors)?;
        handler.end_at_rule();

        Ok(())
    }

    /// Consumes the `{` that opens a block and returns its location
    fn open_block(&mut self, errors: &mut dyn CssErrorHandler) -> CssResult<Location> {
        let t = self.tokenizer.consume();
        if t.token_type != TokenType::LCurly {
            return Err(fatal(errors, self.unexpected(&t, "Expected '{'")));
        }

        Ok(t.location)
    }

    fn close_block(&mut self, open: Location, errors: &mut dyn CssErrorHandler) -> CssResult<()> {
        let t = self.tokenizer.consume();
        if t.token_type != TokenType::RCurly {
            return Err(fatal(errors, unterminated(open)));
        }

        Ok(())
    }

    /// Skips everything up to and including the `}` that closes an already opened block
    fn skip_block(&mut self, open: Location, errors: &mut dyn CssErrorHandler) -> CssResult<()> {
        log::trace!("skip_block");

        let mut depth = 1usize;

        loop {
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::LCurly => depth += 1,
                TokenType::RCurly => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                TokenType::Eof => return Err(fatal(errors, unterminated(open))),
                _ => {}
            }
        }
    }

    /// Skips an at-rule up to its `;`, or up to the end of its block
    fn skip_at_rule(&mut self, errors: &mut dyn CssErrorHandler) -> CssResult<()> {
        log::trace!("skip_at_rule");

        loop {
            let t = self.tokenizer.consume();
            match t.token_type {
                TokenType::Semicolon | TokenType::Eof => return Ok(()),
                TokenType::LCurly => return self.skip_block(t.location, errors),
                _ => {}
            }
        }
    }
}

fn unterminated(open: Location) -> CssError {
    CssError::with_kind(CssErrorKind::Eof, "Unterminated block", open)
}

/// Reports the error as fatal and hands it back for returning
fn fatal(errors: &mut dyn CssErrorHandler, err: CssError) -> CssError {
    log::error!("Fatal error: {}", err);
    errors.fatal_error(err.clone());
    err
}
