use crate::escape::decode_escape;
use crate::unicode::{is_ident_char, is_ident_start, is_non_printable, UnicodeChar};
use gosub_css_shared::char_stream::Character::Ch;
use gosub_css_shared::char_stream::{CharStream, Character, Location};
use std::fmt;

pub type Number = f32;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    /// A [`<at-keyword-token>`](https://drafts.csswg.org/css-syntax/#at-keyword-token-diagram)
    ///
    /// The value does not include the `@` marker.
    AtKeyword(String),
    Ident(String),
    Function(String),
    Url(String),
    BadUrl(String),
    Dimension {
        value: Number,
        unit: String,
    },
    Percentage(Number),
    Number(Number),
    /// A [`<string-token>`](https://drafts.csswg.org/css-syntax/#string-token-diagram)
    ///
    /// The value does not include the quotes.
    QuotedString(String),
    /// A `<bad-string-token>`
    ///
    /// This token always indicates a parse error.
    BadString(String),
    /// A [`<whitespace-token>`](https://drafts.csswg.org/css-syntax/#whitespace-token-diagram)
    Whitespace,
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "unrestricted"
    ///
    /// The value does not include the `#` marker.
    Hash(String),
    /// A [`<hash-token>`](https://drafts.csswg.org/css-syntax/#hash-token-diagram) with the type flag set to "id"
    ///
    /// The value does not include the `#` marker.
    ///
    /// Hash that is a valid ID selector.
    IDHash(String),
    /// A `<delim-token>`
    Delim(char),
    /// A `<{-token>`
    LCurly,
    /// A `<}-token>`
    RCurly,
    /// A `<(-token>`
    LParen,
    /// A `<)-token>`
    RParen,
    /// A `<[-token>`
    LBracket,
    /// A `<]-token>`
    RBracket,
    /// A `<comma-token>`
    Comma,
    /// A `:` `<colon-token>`
    Colon,
    /// A `;` `<semicolon-token>`
    Semicolon,
    /// A `<!--` `<CDO-token>`
    Cdo,
    /// A `-->` `<CDC-token>`
    Cdc,
    /// A `<EOF-token>`
    Eof,
    /// A comment, including the `/*` and `*/` markers
    Comment(String),
    /// A [`<urange>`](https://drafts.csswg.org/css-syntax/#urange) without the `U+` prefix.
    ///
    /// Only produced when the tokenizer runs with unicode ranges enabled.
    UnicodeRange(String),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Token {
    /// Type of the token
    pub token_type: TokenType,
    /// Location of the token in the stream
    pub location: Location,
    /// Source text of the token
    pub raw: String,
    /// Source text of the numeric part of number, percentage and dimension tokens
    repr: Option<String>,
}

impl Token {
    /// Returns a new token for the given type on the given location
    pub(crate) fn new(token_type: TokenType, location: Location) -> Token {
        Token {
            token_type,
            location,
            raw: String::new(),
            repr: None,
        }
    }

    fn with_repr(mut self, repr: String) -> Token {
        self.repr = Some(repr);
        self
    }

    /// True when this is a numeric token whose number was written without a fraction or exponent
    pub fn is_integer(&self) -> bool {
        match &self.repr {
            Some(repr) => !repr.contains(['.', 'e', 'E']),
            None => false,
        }
    }

    /// True when this is a numeric token whose number was written with an explicit sign
    pub fn has_sign(&self) -> bool {
        matches!(&self.repr, Some(repr) if repr.starts_with(['+', '-']))
    }

    /// Integer value of an integer numeric token
    pub fn integer_value(&self) -> Option<i32> {
        if !self.is_integer() {
            return None;
        }

        self.repr.as_ref().and_then(|r| r.parse::<i32>().ok())
    }

    pub(crate) fn is_comma(&self) -> bool {
        matches!(self.token_type, TokenType::Comma)
    }

    pub(crate) fn is_ident(&self) -> bool {
        matches!(self.token_type, TokenType::Ident(_))
    }

    /// True when the token is an identifier that matches the given keyword (ASCII case-insensitive)
    pub(crate) fn is_ident_value(&self, keyword: &str) -> bool {
        matches!(&self.token_type, TokenType::Ident(v) if v.eq_ignore_ascii_case(keyword))
    }

    pub(crate) fn is_comment(&self) -> bool {
        matches!(self.token_type, TokenType::Comment(_))
    }

    pub(crate) fn is_whitespace(&self) -> bool {
        matches!(self.token_type, TokenType::Whitespace)
    }

    pub(crate) fn is_colon(&self) -> bool {
        matches!(self.token_type, TokenType::Colon)
    }

    pub(crate) fn is_delim(&self, delim: char) -> bool {
        matches!(self.token_type, TokenType::Delim(c) if c == delim)
    }

    pub(crate) fn is_eof(&self) -> bool {
        matches!(self.token_type, TokenType::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self.token_type.clone() {
            TokenType::AtKeyword(val)
            | TokenType::Url(val)
            | TokenType::Comment(val)
            | TokenType::BadUrl(val)
            | TokenType::Hash(val)
            | TokenType::IDHash(val)
            | TokenType::Ident(val)
            | TokenType::Function(val)
            | TokenType::QuotedString(val)
            | TokenType::BadString(val)
            | TokenType::UnicodeRange(val) => val,
            TokenType::Delim(val) => val.to_string(),
            TokenType::Number(val) => val.to_string(),
            TokenType::Percentage(val) => format!("{}%", val),
            TokenType::Dimension { unit, value } => format!("{}{}", value, unit),
            TokenType::Cdc => "-->".into(),
            TokenType::Cdo => "<!--".into(),
            TokenType::Colon => ":".into(),
            TokenType::Semicolon => ";".into(),
            TokenType::Comma => ",".into(),
            TokenType::LBracket => "[".into(),
            TokenType::RBracket => "]".into(),
            TokenType::LCurly => "{".into(),
            TokenType::RCurly => "}".into(),
            TokenType::LParen => "(".into(),
            TokenType::RParen => ")".into(),
            TokenType::Whitespace => " ".into(),
            TokenType::Eof => "eof".into(),
        };

        write!(f, "{string}")
    }
}

/// Options that change how the tokenizer reads certain sequences
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Read `U+...` sequences as a single unicode-range token
    pub unicode_ranges: bool,
}

/// CSS Tokenizer according to the [w3 specification](https://www.w3.org/TR/css-syntax-3/#tokenization)
pub struct Tokenizer<'stream> {
    stream: &'stream mut CharStream,
    /// Position on the NEXT read to consume. If it's outside the vec list, it will return EOF
    position: usize,
    /// Full list of all tokens produced by the tokenizer
    tokens: Vec<Token>,
    /// Start position of the stream (this does not have to be 1/1)
    start_location: Location,
    /// Current position of the stream, to get the absolute position, we must add start_location to it
    cur_location: Location,
    options: TokenizerOptions,
}

impl<'stream> Tokenizer<'stream> {
    /// Creates a new tokenizer with the given stream that starts on the given location. This does not have
    /// to be 1/1, but can be any location.
    pub fn new(stream: &'stream mut CharStream, location: Location) -> Self {
        Self::with_options(stream, location, TokenizerOptions::default())
    }

    pub fn with_options(
        stream: &'stream mut CharStream,
        location: Location,
        options: TokenizerOptions,
    ) -> Self {
        Self {
            stream,
            position: 0,
            tokens: Vec::new(),
            start_location: location,
            cur_location: Location::default(),
            options,
        }
    }

    /// Returns the current location and takes the start location into account
    pub fn current_location(&self) -> Location {
        self.cur_location.relative_to(&self.start_location)
    }

    /// Returns true when there is no next element, and the stream is closed
    pub fn eof(&self) -> bool {
        self.stream.eof() && self.position >= self.tokens.len()
    }

    /// Returns the last consumed token, or EOF when nothing has been consumed yet
    pub fn current(&self) -> Token {
        if self.position == 0 || self.position > self.tokens.len() {
            return Token::new(TokenType::Eof, self.current_location());
        }

        self.tokens[self.position - 1].clone()
    }

    /// Looks ahead at the next NON-WHITESPACE AND NON-COMMENT token.
    pub fn lookahead_sc(&mut self, offset: usize) -> Token {
        let mut i = offset;

        loop {
            let t = self.lookahead(i);
            match t.token_type {
                TokenType::Whitespace | TokenType::Comment(_) => {
                    i += 1;
                }
                _ => return t,
            }
        }
    }

    /// Looks ahead at the next token with offset. So lookahead(0) will look at the token that
    /// will be consumed with consume()
    pub fn lookahead(&mut self, offset: usize) -> Token {
        while self.tokens.len() <= self.position + offset {
            let token = self.consume_token();
            self.tokens.push(token);
        }

        self.tokens[self.position + offset].clone()
    }

    /// Consumes the next token and returns it
    pub fn consume(&mut self) -> Token {
        if self.tokens.len() <= self.position {
            let token = self.consume_token();
            self.tokens.push(token);
        }

        let token = &self.tokens[self.position];
        self.position += 1;

        log::trace!("{:?}", token);

        token.clone()
    }

    /// Reconsumes will push the current position back so the next read will be the same token
    pub fn reconsume(&mut self) {
        if self.position > 0 {
            self.position -= 1;
        }
    }

    /// Returns the position of the next token to consume, to be used with `rewind`
    pub fn tell(&self) -> usize {
        self.position
    }

    /// Moves back to a position returned by `tell`
    pub fn rewind(&mut self, position: usize) {
        self.position = position.min(self.tokens.len());
    }

    /// Returns the source text between two absolute offsets
    pub fn slice(&self, start: usize, end: usize) -> String {
        let base = self.start_location.offset;
        self.stream
            .get_slice(start.saturating_sub(base), end.saturating_sub(base))
    }

    /// 4.3.1. [Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> Token {
        let start = self.stream.tell();
        let mut token = self.consume_token_type();
        token.raw = self.stream.get_slice(start, self.stream.tell());
        token
    }

    fn consume_token_type(&mut self) -> Token {
        let current = self.current_char();
        let loc = self.current_location();

        if self.look_ahead_slice(2) == "/*" {
            let comment = self.consume_comment();
            return Token::new(TokenType::Comment(comment), loc);
        }

        match current {
            Character::StreamEnd | Character::StreamEmpty => Token::new(TokenType::Eof, loc),
            c if c.is_whitespace() => {
                self.consume_whitespace();
                Token::new(TokenType::Whitespace, loc)
            }
            Ch('"' | '\'') => self.consume_string_token(),
            Ch(c @ '#') => {
                // consume '#'
                self.next_char();

                if is_ident_char(self.current_char().into()) || self.is_start_of_escape(0) {
                    let id = self.is_next_3_points_starts_ident_seq(0);
                    let value = self.consume_ident();
                    return if id {
                        Token::new(TokenType::IDHash(value), loc)
                    } else {
                        Token::new(TokenType::Hash(value), loc)
                    };
                }

                Token::new(TokenType::Delim(c), loc)
            }
            Ch(c) if "()[]{},:;".contains(c) => {
                self.next_char();
                let token_type = match c {
                    '(' => TokenType::LParen,
                    ')' => TokenType::RParen,
                    '[' => TokenType::LBracket,
                    ']' => TokenType::RBracket,
                    '{' => TokenType::LCurly,
                    '}' => TokenType::RCurly,
                    ',' => TokenType::Comma,
                    ':' => TokenType::Colon,
                    _ => TokenType::Semicolon,
                };
                Token::new(token_type, loc)
            }
            Ch(c @ '+') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                // consume '+'
                self.next_char();
                Token::new(TokenType::Delim(c), loc)
            }
            Ch('.') => {
                if self.stream.look_ahead(1).is_numeric() {
                    return self.consume_numeric_token();
                }

                // consume '.'
                self.next_char();
                Token::new(TokenType::Delim('.'), loc)
            }
            Ch(c @ '-') => {
                if self.is_signed_decimal(0) {
                    return self.consume_numeric_token();
                }

                let cdc_token = "-->";
                if self.look_ahead_slice(cdc_token.len()) == cdc_token {
                    self.consume_chars(cdc_token.len());
                    return Token::new(TokenType::Cdc, loc);
                }

                if self.is_next_3_points_starts_ident_seq(0) {
                    return self.consume_ident_like_seq();
                }

                // consume '-'
                self.next_char();
                Token::new(TokenType::Delim(c), loc)
            }
            Ch(c @ '<') => {
                let cdo_token = "<!--";
                if self.look_ahead_slice(cdo_token.len()) == cdo_token {
                    self.consume_chars(cdo_token.len());
                    return Token::new(TokenType::Cdo, loc);
                }

                // consume '<'
                self.next_char();
                Token::new(TokenType::Delim(c), loc)
            }
            Ch(c @ '@') => {
                // consume '@'
                self.next_char();

                if self.is_next_3_points_starts_ident_seq(0) {
                    return Token::new(TokenType::AtKeyword(self.consume_ident()), loc);
                }

                Token::new(TokenType::Delim(c), loc)
            }
            Ch(c @ '\\') => {
                if self.is_start_of_escape(0) {
                    return self.consume_ident_like_seq();
                }

                // parser error
                self.next_char();
                Token::new(TokenType::Delim(c), loc)
            }
            Ch('u' | 'U') if self.is_start_of_unicode_range() => self.consume_unicode_range(),
            c if c.is_numeric() => self.consume_numeric_token(),
            Ch(c) if is_ident_start(c) => self.consume_ident_like_seq(),
            Ch(c) => {
                self.next_char();
                Token::new(TokenType::Delim(c), loc)
            }
        }
    }

    /// 4.3.2. [Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    fn consume_comment(&mut self) -> String {
        let mut comment = String::new();

        // consume '/*'
        comment.push_str(&self.consume_chars(2));

        while self.look_ahead_slice(2) != "*/" && !self.stream.eof() {
            comment.push(self.next_char().into());
        }

        // consume '*/'
        if !self.stream.eof() {
            comment.push_str(&self.consume_chars(2));
        }

        comment
    }

    /// 4.3.3. [Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    /// Returns either a `<number-token>`, `<percentage-token>`, or `<dimension-token>`.
    fn consume_numeric_token(&mut self) -> Token {
        let loc = self.current_location();
        let (number, repr) = self.consume_number();

        if self.is_next_3_points_starts_ident_seq(0) {
            let unit = self.consume_ident();
            let dimension = TokenType::Dimension {
                value: number,
                unit,
            };
            return Token::new(dimension, loc).with_repr(repr);
        }

        if self.current_char() == Ch('%') {
            // consume '%'
            self.next_char();
            return Token::new(TokenType::Percentage(number), loc).with_repr(repr);
        }

        Token::new(TokenType::Number(number), loc).with_repr(repr)
    }

    /// 4.3.5. [Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// Returns either a `<string-token>` or `<bad-string-token>`.
    fn consume_string_token(&mut self) -> Token {
        let loc = self.current_location();

        // consume string starting: (') or (") ...
        let ending = self.next_char();
        let mut value = String::new();

        loop {
            // eof is a parse error, the string is returned as is
            if self.current_char() == ending || self.stream.eof() {
                self.next_char();
                return Token::new(TokenType::QuotedString(value), loc);
            }

            // newline: parser error
            if self.current_char() == Ch('\n') {
                // note: don't consume '\n'
                return Token::new(TokenType::BadString(value), loc);
            }

            if self.current_char() == Ch('\\') {
                match self.stream.look_ahead(1) {
                    Character::StreamEnd | Character::StreamEmpty => {
                        self.next_char();
                        continue;
                    }
                    Ch('\n') => {
                        // escaped newline continues the string
                        self.consume_chars(2);
                        continue;
                    }
                    _ => {
                        value.push(self.consume_escaped_token());
                        continue;
                    }
                }
            }

            value.push(self.next_char().into());
        }
    }

    /// 4.3.12. [Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    ///
    /// Returns the value together with its source representation.
    fn consume_number(&mut self) -> (Number, String) {
        let mut value = String::new();

        if matches!(self.current_char(), Ch('+' | '-')) {
            value.push(self.next_char().into());
        }

        value.push_str(&self.consume_digits());

        if self.current_char() == Ch('.') && self.stream.look_ahead(1).is_numeric() {
            value.push_str(&self.consume_chars(2));
            value.push_str(&self.consume_digits());
        }

        let c1 = self.stream.look_ahead(0);
        let c2 = self.stream.look_ahead(1);
        let c3 = self.stream.look_ahead(2);
        if matches!(c1, Ch('e' | 'E'))
            && ((matches!(c2, Ch('-' | '+')) && c3.is_numeric()) || c2.is_numeric())
        {
            value.push(self.next_char().into());
            value.push(self.next_char().into());
            value.push_str(&self.consume_digits());
        }

        (value.parse().unwrap_or_default(), value)
    }

    /// 4.3.4. [Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    ///
    /// Returns: `<ident-token>`, `<function-token>`, `<url-token>`, or `<bad-url-token>`.
    fn consume_ident_like_seq(&mut self) -> Token {
        let loc = self.current_location();

        let value = self.consume_ident();

        if value.eq_ignore_ascii_case("url") && self.current_char() == Ch('(') {
            // consume '('
            self.next_char();

            let mut ws = 0;
            while self.stream.look_ahead(ws).is_whitespace() {
                ws += 1;
            }

            if matches!(self.stream.look_ahead(ws), Ch('"' | '\'')) {
                // leave the whitespace for the parser, this is a function with a string argument
                return Token::new(TokenType::Function(value), loc);
            }

            return self.consume_url(loc);
        }

        if self.current_char() == Ch('(') {
            // consume '('
            self.next_char();
            return Token::new(TokenType::Function(value), loc);
        }

        Token::new(TokenType::Ident(value), loc)
    }

    /// 4.3.6. [Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-a-url-token)
    ///
    /// Returns either a `<url-token>` or a `<bad-url-token>`
    fn consume_url(&mut self, loc: Location) -> Token {
        let mut url = String::new();

        self.consume_whitespace();

        loop {
            if self.current_char() == Ch(')') {
                // consume ')'
                self.next_char();
                break;
            }

            if self.stream.eof() {
                // parser error
                break;
            }

            if self.current_char().is_whitespace() {
                self.consume_whitespace();
                if self.current_char() == Ch(')') || self.stream.eof() {
                    continue;
                }

                self.consume_remnants_of_bad_url();
                return Token::new(TokenType::BadUrl(url), loc);
            }

            let is_bad_char = |c: char| c == '"' || c == '\'' || c == '(' || is_non_printable(c);
            if matches!(self.current_char(), Ch(c) if is_bad_char(c)) {
                // parse error
                self.consume_remnants_of_bad_url();
                return Token::new(TokenType::BadUrl(url), loc);
            }

            if self.current_char() == Ch('\\') {
                if self.is_start_of_escape(0) {
                    url.push(self.consume_escaped_token());
                    continue;
                }

                self.consume_remnants_of_bad_url();
                return Token::new(TokenType::BadUrl(url), loc);
            }

            url.push(self.next_char().into());
        }

        Token::new(TokenType::Url(url), loc)
    }

    /// 4.3.14. [Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    ///
    /// Used is to consume enough of the input stream to reach a recovery point where normal tokenizing can resume.
    fn consume_remnants_of_bad_url(&mut self) {
        loop {
            if self.stream.eof() {
                break;
            }

            if self.current_char() == Ch(')') {
                self.next_char();
                break;
            }

            if self.is_start_of_escape(0) {
                self.consume_escaped_token();
                continue;
            }

            self.next_char();
        }
    }

    /// 4.3.7. [Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-an-escaped-code-point)
    fn consume_escaped_token(&mut self) -> char {
        // consume '\'
        self.next_char();

        let stream = &self.stream;
        let escape = decode_escape(|n| match stream.look_ahead(n) {
            Ch(c) => Some(c),
            _ => None,
        });

        match escape {
            Some((c, len)) => {
                self.consume_chars(len);
                c
            }
            // eof: parser error
            None => UnicodeChar::REPLACEMENT_CHARACTER,
        }
    }

    /// 4.3.11. [Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// Note: that algorithm does not do the verification that are necessary to
    /// ensure the returned code points would constitute an <ident-token>.
    /// Caller should ensure that the stream starts with an ident sequence before calling this
    /// algorithm.
    fn consume_ident(&mut self) -> String {
        let mut value = String::new();

        loop {
            if self.is_start_of_escape(0) {
                value.push(self.consume_escaped_token());
                continue;
            }

            match self.current_char() {
                Ch(c) if is_ident_char(c) => {
                    self.next_char();
                    value.push(c);
                }
                _ => break,
            }
        }

        value
    }

    /// Reads `u+` followed by hex digits and question marks, optionally followed by `-` and
    /// more hex digits. Validation of the range is left to the parser.
    fn consume_unicode_range(&mut self) -> Token {
        let loc = self.current_location();

        // consume 'u+'
        self.consume_chars(2);

        let mut value = String::new();
        while matches!(self.current_char(), Ch(c) if c.is_ascii_hexdigit() || c == '?') {
            value.push(self.next_char().into());
        }

        if self.current_char() == Ch('-') && self.stream.look_ahead(1).is_hex_digit() {
            value.push(self.next_char().into());
            while self.current_char().is_hex_digit() {
                value.push(self.next_char().into());
            }
        }

        Token::new(TokenType::UnicodeRange(value), loc)
    }

    fn consume_digits(&mut self) -> String {
        let mut value = String::new();

        while self.current_char().is_numeric() {
            value.push(self.next_char().into());
        }

        value
    }

    fn consume_chars(&mut self, len: usize) -> String {
        (0..len).map(|_| char::from(self.next_char())).collect()
    }

    fn consume_whitespace(&mut self) {
        while self.current_char().is_whitespace() {
            self.next_char();
        }
    }

    fn is_start_of_unicode_range(&self) -> bool {
        self.options.unicode_ranges
            && self.stream.look_ahead(1) == Ch('+')
            && matches!(self.stream.look_ahead(2), Ch(c) if c.is_ascii_hexdigit() || c == '?')
    }

    /// 4.3.8. [Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
    fn is_start_of_escape(&self, start: usize) -> bool {
        let current_char = self.stream.look_ahead(start);
        let next_char = self.stream.look_ahead(start + 1);

        current_char == Ch('\\') && matches!(next_char, Ch(c) if c != '\n')
    }

    /// [4.3.9. Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#check-if-three-code-points-would-start-an-ident-sequence)
    fn is_next_3_points_starts_ident_seq(&self, start: usize) -> bool {
        let first = self.stream.look_ahead(start);
        let second = self.stream.look_ahead(start + 1);

        match first {
            Ch('-') => {
                matches!(second, Ch(c) if is_ident_start(c))
                    || second == Ch('-')
                    || self.is_start_of_escape(start + 1)
            }
            Ch('\\') => self.is_start_of_escape(start),
            Ch(c) => is_ident_start(c),
            _ => false,
        }
    }

    fn is_signed_decimal(&self, start: usize) -> bool {
        let current = self.stream.look_ahead(start);
        let next = self.stream.look_ahead(start + 1);
        let last = self.stream.look_ahead(start + 2);

        // e.g. +1, -1, +.1, -0.01
        matches!(current, Ch('+' | '-'))
            && ((next == Ch('.') && last.is_numeric()) || next.is_numeric())
    }

    fn current_char(&self) -> Character {
        self.stream.look_ahead(0)
    }

    fn next_char(&mut self) -> Character {
        if self.stream.eof() {
            return Character::StreamEnd;
        }

        let c = self.stream.read_and_next();
        self.cur_location.offset += 1;
        if c == Ch('\n') {
            self.cur_location.line += 1;
            self.cur_location.column = 1;
        } else {
            self.cur_location.column += 1;
        }

        c
    }

    fn look_ahead_slice(&self, len: usize) -> String {
        let mut s = String::new();

        for i in 0..len {
            match self.stream.look_ahead(i) {
                Ch(c) => s.push(c),
                _ => break,
            }
        }

        s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! assert_token_eq {
        ($t1:expr, $t2:expr) => {
            assert_eq!($t1.token_type, $t2)
        };
    }

    fn stream_of(data: &str) -> CharStream {
        let mut stream = CharStream::new();
        stream.read_from_str(data);
        stream.close();
        stream
    }

    fn token_types(data: &str, options: TokenizerOptions) -> Vec<TokenType> {
        let mut stream = stream_of(data);
        let mut tokenizer = Tokenizer::with_options(&mut stream, Location::default(), options);

        let mut types = Vec::new();
        loop {
            let t = tokenizer.consume();
            if t.is_eof() {
                break;
            }
            types.push(t.token_type);
        }
        types
    }

    #[test]
    fn parse_comment() {
        let mut stream = stream_of("/* css comment */a");
        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());

        let t = tokenizer.consume();
        assert_token_eq!(t, TokenType::Comment("/* css comment */".into()));
        assert_token_eq!(tokenizer.consume(), TokenType::Ident("a".into()));
        assert!(tokenizer.consume().is_eof());
    }

    #[test]
    fn parse_unterminated_comment() {
        let types = token_types("a/* open", TokenizerOptions::default());
        assert_eq!(
            types,
            vec![
                TokenType::Ident("a".into()),
                TokenType::Comment("/* open".into()),
            ]
        );
    }

    #[test]
    fn parse_numbers() {
        let num_tokens = vec![
            ("12", 12.0, true, false),
            ("+34", 34.0, true, true),
            ("-56", -56.0, true, true),
            ("7.8", 7.8, false, false),
            ("-9.10", -9.10, false, true),
            ("+.5", 0.5, false, true),
            ("1e+1", 1e+1, false, false),
            ("1e1", 1e1, false, false),
            ("1e-1", 1e-1, false, false),
        ];

        for (raw_num, num, integer, sign) in num_tokens {
            let mut stream = stream_of(raw_num);
            let mut tokenizer = Tokenizer::new(&mut stream, Location::default());

            let t = tokenizer.consume();
            assert_token_eq!(t, TokenType::Number(num));
            assert_eq!(t.is_integer(), integer, "{raw_num}");
            assert_eq!(t.has_sign(), sign, "{raw_num}");
            assert_eq!(t.raw, raw_num);
        }
    }

    #[test]
    fn integer_value() {
        let mut stream = stream_of("+5 -3n 2.0 1e3");
        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());

        assert_eq!(tokenizer.consume().integer_value(), Some(5));
        tokenizer.consume();
        let dim = tokenizer.consume();
        assert_eq!(dim.integer_value(), Some(-3));
        assert_eq!(dim.raw, "-3n");
        tokenizer.consume();
        assert_eq!(tokenizer.consume().integer_value(), None);
        tokenizer.consume();
        assert_eq!(tokenizer.consume().integer_value(), None);
    }

    #[test]
    fn parse_ident_tokens() {
        let ident_tokens = vec![
            ("-ident", "-ident"),
            ("ide  nt", "ide"),
            ("_123-ident", "_123-ident"),
            ("_123\\ident", "_123ident"),
            ("--custom", "--custom"),
            ("bl\\9 ock", "bl\u{9}ock"),
        ];

        for (raw_ident, ident) in ident_tokens {
            let types = token_types(raw_ident, TokenizerOptions::default());
            assert_eq!(types[0], TokenType::Ident(ident.into()), "{raw_ident}");
        }
    }

    #[test]
    fn parse_escaped_tokens() {
        let escaped_chars = vec![
            ("\\005F ", '_'),
            ("\\2A", '*'),
            ("\\000000 ", UnicodeChar::REPLACEMENT_CHARACTER),
            ("\\FFFFFF ", UnicodeChar::REPLACEMENT_CHARACTER),
            ("\\D800 ", UnicodeChar::REPLACEMENT_CHARACTER),
            ("\\1F47D ", '👽'),
        ];

        for (raw_escaped, escaped_char) in escaped_chars {
            let mut stream = stream_of(raw_escaped);
            let mut tokenizer = Tokenizer::new(&mut stream, Location::default());
            let decoded = tokenizer.consume_escaped_token();
            assert_eq!(decoded, escaped_char, "{raw_escaped}");
        }
    }

    #[test]
    fn parse_urls() {
        let urls = vec![
            ("url(https://gosub.io/)", TokenType::Url("https://gosub.io/".into())),
            ("url(  gosub.io  )", TokenType::Url("gosub.io".into())),
            ("url(gosub\\)io)", TokenType::Url("gosub)io".into())),
            ("url(gosub io)", TokenType::BadUrl("gosub".into())),
            ("url(gosub(io)", TokenType::BadUrl("gosub".into())),
            ("url(\"gosub.io\")", TokenType::Function("url".into())),
            ("url(  'gosub.io')", TokenType::Function("url".into())),
        ];

        for (raw_url, url_token) in urls {
            let types = token_types(raw_url, TokenizerOptions::default());
            assert_eq!(types[0], url_token, "{raw_url}");
        }
    }

    #[test]
    fn unterminated_url_keeps_raw() {
        let mut stream = stream_of("url(foo");
        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());

        let t = tokenizer.consume();
        assert_token_eq!(t, TokenType::Url("foo".into()));
        assert_eq!(t.raw, "url(foo");
    }

    #[test]
    fn parse_string_tokens() {
        let strings = vec![
            ("\"double\"", TokenType::QuotedString("double".into())),
            ("'single'", TokenType::QuotedString("single".into())),
            ("'it\\'s'", TokenType::QuotedString("it's".into())),
            ("\"me \\26  you\"", TokenType::QuotedString("me & you".into())),
            ("\"con\\\ntinued\"", TokenType::QuotedString("continued".into())),
            ("\"open", TokenType::QuotedString("open".into())),
            ("\"bad\nstring\"", TokenType::BadString("bad".into())),
        ];

        for (raw, expected) in strings {
            let types = token_types(raw, TokenizerOptions::default());
            assert_eq!(types[0], expected, "{raw}");
        }
    }

    #[test]
    fn produce_valid_stream_of_css_tokens() {
        let types = token_types(
            "#header .nav { font-size: 1.1rem; }\n@media screen {}",
            TokenizerOptions::default(),
        );

        assert_eq!(
            types,
            vec![
                TokenType::IDHash("header".into()),
                TokenType::Whitespace,
                TokenType::Delim('.'),
                TokenType::Ident("nav".into()),
                TokenType::Whitespace,
                TokenType::LCurly,
                TokenType::Whitespace,
                TokenType::Ident("font-size".into()),
                TokenType::Colon,
                TokenType::Whitespace,
                TokenType::Dimension {
                    value: 1.1,
                    unit: "rem".into()
                },
                TokenType::Semicolon,
                TokenType::Whitespace,
                TokenType::RCurly,
                TokenType::Whitespace,
                TokenType::AtKeyword("media".into()),
                TokenType::Whitespace,
                TokenType::Ident("screen".into()),
                TokenType::Whitespace,
                TokenType::LCurly,
                TokenType::RCurly,
            ]
        );
    }

    #[test]
    fn parse_hashes() {
        let types = token_types("#fff #123 #-a #", TokenizerOptions::default());
        assert_eq!(
            types,
            vec![
                TokenType::IDHash("fff".into()),
                TokenType::Whitespace,
                TokenType::Hash("123".into()),
                TokenType::Whitespace,
                TokenType::IDHash("-a".into()),
                TokenType::Whitespace,
                TokenType::Delim('#'),
            ]
        );
    }

    #[test]
    fn parse_cdo_and_cdc() {
        let types = token_types("<!-- a -->", TokenizerOptions::default());
        assert_eq!(
            types,
            vec![
                TokenType::Cdo,
                TokenType::Whitespace,
                TokenType::Ident("a".into()),
                TokenType::Whitespace,
                TokenType::Cdc,
            ]
        );
    }

    #[test]
    fn parse_dimension_and_percentage() {
        let types = token_types("10px 50% -2em 3n-1 600px\\9", TokenizerOptions::default());
        assert_eq!(
            types,
            vec![
                TokenType::Dimension {
                    value: 10.0,
                    unit: "px".into()
                },
                TokenType::Whitespace,
                TokenType::Percentage(50.0),
                TokenType::Whitespace,
                TokenType::Dimension {
                    value: -2.0,
                    unit: "em".into()
                },
                TokenType::Whitespace,
                TokenType::Dimension {
                    value: 3.0,
                    unit: "n-1".into()
                },
                TokenType::Whitespace,
                TokenType::Dimension {
                    value: 600.0,
                    unit: "px\u{9}".into()
                },
            ]
        );
    }

    #[test]
    fn unicode_ranges_only_when_enabled() {
        let enabled = TokenizerOptions {
            unicode_ranges: true,
        };

        assert_eq!(
            token_types("U+0025-00FF, u+4??", enabled),
            vec![
                TokenType::UnicodeRange("0025-00FF".into()),
                TokenType::Comma,
                TokenType::Whitespace,
                TokenType::UnicodeRange("4??".into()),
            ]
        );

        assert_eq!(
            token_types("u+a", TokenizerOptions::default()),
            vec![
                TokenType::Ident("u".into()),
                TokenType::Delim('+'),
                TokenType::Ident("a".into()),
            ]
        );

        assert_eq!(
            token_types("url(x)", enabled),
            vec![TokenType::Url("x".into())]
        );
    }

    #[test]
    fn lookahead_and_reconsume() {
        let mut stream = stream_of("a /* c */ b");
        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());

        assert_token_eq!(tokenizer.lookahead(1), TokenType::Whitespace);
        assert_token_eq!(tokenizer.lookahead_sc(1), TokenType::Ident("b".into()));
        assert_token_eq!(tokenizer.consume(), TokenType::Ident("a".into()));

        let mark = tokenizer.tell();
        tokenizer.consume();
        tokenizer.consume();
        tokenizer.rewind(mark);
        assert_token_eq!(tokenizer.consume(), TokenType::Whitespace);
        tokenizer.reconsume();
        assert_token_eq!(tokenizer.consume(), TokenType::Whitespace);
        assert!(tokenizer.current().is_whitespace());
    }

    #[test]
    fn location() {
        let mut stream = stream_of("test { color: #123; background-color: #11223344 }");
        let mut tokenizer = Tokenizer::new(&mut stream, Location::default());

        let locations = vec![
            Location::new(1, 1, 0),
            Location::new(1, 5, 4),
            Location::new(1, 6, 5),
            Location::new(1, 7, 6),
            Location::new(1, 8, 7),
            Location::new(1, 13, 12),
            Location::new(1, 14, 13),
            Location::new(1, 15, 14),
            Location::new(1, 19, 18),
            Location::new(1, 20, 19),
            Location::new(1, 21, 20),
            Location::new(1, 37, 36),
            Location::new(1, 38, 37),
            Location::new(1, 39, 38),
            Location::new(1, 48, 47),
            Location::new(1, 49, 48),
            Location::new(1, 50, 49),
        ];

        for location in locations {
            assert_eq!(tokenizer.consume().location, location);
        }

        assert!(tokenizer.eof());
    }

    #[test]
    fn location_multiline() {
        let mut stream = stream_of("test {\r\n    color: #123;\n}");
        let mut tokenizer = Tokenizer::new(&mut stream, Location::new(10, 5, 100));

        let locations = vec![
            Location::new(10, 5, 100),
            Location::new(10, 9, 104),
            Location::new(10, 10, 105),
            Location::new(10, 11, 106),
            Location::new(11, 5, 111),
            Location::new(11, 10, 116),
            Location::new(11, 11, 117),
            Location::new(11, 12, 118),
            Location::new(11, 16, 122),
            Location::new(11, 17, 123),
            Location::new(12, 1, 124),
        ];

        for location in locations {
            assert_eq!(tokenizer.consume().location, location);
        }
    }

    #[test]
    fn slice_uses_absolute_offsets() {
        let mut stream = stream_of("foo(bar)");
        let mut tokenizer = Tokenizer::new(&mut stream, Location::new(1, 11, 10));

        let function = tokenizer.consume();
        tokenizer.consume();
        let end = tokenizer.consume();
        assert_eq!(
            tokenizer.slice(function.location.offset, end.location.offset + 1),
            "foo(bar)"
        );
    }
}
