//! The Level-3 CSS tokenizer (spec §4.2): turns a preprocessed character
//! sequence into the full token list, recovering from every malformed
//! construct named in CSS Syntax §4.3 rather than aborting.
//!
//! The tokenizer is eager: `Tokenizer::tokenize` walks the whole input once
//! and returns the complete `Vec<Token>` (always EOF-terminated) plus any
//! recoverable errors discovered along the way. This is what makes the
//! later token list "randomly indexable" (design note §5, §9) for the
//! selectors parser's transactional backtracking — there is nothing left
//! to pull lazily by the time anyone holds a `&[Token]`.

use crate::errors::CssError;
use crate::location::Location;
use crate::stream::CharStream;
use crate::token::{HashKind, NumberKind, Token, TokenKind};
use crate::unicode::{
    is_digit, is_hex_digit, is_ident_char, is_ident_start, is_non_printable, is_whitespace, valid_escape,
    would_start_ident, would_start_number,
};

struct Tokenizer<'a> {
    chars: CharStream,
    errors: &'a mut Vec<CssError>,
}

/// Tokenizes `source` in full, appending any recoverable errors found to
/// `errors`. The returned list always ends with a synthetic `Eof` token at
/// `len..len`.
#[must_use]
pub fn tokenize(source: &str, errors: &mut Vec<CssError>) -> Vec<Token> {
    let mut tokenizer = Tokenizer {
        chars: CharStream::new(source),
        errors,
    };
    let mut tokens = Vec::new();

    loop {
        let token = tokenizer.consume_token();
        let is_eof = token.is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }

    tokens
}

impl Tokenizer<'_> {
    fn error(&mut self, message: impl Into<String>, at: usize) {
        self.errors.push(CssError::at(message.into(), Location::at(at)));
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.look_ahead(offset)
    }

    fn advance(&mut self) -> Option<char> {
        self.chars.next()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(i, c)| self.peek(i) == Some(c))
    }

    fn single(&mut self, start: usize, kind: TokenKind) -> Token {
        self.advance();
        Token::new(kind, Location::new(start, self.chars.tell()))
    }

    /// 4.3.1 Consume a token.
    fn consume_token(&mut self) -> Token {
        let start = self.chars.tell();
        let Some(c) = self.peek(0) else {
            return Token::eof(start);
        };

        match c {
            '/' if self.peek(1) == Some('*') => self.consume_comment(start),
            c if is_whitespace(c) => self.consume_whitespace(start),
            '"' | '\'' => self.consume_string(start),
            '#' => self.consume_hash_or_delim(start),
            '(' => self.single(start, TokenKind::OpenParen),
            ')' => self.single(start, TokenKind::CloseParen),
            '[' => self.single(start, TokenKind::OpenSquare),
            ']' => self.single(start, TokenKind::CloseSquare),
            '{' => self.single(start, TokenKind::OpenCurly),
            '}' => self.single(start, TokenKind::CloseCurly),
            ',' => self.single(start, TokenKind::Comma),
            ':' => self.single(start, TokenKind::Colon),
            ';' => self.single(start, TokenKind::Semicolon),
            '+' | '.' if would_start_number(self.peek(0), self.peek(1), self.peek(2)) => {
                self.consume_numeric(start)
            }
            '+' => self.single(start, TokenKind::Delim('+')),
            '.' => self.single(start, TokenKind::Delim('.')),
            '-' if would_start_number(self.peek(0), self.peek(1), self.peek(2)) => self.consume_numeric(start),
            '-' if self.starts_with("-->") => {
                for _ in 0..3 {
                    self.advance();
                }
                Token::new(TokenKind::Cdc, Location::new(start, self.chars.tell()))
            }
            '-' if would_start_ident(self.peek(0), self.peek(1), self.peek(2)) => self.consume_ident_like(start),
            '-' => self.single(start, TokenKind::Delim('-')),
            '<' if self.starts_with("<!--") => {
                for _ in 0..4 {
                    self.advance();
                }
                Token::new(TokenKind::Cdo, Location::new(start, self.chars.tell()))
            }
            '<' => self.single(start, TokenKind::Delim('<')),
            '@' => {
                self.advance();
                if would_start_ident(self.peek(0), self.peek(1), self.peek(2)) {
                    let name = self.consume_ident_sequence();
                    Token::new(TokenKind::AtKeyword(name), Location::new(start, self.chars.tell()))
                } else {
                    Token::new(TokenKind::Delim('@'), Location::new(start, self.chars.tell()))
                }
            }
            '\\' if valid_escape(self.peek(0), self.peek(1)) => self.consume_ident_like(start),
            '\\' => {
                self.error("invalid escape", start);
                self.advance();
                Token::new(TokenKind::Delim('\\'), Location::new(start, self.chars.tell()))
            }
            c if is_digit(c) => self.consume_numeric(start),
            c if is_ident_start(c) => self.consume_ident_like(start),
            c => {
                self.advance();
                Token::new(TokenKind::Delim(c), Location::new(start, self.chars.tell()))
            }
        }
    }

    /// 4.3.2 Consume comments.
    fn consume_comment(&mut self, start: usize) -> Token {
        self.advance();
        self.advance();
        let text_start = self.chars.tell();
        loop {
            if self.peek(0) == Some('*') && self.peek(1) == Some('/') {
                break;
            }
            if self.advance().is_none() {
                self.error("unterminated comment", start);
                break;
            }
        }
        let text = self.chars.slice(text_start, self.chars.tell());
        if self.peek(0) == Some('*') {
            self.advance();
            self.advance();
        }
        Token::new(TokenKind::Comment(text), Location::new(start, self.chars.tell()))
    }

    fn consume_whitespace(&mut self, start: usize) -> Token {
        while matches!(self.peek(0), Some(c) if is_whitespace(c)) {
            self.advance();
        }
        let text = self.chars.slice(start, self.chars.tell());
        Token::new(TokenKind::Whitespace(text), Location::new(start, self.chars.tell()))
    }

    /// 4.3.5 Consume a string token.
    fn consume_string(&mut self, start: usize) -> Token {
        let quote = self.advance().unwrap();
        let mut value = String::new();

        loop {
            match self.peek(0) {
                None => {
                    self.error("unterminated string", start);
                    break;
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\n') => {
                    self.error("newline in string", start);
                    return Token::new(TokenKind::BadString(value), Location::new(start, self.chars.tell()));
                }
                Some('\\') if self.peek(1).is_none() => {
                    self.advance();
                }
                Some('\\') if self.peek(1) == Some('\n') => {
                    self.advance();
                    self.advance();
                }
                Some('\\') if valid_escape(self.peek(0), self.peek(1)) => {
                    value.push(self.consume_escaped());
                }
                Some(_) => {
                    value.push(self.advance().unwrap());
                }
            }
        }

        Token::new(TokenKind::String(value), Location::new(start, self.chars.tell()))
    }

    fn consume_hash_or_delim(&mut self, start: usize) -> Token {
        self.advance();
        let next_is_ident_char = matches!(self.peek(0), Some(c) if is_ident_char(c));
        let next_is_escape = valid_escape(self.peek(0), self.peek(1));

        if next_is_ident_char || next_is_escape {
            let kind = if would_start_ident(self.peek(0), self.peek(1), self.peek(2)) {
                HashKind::Id
            } else {
                HashKind::Unrestricted
            };
            let name = self.consume_ident_sequence();
            Token::new(TokenKind::Hash(name, kind), Location::new(start, self.chars.tell()))
        } else {
            Token::new(TokenKind::Delim('#'), Location::new(start, self.chars.tell()))
        }
    }

    /// 4.3.7 Consume an escaped code point. Caller has verified the
    /// backslash starts a valid escape and has not yet consumed it.
    fn consume_escaped(&mut self) -> char {
        self.advance(); // backslash
        match self.peek(0) {
            None => '\u{FFFD}',
            Some(c) if is_hex_digit(c) => {
                let mut hex = String::new();
                while hex.len() < 6 {
                    match self.peek(0) {
                        Some(c) if is_hex_digit(c) => {
                            hex.push(c);
                            self.advance();
                        }
                        _ => break,
                    }
                }
                if matches!(self.peek(0), Some(c) if is_whitespace(c)) {
                    self.advance();
                }
                let code = u32::from_str_radix(&hex, 16).unwrap_or(0);
                if code == 0 || code > 0x10FFFF {
                    return '\u{FFFD}';
                }
                char::from_u32(code).unwrap_or('\u{FFFD}')
            }
            Some(c) => {
                self.advance();
                c
            }
        }
    }

    /// 4.3.11 Consume an ident sequence. Caller has verified the sequence
    /// would start an ident.
    fn consume_ident_sequence(&mut self) -> String {
        let mut value = String::new();
        loop {
            match self.peek(0) {
                Some(c) if is_ident_char(c) => {
                    value.push(c);
                    self.advance();
                }
                Some('\\') if valid_escape(self.peek(0), self.peek(1)) => {
                    value.push(self.consume_escaped());
                }
                _ => break,
            }
        }
        value
    }

    /// 4.3.3 Consume a numeric token.
    fn consume_numeric(&mut self, start: usize) -> Token {
        let (value, kind) = self.consume_number();

        if would_start_ident(self.peek(0), self.peek(1), self.peek(2)) {
            let unit = self.consume_ident_sequence();
            Token::new(
                TokenKind::Dimension(value, kind, unit),
                Location::new(start, self.chars.tell()),
            )
        } else if self.peek(0) == Some('%') {
            self.advance();
            Token::new(TokenKind::Percentage(value, kind), Location::new(start, self.chars.tell()))
        } else {
            Token::new(TokenKind::Number(value, kind), Location::new(start, self.chars.tell()))
        }
    }

    /// 4.3.12 Consume a number. Returns the numeric value and whether its
    /// representation marks it `integer` or `number` (spec §8 invariant 5).
    fn consume_number(&mut self) -> (f64, NumberKind) {
        let mut repr = String::new();
        let mut kind = NumberKind::Integer;

        if matches!(self.peek(0), Some('+' | '-')) {
            repr.push(self.advance().unwrap());
        }

        while matches!(self.peek(0), Some(c) if is_digit(c)) {
            repr.push(self.advance().unwrap());
        }

        if self.peek(0) == Some('.') && matches!(self.peek(1), Some(c) if is_digit(c)) {
            kind = NumberKind::Number;
            repr.push(self.advance().unwrap());
            while matches!(self.peek(0), Some(c) if is_digit(c)) {
                repr.push(self.advance().unwrap());
            }
        }

        if matches!(self.peek(0), Some('e' | 'E')) {
            let sign_digit = matches!(self.peek(1), Some('+' | '-')) && matches!(self.peek(2), Some(c) if is_digit(c));
            let plain_digit = matches!(self.peek(1), Some(c) if is_digit(c));
            if sign_digit || plain_digit {
                kind = NumberKind::Number;
                repr.push(self.advance().unwrap());
                if matches!(self.peek(0), Some('+' | '-')) {
                    repr.push(self.advance().unwrap());
                }
                while matches!(self.peek(0), Some(c) if is_digit(c)) {
                    repr.push(self.advance().unwrap());
                }
            }
        }

        let value = repr.parse::<f64>().unwrap_or(0.0);
        (value, kind)
    }

    /// 4.3.4 Consume an ident-like token: ident, function, url, bad-url, or
    /// (spec §4.4) a unicode-range.
    fn consume_ident_like(&mut self, start: usize) -> Token {
        let name = self.consume_ident_sequence();

        if name.eq_ignore_ascii_case("u") {
            if let Some(token) = self.try_consume_unicode_range(start) {
                return token;
            }
        }

        if self.peek(0) == Some('(') {
            if name.eq_ignore_ascii_case("url") {
                self.advance();
                return self.consume_url_or_function(start, name);
            }
            self.advance();
            return Token::new(TokenKind::Function(name), Location::new(start, self.chars.tell()));
        }

        Token::new(TokenKind::Ident(name), Location::new(start, self.chars.tell()))
    }

    /// After `url(`: either a bare url-token/bad-url-token, or — if the
    /// first non-whitespace code point is a quote — a plain `Function`
    /// token so the grammar parser re-enters with `url("...")`.
    fn consume_url_or_function(&mut self, start: usize, name: String) -> Token {
        let mark = self.chars.tell();
        while matches!(self.peek(0), Some(c) if is_whitespace(c)) {
            self.advance();
        }
        if matches!(self.peek(0), Some('"' | '\'')) {
            self.chars.seek(mark);
            return Token::new(TokenKind::Function(name), Location::new(start, self.chars.tell()));
        }
        self.consume_url(start)
    }

    /// 4.3.6 Consume a url token.
    fn consume_url(&mut self, start: usize) -> Token {
        let mut value = String::new();

        while matches!(self.peek(0), Some(c) if is_whitespace(c)) {
            self.advance();
        }

        loop {
            match self.peek(0) {
                Some(')') => {
                    self.advance();
                    return Token::new(TokenKind::Url(value), Location::new(start, self.chars.tell()));
                }
                None => {
                    self.error("unterminated url", start);
                    return Token::new(TokenKind::Url(value), Location::new(start, self.chars.tell()));
                }
                Some(c) if is_whitespace(c) => {
                    while matches!(self.peek(0), Some(c) if is_whitespace(c)) {
                        self.advance();
                    }
                    if self.peek(0) == Some(')') {
                        self.advance();
                        return Token::new(TokenKind::Url(value), Location::new(start, self.chars.tell()));
                    }
                    if self.peek(0).is_none() {
                        self.error("unterminated url", start);
                        return Token::new(TokenKind::Url(value), Location::new(start, self.chars.tell()));
                    }
                    self.error("invalid character in url", start);
                    self.consume_bad_url_remnants();
                    return Token::new(TokenKind::BadUrl(value), Location::new(start, self.chars.tell()));
                }
                Some('"' | '\'' | '(') => {
                    self.error("invalid character in url", start);
                    self.consume_bad_url_remnants();
                    return Token::new(TokenKind::BadUrl(value), Location::new(start, self.chars.tell()));
                }
                Some(c) if is_non_printable(c) => {
                    self.error("invalid character in url", start);
                    self.consume_bad_url_remnants();
                    return Token::new(TokenKind::BadUrl(value), Location::new(start, self.chars.tell()));
                }
                Some('\\') if valid_escape(self.peek(0), self.peek(1)) => {
                    value.push(self.consume_escaped());
                }
                Some('\\') => {
                    self.error("invalid escape", start);
                    self.consume_bad_url_remnants();
                    return Token::new(TokenKind::BadUrl(value), Location::new(start, self.chars.tell()));
                }
                Some(_) => {
                    value.push(self.advance().unwrap());
                }
            }
        }
    }

    /// 4.3.14 Consume the remnants of a bad url.
    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.peek(0) {
                None | Some(')') => {
                    self.advance();
                    break;
                }
                Some('\\') if valid_escape(self.peek(0), self.peek(1)) => {
                    self.consume_escaped();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// §4.4 unicode-range microsyntax. Caller has already consumed the
    /// leading `u`/`U` ident; `start` is that ident's start offset. On
    /// rejection, the cursor is restored to just after the `u`/`U` so the
    /// caller falls back to an ordinary `Ident("u")`.
    fn try_consume_unicode_range(&mut self, start: usize) -> Option<Token> {
        if self.peek(0) != Some('+') {
            return None;
        }
        let after_plus = self.peek(1)?;
        if !(is_hex_digit(after_plus) || after_plus == '?') {
            return None;
        }

        let mark = self.chars.tell();
        self.advance(); // '+'

        let mut start_hex = String::new();
        let mut wildcards = 0usize;
        while start_hex.len() + wildcards < 6 {
            match self.peek(0) {
                Some(c) if is_hex_digit(c) && wildcards == 0 => {
                    start_hex.push(c);
                    self.advance();
                }
                Some('?') => {
                    wildcards += 1;
                    self.advance();
                }
                _ => break,
            }
        }

        if start_hex.is_empty() && wildcards == 0 {
            self.chars.seek(mark);
            return None;
        }

        // An explicit `-HEX` end is allowed after a wildcard start too (e.g.
        // `U+1F??-2FFF`); when present it overrides the wildcard-derived end.
        let mut end_hex = String::new();
        if self.peek(0) == Some('-') && matches!(self.peek(1), Some(c) if is_hex_digit(c)) {
            self.advance(); // '-'
            while end_hex.len() < 6 {
                match self.peek(0) {
                    Some(c) if is_hex_digit(c) => {
                        end_hex.push(c);
                        self.advance();
                    }
                    _ => break,
                }
            }
        }

        // `?`s expand to `0` for the start (spec §4.4).
        let start_str = format!("{start_hex}{}", "0".repeat(wildcards));
        let range_start = u32::from_str_radix(&start_str, 16).unwrap_or(0);
        let end_str = if !end_hex.is_empty() {
            end_hex
        } else if wildcards > 0 {
            // `?`s expand to `F` for the end (spec §4.4).
            format!("{start_hex}{}", "f".repeat(wildcards))
        } else {
            start_hex.clone()
        };
        let range_end = u32::from_str_radix(&end_str, 16).unwrap_or(range_start);

        if range_end > 0x10FFFF || range_start > range_end {
            self.error("invalid unicode-range", start);
            self.chars.seek(mark);
            return None;
        }

        Some(Token::new(
            TokenKind::UnicodeRange(range_start, range_end),
            Location::new(start, self.chars.tell()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(src: &str) -> (Vec<Token>, Vec<CssError>) {
        let mut errors = Vec::new();
        let tokens = tokenize(src, &mut errors);
        (tokens, errors)
    }

    macro_rules! assert_token_eq {
        ($tok:expr, $kind:pat) => {
            assert!(matches!(&$tok.kind, $kind), "got {:?}", $tok.kind)
        };
    }

    #[test]
    fn tokenizes_basic_rule() {
        let (tokens, errors) = toks("a { color: red; }");
        assert!(errors.is_empty());
        assert_token_eq!(tokens[0], TokenKind::Ident(s) if s == "a");
        assert_token_eq!(tokens[1], TokenKind::Whitespace(_));
        assert_token_eq!(tokens[2], TokenKind::OpenCurly);
        assert_token_eq!(tokens.last().unwrap(), TokenKind::Eof);
    }

    #[test]
    fn number_kind_tracks_representation() {
        let (tokens, _) = toks("1 1.5 1e3 1%");
        assert_token_eq!(tokens[0], TokenKind::Number(_, NumberKind::Integer));
        assert_token_eq!(tokens[2], TokenKind::Number(_, NumberKind::Number));
        assert_token_eq!(tokens[4], TokenKind::Number(_, NumberKind::Number));
        assert_token_eq!(tokens[6], TokenKind::Percentage(_, NumberKind::Integer));
    }

    #[test]
    fn hash_kind_depends_on_ident_start() {
        let (tokens, _) = toks("#foo #1bad");
        assert_token_eq!(tokens[0], TokenKind::Hash(_, HashKind::Id));
        assert_token_eq!(tokens[2], TokenKind::Hash(_, HashKind::Unrestricted));
    }

    #[test]
    fn unterminated_string_recovers() {
        let (tokens, errors) = toks("'unterminated");
        assert_eq!(errors.len(), 1);
        assert_token_eq!(tokens[0], TokenKind::String(s) if s == "unterminated");
    }

    #[test]
    fn newline_in_string_is_bad_string() {
        let (tokens, errors) = toks("'abc\ndef'");
        assert_eq!(errors.len(), 1);
        assert_token_eq!(tokens[0], TokenKind::BadString(s) if s == "abc");
    }

    #[test]
    fn url_token_and_bad_url() {
        let (tokens, errors) = toks("url(foo.png) url(bad url)");
        assert!(!errors.is_empty());
        assert_token_eq!(tokens[0], TokenKind::Url(s) if s == "foo.png");
        let bad = tokens.iter().find(|t| matches!(t.kind, TokenKind::BadUrl(_))).unwrap();
        assert_token_eq!(bad, TokenKind::BadUrl(_));
    }

    #[test]
    fn url_with_quote_becomes_function() {
        let (tokens, _) = toks("url(\"foo.png\")");
        assert_token_eq!(tokens[0], TokenKind::Function(s) if s == "url");
    }

    #[test]
    fn unicode_range_wildcard() {
        let (tokens, _) = toks("U+1F??-2FFF");
        assert_token_eq!(tokens[0], TokenKind::UnicodeRange(0x1F00, 0x2FFF));
    }

    #[test]
    fn unicode_range_explicit_span() {
        let (tokens, _) = toks("U+0025-00FF");
        assert_token_eq!(tokens[0], TokenKind::UnicodeRange(0x25, 0xFF));
    }

    #[test]
    fn invalid_unicode_range_falls_back_to_ident() {
        let (tokens, errors) = toks("U+110000-120000");
        assert!(!errors.is_empty());
        assert_token_eq!(tokens[0], TokenKind::Ident(s) if s.eq_ignore_ascii_case("u"));
    }

    #[test]
    fn cdo_cdc() {
        let (tokens, _) = toks("<!-- -->");
        assert_token_eq!(tokens[0], TokenKind::Cdo);
        assert_token_eq!(tokens[2], TokenKind::Cdc);
    }

    #[test]
    fn comment_token_preserved() {
        let (tokens, _) = toks("/* hi */a");
        assert_token_eq!(tokens[0], TokenKind::Comment(s) if s == " hi ");
    }

    #[test]
    fn token_locations_are_contiguous() {
        let (tokens, _) = toks("a b");
        for w in tokens.windows(2) {
            assert!(w[1].location.start >= w[0].location.end);
        }
    }
}
