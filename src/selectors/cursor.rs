//! Transactional token cursor (design note §9): a bare integer position
//! into a slice of tokens, with a `maybe` scope that tries a production and
//! rewinds the position — never clones tokens — if the closure signals
//! "didn't match" via `MissingToken`.

use crate::errors::{MissingToken, SelectorResult};
use crate::location::Location;
use crate::token::{Token, TokenKind};

pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        Self { tokens, pos: 0 }
    }

    #[must_use]
    pub fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .unwrap_or_else(|| self.tokens.last().expect("token list is never empty"))
    }

    #[must_use]
    pub fn current_location(&self) -> Location {
        self.peek(0).location
    }

    #[must_use]
    pub fn eof(&self) -> bool {
        matches!(self.peek(0).kind, TokenKind::Eof)
    }

    pub fn next(&mut self) -> Token {
        let t = self.peek(0).clone();
        if !t.is_eof() {
            self.pos += 1;
        }
        t
    }

    pub fn reconsume(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    #[must_use]
    pub fn mark(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    /// Skips a run of whitespace/comment tokens, returning whether any were
    /// present (this is what becomes a `Descendant` combinator between
    /// compound selectors, spec §4.5).
    pub fn skip_whitespace_comments(&mut self) -> bool {
        let start = self.pos;
        while self.peek(0).is_whitespace_or_comment() {
            self.pos += 1;
        }
        self.pos != start
    }

    /// Runs `f`; on `Err(MissingToken)` the cursor is rewound to where it
    /// started, so the caller can try an alternative production.
    pub fn maybe<T>(&mut self, f: impl FnOnce(&mut Self) -> SelectorResult<T>) -> SelectorResult<T> {
        let mark = self.mark();
        match f(self) {
            Ok(v) => Ok(v),
            Err(e) => {
                self.reset(mark);
                Err(e)
            }
        }
    }

    pub fn expect_delim(&mut self, c: char) -> SelectorResult<Token> {
        let t = self.peek(0).clone();
        if t.is_delim(c) {
            self.next();
            Ok(t)
        } else {
            Err(MissingToken)
        }
    }

    pub fn expect_kind(&mut self, kind: &TokenKind) -> SelectorResult<Token> {
        let t = self.peek(0).clone();
        if &t.kind == kind {
            self.next();
            Ok(t)
        } else {
            Err(MissingToken)
        }
    }
}
