use crate::location::Location;
use std::fmt;

/// Whether a number/hash/dimension token's textual representation marks it
/// as a CSS Syntax "integer" or a "number" (spec §3, §8 invariant 5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Number,
}

/// Whether a `<hash-token>` would itself start an ident sequence (spec §3,
/// §8 invariant 6). `Id` hashes are the ones that can stand in for an
/// `#id` selector without a preceding `#` delimiter being re-tokenized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashKind {
    Id,
    Unrestricted,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Whitespace(String),
    Comment(String),

    Colon,
    Semicolon,
    Comma,
    OpenParen,
    CloseParen,
    OpenSquare,
    CloseSquare,
    OpenCurly,
    CloseCurly,

    Delim(char),

    Ident(String),
    Function(String),
    AtKeyword(String),
    Hash(String, HashKind),

    String(String),
    BadString(String),
    Url(String),
    BadUrl(String),

    Number(f64, NumberKind),
    Percentage(f64, NumberKind),
    Dimension(f64, NumberKind, String),

    UnicodeRange(u32, u32),

    Cdo,
    Cdc,

    /// Synthetic, zero-width, always at `len..len`.
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Self { kind, location }
    }

    #[must_use]
    pub fn eof(at: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            location: Location::at(at),
        }
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    #[must_use]
    pub fn is_whitespace_or_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace(_) | TokenKind::Comment(_))
    }

    #[must_use]
    pub fn is_delim(&self, c: char) -> bool {
        matches!(self.kind, TokenKind::Delim(d) if d == c)
    }

    #[must_use]
    pub fn is_ident(&self) -> bool {
        matches!(self.kind, TokenKind::Ident(_))
    }

    #[must_use]
    pub fn is_ident_matching(&self, value: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(value))
    }

    /// True for the four opening tokens any simple block starts with.
    #[must_use]
    pub fn opens_simple_block(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::OpenParen | TokenKind::OpenSquare | TokenKind::OpenCurly
        )
    }

    /// The matching closer for an opening token, per the bijective mapping
    /// `( ) `, `[ ]`, `{ }` (spec §4.3).
    #[must_use]
    pub fn matching_closer(&self) -> Option<TokenKind> {
        match self.kind {
            TokenKind::OpenParen => Some(TokenKind::CloseParen),
            TokenKind::OpenSquare => Some(TokenKind::CloseSquare),
            TokenKind::OpenCurly => Some(TokenKind::CloseCurly),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Whitespace(_) => write!(f, " "),
            TokenKind::Comment(s) => write!(f, "/*{s}*/"),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::OpenParen => write!(f, "("),
            TokenKind::CloseParen => write!(f, ")"),
            TokenKind::OpenSquare => write!(f, "["),
            TokenKind::CloseSquare => write!(f, "]"),
            TokenKind::OpenCurly => write!(f, "{{"),
            TokenKind::CloseCurly => write!(f, "}}"),
            TokenKind::Delim(c) => write!(f, "{c}"),
            TokenKind::Ident(s) | TokenKind::AtKeyword(s) => write!(f, "{s}"),
            TokenKind::Function(s) => write!(f, "{s}("),
            TokenKind::Hash(s, _) => write!(f, "#{s}"),
            TokenKind::String(s) | TokenKind::BadString(s) => write!(f, "\"{s}\""),
            TokenKind::Url(s) | TokenKind::BadUrl(s) => write!(f, "url({s})"),
            TokenKind::Number(v, _) => write!(f, "{v}"),
            TokenKind::Percentage(v, _) => write!(f, "{v}%"),
            TokenKind::Dimension(v, _, unit) => write!(f, "{v}{unit}"),
            TokenKind::UnicodeRange(start, end) => write!(f, "U+{start:X}-{end:X}"),
            TokenKind::Cdo => write!(f, "<!--"),
            TokenKind::Cdc => write!(f, "-->"),
            TokenKind::Eof => write!(f, ""),
        }
    }
}
