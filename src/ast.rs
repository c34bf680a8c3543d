//! The grammar-level concrete syntax tree (spec §3, §4.3): rules,
//! declarations, blocks, functions. Every node owns its children; nodes
//! produced once by the parser are never mutated afterwards (spec §3
//! Lifecycle).

use crate::location::Location;
use crate::token::{Token, TokenKind};

/// The union `Token | SimpleBlock | Function` (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentValue {
    Token(Token),
    Block(SimpleBlock),
    Function(Function),
}

impl ComponentValue {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            ComponentValue::Token(t) => t.location,
            ComponentValue::Block(b) => b.location,
            ComponentValue::Function(f) => f.location,
        }
    }

    #[must_use]
    pub fn is_whitespace_or_comment(&self) -> bool {
        matches!(self, ComponentValue::Token(t) if t.is_whitespace_or_comment())
    }

    #[must_use]
    pub fn as_token(&self) -> Option<&Token> {
        match self {
            ComponentValue::Token(t) => Some(t),
            _ => None,
        }
    }
}

/// Which bracket pair a `SimpleBlock` opens with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOpening {
    Paren,
    Square,
    Curly,
}

impl BlockOpening {
    #[must_use]
    pub fn from_open_kind(kind: &TokenKind) -> Option<Self> {
        match kind {
            TokenKind::OpenParen => Some(BlockOpening::Paren),
            TokenKind::OpenSquare => Some(BlockOpening::Square),
            TokenKind::OpenCurly => Some(BlockOpening::Curly),
            _ => None,
        }
    }

    #[must_use]
    pub fn close_kind(self) -> TokenKind {
        match self {
            BlockOpening::Paren => TokenKind::CloseParen,
            BlockOpening::Square => TokenKind::CloseSquare,
            BlockOpening::Curly => TokenKind::CloseCurly,
        }
    }

    #[must_use]
    pub fn open_kind(self) -> TokenKind {
        match self {
            BlockOpening::Paren => TokenKind::OpenParen,
            BlockOpening::Square => TokenKind::OpenSquare,
            BlockOpening::Curly => TokenKind::OpenCurly,
        }
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            BlockOpening::Paren => '(',
            BlockOpening::Square => '[',
            BlockOpening::Curly => '{',
        }
    }
}

/// A balanced pair of delimiters enclosing component values (spec §3, §4.3
/// `consume_simple_block`).
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleBlock {
    pub opening: BlockOpening,
    /// Span of just the opening token, so the block can be flattened back
    /// into a token list for re-entrant parsing (selectors, declarations).
    pub opening_location: Location,
    pub value: Vec<ComponentValue>,
    pub location: Location,
}

/// An ident immediately followed by `(`, with its argument component
/// values (spec §3, §4.3 `consume_function`).
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    /// Span of the `name(` function token.
    pub name_location: Location,
    pub value: Vec<ComponentValue>,
    pub location: Location,
}

/// A rule introduced by an `@`-prefixed identifier (spec §3, GLOSSARY).
#[derive(Clone, Debug, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub prelude: Vec<ComponentValue>,
    pub block: Option<SimpleBlock>,
    pub location: Location,
}

/// A prelude followed by a `{}` block (spec §3, GLOSSARY).
#[derive(Clone, Debug, PartialEq)]
pub struct QualifiedRule {
    pub prelude: Vec<ComponentValue>,
    pub block: SimpleBlock,
    pub location: Location,
}

/// Either rule shape the generic rule-list grammar can produce.
#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    At(AtRule),
    Qualified(QualifiedRule),
}

impl Rule {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Rule::At(r) => r.location,
            Rule::Qualified(r) => r.location,
        }
    }
}

/// `name: value [!important]` (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Vec<ComponentValue>,
    pub important: bool,
    pub location: Location,
}

/// An entry of a declaration list (spec §4.3 `consume_declaration_list`).
#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationListItem {
    Declaration(Declaration),
    AtRule(AtRule),
}

/// Untouched rule list (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
    pub location: Location,
}

/// A bare qualified rule promoted by re-entering its prelude through the
/// selectors parser and its block through the declaration-list consumer
/// (spec §3, §4.6). Nested qualified rules introduced by a leading
/// `Delim('&')` (the supplemented nesting feature, spec §4.6) are promoted
/// the same way and collected separately from the declarations they were
/// interleaved with.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleRule {
    pub selectors: Vec<crate::selectors::Selector>,
    pub declarations: Vec<DeclarationListItem>,
    pub nested: Vec<StyleRule>,
    pub location: Location,
}

/// Either rule shape a promoted stylesheet can contain. At-rules pass
/// through the promoter unchanged (spec §3, §4.6).
#[derive(Clone, Debug, PartialEq)]
pub enum CssRule {
    At(AtRule),
    Style(StyleRule),
}

impl CssRule {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            CssRule::At(r) => r.location,
            CssRule::Style(r) => r.location,
        }
    }
}

/// The promoted top-level tree `parse_css_stylesheet` returns (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct CssStylesheet {
    pub rules: Vec<CssRule>,
    pub location: Location,
}
