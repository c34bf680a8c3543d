//! Error types for the CSS core.
//!
//! `CssError` is the recoverable kind: every tokenizer- and grammar-level
//! issue in the taxonomy below is pushed onto a parser's `errors` vector and
//! parsing continues. `ParseError` is what the hard-fail entry points
//! (`parse_rule`, `parse_declaration`, `parse_component_value`, and the
//! selectors entries) return instead of a tree.

use std::fmt;

use crate::location::Location;

/// A recoverable error discovered during tokenizing or grammar parsing.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CssError {
    pub message: String,
    pub location: Option<Location>,
}

impl CssError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }
}

/// The error a hard-fail entry point returns in place of a node.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub location: Option<Location>,
}

impl ParseError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn at(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            location: Some(location),
        }
    }
}

impl From<CssError> for ParseError {
    fn from(e: CssError) -> Self {
        ParseError {
            message: e.message,
            location: e.location,
        }
    }
}

pub type CssResult<T> = Result<T, ParseError>;

/// The selectors parser's backtracking control signal (spec §4.5, §9).
///
/// Raised by a production that didn't match; caught by `TokenCursor::maybe`,
/// which rolls the cursor back and treats the scope as "didn't happen". An
/// unhandled `MissingToken` that escapes the top-level selector production
/// becomes a `ParseError`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub struct MissingToken;

impl fmt::Display for MissingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected token was not present")
    }
}

impl From<MissingToken> for ParseError {
    fn from(_: MissingToken) -> Self {
        ParseError::new("expected token was not present")
    }
}

pub type SelectorResult<T> = Result<T, MissingToken>;
