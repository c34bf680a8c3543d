//! A Level-3 CSS Syntax tokenizer, a grammar-level parser, and a Level-4
//! Selectors parser, composed into a single crate that turns a CSS source
//! string into a typed, source-located concrete syntax tree and recovers
//! from malformed input rather than aborting.
//!
//! This crate is the CORE of a larger CSS pipeline: pretty-printing, a
//! tree-walking visitor layer, file I/O/CLI wiring, and full encoding
//! detection are deliberately left to a host crate to build on top of this
//! one (see the module docs below for where each piece lives).
#![allow(clippy::module_name_repetitions)]

pub mod ast;
pub mod errors;
pub mod location;
pub mod parser;
pub mod parser_config;
pub mod promote;
pub mod selectors;
pub mod stream;
pub mod token;
pub mod tokenizer;
mod unicode;

pub use ast::{ComponentValue, CssRule, CssStylesheet, Declaration, DeclarationListItem, Rule, StyleRule, Stylesheet};
pub use errors::{CssError, CssResult, ParseError};
pub use location::Location;
pub use parser_config::{Context, ParserConfig};
pub use token::{Token, TokenKind};

/// A parsed tree paired with the recoverable errors discovered while
/// building it (spec §6 "Error object": "Stylesheet parsing always returns
/// a tree plus an accumulated error list").
#[derive(Clone, Debug, PartialEq)]
pub struct Parsed<T> {
    pub tree: T,
    pub errors: Vec<CssError>,
}

impl<T> Parsed<T> {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// `parse(source) -> CssStylesheet` (spec §6): the crate's primary entry
/// point. Parses `source` as a full stylesheet with bare qualified rules
/// promoted to `StyleRule`s (spec §4.6).
#[must_use]
pub fn parse(source: &str) -> Parsed<CssStylesheet> {
    let mut errors = Vec::new();
    let tree = parser::parse_css_stylesheet(source, &mut errors);
    Parsed { tree, errors }
}

/// One of the grammar's four re-entrant parse results, matched by
/// `Css3::parse_with_config`'s `context`.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedNode {
    Stylesheet(CssStylesheet),
    Rule(Rule),
    AtRule(ast::AtRule),
    Declaration(Declaration),
}

/// A thin facade dispatching `ParserConfig::context` onto the matching
/// grammar entry point, the way the teacher's own `Css3` struct dispatches
/// on `config.context` (spec §6 "Library surface").
pub struct Css3;

impl Css3 {
    /// Parses `source` as a full stylesheet; equivalent to the free
    /// function [`parse`].
    #[must_use]
    pub fn parse(source: &str) -> Parsed<CssStylesheet> {
        parse(source)
    }

    /// Parses `source` according to `config.context`. The `Stylesheet`
    /// context never fails (recoverable problems land in the `errors`
    /// vector the caller passes in); the other three contexts are hard-fail
    /// entries that return a `ParseError` in `source`'s place.
    pub fn parse_with_config(source: &str, config: &ParserConfig, errors: &mut Vec<CssError>) -> CssResult<ParsedNode> {
        match config.context {
            Context::Stylesheet => {
                let stylesheet = parser::parse_css_stylesheet(source, errors);
                Ok(ParsedNode::Stylesheet(stylesheet))
            }
            Context::Rule => parser::parse_rule(source, errors).map(ParsedNode::Rule),
            Context::AtRule => parser::parse_at_rule(source, errors).map(ParsedNode::AtRule),
            Context::Declaration => parser::parse_declaration(source, errors).map(ParsedNode::Declaration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_promotes_style_rules() {
        let parsed = parse("* { hello: world; }");
        assert!(parsed.is_clean());
        assert_eq!(parsed.tree.rules.len(), 1);
        assert!(matches!(&parsed.tree.rules[0], CssRule::Style(_)));
    }

    #[test]
    fn parse_recovers_from_a_malformed_rule() {
        let parsed = parse("a { color: red; } b {");
        assert_eq!(parsed.tree.rules.len(), 1);
        assert!(!parsed.is_clean());
    }

    #[test]
    fn css3_parse_with_config_dispatches_on_context() {
        let mut errors = Vec::new();
        let config = ParserConfig {
            context: Context::Declaration,
            ..Default::default()
        };
        let node = Css3::parse_with_config("color: red", &config, &mut errors).unwrap();
        assert!(matches!(node, ParsedNode::Declaration(d) if d.name == "color"));
    }

    #[test]
    fn css3_parse_with_config_propagates_hard_failures() {
        let mut errors = Vec::new();
        let config = ParserConfig {
            context: Context::Declaration,
            ..Default::default()
        };
        assert!(Css3::parse_with_config("", &config, &mut errors).is_err());
    }
}
