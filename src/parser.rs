//! The generic CSS Syntax Level-3 grammar parser (spec §4.3): turns a flat
//! token list into the CST defined in `ast.rs`. Every `consume_*` method
//! mirrors one production of CSS Syntax §5.4; the `parse_*` free functions
//! are the public entry points from the spec's entry-point table.
//!
//! Recoverable problems are pushed onto an `errors` accumulator and parsing
//! continues with best-effort recovery (spec §4.3 "Failure semantics"); the
//! four hard-fail entries additionally return a `ParseError` in place of a
//! tree when the grammar mandates a failure verdict.

use crate::ast::{AtRule, ComponentValue, Declaration, DeclarationListItem, QualifiedRule, Rule, SimpleBlock, Stylesheet};
use crate::ast::{BlockOpening, Function};
use crate::errors::{CssError, CssResult, ParseError};
use crate::location::Location;
use crate::token::{Token, TokenKind};
use crate::tokenizer;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: &'a mut Vec<CssError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], errors: &'a mut Vec<CssError>) -> Self {
        Self { tokens, pos: 0, errors }
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .unwrap_or_else(|| self.tokens.last().expect("token list is never empty"))
    }

    fn current_location(&self) -> Location {
        self.peek(0).location
    }

    fn eof(&self) -> bool {
        matches!(self.peek(0).kind, TokenKind::Eof)
    }

    fn next(&mut self) -> Token {
        let t = self.peek(0).clone();
        if !t.is_eof() {
            self.pos += 1;
        }
        t
    }

    fn skip_whitespace_comments(&mut self) {
        while self.peek(0).is_whitespace_or_comment() {
            self.pos += 1;
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(CssError::at(message, self.current_location()));
    }

    /// `consume_rule_list(top_level)` (spec §5.4.1).
    fn consume_rule_list(&mut self, top_level: bool) -> Vec<Rule> {
        log::trace!("consume_rule_list(top_level={top_level})");
        let mut rules = Vec::new();
        loop {
            match &self.peek(0).kind {
                TokenKind::Whitespace(_) | TokenKind::Comment(_) => {
                    self.next();
                }
                TokenKind::Eof => return rules,
                TokenKind::Cdo | TokenKind::Cdc => {
                    if top_level {
                        self.next();
                    } else if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(rule);
                    }
                }
                TokenKind::AtKeyword(_) => rules.push(Rule::At(self.consume_at_rule())),
                _ => {
                    if let Some(rule) = self.consume_qualified_rule() {
                        rules.push(rule);
                    }
                }
            }
        }
    }

    /// `consume_at_rule` (spec §5.4.2).
    fn consume_at_rule(&mut self) -> AtRule {
        log::trace!("consume_at_rule");
        let start = self.current_location();
        let name = match self.next().kind {
            TokenKind::AtKeyword(n) => n,
            other => unreachable!("consume_at_rule called on non-at-keyword token: {other:?}"),
        };

        let mut prelude = Vec::new();
        loop {
            match &self.peek(0).kind {
                TokenKind::Semicolon => {
                    let end = self.current_location();
                    self.next();
                    return AtRule {
                        name,
                        prelude,
                        block: None,
                        location: start.cover(&end),
                    };
                }
                TokenKind::Eof => {
                    self.error("unexpected end of input in at-rule prelude");
                    let end = self.current_location();
                    return AtRule {
                        name,
                        prelude,
                        block: None,
                        location: start.cover(&end),
                    };
                }
                TokenKind::OpenCurly => {
                    let block = self.consume_simple_block();
                    let end = block.location;
                    return AtRule {
                        name,
                        prelude,
                        block: Some(block),
                        location: start.cover(&end),
                    };
                }
                _ => prelude.push(self.consume_component_value()),
            }
        }
    }

    /// `consume_qualified_rule` (spec §5.4.3). Returns `None` on the
    /// EOF-without-block error case (dropped by the caller).
    fn consume_qualified_rule(&mut self) -> Option<Rule> {
        log::trace!("consume_qualified_rule");
        let start = self.current_location();
        let mut prelude = Vec::new();
        loop {
            match &self.peek(0).kind {
                TokenKind::Eof => {
                    self.error("unexpected end of input in qualified rule prelude");
                    return None;
                }
                TokenKind::OpenCurly => {
                    let block = self.consume_simple_block();
                    let end = block.location;
                    return Some(Rule::Qualified(QualifiedRule {
                        prelude,
                        block,
                        location: start.cover(&end),
                    }));
                }
                _ => prelude.push(self.consume_component_value()),
            }
        }
    }

    /// `consume_simple_block` (spec §5.4.7): caller is positioned at an
    /// opening token.
    fn consume_simple_block(&mut self) -> SimpleBlock {
        let opener = self.next();
        let opening = BlockOpening::from_open_kind(&opener.kind).expect("called at an opening token");
        let closer = opening.close_kind();
        log::trace!("consume_simple_block({opening:?})");

        let mut value = Vec::new();
        loop {
            if self.peek(0).kind == closer {
                let end = self.current_location();
                self.next();
                return SimpleBlock {
                    opening,
                    opening_location: opener.location,
                    value,
                    location: opener.location.cover(&end),
                };
            }
            if self.eof() {
                self.error(format!("unexpected end of input, expected {closer:?}"));
                let end = self.current_location();
                return SimpleBlock {
                    opening,
                    opening_location: opener.location,
                    value,
                    location: opener.location.cover(&end),
                };
            }
            value.push(self.consume_component_value());
        }
    }

    /// `consume_function` (spec §5.4.8): caller is positioned at a
    /// `Function` token.
    fn consume_function(&mut self) -> Function {
        let name_token = self.next();
        let name = match name_token.kind {
            TokenKind::Function(ref n) => n.clone(),
            ref other => unreachable!("consume_function called on non-function token: {other:?}"),
        };
        log::trace!("consume_function({name})");

        let mut value = Vec::new();
        loop {
            if matches!(self.peek(0).kind, TokenKind::CloseParen) {
                let end = self.current_location();
                self.next();
                return Function {
                    name,
                    name_location: name_token.location,
                    value,
                    location: name_token.location.cover(&end),
                };
            }
            if self.eof() {
                self.error("unexpected end of input, expected ')'");
                let end = self.current_location();
                return Function {
                    name,
                    name_location: name_token.location,
                    value,
                    location: name_token.location.cover(&end),
                };
            }
            value.push(self.consume_component_value());
        }
    }

    /// `consume_component_value` (spec §5.4.9).
    fn consume_component_value(&mut self) -> ComponentValue {
        if self.peek(0).opens_simple_block() {
            return ComponentValue::Block(self.consume_simple_block());
        }
        if matches!(self.peek(0).kind, TokenKind::Function(_)) {
            return ComponentValue::Function(self.consume_function());
        }
        ComponentValue::Token(self.next())
    }

    /// `consume_declaration` (spec §5.4.5): `self.tokens` is a bounded,
    /// synthetic-EOF-terminated slice positioned at the declaration name.
    fn consume_declaration(&mut self) -> Option<Declaration> {
        let start = self.current_location();
        let name = match self.peek(0).kind.clone() {
            TokenKind::Ident(n) => {
                self.next();
                n
            }
            _ => {
                self.error("expected an identifier to start a declaration");
                return None;
            }
        };
        log::trace!("consume_declaration({name})");

        self.skip_whitespace_comments();
        if !matches!(self.peek(0).kind, TokenKind::Colon) {
            self.error("expected ':' in declaration");
            return None;
        }
        self.next();
        self.skip_whitespace_comments();

        let mut value = Vec::new();
        while !self.eof() {
            value.push(self.consume_component_value());
        }
        while matches!(value.last(), Some(v) if v.is_whitespace_or_comment()) {
            value.pop();
        }

        // The last two non-whitespace/comment tokens must be `!` then
        // `important`; whitespace/comments may appear between them (spec §4.3).
        let mut important = false;
        let last_non_ws = value.iter().enumerate().rev().find(|(_, v)| !v.is_whitespace_or_comment());
        if let Some((important_idx, v)) = last_non_ws {
            let is_important_ident = matches!(v.as_token().map(|t| &t.kind), Some(TokenKind::Ident(s)) if s.eq_ignore_ascii_case("important"));
            if is_important_ident {
                let bang = value[..important_idx].iter().enumerate().rev().find(|(_, v)| !v.is_whitespace_or_comment());
                if let Some((bang_idx, v)) = bang {
                    if matches!(v.as_token().map(|t| &t.kind), Some(TokenKind::Delim('!'))) {
                        value.truncate(bang_idx);
                        while matches!(value.last(), Some(v) if v.is_whitespace_or_comment()) {
                            value.pop();
                        }
                        important = true;
                    }
                }
            }
        }

        let end = value.last().map_or(start, ComponentValue::location);
        Some(Declaration {
            name,
            value,
            important,
            location: start.cover(&end),
        })
    }

    /// `consume_declaration_list` (spec §5.4.4).
    fn consume_declaration_list(&mut self) -> Vec<DeclarationListItem> {
        log::trace!("consume_declaration_list");
        let mut items = Vec::new();
        loop {
            match &self.peek(0).kind {
                TokenKind::Whitespace(_) | TokenKind::Comment(_) | TokenKind::Semicolon => {
                    self.next();
                }
                TokenKind::Eof => return items,
                TokenKind::AtKeyword(_) => items.push(DeclarationListItem::AtRule(self.consume_at_rule())),
                TokenKind::Ident(_) => {
                    if let Some(decl) = self.consume_bounded_declaration() {
                        items.push(DeclarationListItem::Declaration(decl));
                    }
                }
                _ => {
                    self.error("expected a declaration or at-rule");
                    self.fast_forward_to_semicolon();
                }
            }
        }
    }

    /// Like `consume_declaration_list` but also accepts `Delim('&')`-prefixed
    /// nested qualified rules (the supplemented nesting feature, spec §4.6),
    /// returning declarations followed by nested rules in that order.
    fn consume_style_block_contents(&mut self) -> (Vec<DeclarationListItem>, Vec<Rule>) {
        log::trace!("consume_style_block_contents");
        let mut items = Vec::new();
        let mut nested = Vec::new();
        loop {
            match &self.peek(0).kind {
                TokenKind::Whitespace(_) | TokenKind::Comment(_) | TokenKind::Semicolon => {
                    self.next();
                }
                TokenKind::Eof => return (items, nested),
                TokenKind::AtKeyword(_) => items.push(DeclarationListItem::AtRule(self.consume_at_rule())),
                TokenKind::Delim('&') => {
                    if let Some(rule) = self.consume_qualified_rule() {
                        nested.push(rule);
                    }
                }
                TokenKind::Ident(_) => {
                    if let Some(decl) = self.consume_bounded_declaration() {
                        items.push(DeclarationListItem::Declaration(decl));
                    }
                }
                _ => {
                    self.error("expected a declaration, at-rule, or nested rule");
                    self.fast_forward_to_semicolon();
                }
            }
        }
    }

    /// Collects the tokens up to the next top-level `;`/EOF, appends a
    /// synthetic EOF, and hands them to `consume_declaration` in a
    /// sub-parser so that parser's own EOF-bounded loops terminate there.
    fn consume_bounded_declaration(&mut self) -> Option<Declaration> {
        let mut bounded = Vec::new();
        loop {
            match &self.peek(0).kind {
                TokenKind::Semicolon | TokenKind::Eof => break,
                _ => bounded.push(self.next()),
            }
        }
        if matches!(self.peek(0).kind, TokenKind::Semicolon) {
            self.next();
        }
        let at = bounded.last().map_or(self.current_location().start, |t| t.location.end);
        bounded.push(Token::eof(at));

        let mut sub = Parser::new(&bounded, self.errors);
        sub.consume_declaration()
    }

    fn fast_forward_to_semicolon(&mut self) {
        while !matches!(self.peek(0).kind, TokenKind::Semicolon | TokenKind::Eof) {
            self.consume_component_value();
        }
        if matches!(self.peek(0).kind, TokenKind::Semicolon) {
            self.next();
        }
    }
}

fn tokenize_source(source: &str, errors: &mut Vec<CssError>) -> Vec<Token> {
    tokenizer::tokenize(source, errors)
}

/// `parse_stylesheet` (spec §4.3 entry-point table): the untouched rule list.
#[must_use]
pub fn parse_stylesheet(source: &str, errors: &mut Vec<CssError>) -> Stylesheet {
    let tokens = tokenize_source(source, errors);
    let location = Location::new(0, tokens.last().map_or(0, |t| t.location.end));
    let mut parser = Parser::new(&tokens, errors);
    let rules = parser.consume_rule_list(true);
    Stylesheet { rules, location }
}

/// `parse_css_stylesheet` (spec §4.3, §4.6): `parse_stylesheet` with bare
/// qualified rules promoted to `StyleRule`.
#[must_use]
pub fn parse_css_stylesheet(source: &str, errors: &mut Vec<CssError>) -> crate::ast::CssStylesheet {
    let stylesheet = parse_stylesheet(source, errors);
    crate::promote::promote_stylesheet(stylesheet, errors)
}

/// `parse_rule_list` (spec §4.3): nested, not top-level — CDO/CDC are
/// treated as qualified rules rather than discarded.
#[must_use]
pub fn parse_rule_list(source: &str, errors: &mut Vec<CssError>) -> Vec<Rule> {
    let tokens = tokenize_source(source, errors);
    let mut parser = Parser::new(&tokens, errors);
    parser.consume_rule_list(false)
}

/// `parse_rule` (spec §4.3): hard-fail on empty input, extra input after
/// the rule, or an invalid rule.
pub fn parse_rule(source: &str, errors: &mut Vec<CssError>) -> CssResult<Rule> {
    let tokens = tokenize_source(source, errors);
    let mut parser = Parser::new(&tokens, errors);
    parser.skip_whitespace_comments();

    if parser.eof() {
        return Err(ParseError::at("expected a rule, found nothing", parser.current_location()));
    }

    let rule = match &parser.peek(0).kind {
        TokenKind::AtKeyword(_) => Rule::At(parser.consume_at_rule()),
        _ => parser
            .consume_qualified_rule()
            .ok_or_else(|| ParseError::at("invalid rule", parser.current_location()))?,
    };

    parser.skip_whitespace_comments();
    if !parser.eof() {
        return Err(ParseError::at("unexpected trailing input after rule", parser.current_location()));
    }
    Ok(rule)
}

/// `parse_at_rule` (SPEC_FULL "Configuration", `Context::AtRule`): hard-fail
/// on empty input, a non-`@`-keyword start, or trailing input after the rule.
pub fn parse_at_rule(source: &str, errors: &mut Vec<CssError>) -> CssResult<AtRule> {
    let tokens = tokenize_source(source, errors);
    let mut parser = Parser::new(&tokens, errors);
    parser.skip_whitespace_comments();

    if parser.eof() {
        return Err(ParseError::at("expected an at-rule, found nothing", parser.current_location()));
    }
    if !matches!(parser.peek(0).kind, TokenKind::AtKeyword(_)) {
        return Err(ParseError::at(
            "expected an at-rule to start with '@'",
            parser.current_location(),
        ));
    }
    let rule = parser.consume_at_rule();

    parser.skip_whitespace_comments();
    if !parser.eof() {
        return Err(ParseError::at("unexpected trailing input after at-rule", parser.current_location()));
    }
    Ok(rule)
}

/// `parse_declaration` (spec §4.3): hard-fail on empty input or a
/// non-identifier start.
pub fn parse_declaration(source: &str, errors: &mut Vec<CssError>) -> CssResult<Declaration> {
    let mut tokens = tokenize_source(source, errors);
    if let Some(last) = tokens.last() {
        if !last.is_eof() {
            let at = last.location.end;
            tokens.push(Token::eof(at));
        }
    }
    let mut parser = Parser::new(&tokens, errors);
    parser.skip_whitespace_comments();

    if !matches!(parser.peek(0).kind, TokenKind::Ident(_)) {
        return Err(ParseError::at(
            "expected an identifier to start a declaration",
            parser.current_location(),
        ));
    }

    parser
        .consume_declaration()
        .ok_or_else(|| ParseError::at("invalid declaration", parser.current_location()))
}

/// `parse_declaration_list` (spec §4.3).
#[must_use]
pub fn parse_declaration_list(source: &str, errors: &mut Vec<CssError>) -> Vec<DeclarationListItem> {
    let tokens = tokenize_source(source, errors);
    let mut parser = Parser::new(&tokens, errors);
    parser.consume_declaration_list()
}

/// `parse_component_value` (spec §4.3): hard-fail on empty input or
/// trailing input after the one component value.
pub fn parse_component_value(source: &str, errors: &mut Vec<CssError>) -> CssResult<ComponentValue> {
    let tokens = tokenize_source(source, errors);
    let mut parser = Parser::new(&tokens, errors);
    parser.skip_whitespace_comments();

    if parser.eof() {
        return Err(ParseError::at("expected a component value, found nothing", parser.current_location()));
    }
    let value = parser.consume_component_value();
    parser.skip_whitespace_comments();
    if !parser.eof() {
        return Err(ParseError::at(
            "unexpected trailing input after component value",
            parser.current_location(),
        ));
    }
    Ok(value)
}

/// `parse_component_values` (spec §4.3).
#[must_use]
pub fn parse_component_values(source: &str, errors: &mut Vec<CssError>) -> Vec<ComponentValue> {
    let tokens = tokenize_source(source, errors);
    let mut parser = Parser::new(&tokens, errors);
    let mut values = Vec::new();
    while !parser.eof() {
        values.push(parser.consume_component_value());
    }
    values
}

pub(crate) fn consume_style_block_contents(
    tokens: &[Token],
    errors: &mut Vec<CssError>,
) -> (Vec<DeclarationListItem>, Vec<Rule>) {
    let mut parser = Parser::new(tokens, errors);
    parser.consume_style_block_contents()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::NumberKind;

    #[test]
    fn simple_qualified_rule() {
        let mut errors = Vec::new();
        let sheet = parse_stylesheet("* { hello: world; }", &mut errors);
        assert!(errors.is_empty());
        assert_eq!(sheet.rules.len(), 1);
        assert!(matches!(&sheet.rules[0], Rule::Qualified(_)));
    }

    #[test]
    fn at_rule_without_block() {
        let mut errors = Vec::new();
        let sheet = parse_stylesheet("@charset \"utf-8\";", &mut errors);
        assert_eq!(sheet.rules.len(), 1);
        match &sheet.rules[0] {
            Rule::At(at) => {
                assert_eq!(at.name, "charset");
                assert!(at.block.is_none());
            }
            other => panic!("expected at-rule, got {other:?}"),
        }
    }

    #[test]
    fn at_rule_with_block() {
        let mut errors = Vec::new();
        let sheet = parse_stylesheet("@media screen { a { color: red; } }", &mut errors);
        match &sheet.rules[0] {
            Rule::At(at) => {
                assert_eq!(at.name, "media");
                assert!(at.block.is_some());
            }
            other => panic!("expected at-rule, got {other:?}"),
        }
    }

    #[test]
    fn declaration_with_important() {
        let mut errors = Vec::new();
        let decl = parse_declaration("color: red !important", &mut errors).unwrap();
        assert_eq!(decl.name, "color");
        assert!(decl.important);
    }

    #[test]
    fn declaration_requires_colon() {
        let mut errors = Vec::new();
        assert!(parse_declaration("color red", &mut errors).is_err());
    }

    #[test]
    fn declaration_list_mixes_at_rules() {
        let mut errors = Vec::new();
        let items = parse_declaration_list("color: red; @media screen { }", &mut errors);
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[1], DeclarationListItem::AtRule(_)));
    }

    #[test]
    fn component_value_number() {
        let mut errors = Vec::new();
        let value = parse_component_value("1", &mut errors).unwrap();
        assert!(matches!(value.as_token().map(|t| &t.kind), Some(TokenKind::Number(n, NumberKind::Integer)) if *n == 1.0));
    }

    #[test]
    fn component_value_rejects_extra_input() {
        let mut errors = Vec::new();
        assert!(parse_component_value("1 2", &mut errors).is_err());
    }

    #[test]
    fn rule_list_treats_cdo_as_start_of_a_qualified_rule_prelude_when_nested() {
        let mut errors = Vec::new();
        let rules = parse_rule_list("<!-- a {} -->", &mut errors);
        // CDO becomes part of the first rule's prelude instead of being
        // discarded (that only happens at the top level); the dangling CDC
        // afterwards starts a second prelude that never reaches `{` and is
        // dropped with a recoverable error.
        assert_eq!(rules.len(), 1);
        assert!(!errors.is_empty());
    }

    #[test]
    fn stylesheet_discards_cdo_cdc_at_top_level() {
        let mut errors = Vec::new();
        let sheet = parse_stylesheet("<!-- a {} -->", &mut errors);
        assert_eq!(sheet.rules.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn unterminated_qualified_rule_is_dropped_with_error() {
        let mut errors = Vec::new();
        let sheet = parse_stylesheet("a {", &mut errors);
        assert!(sheet.rules.is_empty());
        assert!(!errors.is_empty());
    }

    #[test]
    fn parse_at_rule_entry_point() {
        let mut errors = Vec::new();
        let at = parse_at_rule("@media screen { a { color: red; } }", &mut errors).unwrap();
        assert_eq!(at.name, "media");
        assert!(errors.is_empty());
    }

    #[test]
    fn parse_at_rule_rejects_non_at_keyword_start() {
        let mut errors = Vec::new();
        assert!(parse_at_rule("a { color: red; }", &mut errors).is_err());
    }
}
