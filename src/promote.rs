//! CSS stylesheet promoter (spec §3, §4.6): lifts each top-level bare
//! `QualifiedRule` into a `StyleRule` by re-entering its prelude through the
//! selectors parser and its block through the declaration-list consumer.
//!
//! Re-parsing creates bounded, synthetic-EOF-terminated token views over the
//! owning component-value vectors; the resulting selectors and declarations
//! are new nodes that do not alias the `Stylesheet` they were promoted from
//! (design note §9).

use crate::ast::{AtRule, ComponentValue, CssRule, CssStylesheet, QualifiedRule, Rule, StyleRule, Stylesheet};
use crate::errors::CssError;
use crate::location::Location;
use crate::selectors;
use crate::token::{Token, TokenKind};

/// `parse_css_stylesheet` (spec §4.3 entry-point table): `parse_stylesheet`
/// with bare qualified rules promoted to `StyleRule`.
#[must_use]
pub fn promote_stylesheet(sheet: Stylesheet, errors: &mut Vec<CssError>) -> CssStylesheet {
    let rules = sheet.rules.into_iter().map(|rule| promote_rule(rule, errors)).collect();
    CssStylesheet {
        rules,
        location: sheet.location,
    }
}

fn promote_rule(rule: Rule, errors: &mut Vec<CssError>) -> CssRule {
    match rule {
        Rule::At(at) => CssRule::At(at),
        Rule::Qualified(q) => CssRule::Style(promote_qualified_rule(q, errors)),
    }
}

/// Promotes one qualified rule. Also used recursively for the nested
/// `&`-prefixed rules `consume_style_block_contents` collects (spec §4.3,
/// SPEC_FULL "Supplemented features"): the nesting sigil `&` is a
/// promotion-level concern, not part of the Selectors-4 grammar, so it is
/// stripped here before the prelude is handed to the selectors parser.
fn promote_qualified_rule(q: QualifiedRule, errors: &mut Vec<CssError>) -> StyleRule {
    let mut prelude_tokens = component_values_to_tokens(&q.prelude, q.location.end);
    strip_leading_nesting_sigil(&mut prelude_tokens);

    let selectors = if is_empty_of_content(&prelude_tokens) {
        Vec::new()
    } else {
        match selectors::parse_selector_list(&prelude_tokens) {
            Ok(list) => list,
            Err(e) => {
                errors.push(CssError::at(e.message, e.location.unwrap_or(q.location)));
                Vec::new()
            }
        }
    };

    let block_tokens = component_values_to_tokens(&q.block.value, q.block.location.end);
    let (declarations, nested_rules) = crate::parser::consume_style_block_contents(&block_tokens, errors);

    let nested = nested_rules
        .into_iter()
        .map(|rule| match rule {
            Rule::Qualified(nested_q) => promote_qualified_rule(nested_q, errors),
            Rule::At(_) => unreachable!("consume_style_block_contents only nests qualified rules"),
        })
        .collect();

    StyleRule {
        selectors,
        declarations,
        nested,
        location: q.location,
    }
}

/// Whether `tokens` (already EOF-terminated) has nothing but whitespace,
/// comments, and the trailing synthetic EOF — the bare `& { ... }` case,
/// which refers to the parent selector and so promotes to no selectors of
/// its own rather than a parse error.
fn is_empty_of_content(tokens: &[Token]) -> bool {
    tokens
        .iter()
        .all(|t| t.is_whitespace_or_comment() || t.is_eof())
}

fn strip_leading_nesting_sigil(tokens: &mut Vec<Token>) {
    let mut i = 0;
    while matches!(tokens.get(i), Some(t) if t.is_whitespace_or_comment()) {
        i += 1;
    }
    if matches!(tokens.get(i), Some(t) if t.is_delim('&')) {
        tokens.remove(i);
    }
}

/// Flattens a component-value list back into its leading tokens, so a
/// prelude or block value can be re-entered by the selectors parser or the
/// grammar parser's bounded sub-parsers. Terminated by a synthetic EOF at
/// `eof_at`.
fn component_values_to_tokens(values: &[ComponentValue], eof_at: usize) -> Vec<Token> {
    let mut out = Vec::new();
    for value in values {
        flatten_component_value(value, &mut out);
    }
    out.push(Token::eof(eof_at));
    out
}

fn flatten_component_value(value: &ComponentValue, out: &mut Vec<Token>) {
    match value {
        ComponentValue::Token(t) => out.push(t.clone()),
        ComponentValue::Block(b) => {
            out.push(Token::new(b.opening.open_kind(), b.opening_location));
            for v in &b.value {
                flatten_component_value(v, out);
            }
            out.push(Token::new(b.opening.close_kind(), Location::at(b.location.end)));
        }
        ComponentValue::Function(f) => {
            out.push(Token::new(TokenKind::Function(f.name.clone()), f.name_location));
            for v in &f.value {
                flatten_component_value(v, out);
            }
            out.push(Token::new(TokenKind::CloseParen, Location::at(f.location.end)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DeclarationListItem;

    fn promote(src: &str) -> (CssStylesheet, Vec<CssError>) {
        let mut errors = Vec::new();
        let sheet = crate::parser::parse_stylesheet(src, &mut errors);
        (promote_stylesheet(sheet, &mut errors), errors)
    }

    #[test]
    fn promotes_qualified_rule_to_style_rule() {
        let (sheet, errors) = promote("* { hello: world; }");
        assert!(errors.is_empty());
        assert_eq!(sheet.rules.len(), 1);
        match &sheet.rules[0] {
            CssRule::Style(style) => {
                assert_eq!(style.selectors.len(), 1);
                assert_eq!(style.declarations.len(), 1);
                assert!(matches!(&style.declarations[0], DeclarationListItem::Declaration(d) if d.name == "hello"));
            }
            other => panic!("expected a style rule, got {other:?}"),
        }
    }

    #[test]
    fn at_rules_pass_through_unchanged() {
        let (sheet, _) = promote("@media (min-width: 10px) { a { b: c } }");
        assert_eq!(sheet.rules.len(), 1);
        assert!(matches!(&sheet.rules[0], CssRule::At(at) if at.name == "media"));
    }

    #[test]
    fn important_declaration_is_flagged() {
        let (sheet, _) = promote("a { x: 1 !important }");
        match &sheet.rules[0] {
            CssRule::Style(style) => match &style.declarations[0] {
                DeclarationListItem::Declaration(d) => assert!(d.important),
                other => panic!("expected a declaration, got {other:?}"),
            },
            other => panic!("expected a style rule, got {other:?}"),
        }
    }

    #[test]
    fn nested_ampersand_rule_becomes_a_nested_style_rule() {
        let (sheet, errors) = promote("a { color: red; &:hover { color: blue; } }");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        match &sheet.rules[0] {
            CssRule::Style(style) => {
                assert_eq!(style.declarations.len(), 1);
                assert_eq!(style.nested.len(), 1);
                assert_eq!(style.nested[0].selectors.len(), 1);
            }
            other => panic!("expected a style rule, got {other:?}"),
        }
    }

    #[test]
    fn bare_ampersand_nested_rule_has_no_selectors_of_its_own() {
        let (sheet, errors) = promote("a { & { color: blue; } }");
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        match &sheet.rules[0] {
            CssRule::Style(style) => {
                assert_eq!(style.nested.len(), 1);
                assert!(style.nested[0].selectors.is_empty());
            }
            other => panic!("expected a style rule, got {other:?}"),
        }
    }

    #[test]
    fn invalid_selector_prelude_is_recorded_as_an_error() {
        let (sheet, errors) = promote("1px { color: red; }");
        assert!(!errors.is_empty());
        match &sheet.rules[0] {
            CssRule::Style(style) => assert!(style.selectors.is_empty()),
            other => panic!("expected a style rule, got {other:?}"),
        }
    }
}
