//! Crate-level integration tests exercising the public `parse`/entry-point
//! surface end to end (SPEC_FULL "Test tooling"), covering the concrete
//! scenarios from spec §8.

use css_syntax_core::ast::{ComponentValue, CssRule, DeclarationListItem};
use css_syntax_core::parser;
use css_syntax_core::selectors::{Selector, Subclass, TypeSelector};
use css_syntax_core::token::{NumberKind, TokenKind};
use css_syntax_core::{parse, Css3};

#[test]
fn scenario_1_universal_selector_and_declaration() {
    let parsed = parse("* { hello: world; }");
    assert!(parsed.is_clean());
    assert_eq!(parsed.tree.rules.len(), 1);
    let CssRule::Style(style) = &parsed.tree.rules[0] else {
        panic!("expected a style rule");
    };
    assert_eq!(style.selectors.len(), 1);
    assert!(matches!(&style.selectors[0], Selector::Type(TypeSelector::Universal { .. })));
    let DeclarationListItem::Declaration(decl) = &style.declarations[0] else {
        panic!("expected a declaration");
    };
    assert_eq!(decl.name, "hello");
    assert!(!decl.important);
    assert!(matches!(
        decl.value.as_slice(),
        [ComponentValue::Token(t)] if matches!(&t.kind, TokenKind::Ident(s) if s == "world")
    ));
}

#[test]
fn scenario_2_important_declaration_with_leading_comment() {
    let parsed = parse("/* c */ a { x:1!important }");
    assert_eq!(parsed.tree.rules.len(), 1);
    let CssRule::Style(style) = &parsed.tree.rules[0] else {
        panic!("expected a style rule");
    };
    let DeclarationListItem::Declaration(decl) = &style.declarations[0] else {
        panic!("expected a declaration");
    };
    assert!(decl.important);
    assert!(matches!(
        decl.value.as_slice(),
        [ComponentValue::Token(t)] if matches!(&t.kind, TokenKind::Number(v, NumberKind::Integer) if *v == 1.0)
    ));
}

#[test]
fn scenario_3_media_at_rule_with_simple_block_prelude() {
    let parsed = parse("@media (min-width: 10px) { a { b: c } }");
    assert_eq!(parsed.tree.rules.len(), 1);
    let CssRule::At(at) = &parsed.tree.rules[0] else {
        panic!("expected an at-rule");
    };
    assert_eq!(at.name, "media");
    assert!(at.block.is_some());
    assert!(matches!(at.prelude.as_slice(), [ComponentValue::Block(b)] if b.opening == css_syntax_core::ast::BlockOpening::Paren));
}

#[test]
fn scenario_4_not_function_pseudo_class_with_two_arguments() {
    let parsed = parse("a:not(.x, b) {}");
    assert!(parsed.is_clean());
    let CssRule::Style(style) = &parsed.tree.rules[0] else {
        panic!("expected a style rule");
    };
    let Selector::Compound(compound) = &style.selectors[0] else {
        panic!("expected a compound selector");
    };
    let Subclass::PseudoClass(css_syntax_core::selectors::PseudoClassSelector::Function(f)) = &compound.subclasses[0]
    else {
        panic!("expected a pseudo-class function");
    };
    assert_eq!(f.name, "not");
    let css_syntax_core::selectors::PseudoClassArguments::Selectors(args) = &f.arguments else {
        panic!("expected selector-list arguments");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(&args[0], Selector::Class(c) if c.value == "x"));
    assert!(matches!(&args[1], Selector::Type(TypeSelector::Named(wq)) if wq.name.value == "b"));
}

#[test]
fn scenario_5_unicode_range_component_value() {
    let mut errors = Vec::new();
    let value = parser::parse_component_value("U+1F??-2FFF", &mut errors).unwrap();
    let ComponentValue::Token(t) = value else {
        panic!("expected a token component value");
    };
    assert_eq!(t.kind, TokenKind::UnicodeRange(0x1F00, 0x2FFF));
}

#[test]
fn scenario_6_unterminated_string_recovers_with_one_error() {
    let parsed = parse("'unterminated");
    assert_eq!(parsed.errors.len(), 1);
    assert!(parsed.errors[0].message.contains("unterminated string"));
}

#[test]
fn scenario_7_complex_selector_with_all_five_combinators() {
    let mut errors = Vec::new();
    let tokens = css_syntax_core::tokenizer::tokenize("a > b + c ~ d || e f", &mut errors);
    let list = css_syntax_core::selectors::parse_selector_list(&tokens).unwrap();
    assert_eq!(list.len(), 1);
    let Selector::Complex(complex) = &list[0] else {
        panic!("expected a complex selector");
    };
    assert_eq!(complex.children.len(), 11);
    use css_syntax_core::selectors::Combinator;
    let combinators: Vec<&Selector> = complex.children.iter().skip(1).step_by(2).collect();
    assert!(matches!(combinators[0], Selector::Combinator(Combinator::Child(_))));
    assert!(matches!(combinators[1], Selector::Combinator(Combinator::NextSibling(_))));
    assert!(matches!(combinators[2], Selector::Combinator(Combinator::SubsequentSibling(_))));
    assert!(matches!(combinators[3], Selector::Combinator(Combinator::Column(_))));
    assert!(matches!(combinators[4], Selector::Combinator(Combinator::Descendant(_))));
}

#[test]
fn css3_facade_parse_matches_free_function() {
    let a = parse("a { color: red; }");
    let b = Css3::parse("a { color: red; }");
    assert_eq!(a.tree, b.tree);
}

#[test]
fn parse_rule_list_and_parse_rule_entry_points() {
    let mut errors = Vec::new();
    let rules = parser::parse_rule_list("a {} b {}", &mut errors);
    assert_eq!(rules.len(), 2);

    let mut errors = Vec::new();
    assert!(parser::parse_rule("a {} b {}", &mut errors).is_err());
    let rule = parser::parse_rule("a { color: red; }", &mut errors).unwrap();
    assert!(matches!(rule, css_syntax_core::ast::Rule::Qualified(_)));
}

#[test]
fn every_node_location_covers_the_original_substring() {
    let src = "a.b#c[d=\"e\"] { color: red !important; }";
    let parsed = parse(src);
    assert!(parsed.is_clean());
    let CssRule::Style(style) = &parsed.tree.rules[0] else {
        panic!("expected a style rule");
    };
    let loc = style.location;
    assert_eq!(&src[loc.start..loc.end], src);
}
