//! Small hand-rolled generators over ASCII CSS-like strings, asserting the
//! invariants from spec §8 always hold and the parser never fails
//! ungracefully. No property-testing crate is introduced (SPEC_FULL "Test
//! tooling") — these are a few dozen lines of plain Rust driven by a tiny
//! deterministic LCG, not a framework.

use css_syntax_core::ast::{AtRule, ComponentValue, CssRule, DeclarationListItem, SimpleBlock};
use css_syntax_core::parse;

/// A tiny deterministic linear congruential generator so the test is
/// reproducible without pulling in a `rand` dependency the core doesn't
/// otherwise need.
struct Lcg(u64);

impl Lcg {
    fn next_u32(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 32) as u32
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u32() as usize % items.len()]
    }

    fn range(&mut self, lo: usize, hi: usize) -> usize {
        lo + (self.next_u32() as usize % (hi - lo))
    }
}

const FRAGMENTS: &[&str] = &[
    "a", "b", ".c", "#d", "[e]", ":hover", "::before", ">", "+", "~", "||", " ", ",", "{", "}", "(", ")", "\"str\"",
    "1px", "1.5em", "--x", "url(foo)", "/* c */", "!important", ":", ";", "@media", "&", "*", "|", "url(\"q\")",
    "'unterminated", "\\", "U+1F600",
];

fn random_css(rng: &mut Lcg, len: usize) -> String {
    let mut out = String::new();
    for _ in 0..len {
        out.push_str(rng.choose(FRAGMENTS));
        if rng.next_u32() % 3 == 0 {
            out.push(' ');
        }
    }
    out
}

/// Invariant 1 (spec §8): every node's location is within `[0, len(src)]`
/// and `end >= start`.
fn assert_location_sane(start: usize, end: usize, len: usize) {
    assert!(start <= end, "location start {start} > end {end}");
    assert!(end <= len, "location end {end} exceeds source length {len}");
}

fn walk_component_value(cv: &ComponentValue, src: &str) {
    let loc = cv.location();
    assert_location_sane(loc.start, loc.end, src.len());
    match cv {
        ComponentValue::Token(_) => {}
        ComponentValue::Block(SimpleBlock { value, .. }) | ComponentValue::Function(css_syntax_core::ast::Function { value, .. }) => {
            for v in value {
                walk_component_value(v, src);
            }
        }
    }
}

fn walk_at_rule(at: &AtRule, src: &str) {
    assert_location_sane(at.location.start, at.location.end, src.len());
    for cv in &at.prelude {
        walk_component_value(cv, src);
    }
    if let Some(block) = &at.block {
        assert_location_sane(block.location.start, block.location.end, src.len());
        for cv in &block.value {
            walk_component_value(cv, src);
        }
    }
}

#[test]
fn stylesheet_parsing_never_panics_and_locations_stay_in_bounds() {
    let mut rng = Lcg(0xC55_5EED);
    for _ in 0..500 {
        let len = rng.range(0, 24);
        let src = random_css(&mut rng, len);

        let parsed = parse(&src);

        assert_location_sane(parsed.tree.location.start, parsed.tree.location.end, src.len());
        for rule in &parsed.tree.rules {
            match rule {
                CssRule::At(at) => walk_at_rule(at, &src),
                CssRule::Style(style) => {
                    assert_location_sane(style.location.start, style.location.end, src.len());
                    for item in &style.declarations {
                        match item {
                            DeclarationListItem::Declaration(d) => {
                                assert_location_sane(d.location.start, d.location.end, src.len());
                                for cv in &d.value {
                                    walk_component_value(cv, &src);
                                }
                            }
                            DeclarationListItem::AtRule(at) => walk_at_rule(at, &src),
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn declaration_value_substring_round_trips_through_the_source() {
    let mut rng = Lcg(42);
    for _ in 0..200 {
        let selector_like = *rng.choose(&["a", ".b", "#c", "div > p", "a:not(.x)"]);
        let value_like = *rng.choose(&["red", "1px", "\"q\"", "url(foo)", "1.5em", "var(--x)"]);
        let src = format!("{selector_like} {{ color: {value_like}; }}");
        let parsed = parse(&src);
        if !parsed.is_clean() {
            continue;
        }
        let CssRule::Style(style) = &parsed.tree.rules[0] else {
            continue;
        };
        let loc = style.location;
        assert_eq!(&src[loc.start..loc.end], src.trim());
    }
}

#[test]
fn preprocessing_is_idempotent() {
    use css_syntax_core::stream::preprocess;
    let samples = ["a\r\nb\rc\u{000C}d", "plain", "\0null", "mix\r\n\0\r"];
    for s in samples {
        let once: String = preprocess(s).into_iter().collect();
        let twice: String = preprocess(&once).into_iter().collect();
        assert_eq!(once, twice);
    }
}
