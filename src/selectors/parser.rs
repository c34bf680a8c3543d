//! Level-4 selectors grammar (spec §4.5): hand-written recursive descent
//! with transactional backtracking over a `TokenCursor`.
//!
//! Every optional production is wrapped in `TokenCursor::maybe`, which
//! commits forward on success and restores the cursor on a `MissingToken`
//! signal — never copies tokens, only moves the cursor's integer position
//! (design note §9).

use crate::errors::{MissingToken, ParseError, SelectorResult};
use crate::location::Location;
use crate::selectors::cursor::TokenCursor;
use crate::selectors::*;
use crate::token::{Token, TokenKind};

/// `<selector-list> = <complex-selector> ( , <complex-selector> )*`
/// (spec §4.5). Hard-fail entry: errors if the tokens don't fully parse as
/// a selector list.
pub fn parse_selector_list(tokens: &[Token]) -> Result<Vec<Selector>, ParseError> {
    let mut cursor = TokenCursor::new(tokens);
    cursor.skip_whitespace_comments();
    let list = selector_list_core(&mut cursor).map_err(|_| {
        ParseError::at("expected a selector list", cursor.current_location())
    })?;
    cursor.skip_whitespace_comments();
    if !cursor.eof() {
        return Err(ParseError::at(
            "unexpected trailing input after selector list",
            cursor.current_location(),
        ));
    }
    Ok(list)
}

/// `<relative-selector-list>`: each item optionally starts with an
/// explicit combinator (used for `:has()`'s argument, spec §4.5).
pub fn parse_relative_selector_list(tokens: &[Token]) -> Result<Vec<Selector>, ParseError> {
    let mut cursor = TokenCursor::new(tokens);
    cursor.skip_whitespace_comments();
    let list = relative_selector_list_core(&mut cursor).map_err(|_| {
        ParseError::at("expected a relative selector list", cursor.current_location())
    })?;
    cursor.skip_whitespace_comments();
    if !cursor.eof() {
        return Err(ParseError::at(
            "unexpected trailing input after selector list",
            cursor.current_location(),
        ));
    }
    Ok(list)
}

fn selector_list_core(cur: &mut TokenCursor) -> SelectorResult<Vec<Selector>> {
    let mut out = vec![parse_complex_selector(cur)?];
    loop {
        cur.skip_whitespace_comments();
        if !matches!(cur.peek(0).kind, TokenKind::Comma) {
            break;
        }
        cur.next();
        cur.skip_whitespace_comments();
        out.push(parse_complex_selector(cur)?);
    }
    Ok(out)
}

fn relative_selector_list_core(cur: &mut TokenCursor) -> SelectorResult<Vec<Selector>> {
    let mut out = vec![parse_relative_selector(cur)?];
    loop {
        cur.skip_whitespace_comments();
        if !matches!(cur.peek(0).kind, TokenKind::Comma) {
            break;
        }
        cur.next();
        cur.skip_whitespace_comments();
        out.push(parse_relative_selector(cur)?);
    }
    Ok(out)
}

fn parse_relative_selector(cur: &mut TokenCursor) -> SelectorResult<Selector> {
    let start = cur.current_location();
    let combinator = leading_combinator(cur);
    let complex = parse_complex_selector(cur)?;
    let complex = match complex {
        Selector::Complex(c) => c,
        other => ComplexSelector {
            location: other.location(),
            children: vec![other],
        },
    };
    let loc = combinator.as_ref().map_or(complex.location, |c| start.cover(&complex.location).cover(&c.location()));
    Ok(Selector::Relative(RelativeSelector {
        combinator,
        complex,
        location: loc,
    }))
}

/// An explicit leading combinator on a relative selector, e.g. `:has(> a)`.
fn leading_combinator(cur: &mut TokenCursor) -> Option<Combinator> {
    cur.skip_whitespace_comments();
    if cur.peek(0).is_delim('>') {
        let l = cur.peek(0).location;
        cur.next();
        cur.skip_whitespace_comments();
        return Some(Combinator::Child(l));
    }
    if cur.peek(0).is_delim('+') {
        let l = cur.peek(0).location;
        cur.next();
        cur.skip_whitespace_comments();
        return Some(Combinator::NextSibling(l));
    }
    if cur.peek(0).is_delim('~') {
        let l = cur.peek(0).location;
        cur.next();
        cur.skip_whitespace_comments();
        return Some(Combinator::SubsequentSibling(l));
    }
    if cur.peek(0).is_delim('|') && cur.peek(1).is_delim('|') {
        let s = cur.peek(0).location;
        cur.next();
        let e = cur.peek(0).location;
        cur.next();
        cur.skip_whitespace_comments();
        return Some(Combinator::Column(s.cover(&e)));
    }
    None
}

/// `<complex-selector> = <compound-selector> ( <combinator>? <compound-selector> )*`
fn parse_complex_selector(cur: &mut TokenCursor) -> SelectorResult<Selector> {
    let first = parse_compound_selector(cur)?;
    let mut children = vec![first];

    loop {
        match cur.maybe(try_combinator_and_compound) {
            Ok((combinator, compound)) => {
                children.push(Selector::Combinator(combinator));
                children.push(compound);
            }
            Err(_) => break,
        }
    }

    if children.len() == 1 {
        return Ok(children.pop().expect("just checked len == 1"));
    }

    let location = Location::cover_all(children.iter(), |s| s.location()).expect("non-empty");
    Ok(Selector::Complex(ComplexSelector { children, location }))
}

/// Combinator + the compound selector it introduces, committed atomically:
/// on failure to find a following compound, the cursor rewinds past any
/// whitespace this production speculatively skipped (design note §9).
fn try_combinator_and_compound(cur: &mut TokenCursor) -> SelectorResult<(Combinator, Selector)> {
    let ws_start = cur.current_location().start;
    let had_ws = cur.skip_whitespace_comments();
    let ws_end = cur.current_location().start;

    let combinator = if cur.peek(0).is_delim('>') {
        let l = cur.peek(0).location;
        cur.next();
        Some(Combinator::Child(l))
    } else if cur.peek(0).is_delim('+') {
        let l = cur.peek(0).location;
        cur.next();
        Some(Combinator::NextSibling(l))
    } else if cur.peek(0).is_delim('~') {
        let l = cur.peek(0).location;
        cur.next();
        Some(Combinator::SubsequentSibling(l))
    } else if cur.peek(0).is_delim('|') && cur.peek(1).is_delim('|') {
        let s = cur.peek(0).location;
        cur.next();
        let e = cur.peek(0).location;
        cur.next();
        Some(Combinator::Column(s.cover(&e)))
    } else if had_ws {
        Some(Combinator::Descendant(Location::new(ws_start, ws_end)))
    } else {
        None
    };

    let Some(combinator) = combinator else {
        return Err(MissingToken);
    };

    cur.skip_whitespace_comments();
    let compound = parse_compound_selector(cur)?;
    Ok((combinator, compound))
}

/// `<compound-selector> = <type-selector>? <subclass-selector>*
///   ( <pseudo-element-selector> <pseudo-class-selector>* )*`
///
/// A compound selector always holds at least two concrete pieces; a single
/// piece collapses to that piece directly instead of a one-element
/// `CompoundSelector` wrapper (spec §3 invariant).
fn parse_compound_selector(cur: &mut TokenCursor) -> SelectorResult<Selector> {
    let start = cur.current_location();
    let mut locs = Vec::new();

    let type_selector = cur.maybe(parse_type_selector).ok();
    if let Some(t) = &type_selector {
        locs.push(t.location());
    }

    let mut subclasses = Vec::new();
    while let Ok(s) = cur.maybe(parse_subclass_selector) {
        locs.push(s.location());
        subclasses.push(s);
    }

    let mut pseudo_elements = Vec::new();
    while let Ok(pe) = cur.maybe(parse_pseudo_element_selector) {
        locs.push(pe.location);
        let mut trailing = Vec::new();
        while let Ok(pc) = cur.maybe(parse_pseudo_class_selector) {
            locs.push(pc.location());
            trailing.push(pc);
        }
        pseudo_elements.push((pe, trailing));
    }

    if type_selector.is_none() && subclasses.is_empty() && pseudo_elements.is_empty() {
        return Err(MissingToken);
    }

    let piece_count = usize::from(type_selector.is_some())
        + subclasses.len()
        + pseudo_elements.iter().map(|(_, trailing)| 1 + trailing.len()).sum::<usize>();

    if piece_count == 1 {
        if let Some(t) = type_selector {
            return Ok(Selector::Type(t));
        }
        if let Some(s) = subclasses.into_iter().next() {
            return Ok(subclass_to_selector(s));
        }
        let (pe, _trailing) = pseudo_elements.into_iter().next().expect("piece_count == 1");
        return Ok(Selector::PseudoElement(pe));
    }

    let location = locs.into_iter().reduce(|a, b| a.cover(&b)).unwrap_or(start);

    Ok(Selector::Compound(CompoundSelector {
        type_selector,
        subclasses,
        pseudo_elements,
        location,
    }))
}

fn subclass_to_selector(s: Subclass) -> Selector {
    match s {
        Subclass::Id(i) => Selector::Id(i),
        Subclass::Class(c) => Selector::Class(c),
        Subclass::Attribute(a) => Selector::Attribute(a),
        Subclass::PseudoClass(pc) => Selector::PseudoClass(pc),
    }
}

fn parse_subclass_selector(cur: &mut TokenCursor) -> SelectorResult<Subclass> {
    if let Ok(id) = cur.maybe(parse_id_selector) {
        return Ok(Subclass::Id(id));
    }
    if let Ok(class) = cur.maybe(parse_class_selector) {
        return Ok(Subclass::Class(class));
    }
    if let Ok(attr) = cur.maybe(parse_attribute_selector) {
        return Ok(Subclass::Attribute(attr));
    }
    if let Ok(pc) = cur.maybe(parse_pseudo_class_selector) {
        return Ok(Subclass::PseudoClass(pc));
    }
    Err(MissingToken)
}

fn parse_id_selector(cur: &mut TokenCursor) -> SelectorResult<IdSelector> {
    match cur.peek(0).kind.clone() {
        TokenKind::Hash(value, _kind) => {
            let loc = cur.peek(0).location;
            cur.next();
            Ok(IdSelector { value, location: loc })
        }
        _ => Err(MissingToken),
    }
}

fn parse_class_selector(cur: &mut TokenCursor) -> SelectorResult<ClassSelector> {
    let start = cur.current_location();
    cur.expect_delim('.')?;
    match cur.peek(0).kind.clone() {
        TokenKind::Ident(value) => {
            let end = cur.peek(0).location;
            cur.next();
            Ok(ClassSelector {
                value,
                location: start.cover(&end),
            })
        }
        _ => Err(MissingToken),
    }
}

/// `ns-prefix = (ident | '*')? '|'`, careful not to consume the first half
/// of a `||` column combinator.
fn parse_ns_prefix(cur: &mut TokenCursor) -> SelectorResult<NsPrefix> {
    let leading = match cur.peek(0).kind.clone() {
        TokenKind::Ident(name) => {
            let loc = cur.peek(0).location;
            cur.next();
            Some((Some(name), loc))
        }
        TokenKind::Delim('*') => {
            let loc = cur.peek(0).location;
            cur.next();
            Some((None, loc))
        }
        _ => None,
    };

    if !cur.peek(0).is_delim('|') || cur.peek(1).is_delim('|') {
        return Err(MissingToken);
    }
    let pipe_loc = cur.peek(0).location;
    cur.next();

    match leading {
        Some((Some(name), loc)) => Ok(NsPrefix::Named(Ident {
            value: name,
            location: loc,
        })),
        Some((None, loc)) => Ok(NsPrefix::Any(loc.cover(&pipe_loc))),
        None => Ok(NsPrefix::Empty(pipe_loc)),
    }
}

fn parse_wq_name(cur: &mut TokenCursor) -> SelectorResult<WqName> {
    let prefix = cur.maybe(parse_ns_prefix).ok();

    match cur.peek(0).kind.clone() {
        TokenKind::Ident(name) => {
            let ident_loc = cur.peek(0).location;
            cur.next();
            let location = prefix.as_ref().map_or(ident_loc, |p| p.location().cover(&ident_loc));
            Ok(WqName {
                prefix,
                name: Ident {
                    value: name,
                    location: ident_loc,
                },
                location,
            })
        }
        _ => Err(MissingToken),
    }
}

fn parse_type_selector(cur: &mut TokenCursor) -> SelectorResult<TypeSelector> {
    if let Ok(wq) = cur.maybe(parse_wq_name) {
        return Ok(TypeSelector::Named(wq));
    }

    cur.maybe(|c| {
        let prefix = c.maybe(parse_ns_prefix).ok();
        if c.peek(0).is_delim('*') {
            let star_loc = c.peek(0).location;
            c.next();
            let location = prefix.as_ref().map_or(star_loc, |p| p.location().cover(&star_loc));
            Ok(TypeSelector::Universal { prefix, location })
        } else {
            Err(MissingToken)
        }
    })
}

fn parse_attr_matcher_op(cur: &mut TokenCursor) -> SelectorResult<AttrMatcherOp> {
    match cur.peek(0).kind.clone() {
        TokenKind::Delim('=') => {
            cur.next();
            Ok(AttrMatcherOp::Equals)
        }
        TokenKind::Delim(ch @ ('~' | '|' | '^' | '$' | '*')) => {
            cur.next();
            cur.expect_delim('=')?;
            Ok(match ch {
                '~' => AttrMatcherOp::Includes,
                '|' => AttrMatcherOp::DashMatch,
                '^' => AttrMatcherOp::PrefixMatch,
                '$' => AttrMatcherOp::SuffixMatch,
                '*' => AttrMatcherOp::SubstringMatch,
                _ => unreachable!(),
            })
        }
        _ => Err(MissingToken),
    }
}

fn parse_attribute_selector(cur: &mut TokenCursor) -> SelectorResult<AttributeSelector> {
    let start = cur.current_location();
    cur.expect_kind(&TokenKind::OpenSquare)?;
    cur.skip_whitespace_comments();

    let name = parse_wq_name(cur)?;
    cur.skip_whitespace_comments();

    let mut matcher = None;
    if !matches!(cur.peek(0).kind, TokenKind::CloseSquare) {
        let op = parse_attr_matcher_op(cur)?;
        cur.skip_whitespace_comments();

        let value = match cur.peek(0).kind.clone() {
            TokenKind::String(s) => {
                cur.next();
                AttrValue::String(s)
            }
            TokenKind::Ident(s) => {
                cur.next();
                AttrValue::Ident(s)
            }
            _ => return Err(MissingToken),
        };
        cur.skip_whitespace_comments();

        let modifier = match cur.peek(0).kind.clone() {
            TokenKind::Ident(m) if m.eq_ignore_ascii_case("i") => {
                cur.next();
                Some(AttrModifier::IgnoreCase)
            }
            TokenKind::Ident(m) if m.eq_ignore_ascii_case("s") => {
                cur.next();
                Some(AttrModifier::CaseSensitive)
            }
            _ => None,
        };
        if modifier.is_some() {
            cur.skip_whitespace_comments();
        }

        matcher = Some(AttrMatcher { op, value, modifier });
    }

    if !matches!(cur.peek(0).kind, TokenKind::CloseSquare) {
        return Err(MissingToken);
    }
    let end = cur.peek(0).location;
    cur.next();

    Ok(AttributeSelector {
        name,
        matcher,
        location: start.cover(&end),
    })
}

/// The `<ident> | <function-token> <any-value> ')'` body shared by
/// pseudo-class and pseudo-element selectors (spec §4.5).
fn parse_pseudo_class_body(cur: &mut TokenCursor) -> SelectorResult<PseudoClassSelector> {
    match cur.peek(0).kind.clone() {
        TokenKind::Ident(name) => {
            let loc = cur.peek(0).location;
            cur.next();
            Ok(PseudoClassSelector::Ident(Ident { value: name, location: loc }))
        }
        TokenKind::Function(name) => {
            let func_loc = cur.peek(0).location;
            cur.next();
            let arguments = pseudo_function_arguments(cur, &name);
            if !matches!(cur.peek(0).kind, TokenKind::CloseParen) {
                return Err(MissingToken);
            }
            let close_loc = cur.peek(0).location;
            cur.next();
            Ok(PseudoClassSelector::Function(Box::new(PseudoClassFunction {
                name,
                arguments,
                location: func_loc.cover(&close_loc),
            })))
        }
        _ => Err(MissingToken),
    }
}

fn parse_pseudo_class_selector(cur: &mut TokenCursor) -> SelectorResult<PseudoClassSelector> {
    if !matches!(cur.peek(0).kind, TokenKind::Colon) || cur.peek(1).kind == TokenKind::Colon {
        return Err(MissingToken);
    }
    cur.next();
    parse_pseudo_class_body(cur)
}

fn parse_pseudo_element_selector(cur: &mut TokenCursor) -> SelectorResult<PseudoElementSelector> {
    if !matches!(cur.peek(0).kind, TokenKind::Colon) || cur.peek(1).kind != TokenKind::Colon {
        return Err(MissingToken);
    }
    let start = cur.peek(0).location;
    cur.next();
    cur.next();
    let body = parse_pseudo_class_body(cur)?;
    let location = start.cover(&body.location());
    Ok(PseudoElementSelector { value: body, location })
}

/// `:has()` takes a relative selector list; everything else that looks
/// like a selector list (`:not()`, `:is()`, `:where()`, vendor `:-moz-any()`
/// / `:-webkit-any()`, and permissively any other function) is parsed as
/// one. When the argument list does not parse as a (relative) selector
/// list at all — `:nth-child(2n+1)` and friends — it is kept as opaque
/// component values instead of hard-failing the whole compound selector
/// (spec's supplemented-features note: no bespoke `An+B` grammar).
fn pseudo_function_arguments(cur: &mut TokenCursor, name: &str) -> PseudoClassArguments {
    let is_has = name.eq_ignore_ascii_case("has");
    let attempt = cur.maybe(|c| {
        let list = if is_has { relative_selector_list_core(c)? } else { selector_list_core(c)? };
        c.skip_whitespace_comments();
        if matches!(c.peek(0).kind, TokenKind::CloseParen) {
            Ok(list)
        } else {
            Err(MissingToken)
        }
    });

    match attempt {
        Ok(list) => PseudoClassArguments::Selectors(list),
        Err(_) => PseudoClassArguments::Raw(raw_until_close_paren(cur)),
    }
}

/// Collects the component values up to (not including) the matching `)` for
/// a pseudo-class function whose argument list did not parse as a selector
/// list, tracking paren nesting depth so an inner `(...)` isn't mistaken
/// for our own closer.
fn raw_until_close_paren(cur: &mut TokenCursor) -> Vec<crate::ast::ComponentValue> {
    use crate::ast::ComponentValue;

    let mut depth = 0i32;
    let mut out = Vec::new();
    loop {
        match &cur.peek(0).kind {
            TokenKind::Eof => break,
            TokenKind::CloseParen if depth == 0 => break,
            TokenKind::CloseParen => {
                depth -= 1;
                out.push(ComponentValue::Token(cur.next()));
            }
            TokenKind::OpenParen | TokenKind::Function(_) => {
                depth += 1;
                out.push(ComponentValue::Token(cur.next()));
            }
            _ => out.push(ComponentValue::Token(cur.next())),
        }
    }
    out
}
