//! Selector tree node types (spec §3, §4.5): the Level-4 selectors grammar
//! the selectors parser (`parser.rs`) produces by re-entering a qualified
//! rule's prelude token list.

mod cursor;
pub mod parser;

pub use cursor::TokenCursor;
pub use parser::{parse_relative_selector_list, parse_selector_list};

use crate::location::Location;

#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub value: String,
    pub location: Location,
}

/// `ns|` or `*|` namespace prefix on a qualified name (spec §3 `NsPrefix`).
#[derive(Clone, Debug, PartialEq)]
pub enum NsPrefix {
    Named(Ident),
    Any(Location),
    Empty(Location),
}

impl NsPrefix {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            NsPrefix::Named(i) => i.location,
            NsPrefix::Any(l) | NsPrefix::Empty(l) => *l,
        }
    }
}

/// An optionally namespace-qualified name (spec §3 `WqName`).
#[derive(Clone, Debug, PartialEq)]
pub struct WqName {
    pub prefix: Option<NsPrefix>,
    pub name: Ident,
    pub location: Location,
}

/// `TypeSelector` is either a qualified name or the universal `*`
/// (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSelector {
    Named(WqName),
    Universal {
        prefix: Option<NsPrefix>,
        location: Location,
    },
}

impl TypeSelector {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            TypeSelector::Named(wq) => wq.location,
            TypeSelector::Universal { location, .. } => *location,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdSelector {
    pub value: String,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassSelector {
    pub value: String,
    pub location: Location,
}

/// `[~|^$*]?=` attribute value matcher (spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrMatcherOp {
    Equals,
    Includes,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
}

impl AttrMatcherOp {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AttrMatcherOp::Equals => "=",
            AttrMatcherOp::Includes => "~=",
            AttrMatcherOp::DashMatch => "|=",
            AttrMatcherOp::PrefixMatch => "^=",
            AttrMatcherOp::SuffixMatch => "$=",
            AttrMatcherOp::SubstringMatch => "*=",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrModifier {
    IgnoreCase,
    CaseSensitive,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    String(String),
    Ident(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttrMatcher {
    pub op: AttrMatcherOp,
    pub value: AttrValue,
    pub modifier: Option<AttrModifier>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSelector {
    pub name: WqName,
    pub matcher: Option<AttrMatcher>,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PseudoClassSelector {
    Ident(Ident),
    Function(Box<PseudoClassFunction>),
}

impl PseudoClassSelector {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            PseudoClassSelector::Ident(i) => i.location,
            PseudoClassSelector::Function(f) => f.location,
        }
    }
}

/// A pseudo-class function's argument list: re-entered through the
/// selectors parser when it parses as one (`:not()`, `:is()`, `:where()`,
/// `:has()`, vendor `:-webkit-any()`); otherwise kept as the opaque
/// component values it actually is (e.g. `:nth-child(2n+1)`'s `An+B`
/// microsyntax, which this grammar does not parse structurally — spec.md's
/// `<pseudo-class>` production only names `<ident>` and `<function-token>
/// <any-value> ')'`, see SPEC_FULL "Supplemented features").
#[derive(Clone, Debug, PartialEq)]
pub enum PseudoClassArguments {
    Selectors(Vec<Selector>),
    Raw(Vec<crate::ast::ComponentValue>),
}

/// `:name(<selector-list>)` and friends; the argument list is recursively
/// re-entered through the selectors parser (spec §4.5).
#[derive(Clone, Debug, PartialEq)]
pub struct PseudoClassFunction {
    pub name: String,
    pub arguments: PseudoClassArguments,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PseudoElementSelector {
    pub value: PseudoClassSelector,
    pub location: Location,
}

/// A subclass selector: one id/class/attribute/pseudo-class piece of a
/// compound selector (spec §3, GLOSSARY).
#[derive(Clone, Debug, PartialEq)]
pub enum Subclass {
    Id(IdSelector),
    Class(ClassSelector),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClassSelector),
}

impl Subclass {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Subclass::Id(s) => s.location,
            Subclass::Class(s) => s.location,
            Subclass::Attribute(s) => s.location,
            Subclass::PseudoClass(s) => s.location(),
        }
    }
}

/// One type selector, zero or more subclass selectors, and zero or more
/// pseudo-element groups each with their trailing pseudo-classes, with no
/// inter-whitespace (spec §3, GLOSSARY).
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundSelector {
    pub type_selector: Option<TypeSelector>,
    pub subclasses: Vec<Subclass>,
    pub pseudo_elements: Vec<(PseudoElementSelector, Vec<PseudoClassSelector>)>,
    pub location: Location,
}

/// The five combinator kinds (spec §3, design note §9): whitespace is
/// promoted to an explicit `Descendant` combinator rather than being
/// implicit, so a formatter can reproduce canonical whitespace.
#[derive(Clone, Debug, PartialEq)]
pub enum Combinator {
    Descendant(Location),
    Child(Location),
    NextSibling(Location),
    SubsequentSibling(Location),
    Column(Location),
}

impl Combinator {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Combinator::Descendant(l)
            | Combinator::Child(l)
            | Combinator::NextSibling(l)
            | Combinator::SubsequentSibling(l)
            | Combinator::Column(l) => *l,
        }
    }
}

/// A sequence of compound selectors joined by combinators. Always contains
/// at least one combinator; a single compound collapses to that compound
/// (or piece) selector directly instead (spec §3 invariant).
#[derive(Clone, Debug, PartialEq)]
pub struct ComplexSelector {
    /// Alternating compound/combinator, starting and ending on a compound:
    /// `[compound, combinator, compound, ...]`.
    pub children: Vec<Selector>,
    pub location: Location,
}

/// `<combinator>? <complex-selector>`, used as a pseudo-class function
/// argument in relative contexts (e.g. `:has()`).
#[derive(Clone, Debug, PartialEq)]
pub struct RelativeSelector {
    pub combinator: Option<Combinator>,
    pub complex: ComplexSelector,
    pub location: Location,
}

/// A compound selector collapses to its single piece directly when it holds
/// exactly one concrete piece (spec §3 invariant): the bare type selector,
/// subclass selector, or pseudo-element, rather than a one-element
/// `CompoundSelector` wrapper.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    Compound(CompoundSelector),
    Type(TypeSelector),
    Id(IdSelector),
    Class(ClassSelector),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClassSelector),
    PseudoElement(PseudoElementSelector),
    Complex(ComplexSelector),
    Combinator(Combinator),
    Relative(RelativeSelector),
}

impl Selector {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Selector::Compound(c) => c.location,
            Selector::Type(t) => t.location(),
            Selector::Id(i) => i.location,
            Selector::Class(c) => c.location,
            Selector::Attribute(a) => a.location,
            Selector::PseudoClass(p) => p.location(),
            Selector::PseudoElement(p) => p.location,
            Selector::Complex(c) => c.location,
            Selector::Combinator(c) => c.location(),
            Selector::Relative(r) => r.location,
        }
    }
}
