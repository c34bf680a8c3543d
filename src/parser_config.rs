//! Threaded through every entry point the way the teacher's own
//! `parser_config.rs` does: which grammar context to parse, where the
//! source starts (for re-entrant parses of an already-located substring)
//! and whether to short-circuit the best-effort recovery trace.

use crate::location::Location;

/// Which of the grammar parser's entry productions to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Context {
    #[default]
    Stylesheet,
    Rule,
    AtRule,
    Declaration,
}

/// Configuration threaded through the parser entry points.
#[derive(Clone, Debug, Default)]
pub struct ParserConfig {
    /// Which grammar production to parse as.
    pub context: Context,
    /// Where the source text starts, for re-entrant parses of a substring
    /// that is itself located inside a larger document.
    pub location: Location,
    /// Optional source name (filename/url) carried into diagnostics.
    pub source: Option<String>,
    /// When set, skips the best-effort recovery trace logging; the
    /// `errors` vector is still populated either way.
    pub ignore_errors: bool,
}
