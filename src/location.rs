use std::fmt;
use std::fmt::{Debug, Formatter};

/// A half-open byte range `[start, end)` into the original, pre-processed source.
///
/// `start == end` is valid and denotes a zero-width location (the synthetic EOF
/// token, an empty simple block, etc).
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub start: usize,
    pub end: usize,
}

impl Location {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width location at `pos`.
    #[must_use]
    pub fn at(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// The smallest location covering both `self` and `other`.
    #[must_use]
    pub fn cover(&self, other: &Location) -> Location {
        Location {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The smallest location covering an entire slice of located nodes.
    pub fn cover_all<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>, loc: impl Fn(&'a T) -> Location) -> Option<Location> {
        items
            .into_iter()
            .map(loc)
            .reduce(|acc, next| acc.cover(&next))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
