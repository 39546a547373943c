use crate::pattern::Pattern;
use std::fmt;
use thiserror::Error;

/// An error raised while resolving or counting a pattern against a
/// [`crate::index::Graph`], per spec.md §7's error taxonomy.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IndexError {
    /// Transitive resolution was asked to close over all three positions
    /// unbound; unbounded transitive closure over all predicates is not
    /// supported (spec.md §4.3, `(?,?,?)`).
    #[error("transitive closure over a fully unbound pattern {pattern} is not supported")]
    UnboundClosure { pattern: DisplayPattern },
    /// A pattern's arity was not three, or a position held a value of an
    /// unsupported type.
    ///
    /// `Pattern`'s own shape (three fixed `Slot` fields) makes both of
    /// those states unrepresentable in this crate, so this variant is
    /// never constructed here; it exists for taxonomy completeness
    /// against spec.md §7 and for callers layering a less strictly typed
    /// pattern representation on top.
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),
    /// The three coordinated indexes (SPO/POS/OSP) were found out of sync
    /// during an operation. This should never happen; it indicates a bug.
    ///
    /// Never constructed here: `Graph`'s `add`/`delete` write to all three
    /// indexes in lockstep, so desync is unreachable through its public
    /// API. Kept so a caller's own invariant checks have somewhere to
    /// report into.
    #[error("internal index invariant violated: {0}")]
    InternalInvariant(String),
}

impl IndexError {
    pub fn unbound_closure(pattern: &Pattern) -> Self {
        Self::UnboundClosure {
            pattern: DisplayPattern::from(pattern),
        }
    }
}

/// A small owned snapshot of a [`Pattern`] suitable for embedding in an
/// error message (the pattern itself borrows, and errors must be `'static`).
#[derive(Debug)]
pub struct DisplayPattern(String);

impl From<&Pattern> for DisplayPattern {
    fn from(pattern: &Pattern) -> Self {
        Self(format!(
            "({}, {}, {})",
            pattern.subject().map_or_else(|| "?".to_owned(), ToString::to_string),
            pattern.predicate().map_or_else(|| "?".to_owned(), ToString::to_string),
            pattern.object().map_or_else(|| "?".to_owned(), ToString::to_string),
        ))
    }
}

impl fmt::Display for DisplayPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
