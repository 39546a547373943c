//! An in-memory, immutable triple-index engine: coordinated SPO/POS/OSP
//! indexes over `(subject, predicate, object)` triples, pattern resolution
//! across all eight bound/unbound shapes, atomic multi-triple transactions
//! with datom diffs, and transitive closure over tagged predicates (`p*`,
//! `p+`).
//!
//! Every [`index::Graph`] value is immutable: [`index::Graph::add`] and
//! [`index::Graph::delete`] return a new value that structurally shares
//! untouched subtrees with the original, and return the *same* value
//! (observable via [`index::Graph::ptr_eq`]) when the write is a no-op.
//! [`transact`] builds on this to report exactly which assertions and
//! retractions actually changed anything.
//!
//! ```
//! use oxindex::{transact, Graph, Node, Pattern, Predicate, Slot, Triple};
//!
//! let graph = Graph::empty();
//! let result = transact(
//!     &graph,
//!     vec![Triple::new(Node::iri("a"), Predicate::new("knows"), Node::iri("b"))],
//!     Vec::new(),
//!     1,
//! );
//! assert_eq!(result.asserted.len(), 1);
//!
//! let pattern = Pattern::new(Slot::Bound(Node::iri("a")), Slot::Bound(Predicate::new("knows")), Slot::Var);
//! assert_eq!(result.graph.resolve(&pattern).len(), 1);
//! ```

mod error;
mod index;
mod node;
mod pattern;
mod transact;
mod transitive;
mod triple;

pub use error::{DisplayPattern, IndexError};
pub use index::{from_triples, Graph};
pub use node::{Node, Predicate, TransitiveTag};
pub use pattern::{Binding, BindingValue, Pattern, PatternShape, Slot};
pub use transact::{transact, TransactResult};
pub use transitive::{resolve_transitive, TransitiveResolver};
pub use triple::{Datom, Triple};

/// A convenience alias for fallible operations returning an [`IndexError`].
pub type Result<T> = std::result::Result<T, IndexError>;
