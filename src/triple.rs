use crate::node::{Node, Predicate};
use std::fmt;

/// A directed edge `(subject, predicate, object)`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Predicate,
    pub object: Node,
}

impl Triple {
    /// Builds a triple from its three components.
    pub fn new(subject: Node, predicate: Predicate, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// An observed change to a triple, produced by [`crate::transact::transact`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Datom {
    pub subject: Node,
    pub predicate: Predicate,
    pub object: Node,
    pub tx_id: u64,
    pub added: bool,
}

impl Datom {
    pub fn new(triple: &Triple, tx_id: u64, added: bool) -> Self {
        Self {
            subject: triple.subject.clone(),
            predicate: triple.predicate.clone(),
            object: triple.object.clone(),
            tx_id,
            added,
        }
    }
}

impl fmt::Display for Datom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.subject, self.predicate, self.object, self.tx_id, self.added
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datom_copies_triple_components() {
        let t = Triple::new(Node::iri("a"), Predicate::new("knows"), Node::iri("b"));
        let d = Datom::new(&t, 7, true);
        assert_eq!(d.subject, t.subject);
        assert_eq!(d.object, t.object);
        assert_eq!(d.tx_id, 7);
        assert!(d.added);
    }
}
