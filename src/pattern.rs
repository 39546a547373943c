use crate::node::{Node, Predicate};

/// A single pattern position: either a ground value or the unbound marker.
///
/// This is the `isVar` collaborator of spec.md §6.2 made concrete: a
/// position is a variable exactly when it is [`Slot::Var`].
#[derive(Clone, Debug)]
pub enum Slot<T> {
    Bound(T),
    Var,
}

impl<T> Slot<T> {
    /// The `isVar` test of spec.md §6.2.
    #[must_use]
    pub fn is_var(&self) -> bool {
        matches!(self, Self::Var)
    }

    pub fn as_ref(&self) -> Slot<&T> {
        match self {
            Self::Bound(v) => Slot::Bound(v),
            Self::Var => Slot::Var,
        }
    }

    fn bound(&self) -> Option<&T> {
        match self {
            Self::Bound(v) => Some(v),
            Self::Var => None,
        }
    }
}

/// A triple pattern: each position may be ground or unbound.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub subject: Slot<Node>,
    pub predicate: Slot<Predicate>,
    pub object: Slot<Node>,
}

impl Pattern {
    pub fn new(subject: Slot<Node>, predicate: Slot<Predicate>, object: Slot<Node>) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    pub fn subject(&self) -> Option<&Node> {
        self.subject.bound()
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.bound()
    }

    pub fn object(&self) -> Option<&Node> {
        self.object.bound()
    }

    /// Classifies the pattern into one of the eight shapes of spec.md §4.1,
    /// shared unchanged by the direct resolver and the transitive resolver
    /// so the two dispatchers cannot drift apart.
    #[must_use]
    pub fn shape(&self) -> PatternShape {
        match (self.subject.is_var(), self.predicate.is_var(), self.object.is_var()) {
            (false, false, false) => PatternShape::Ground,
            (false, false, true) => PatternShape::SubjectPredicate,
            (false, true, false) => PatternShape::SubjectObject,
            (false, true, true) => PatternShape::Subject,
            (true, false, false) => PatternShape::PredicateObject,
            (true, false, true) => PatternShape::Predicate,
            (true, true, false) => PatternShape::Object,
            (true, true, true) => PatternShape::All,
        }
    }
}

/// The closed set of eight `(bound/unbound)³` pattern classifications, per
/// spec.md §4.1's dispatch table. Named after which positions are *bound*.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum PatternShape {
    /// `(v,v,v)` — SPO lookup, answers membership.
    Ground,
    /// `(v,v,?)` — SPO lookup, enumerates objects.
    SubjectPredicate,
    /// `(v,?,v)` — OSP lookup, enumerates predicates.
    SubjectObject,
    /// `(v,?,?)` — SPO lookup, enumerates (predicate, object) pairs.
    Subject,
    /// `(?,v,v)` — POS lookup, enumerates subjects.
    PredicateObject,
    /// `(?,v,?)` — POS lookup, enumerates (subject, object) pairs.
    Predicate,
    /// `(?,?,v)` — OSP lookup, enumerates (subject, predicate) pairs.
    Object,
    /// `(?,?,?)` — SPO lookup, enumerates every triple.
    All,
}

/// A single value slot in a [`Binding`]: unbound pattern positions project
/// either a [`Node`] (subject/object) or a [`Predicate`] (predicate).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BindingValue {
    Node(Node),
    Predicate(Predicate),
}

/// A single result tuple: the projection over the unbound positions of a
/// pattern, in subject/predicate/object order, per spec.md §4.1 "Result
/// tuples omit bound positions, so arity equals the number of `?` marks."
pub type Binding = Vec<BindingValue>;
