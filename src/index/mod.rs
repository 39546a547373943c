//! The indexed graph: three coordinated nested indexes (SPO/POS/OSP) over
//! triples, per spec.md §3/§4.1.

mod bag;
mod multimap;

use crate::node::{Node, Predicate};
use crate::pattern::{Binding, BindingValue, Pattern, PatternShape};
use crate::triple::Triple;
use bag::Bag;
use multimap::Nested;
use rustc_hash::FxHashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Which storage discipline a [`Graph`]'s innermost containers use.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
enum GraphKind {
    /// At most one `(s,p,o)` occurrence; innermost container is a set.
    Single,
    /// A multiset; innermost container tracks a strictly-positive count.
    Multi,
}

/// An immutable snapshot of a triple index.
///
/// `add`/`delete` never mutate in place: they return a new `Graph` value
/// that structurally shares every untouched subtree with the original
/// (path copying over `Arc`-wrapped maps, per spec.md §9). When a write is a
/// no-op — adding a triple already present in the single-valued variant, or
/// deleting one that is absent — the same value is returned, observably so
/// via [`Graph::ptr_eq`], matching spec.md §3's "Diff identity" invariant.
#[derive(Clone, Debug)]
pub struct Graph {
    kind: GraphKind,
    spo: Nested<Node, Predicate, Node>,
    pos: Nested<Predicate, Node, Node>,
    osp: Nested<Node, Node, Predicate>,
}

impl Graph {
    /// A fresh, empty single-valued graph.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kind: GraphKind::Single,
            spo: multimap::empty(),
            pos: multimap::empty(),
            osp: multimap::empty(),
        }
    }

    /// A fresh, empty multigraph.
    #[must_use]
    pub fn empty_multi() -> Self {
        Self {
            kind: GraphKind::Multi,
            spo: multimap::empty(),
            pos: multimap::empty(),
            osp: multimap::empty(),
        }
    }

    fn is_multi(&self) -> bool {
        self.kind == GraphKind::Multi
    }

    /// Whether `(s,p,o)` is present at least once.
    #[must_use]
    pub fn contains(&self, s: &Node, p: &Predicate, o: &Node) -> bool {
        self.spo
            .get(s)
            .and_then(|inner| inner.get(p))
            .is_some_and(|bag| bag.contains(o))
    }

    /// Incorporates `(s,p,o)` into all three indexes, per spec.md §4.1.
    ///
    /// `tx_id` is accepted for parity with the source contract
    /// (`add(g, s, p, o, tx) -> Graph`) but is not retained by the index
    /// itself — per-triple transaction provenance is the transactor's and
    /// `Datom`'s concern (spec.md §3/§4.2), not the index's.
    #[must_use]
    pub fn add(&self, s: Node, p: Predicate, o: Node, _tx_id: u64) -> Self {
        let key = p.untagged();
        if !self.is_multi() && self.contains(&s, &key, &o) {
            return self.clone();
        }
        let multi = self.is_multi();
        let (spo, _) = multimap::insert(&self.spo, s.clone(), key.clone(), o.clone(), multi);
        let (pos, _) = multimap::insert(&self.pos, key.clone(), o.clone(), s.clone(), multi);
        let (osp, _) = multimap::insert(&self.osp, o, s, key, multi);
        Self {
            kind: self.kind,
            spo,
            pos,
            osp,
        }
    }

    /// Removes `(s,p,o)` from all three indexes, per spec.md §4.1.
    #[must_use]
    pub fn delete(&self, s: &Node, p: &Predicate, o: &Node) -> Self {
        let key = p.untagged();
        if !self.contains(s, &key, o) {
            return self.clone();
        }
        let (spo, _) = multimap::remove(&self.spo, s, &key, o);
        let (pos, _) = multimap::remove(&self.pos, &key, o, s);
        let (osp, _) = multimap::remove(&self.osp, o, s, &key);
        Self {
            kind: self.kind,
            spo,
            pos,
            osp,
        }
    }

    /// Whether `self` and `other` are the same value, observed the way the
    /// transactor observes `add`/`delete`'s identity contract: by reference,
    /// not by deep content comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.spo, &other.spo)
    }

    /// The projection over the unbound positions of `pattern`, dispatched on
    /// its shape per spec.md §4.1's table. Ordering is unspecified.
    #[must_use]
    pub fn resolve(&self, pattern: &Pattern) -> Vec<Binding> {
        match pattern.shape() {
            PatternShape::Ground => {
                let (s, p, o) = ground(pattern);
                if self.contains(s, p, o) {
                    vec![Vec::new()]
                } else {
                    Vec::new()
                }
            }
            PatternShape::SubjectPredicate => {
                let s = pattern.subject().expect("bound by shape");
                let p = pattern.predicate().expect("bound by shape");
                self.spo
                    .get(s)
                    .and_then(|inner| inner.get(p))
                    .map(|bag| {
                        repeated(bag, |o| vec![BindingValue::Node(o.clone())]).collect()
                    })
                    .unwrap_or_default()
            }
            PatternShape::SubjectObject => {
                let s = pattern.subject().expect("bound by shape");
                let o = pattern.object().expect("bound by shape");
                self.osp
                    .get(o)
                    .and_then(|inner| inner.get(s))
                    .map(|bag| {
                        repeated(bag, |p| vec![BindingValue::Predicate(p.clone())]).collect()
                    })
                    .unwrap_or_default()
            }
            PatternShape::Subject => {
                let s = pattern.subject().expect("bound by shape");
                self.spo
                    .get(s)
                    .map(|inner| {
                        inner
                            .iter()
                            .flat_map(|(p, bag)| {
                                repeated(bag, move |o| {
                                    vec![
                                        BindingValue::Predicate(p.clone()),
                                        BindingValue::Node(o.clone()),
                                    ]
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            }
            PatternShape::PredicateObject => {
                let p = pattern.predicate().expect("bound by shape");
                let o = pattern.object().expect("bound by shape");
                self.pos
                    .get(p)
                    .and_then(|inner| inner.get(o))
                    .map(|bag| repeated(bag, |s| vec![BindingValue::Node(s.clone())]).collect())
                    .unwrap_or_default()
            }
            PatternShape::Predicate => {
                let p = pattern.predicate().expect("bound by shape");
                self.pos
                    .get(p)
                    .map(|inner| {
                        inner
                            .iter()
                            .flat_map(|(o, bag)| {
                                repeated(bag, move |s| {
                                    vec![
                                        BindingValue::Node(s.clone()),
                                        BindingValue::Node(o.clone()),
                                    ]
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            }
            PatternShape::Object => {
                let o = pattern.object().expect("bound by shape");
                self.osp
                    .get(o)
                    .map(|inner| {
                        inner
                            .iter()
                            .flat_map(|(s, bag)| {
                                repeated(bag, move |p| {
                                    vec![
                                        BindingValue::Node(s.clone()),
                                        BindingValue::Predicate(p.clone()),
                                    ]
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default()
            }
            PatternShape::All => self
                .spo
                .iter()
                .flat_map(|(s, inner)| {
                    inner.iter().flat_map(move |(p, bag)| {
                        repeated(bag, move |o| {
                            vec![
                                BindingValue::Node(s.clone()),
                                BindingValue::Predicate(p.clone()),
                                BindingValue::Node(o.clone()),
                            ]
                        })
                    })
                })
                .collect(),
        }
    }

    /// The cardinality of `resolve(pattern)`, computed from the bag
    /// multiplicities directly rather than by materializing the result.
    #[must_use]
    pub fn count(&self, pattern: &Pattern) -> u64 {
        match pattern.shape() {
            PatternShape::Ground => {
                let (s, p, o) = ground(pattern);
                u64::from(self.contains(s, p, o))
            }
            PatternShape::SubjectPredicate => {
                let s = pattern.subject().expect("bound by shape");
                let p = pattern.predicate().expect("bound by shape");
                self.spo
                    .get(s)
                    .and_then(|inner| inner.get(p))
                    .map_or(0, Bag::total)
            }
            PatternShape::SubjectObject => {
                let s = pattern.subject().expect("bound by shape");
                let o = pattern.object().expect("bound by shape");
                self.osp
                    .get(o)
                    .and_then(|inner| inner.get(s))
                    .map_or(0, Bag::total)
            }
            PatternShape::Subject => {
                let s = pattern.subject().expect("bound by shape");
                self.spo
                    .get(s)
                    .map_or(0, |inner| inner.values().map(Bag::total).sum())
            }
            PatternShape::PredicateObject => {
                let p = pattern.predicate().expect("bound by shape");
                let o = pattern.object().expect("bound by shape");
                self.pos
                    .get(p)
                    .and_then(|inner| inner.get(o))
                    .map_or(0, Bag::total)
            }
            PatternShape::Predicate => {
                let p = pattern.predicate().expect("bound by shape");
                self.pos
                    .get(p)
                    .map_or(0, |inner| inner.values().map(Bag::total).sum())
            }
            PatternShape::Object => {
                let o = pattern.object().expect("bound by shape");
                self.osp
                    .get(o)
                    .map_or(0, |inner| inner.values().map(Bag::total).sum())
            }
            PatternShape::All => self
                .spo
                .values()
                .flat_map(|inner| inner.values())
                .map(Bag::total)
                .sum(),
        }
    }

    /// All `(predicate, object)` pairs at `subject`, used by the transitive
    /// resolver's BFS expansion (spec.md §4.3).
    pub(crate) fn edges_from(&self, subject: &Node) -> Vec<(Predicate, Node)> {
        self.spo.get(subject).map_or_else(Vec::new, |inner| {
            inner
                .iter()
                .flat_map(|(p, bag)| repeated(bag, move |o| (p.clone(), o.clone())))
                .collect()
        })
    }

    /// All `(object, predicate)` pairs reachable by an edge terminating at
    /// `object`'s subject position, used by reverse BFS.
    pub(crate) fn object_to_subjects(&self, predicate: &Predicate) -> FxHashMap<Node, Vec<Node>> {
        self.pos.get(predicate).map_or_else(FxHashMap::default, |inner| {
            inner
                .iter()
                .map(|(o, bag)| (o.clone(), bag.iter().map(|(s, _)| s.clone()).collect()))
                .collect()
        })
    }

    /// Every object directly reachable from `subject` via any predicate
    /// (ignores predicate identity — used by path-existence BFS, which per
    /// spec.md §9 treats the closure as "reachable via any edge").
    pub(crate) fn any_targets_from(&self, subject: &Node) -> Vec<Node> {
        self.spo.get(subject).map_or_else(Vec::new, |inner| {
            inner
                .values()
                .flat_map(|bag| bag.iter().map(|(o, _)| o.clone()))
                .collect()
        })
    }

    /// Every subject with an edge (any predicate) terminating at `object`,
    /// the mirror of [`Self::any_targets_from`] used by reverse BFS.
    pub(crate) fn any_sources_into(&self, object: &Node) -> Vec<Node> {
        self.osp
            .get(object)
            .map_or_else(Vec::new, |inner| inner.keys().cloned().collect())
    }

    /// All `(subject, predicate)` pairs of edges terminating at `object`,
    /// used by the `(?,?,v)` transitive shape.
    pub(crate) fn edges_into(&self, object: &Node) -> Vec<(Node, Predicate)> {
        self.osp.get(object).map_or_else(Vec::new, |inner| {
            inner
                .iter()
                .flat_map(|(s, bag)| repeated(bag, move |p| (s.clone(), p.clone())))
                .collect()
        })
    }

    /// The set of subjects whose SPO sub-index differs between `self` and
    /// `other`, per spec.md §4.4.
    #[must_use]
    pub fn diff(&self, other: &Self) -> HashSet<Node> {
        let mut changed = HashSet::new();
        for s in self.spo.keys().chain(other.spo.keys()) {
            if changed.contains(s) {
                continue;
            }
            let a = self.spo.get(s);
            let b = other.spo.get(s);
            let same = match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b) || predicate_maps_equal(a, b),
                (None, None) => true,
                _ => false,
            };
            if !same {
                changed.insert(s.clone());
            }
        }
        changed
    }
}

fn ground(pattern: &Pattern) -> (&Node, &Predicate, &Node) {
    (
        pattern.subject().expect("bound by shape"),
        pattern.predicate().expect("bound by shape"),
        pattern.object().expect("bound by shape"),
    )
}

fn repeated<'a, V, F, B>(bag: &'a Bag<V>, mut project: F) -> impl Iterator<Item = B> + 'a
where
    V: Clone + Eq + std::hash::Hash,
    F: FnMut(&V) -> B + 'a,
    B: 'a,
{
    bag.iter()
        .flat_map(move |(v, count)| std::iter::repeat_with(move || project(v)).take(count as usize))
}

fn predicate_maps_equal(
    a: &FxHashMap<Predicate, Bag<Node>>,
    b: &FxHashMap<Predicate, Bag<Node>>,
) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(p, bag)| b.get(p).is_some_and(|other_bag| bag.semantically_equal(other_bag)))
}

/// Convenience for building a [`Graph`] directly from a batch of triples,
/// each treated as an assertion at `tx_id` 0. Used by tests and by callers
/// that do not need datom diffs.
pub fn from_triples(kind_multi: bool, triples: impl IntoIterator<Item = Triple>) -> Graph {
    let mut graph = if kind_multi {
        Graph::empty_multi()
    } else {
        Graph::empty()
    };
    for triple in triples {
        graph = graph.add(triple.subject, triple.predicate, triple.object, 0);
    }
    graph
}
