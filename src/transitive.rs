//! The transitive resolver: the eight-shape dispatch over a tagged predicate,
//! and the bounded closure memo cache, per spec.md §4.3.

use crate::error::IndexError;
use crate::index::Graph;
use crate::node::{Node, Predicate, TransitiveTag};
use crate::pattern::{Binding, BindingValue, Pattern, PatternShape};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Resolves a transitively-tagged `pattern` against `graph`.
///
/// `tag` is the closure discipline (`*`/`+`) the query layer detected on the
/// predicate before stripping it; `pattern`'s predicate position, if bound,
/// is expected to already carry the plain (untagged) name.
///
/// Equivalent to a one-shot [`TransitiveResolver`] with no cache reuse across
/// calls; prefer constructing a resolver directly when the same predicate's
/// closure will be queried more than once.
pub fn resolve_transitive(
    graph: &Graph,
    tag: TransitiveTag,
    pattern: &Pattern,
) -> Result<Vec<Binding>, IndexError> {
    TransitiveResolver::new().resolve(graph, tag, pattern)
}

/// A transitive-closure resolver carrying its own bounded memo cache.
///
/// Callers that resolve many patterns over the same tagged predicate should
/// keep one resolver around rather than calling [`resolve_transitive`]
/// repeatedly, so the predicate-specific closure cache can actually pay off.
pub struct TransitiveResolver {
    cache: ClosureCache,
}

impl TransitiveResolver {
    /// A resolver with the default cache capacity (2 entries, per spec.md
    /// §4.3's "small, bounded (e.g. 1-2 entries)").
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: ClosureCache::new(2),
        }
    }

    /// A resolver with an explicit cache capacity.
    #[must_use]
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: ClosureCache::new(capacity),
        }
    }

    /// Resolves `pattern` under `tag`, dispatching on its shape per spec.md
    /// §4.3's table.
    pub fn resolve(
        &self,
        graph: &Graph,
        tag: TransitiveTag,
        pattern: &Pattern,
    ) -> Result<Vec<Binding>, IndexError> {
        match pattern.shape() {
            PatternShape::Ground => {
                let s = pattern.subject().expect("bound by shape");
                let o = pattern.object().expect("bound by shape");
                Ok(if path_exists(graph, tag, s, o) {
                    vec![Vec::new()]
                } else {
                    Vec::new()
                })
            }
            PatternShape::SubjectObject => {
                let s = pattern.subject().expect("bound by shape");
                let o = pattern.object().expect("bound by shape");
                Ok(match path_between(graph, tag, s, o) {
                    Some(path) => vec![path.into_iter().map(BindingValue::Predicate).collect()],
                    None => Vec::new(),
                })
            }
            PatternShape::Subject => {
                let s = pattern.subject().expect("bound by shape");
                Ok(reachability_from(graph, tag, s))
            }
            PatternShape::Object => {
                let o = pattern.object().expect("bound by shape");
                Ok(reachability_into(graph, tag, o))
            }
            PatternShape::SubjectPredicate | PatternShape::Predicate | PatternShape::PredicateObject => {
                Ok(self.predicate_closure(graph, tag, pattern))
            }
            PatternShape::All => Err(IndexError::unbound_closure(pattern)),
        }
    }

    fn predicate_closure(&self, graph: &Graph, tag: TransitiveTag, pattern: &Pattern) -> Vec<Binding> {
        let predicate = pattern.predicate().expect("bound by shape").untagged();
        let base = object_to_subject_set(graph, &predicate);
        let plain_closure = self.cache.get_or_compute(&base);
        let mut closure = (*plain_closure).clone();
        if tag == TransitiveTag::Star {
            let mut observed: FxHashSet<Node> = FxHashSet::default();
            for (o, subjects) in &base {
                observed.insert(o.clone());
                observed.extend(subjects.iter().cloned());
            }
            for node in observed {
                closure.entry(node.clone()).or_default().insert(node);
            }
        }

        match pattern.shape() {
            PatternShape::SubjectPredicate => {
                let s = pattern.subject().expect("bound by shape");
                closure
                    .iter()
                    .filter(|(_, subjects)| subjects.contains(s))
                    .map(|(o, _)| vec![BindingValue::Node(o.clone())])
                    .collect()
            }
            PatternShape::Predicate => closure
                .iter()
                .flat_map(|(o, subjects)| {
                    subjects.iter().map(move |s| {
                        vec![BindingValue::Node(s.clone()), BindingValue::Node(o.clone())]
                    })
                })
                .collect(),
            PatternShape::PredicateObject => {
                let o = pattern.object().expect("bound by shape");
                closure
                    .get(o)
                    .map(|subjects| subjects.iter().map(|s| vec![BindingValue::Node(s.clone())]).collect())
                    .unwrap_or_default()
            }
            _ => unreachable!("dispatched only for the predicate-specific shapes"),
        }
    }
}

impl Default for TransitiveResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `o` is reachable from `s` by one or more edges of any predicate
/// (spec.md §4.3, `(v,v,v)`: "this strategy ignores the predicate").
fn path_exists(graph: &Graph, tag: TransitiveTag, s: &Node, o: &Node) -> bool {
    if tag == TransitiveTag::Star && s == o {
        return true;
    }
    let mut visited = HashSet::new();
    visited.insert(s.clone());
    let mut frontier = vec![s.clone()];
    while let Some(current) = frontier.pop() {
        for next in graph.any_targets_from(&current) {
            if &next == o {
                return true;
            }
            if next.is_node_typed() && visited.insert(next.clone()) {
                frontier.push(next);
            }
        }
    }
    false
}

/// The shortest (first-found) sequence of predicates linking `s` to `o` via
/// any edges, or `None` if no such path exists (spec.md §4.3, `(v,?,v)`).
fn path_between(graph: &Graph, tag: TransitiveTag, s: &Node, o: &Node) -> Option<Vec<Predicate>> {
    if tag == TransitiveTag::Star && s == o {
        return Some(Vec::new());
    }
    let mut visited = HashSet::new();
    visited.insert(s.clone());
    let mut queue = VecDeque::new();
    queue.push_back((s.clone(), Vec::<Predicate>::new()));
    while let Some((current, path)) = queue.pop_front() {
        for (p, next) in graph.edges_from(&current) {
            if next == *o {
                let mut full = path;
                full.push(p);
                return Some(full);
            }
            if next.is_node_typed() && visited.insert(next.clone()) {
                let mut full = path.clone();
                full.push(p);
                queue.push_back((next, full));
            }
        }
    }
    None
}

/// Every node reachable from `start` via one or more edges of any predicate
/// (forward) or terminating at `start` (reverse), used by `(v,?,?)` and
/// `(?,?,v)`.
fn reachable_any(graph: &Graph, start: &Node, forward: bool) -> HashSet<Node> {
    let mut visited = HashSet::new();
    visited.insert(start.clone());
    let mut frontier = vec![start.clone()];
    while let Some(current) = frontier.pop() {
        let next_nodes = if forward {
            graph.any_targets_from(&current)
        } else {
            graph.any_sources_into(&current)
        };
        for next in next_nodes {
            if next.is_node_typed() && visited.insert(next.clone()) {
                frontier.push(next);
            }
        }
    }
    visited.remove(start);
    visited
}

/// `(v,?,?)`: for each direct edge `(p, o)` at `s`, emit `(p, o')` for `o`
/// itself and every node downstream of `o` via any edge; with `:star`, also
/// include `s` among each edge's downstream set (spec.md §4.3).
fn reachability_from(graph: &Graph, tag: TransitiveTag, s: &Node) -> Vec<Binding> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (p, o) in graph.edges_from(s) {
        let mut downstream = reachable_any(graph, &o, true);
        downstream.insert(o.clone());
        if tag == TransitiveTag::Star {
            downstream.insert(s.clone());
        }
        for node in downstream {
            if seen.insert((p.clone(), node.clone())) {
                out.push(vec![BindingValue::Predicate(p.clone()), BindingValue::Node(node)]);
            }
        }
    }
    out
}

/// `(?,?,v)`: the mirror of [`reachability_from`] run against incoming edges.
fn reachability_into(graph: &Graph, tag: TransitiveTag, o: &Node) -> Vec<Binding> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (s, p) in graph.edges_into(o) {
        let mut upstream = reachable_any(graph, &s, false);
        upstream.insert(s.clone());
        if tag == TransitiveTag::Star {
            upstream.insert(o.clone());
        }
        for node in upstream {
            if seen.insert((node.clone(), p.clone())) {
                out.push(vec![BindingValue::Node(node), BindingValue::Predicate(p.clone())]);
            }
        }
    }
    out
}

type ClosureMap = FxHashMap<Node, FxHashSet<Node>>;

fn object_to_subject_set(graph: &Graph, predicate: &Predicate) -> ClosureMap {
    graph
        .object_to_subjects(predicate)
        .into_iter()
        .map(|(o, subjects)| (o, subjects.into_iter().collect()))
        .collect()
}

/// The iterative fixed-point closure of an object→subjects map: for every
/// `o` and `s` in `M[o]`, if `s` is itself a key of `M`, `M[s]` is merged
/// into `M[o]`. Excludes reflexive pairs — the `:plus` discipline; `:star`'s
/// reflexive augmentation is applied by the caller afterward, per spec.md
/// §4.3, so the cached result here is shared by both tags.
fn closure_of(base: &ClosureMap) -> ClosureMap {
    let mut result = base.clone();
    loop {
        let mut changed = false;
        let keys: Vec<Node> = result.keys().cloned().collect();
        for o in &keys {
            let subjects: Vec<Node> = result.get(o).into_iter().flatten().cloned().collect();
            for s in subjects {
                let Some(extra) = result.get(&s).cloned() else {
                    continue;
                };
                let entry = result.get_mut(o).expect("o is a key");
                for e in extra {
                    if entry.insert(e) {
                        changed = true;
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    result
}

/// A small, bounded, FIFO-eviction memo cache for [`closure_of`] results,
/// keyed by the base map's own content (spec.md §4.3's "memoized by M's
/// value-equality, bounded 1-2 entries, evicted FIFO").
///
/// Guarded by a [`Mutex`] rather than requiring `&mut self` on the resolver:
/// `closure_of` is pure, so a race between two threads computing the same
/// entry twice is wasted work, not a correctness problem.
struct ClosureCache {
    capacity: usize,
    entries: Mutex<VecDeque<(ClosureMap, std::sync::Arc<ClosureMap>)>>,
}

impl ClosureCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    fn get_or_compute(&self, base: &ClosureMap) -> std::sync::Arc<ClosureMap> {
        let mut entries = self.entries.lock().expect("cache mutex not poisoned");
        if let Some((_, value)) = entries.iter().find(|(key, _)| key == base) {
            return std::sync::Arc::clone(value);
        }
        let computed = std::sync::Arc::new(closure_of(base));
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back((base.clone(), std::sync::Arc::clone(&computed)));
        computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::from_triples;
    use crate::pattern::Slot;
    use crate::triple::Triple;

    fn iri(name: &str) -> Node {
        Node::iri(name)
    }

    fn edge(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), Predicate::new(p), iri(o))
    }

    fn chain() -> Graph {
        from_triples(false, vec![edge("a", "p", "b"), edge("b", "p", "c"), edge("c", "p", "d")])
    }

    #[test]
    fn ground_plus_finds_existing_path() {
        let g = chain();
        let pattern = Pattern::new(Slot::Bound(iri("a")), Slot::Bound(Predicate::new("p")), Slot::Bound(iri("d")));
        let result = resolve_transitive(&g, TransitiveTag::Plus, &pattern).unwrap();
        assert_eq!(result, vec![Vec::new()]);
    }

    #[test]
    fn ground_plus_rejects_missing_path() {
        let g = chain();
        let pattern = Pattern::new(Slot::Bound(iri("a")), Slot::Bound(Predicate::new("p")), Slot::Bound(iri("e")));
        let result = resolve_transitive(&g, TransitiveTag::Plus, &pattern).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn ground_star_is_reflexive_on_identical_endpoints() {
        let g = chain();
        let pattern = Pattern::new(Slot::Bound(iri("a")), Slot::Bound(Predicate::new("p")), Slot::Bound(iri("a")));
        assert_eq!(resolve_transitive(&g, TransitiveTag::Star, &pattern).unwrap(), vec![Vec::new()]);
        assert!(resolve_transitive(&g, TransitiveTag::Plus, &pattern).unwrap().is_empty());
    }

    #[test]
    fn subject_object_returns_predicate_path() {
        let g = chain();
        let pattern = Pattern::new(Slot::Bound(iri("a")), Slot::Var, Slot::Bound(iri("d")));
        let result = resolve_transitive(&g, TransitiveTag::Plus, &pattern).unwrap();
        assert_eq!(
            result,
            vec![vec![
                BindingValue::Predicate(Predicate::new("p")),
                BindingValue::Predicate(Predicate::new("p")),
                BindingValue::Predicate(Predicate::new("p")),
            ]]
        );
    }

    #[test]
    fn predicate_specific_star_closure_matches_scenario() {
        let g = from_triples(false, vec![edge("a", "p", "b"), edge("b", "p", "c")]);
        let pattern = Pattern::new(Slot::Bound(iri("a")), Slot::Bound(Predicate::new("p")), Slot::Var);
        let result = resolve_transitive(&g, TransitiveTag::Star, &pattern).unwrap();
        let mut objects: Vec<Node> = result
            .into_iter()
            .map(|binding| match &binding[0] {
                BindingValue::Node(n) => n.clone(),
                BindingValue::Predicate(_) => unreachable!(),
            })
            .collect();
        objects.sort();
        assert_eq!(objects, vec![iri("a"), iri("b"), iri("c")]);
    }

    #[test]
    fn predicate_specific_plus_closure_excludes_self() {
        let g = from_triples(false, vec![edge("a", "p", "b"), edge("b", "p", "c")]);
        let pattern = Pattern::new(Slot::Bound(iri("a")), Slot::Bound(Predicate::new("p")), Slot::Var);
        let result = resolve_transitive(&g, TransitiveTag::Plus, &pattern).unwrap();
        let mut objects: Vec<Node> = result
            .into_iter()
            .map(|binding| match &binding[0] {
                BindingValue::Node(n) => n.clone(),
                BindingValue::Predicate(_) => unreachable!(),
            })
            .collect();
        objects.sort();
        assert_eq!(objects, vec![iri("b"), iri("c")]);
    }

    #[test]
    fn fully_unbound_closure_is_rejected() {
        let g = chain();
        let pattern = Pattern::new(Slot::Var, Slot::Var, Slot::Var);
        assert!(matches!(
            resolve_transitive(&g, TransitiveTag::Plus, &pattern),
            Err(IndexError::UnboundClosure { .. })
        ));
    }

    #[test]
    fn closure_cache_is_reused_across_calls() {
        let g = from_triples(false, vec![edge("a", "p", "b"), edge("b", "p", "c")]);
        let resolver = TransitiveResolver::with_cache_capacity(1);
        let pattern = Pattern::new(Slot::Bound(iri("a")), Slot::Bound(Predicate::new("p")), Slot::Var);
        let first = resolver.resolve(&g, TransitiveTag::Plus, &pattern).unwrap();
        let second = resolver.resolve(&g, TransitiveTag::Plus, &pattern).unwrap();
        assert_eq!(first.len(), second.len());
    }
}
