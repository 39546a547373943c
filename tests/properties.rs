#![cfg(test)]

//! Randomized checks for the two universal properties of spec.md §8 that
//! are awkward to pin down with a single concrete scenario: property 7
//! (the predicate-specific closure is a fixed point of its own step
//! function) and property 8 (`:star` results are a superset of `:plus`
//! results, the difference being exactly the reflexive additions).
//!
//! Mirrors `lib/benches/store.rs`'s `random::<u64>() % size` idiom for
//! building small random datasets over a bounded vocabulary.

use oxindex::{resolve_transitive, Binding, BindingValue, Graph, Node, Pattern, Predicate, Slot, TransitiveTag};
use rand::random;
use std::collections::HashSet;

const TRIALS: u32 = 200;
const NODE_COUNT: u64 = 6;
const EDGE_COUNT: u32 = 10;

fn vocabulary() -> Vec<Node> {
    (0..NODE_COUNT).map(|i| Node::iri(format!("n{i}"))).collect()
}

fn random_node() -> Node {
    Node::iri(format!("n{}", random::<u64>() % NODE_COUNT))
}

fn random_graph() -> Graph {
    let mut graph = Graph::empty();
    for _ in 0..EDGE_COUNT {
        graph = graph.add(random_node(), Predicate::new("rel"), random_node(), 0);
    }
    graph
}

fn as_set(bindings: Vec<Binding>) -> HashSet<Binding> {
    bindings.into_iter().collect()
}

/// Property 7: `transitive-closure(M)` satisfies `M* = step(M*)` — for
/// every `o` and every `s` already in its closure, `s`'s own closure must
/// already be fully folded into `o`'s (extending by one more hop through
/// `s` adds nothing new).
#[test]
fn property_predicate_closure_is_a_fixed_point() {
    let predicate = Predicate::new("rel");
    let nodes = vocabulary();
    for _ in 0..TRIALS {
        let graph = random_graph();
        let subjects_of = |object: &Node| -> HashSet<Node> {
            let pattern = Pattern::new(Slot::Var, Slot::Bound(predicate.clone()), Slot::Bound(object.clone()));
            resolve_transitive(&graph, TransitiveTag::Plus, &pattern)
                .unwrap()
                .into_iter()
                .map(|binding| match binding.into_iter().next().expect("one slot") {
                    BindingValue::Node(n) => n,
                    BindingValue::Predicate(_) => unreachable!("subject slot yields nodes"),
                })
                .collect()
        };
        for object in &nodes {
            let closure_of_object = subjects_of(object);
            for subject in &closure_of_object {
                let closure_of_subject = subjects_of(subject);
                assert!(
                    closure_of_subject.is_subset(&closure_of_object),
                    "closure of {object:?} is not closed under one more hop through {subject:?}"
                );
            }
        }
    }
}

/// Property 8: for every `(s,p,o)` pattern, the `:star` result set
/// contains the `:plus` result set, and the difference is exactly the
/// reflexive additions `:star` introduces. Swept across the seven
/// transitively-resolvable pattern shapes (the eighth, fully unbound,
/// is rejected rather than resolved, per spec.md §4.3).
#[test]
fn property_star_is_superset_of_plus_with_only_reflexive_difference() {
    let predicate = Predicate::new("rel");
    let nodes = vocabulary();
    for _ in 0..TRIALS {
        let graph = random_graph();

        // (v,v,v) and (v,?,v): at most one binding each; they may differ
        // only when the bound endpoints coincide.
        for s in &nodes {
            for o in &nodes {
                let ground = Pattern::new(Slot::Bound(s.clone()), Slot::Bound(predicate.clone()), Slot::Bound(o.clone()));
                let star = resolve_transitive(&graph, TransitiveTag::Star, &ground).unwrap();
                let plus = resolve_transitive(&graph, TransitiveTag::Plus, &ground).unwrap();
                if !plus.is_empty() {
                    assert!(!star.is_empty(), "plus found a path star should also find");
                }
                if star != plus {
                    assert_eq!(s, o, "ground shape may only differ when s == o");
                }

                let between = Pattern::new(Slot::Bound(s.clone()), Slot::Var, Slot::Bound(o.clone()));
                let star = resolve_transitive(&graph, TransitiveTag::Star, &between).unwrap();
                let plus = resolve_transitive(&graph, TransitiveTag::Plus, &between).unwrap();
                if !plus.is_empty() {
                    assert!(!star.is_empty());
                }
                if star != plus {
                    assert_eq!(s, o, "path-between shape may only differ when s == o");
                }
            }
        }

        // (v,?,?): reflexive additions bind the downstream slot to s itself.
        for s in &nodes {
            let pattern = Pattern::new(Slot::Bound(s.clone()), Slot::Var, Slot::Var);
            let star = as_set(resolve_transitive(&graph, TransitiveTag::Star, &pattern).unwrap());
            let plus = as_set(resolve_transitive(&graph, TransitiveTag::Plus, &pattern).unwrap());
            assert!(plus.is_subset(&star));
            for extra in star.difference(&plus) {
                match extra.as_slice() {
                    [BindingValue::Predicate(_), BindingValue::Node(n)] => assert_eq!(n, s),
                    other => panic!("unexpected binding shape {other:?}"),
                }
            }
        }

        // (?,?,v): the mirror of the above, downstream slot fixed to o.
        for o in &nodes {
            let pattern = Pattern::new(Slot::Var, Slot::Var, Slot::Bound(o.clone()));
            let star = as_set(resolve_transitive(&graph, TransitiveTag::Star, &pattern).unwrap());
            let plus = as_set(resolve_transitive(&graph, TransitiveTag::Plus, &pattern).unwrap());
            assert!(plus.is_subset(&star));
            for extra in star.difference(&plus) {
                match extra.as_slice() {
                    [BindingValue::Node(n), BindingValue::Predicate(_)] => assert_eq!(n, o),
                    other => panic!("unexpected binding shape {other:?}"),
                }
            }
        }

        // (v,v,?): reflexive additions project the subject itself as object.
        for s in &nodes {
            let pattern = Pattern::new(Slot::Bound(s.clone()), Slot::Bound(predicate.clone()), Slot::Var);
            let star = as_set(resolve_transitive(&graph, TransitiveTag::Star, &pattern).unwrap());
            let plus = as_set(resolve_transitive(&graph, TransitiveTag::Plus, &pattern).unwrap());
            assert!(plus.is_subset(&star));
            for extra in star.difference(&plus) {
                match extra.as_slice() {
                    [BindingValue::Node(n)] => assert_eq!(n, s),
                    other => panic!("unexpected binding shape {other:?}"),
                }
            }
        }

        // (?,v,v): reflexive additions project the object itself as subject.
        for o in &nodes {
            let pattern = Pattern::new(Slot::Var, Slot::Bound(predicate.clone()), Slot::Bound(o.clone()));
            let star = as_set(resolve_transitive(&graph, TransitiveTag::Star, &pattern).unwrap());
            let plus = as_set(resolve_transitive(&graph, TransitiveTag::Plus, &pattern).unwrap());
            assert!(plus.is_subset(&star));
            for extra in star.difference(&plus) {
                match extra.as_slice() {
                    [BindingValue::Node(n)] => assert_eq!(n, o),
                    other => panic!("unexpected binding shape {other:?}"),
                }
            }
        }

        // (?,v,?): reflexive additions are self-pairs, subject == object.
        {
            let pattern = Pattern::new(Slot::Var, Slot::Bound(predicate.clone()), Slot::Var);
            let star = as_set(resolve_transitive(&graph, TransitiveTag::Star, &pattern).unwrap());
            let plus = as_set(resolve_transitive(&graph, TransitiveTag::Plus, &pattern).unwrap());
            assert!(plus.is_subset(&star));
            for extra in star.difference(&plus) {
                match extra.as_slice() {
                    [BindingValue::Node(a), BindingValue::Node(b)] => assert_eq!(a, b),
                    other => panic!("unexpected binding shape {other:?}"),
                }
            }
        }
    }
}
