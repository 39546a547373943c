//! The transactor: folds a batch of assertions and retractions into a graph,
//! producing a successor value plus the datom diff that produced it, per
//! spec.md §4.2.

use crate::index::Graph;
use crate::triple::{Datom, Triple};

/// The result of a [`transact`] call: the successor graph, and the datoms
/// that were actually applied (no-op adds/removes are filtered out, per
/// spec.md §4.1's edge-case policies).
#[derive(Clone, Debug)]
pub struct TransactResult {
    pub graph: Graph,
    pub asserted: Vec<Datom>,
    pub retracted: Vec<Datom>,
}

/// Applies `retractions` then `assertions` (in that order, each in input
/// order) to `graph`, returning the successor graph and the two datom
/// lists.
///
/// Each retraction/assertion is applied via [`Graph::delete`]/[`Graph::add`],
/// whose identity contract (spec.md §3) tells the transactor whether
/// anything actually changed — this replaces a separate existence
/// pre-check: the index already knows whether it mutated state, so the
/// transactor piggybacks on that (spec.md §4.2 "Rationale").
pub fn transact(
    graph: &Graph,
    assertions: impl IntoIterator<Item = Triple>,
    retractions: impl IntoIterator<Item = Triple>,
    tx_id: u64,
) -> TransactResult {
    let mut current = graph.clone();
    let mut retracted = Vec::new();
    for triple in retractions {
        let next = current.delete(&triple.subject, &triple.predicate, &triple.object);
        if !next.ptr_eq(&current) {
            retracted.push(Datom::new(&triple, tx_id, false));
        }
        current = next;
    }

    let mut asserted = Vec::new();
    for triple in assertions {
        let next = current.add(
            triple.subject.clone(),
            triple.predicate.clone(),
            triple.object.clone(),
            tx_id,
        );
        if !next.ptr_eq(&current) {
            asserted.push(Datom::new(&triple, tx_id, true));
        }
        current = next;
    }

    TransactResult {
        graph: current,
        asserted,
        retracted,
    }
}
