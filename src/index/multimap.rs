//! Path-copying helpers shared by the SPO/POS/OSP nested indexes.
//!
//! spec.md §9 asks for "a persistent hash-array-mapped trie or copy-on-write
//! small-map variant to preserve the immutability invariant cheaply." No HAMT
//! crate appears anywhere in the example pack, so this hand-rolled
//! path-copying wrapper over `Arc<FxHashMap<...>>` is the idiomatic choice
//! available in the teacher's own dependency stack: a write clones and
//! replaces only the map nodes along the path from the root to the changed
//! leaf, leaving untouched subtrees shared between old and new values.

use super::bag::Bag;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

/// A two-level nested index: `outer[k1][k2]` is a [`Bag`] of values.
pub(crate) type Nested<K1, K2, V> = Arc<FxHashMap<K1, Arc<FxHashMap<K2, Bag<V>>>>>;

pub(crate) fn empty<K1, K2, V>() -> Nested<K1, K2, V> {
    Arc::new(FxHashMap::default())
}

/// Inserts `value` at `outer[k1][k2]`, path-copying the two map levels
/// touched. Returns the new outer map and whether anything changed.
pub(crate) fn insert<K1, K2, V>(
    outer: &Nested<K1, K2, V>,
    k1: K1,
    k2: K2,
    value: V,
    multi: bool,
) -> (Nested<K1, K2, V>, bool)
where
    K1: Clone + Eq + Hash,
    K2: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
{
    let inner = outer.get(&k1);
    let bag = inner
        .and_then(|inner| inner.get(&k2))
        .cloned()
        .unwrap_or_else(|| {
            if multi {
                Bag::empty_multi()
            } else {
                Bag::empty_set()
            }
        });
    let (new_bag, changed) = bag.insert(value);
    if !changed {
        return (Arc::clone(outer), false);
    }
    let mut new_inner = inner.map_or_else(FxHashMap::default, |inner| (**inner).clone());
    new_inner.insert(k2, new_bag);
    let mut new_outer = (**outer).clone();
    new_outer.insert(k1, Arc::new(new_inner));
    (Arc::new(new_outer), true)
}

/// Removes `value` from `outer[k1][k2]`, pruning the bag and, if it becomes
/// empty, the inner map entry, and, if the inner map becomes empty, the
/// outer map entry (spec.md §4.1 "empty inner maps are pruned").
pub(crate) fn remove<K1, K2, V>(
    outer: &Nested<K1, K2, V>,
    k1: &K1,
    k2: &K2,
    value: &V,
) -> (Nested<K1, K2, V>, bool)
where
    K1: Clone + Eq + Hash,
    K2: Clone + Eq + Hash,
    V: Clone + Eq + Hash,
{
    let Some(inner) = outer.get(k1) else {
        return (Arc::clone(outer), false);
    };
    let Some(bag) = inner.get(k2) else {
        return (Arc::clone(outer), false);
    };
    let (new_bag, changed) = bag.remove(value);
    if !changed {
        return (Arc::clone(outer), false);
    }
    let mut new_inner = (**inner).clone();
    match new_bag {
        Some(bag) => {
            new_inner.insert(k2.clone(), bag);
        }
        None => {
            new_inner.remove(k2);
        }
    }
    let mut new_outer = (**outer).clone();
    if new_inner.is_empty() {
        new_outer.remove(k1);
    } else {
        new_outer.insert(k1.clone(), Arc::new(new_inner));
    }
    (Arc::new(new_outer), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_remove_restores_empty_map() {
        let m: Nested<i32, i32, i32> = empty();
        let (m, changed) = insert(&m, 1, 2, 3, false);
        assert!(changed);
        assert_eq!(m.len(), 1);
        let (m, changed) = remove(&m, &1, &2, &3);
        assert!(changed);
        assert!(m.is_empty());
    }

    #[test]
    fn insert_duplicate_is_identity_in_single_variant() {
        let m: Nested<i32, i32, i32> = empty();
        let (m, _) = insert(&m, 1, 2, 3, false);
        let (m2, changed) = insert(&m, 1, 2, 3, false);
        assert!(!changed);
        assert!(Arc::ptr_eq(&m, &m2));
    }

    #[test]
    fn remove_absent_is_identity() {
        let m: Nested<i32, i32, i32> = empty();
        let (m2, changed) = remove(&m, &1, &2, &3);
        assert!(!changed);
        assert!(Arc::ptr_eq(&m, &m2));
    }
}
