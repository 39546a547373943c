use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;
use std::sync::Arc;

/// The innermost container of a nested index, holding the values at a given
/// `(s,p)`/`(p,o)`/`(o,s)` position.
///
/// `Set` backs the single-valued variant (spec.md §3: "at most one `(s,p,o)`
/// occurrence; innermost container is a set"); `Multi` backs the multigraph
/// variant (a multiset, counts strictly positive, zero counts pruned).
#[derive(Clone, Debug)]
pub(crate) enum Bag<V> {
    Set(Arc<FxHashSet<V>>),
    Multi(Arc<FxHashMap<V, u32>>),
}

impl<V: Clone + Eq + Hash> Bag<V> {
    pub(crate) fn empty_set() -> Self {
        Self::Set(Arc::new(FxHashSet::default()))
    }

    pub(crate) fn empty_multi() -> Self {
        Self::Multi(Arc::new(FxHashMap::default()))
    }

    pub(crate) fn contains(&self, value: &V) -> bool {
        match self {
            Self::Set(set) => set.contains(value),
            Self::Multi(map) => map.contains_key(value),
        }
    }

    /// Multiplicity of `value` in this bag (0 if absent, 1 in the
    /// single-valued variant, the stored count in the multigraph variant).
    pub(crate) fn multiplicity(&self, value: &V) -> u64 {
        match self {
            Self::Set(set) => u64::from(set.contains(value)),
            Self::Multi(map) => u64::from(map.get(value).copied().unwrap_or(0)),
        }
    }

    /// Number of distinct values held.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Set(set) => set.len(),
            Self::Multi(map) => map.len(),
        }
    }

    /// Sum of multiplicities across all distinct values.
    pub(crate) fn total(&self) -> u64 {
        match self {
            Self::Set(set) => set.len() as u64,
            Self::Multi(map) => map.values().map(|&c| u64::from(c)).sum(),
        }
    }

    /// Whether two bags hold the same values with the same multiplicities,
    /// regardless of which variant backs them.
    pub(crate) fn semantically_equal(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(v, count)| other.multiplicity(v) == count)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&V, u64)> {
        let as_set: Box<dyn Iterator<Item = (&V, u64)>> = match self {
            Self::Set(set) => Box::new(set.iter().map(|v| (v, 1))),
            Self::Multi(map) => Box::new(map.iter().map(|(v, &c)| (v, u64::from(c)))),
        };
        as_set
    }

    /// Inserts `value`, returning the new bag and whether anything changed
    /// (per spec.md §3's "Add idempotence": inserting an already-present
    /// value into the single-valued variant is a no-op; the multigraph
    /// variant always reports a change since its count increments).
    pub(crate) fn insert(&self, value: V) -> (Self, bool) {
        match self {
            Self::Set(set) => {
                if set.contains(&value) {
                    (self.clone(), false)
                } else {
                    let mut new_set = (**set).clone();
                    new_set.insert(value);
                    (Self::Set(Arc::new(new_set)), true)
                }
            }
            Self::Multi(map) => {
                let mut new_map = (**map).clone();
                new_map
                    .entry(value)
                    .and_modify(|count| *count += 1)
                    .or_insert(1);
                (Self::Multi(Arc::new(new_map)), true)
            }
        }
    }

    /// Removes `value`, returning `None` when the bag becomes empty (so the
    /// caller can prune the parent map entry, per spec.md §4.1 "empty inner
    /// maps are pruned") and whether anything changed.
    pub(crate) fn remove(&self, value: &V) -> (Option<Self>, bool) {
        match self {
            Self::Set(set) => {
                if !set.contains(value) {
                    return (Some(self.clone()), false);
                }
                let mut new_set = (**set).clone();
                new_set.remove(value);
                if new_set.is_empty() {
                    (None, true)
                } else {
                    (Some(Self::Set(Arc::new(new_set))), true)
                }
            }
            Self::Multi(map) => {
                let Some(&count) = map.get(value) else {
                    return (Some(self.clone()), false);
                };
                let mut new_map = (**map).clone();
                if count <= 1 {
                    new_map.remove(value);
                } else {
                    new_map.insert(value.clone(), count - 1);
                }
                if new_map.is_empty() {
                    (None, true)
                } else {
                    (Some(Self::Multi(Arc::new(new_map))), true)
                }
            }
        }
    }
}
