//! Canonical forms of vertices and the structures that remember which of them have
//! already been discovered.

use std::{
    collections::HashSet,
    fmt::Debug,
    hash::{BuildHasher, Hash},
};

use crate::{RootedGraph, Set};

#[cfg(feature = "ahash")]
type DefaultState = ahash::RandomState;
#[cfg(not(feature = "ahash"))]
type DefaultState = std::collections::hash_map::RandomState;

/// Maps a vertex to its canonical form. All membership tests of the traversal engines
/// operate on canonical forms, so vertices with the same canonical form are treated as
/// one explored state.
pub trait Reduce<V> {
    /// The canonical form.
    type Canonical: Clone + Eq + Hash + Debug;

    /// Computes the canonical form of `vertex`.
    fn reduce(&self, vertex: &V) -> Self::Canonical;
}

impl<V, R: Reduce<V> + ?Sized> Reduce<V> for &R {
    type Canonical = R::Canonical;

    fn reduce(&self, vertex: &V) -> Self::Canonical {
        R::reduce(self, vertex)
    }
}

/// The reduction that keeps every vertex as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<V: Clone + Eq + Hash + Debug> Reduce<V> for Identity {
    type Canonical = V;

    fn reduce(&self, vertex: &V) -> V {
        vertex.clone()
    }
}

/// A reduction given by a closure.
#[derive(Clone, Copy)]
pub struct ReduceWith<F>(pub F);

impl<V, A, F> Reduce<V> for ReduceWith<F>
where
    A: Clone + Eq + Hash + Debug,
    F: Fn(&V) -> A,
{
    type Canonical = A;

    fn reduce(&self, vertex: &V) -> A {
        (self.0)(vertex)
    }
}

impl<F> Debug for ReduceWith<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReduceWith(..)")
    }
}

/// The store deciding whether a canonical form counts as known.
pub trait KnownSet<K> {
    /// Returns `true` if `key` is known.
    fn knows(&self, key: &K) -> bool;

    /// Records `key` as known, returns `true` if it was not known before.
    fn learn(&mut self, key: K) -> bool;

    /// The number of keys learnt so far.
    fn len(&self) -> usize;

    /// Returns `true` if nothing has been learnt yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, S: BuildHasher> KnownSet<K> for HashSet<K, S> {
    fn knows(&self, key: &K) -> bool {
        self.contains(key)
    }

    fn learn(&mut self, key: K) -> bool {
        self.insert(key)
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }
}

impl<K, T: KnownSet<K> + ?Sized> KnownSet<K> for &mut T {
    fn knows(&self, key: &K) -> bool {
        T::knows(self, key)
    }

    fn learn(&mut self, key: K) -> bool {
        T::learn(self, key)
    }

    fn len(&self) -> usize {
        T::len(self)
    }
}

/// A store that never knows anything. Only sound for graphs without cycles, and only
/// efficient for graphs without sharing, i.e. trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Forgetful {
    learnt: usize,
}

impl<K> KnownSet<K> for Forgetful {
    fn knows(&self, _key: &K) -> bool {
        false
    }

    fn learn(&mut self, _key: K) -> bool {
        self.learnt += 1;
        true
    }

    fn len(&self) -> usize {
        self.learnt
    }
}

/// The default store, which remembers everything unless the graph declares itself to
/// be a tree.
#[derive(Debug, Clone)]
pub enum Visited<K> {
    /// Every learnt key is kept.
    Remember(Set<K>),
    /// Nothing is kept, only counted.
    Forget(Forgetful),
}

impl<K: Eq + Hash> Default for Visited<K> {
    fn default() -> Self {
        Self::Remember(Set::default())
    }
}

impl<K: Eq + Hash> Visited<K> {
    /// Picks the store that suits the hints of `graph`.
    pub fn for_graph<G: RootedGraph + ?Sized>(graph: &G) -> Self {
        if graph.has_cycles() || graph.has_sharing() {
            Self::default()
        } else {
            Self::Forget(Forgetful::default())
        }
    }

    /// The remembered keys, if they are kept.
    pub fn remembered(&self) -> Option<&Set<K>> {
        match self {
            Visited::Remember(set) => Some(set),
            Visited::Forget(_) => None,
        }
    }
}

impl<K: Eq + Hash> KnownSet<K> for Visited<K> {
    fn knows(&self, key: &K) -> bool {
        match self {
            Visited::Remember(set) => set.contains(key),
            Visited::Forget(_) => false,
        }
    }

    fn learn(&mut self, key: K) -> bool {
        match self {
            Visited::Remember(set) => set.insert(key),
            Visited::Forget(forgetful) => KnownSet::<K>::learn(forgetful, key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Visited::Remember(set) => set.len(),
            Visited::Forget(forgetful) => KnownSet::<K>::len(forgetful),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<K> {
    Empty,
    Deleted,
    Occupied(K),
}

/// A hash set with open addressing and linear probing. Removed entries leave a
/// tombstone behind so that probe sequences running through them stay intact; the
/// tombstones are swept whenever the table is rebuilt.
#[derive(Debug, Clone)]
pub struct ProbingSet<K, S = DefaultState> {
    slots: Vec<Slot<K>>,
    len: usize,
    deleted: usize,
    state: S,
}

const MIN_CAPACITY: usize = 8;

impl<K: Eq + Hash> Default for ProbingSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> ProbingSet<K> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::with_hasher(DefaultState::default())
    }
}

impl<K: Eq + Hash, S: BuildHasher> ProbingSet<K, S> {
    /// Creates an empty set that hashes with `state`.
    pub fn with_hasher(state: S) -> Self {
        Self {
            slots: (0..MIN_CAPACITY).map(|_| Slot::Empty).collect(),
            len: 0,
            deleted: 0,
            state,
        }
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// Locates `key`: `Ok` holds the slot it occupies, `Err` the slot where it would be
    /// inserted, which is the first tombstone on the probe sequence if there is one.
    fn locate(&self, key: &K) -> Result<usize, usize> {
        let mask = self.mask();
        let mut position = (self.state.hash_one(key) as usize) & mask;
        let mut tombstone = None;
        for _ in 0..self.slots.len() {
            match &self.slots[position] {
                Slot::Empty => return Err(tombstone.unwrap_or(position)),
                Slot::Deleted => {
                    tombstone.get_or_insert(position);
                }
                Slot::Occupied(existing) if existing == key => return Ok(position),
                Slot::Occupied(_) => {}
            }
            position = (position + 1) & mask;
        }
        // the table is never full, so a wrapped probe sequence has seen a tombstone
        Err(tombstone.unwrap_or(position))
    }

    /// Returns `true` if `key` is an element.
    pub fn contains(&self, key: &K) -> bool {
        self.locate(key).is_ok()
    }

    /// Inserts `key`, returns `true` if it was not present.
    pub fn insert(&mut self, key: K) -> bool {
        if (self.len + self.deleted + 1) * 4 > self.slots.len() * 3 {
            self.rebuild();
        }
        match self.locate(&key) {
            Ok(_) => false,
            Err(position) => {
                if matches!(self.slots[position], Slot::Deleted) {
                    self.deleted -= 1;
                }
                self.slots[position] = Slot::Occupied(key);
                self.len += 1;
                true
            }
        }
    }

    /// Removes `key`, returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.locate(key) {
            Ok(position) => {
                self.slots[position] = Slot::Deleted;
                self.len -= 1;
                self.deleted += 1;
                true
            }
            Err(_) => false,
        }
    }

    /// Iterates over the elements in table order.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(key) => Some(key),
            _ => None,
        })
    }

    fn rebuild(&mut self) {
        let capacity = if (self.len + 1) * 2 > self.slots.len() {
            self.slots.len() * 2
        } else {
            self.slots.len()
        };
        let old = std::mem::replace(
            &mut self.slots,
            (0..capacity.max(MIN_CAPACITY))
                .map(|_| Slot::Empty)
                .collect(),
        );
        self.len = 0;
        self.deleted = 0;
        for slot in old {
            if let Slot::Occupied(key) = slot {
                if let Err(position) = self.locate(&key) {
                    self.slots[position] = Slot::Occupied(key);
                    self.len += 1;
                }
            }
        }
    }
}

impl<K: Eq + Hash, S: BuildHasher> KnownSet<K> for ProbingSet<K, S> {
    fn knows(&self, key: &K) -> bool {
        self.contains(key)
    }

    fn learn(&mut self, key: K) -> bool {
        self.insert(key)
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::graph::samples;

    #[test]
    fn probing_set_insert_remove() {
        let mut set = ProbingSet::new();
        for i in 0..100u32 {
            assert!(set.insert(i));
        }
        assert!(!set.insert(7));
        assert_eq!(set.len(), 100);
        for i in (0..100u32).step_by(2) {
            assert!(set.remove(&i));
        }
        assert!(!set.remove(&0));
        assert_eq!(set.len(), 50);
        assert!(!set.contains(&4));
        assert!(set.contains(&5));
        assert!(set.insert(4));
        assert_eq!(
            set.iter().copied().sorted().collect_vec(),
            (0..100u32)
                .filter(|i| i % 2 == 1 || *i == 4)
                .collect_vec()
        );
    }

    #[test]
    fn probing_set_survives_churn() {
        let mut set = ProbingSet::new();
        for round in 0..50u32 {
            assert!(set.insert(round));
            assert!(set.remove(&round));
        }
        assert!(set.is_empty());
        assert!(set.slots.len() <= 16);
    }

    #[test]
    fn visited_follows_hints() {
        let tree = samples::binary_tree(3);
        let mut visited = Visited::for_graph(&tree);
        assert!(visited.remembered().is_none());
        assert!(visited.learn(1));
        assert!(visited.learn(1));
        assert!(!visited.knows(&1));
        assert_eq!(KnownSet::len(&visited), 2);

        let cyclic = samples::root_cycle_3();
        let mut visited = Visited::for_graph(&cyclic);
        assert!(visited.learn(1));
        assert!(!visited.learn(1));
        assert!(visited.knows(&1));
    }

    #[test]
    fn reductions() {
        let parity = ReduceWith(|v: &u32| v % 2);
        assert_eq!(parity.reduce(&7), 1);
        assert_eq!(Reduce::<u32>::reduce(&Identity, &7), 7);
    }
}
